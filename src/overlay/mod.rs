pub mod config;
pub mod fallback;
pub mod refresh;

#[cfg(windows)]
pub mod device;
#[cfg(windows)]
pub mod surface;

pub use config::OverlayOptions;
pub use fallback::{AdapterKind, DeviceError, create_with_fallback};
pub use refresh::{DisplayMode, pick_refresh_rate};

#[cfg(windows)]
pub use device::PresentationTarget;
#[cfg(windows)]
pub use refresh::query_refresh_rate;
#[cfg(windows)]
pub use surface::Surface;
