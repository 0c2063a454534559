pub mod frame;
pub mod input;
pub mod lifecycle;

pub use frame::{DrawPath, FrameDriver, Interaction, Tick};
pub use input::{InputEvent, KeyEdge};
pub use lifecycle::Lifecycle;
