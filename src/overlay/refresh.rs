//! Display-mode query used to seed the swap-chain refresh rate.
//!
//! The value only feeds the swap-chain descriptor; presentation cadence is
//! set by the vsync wait at present time, not by this number.

/// Default used whenever enumeration fails or yields nothing usable.
pub const DEFAULT_REFRESH_HZ: f32 = 60.0;

/// Refresh rate of one display mode as the rational DXGI reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub numerator: u32,
    pub denominator: u32,
}

impl DisplayMode {
    fn hz(self) -> Option<f32> {
        if self.denominator == 0 {
            return None;
        }
        let hz = self.numerator as f32 / self.denominator as f32;
        (hz != 0.0).then_some(hz)
    }
}

/// Highest non-zero refresh rate in the list, or [`DEFAULT_REFRESH_HZ`] when
/// the list is empty or carries only zero rates.
pub fn pick_refresh_rate(modes: &[DisplayMode]) -> f32 {
    modes
        .iter()
        .filter_map(|m| m.hz())
        .fold(DEFAULT_REFRESH_HZ, f32::max)
}

#[cfg(windows)]
pub use query::query_refresh_rate;

#[cfg(windows)]
mod query {
    use log::{debug, info};
    use windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_MODE_DESC};
    use windows::Win32::Graphics::Dxgi::{CreateDXGIFactory, DXGI_ENUM_MODES, IDXGIFactory};

    use super::{DEFAULT_REFRESH_HZ, DisplayMode, pick_refresh_rate};

    /// Query the primary output of the first adapter for its supported
    /// display modes and pick the highest refresh rate. Every failure path
    /// short-circuits to the 60 Hz default; this never errors.
    pub fn query_refresh_rate() -> f32 {
        match enumerate_modes() {
            Ok(modes) => {
                let hz = pick_refresh_rate(&modes);
                info!("display refresh rate: {hz} Hz");
                hz
            }
            Err(e) => {
                debug!("display mode enumeration failed ({e}); assuming 60 Hz");
                DEFAULT_REFRESH_HZ
            }
        }
    }

    fn enumerate_modes() -> windows::core::Result<Vec<DisplayMode>> {
        unsafe {
            let factory: IDXGIFactory = CreateDXGIFactory()?;
            let adapter = factory.EnumAdapters(0)?;
            let output = adapter.EnumOutputs(0)?;

            let mut count = 0u32;
            output.GetDisplayModeList(
                DXGI_FORMAT_R8G8B8A8_UNORM,
                DXGI_ENUM_MODES(0),
                &mut count,
                None,
            )?;

            let mut descs = vec![DXGI_MODE_DESC::default(); count as usize];
            output.GetDisplayModeList(
                DXGI_FORMAT_R8G8B8A8_UNORM,
                DXGI_ENUM_MODES(0),
                &mut count,
                Some(descs.as_mut_ptr()),
            )?;
            descs.truncate(count as usize);

            Ok(descs
                .iter()
                .map(|d| DisplayMode {
                    numerator: d.RefreshRate.Numerator,
                    denominator: d.RefreshRate.Denominator,
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(numerator: u32, denominator: u32) -> DisplayMode {
        DisplayMode {
            numerator,
            denominator,
        }
    }

    #[test]
    fn picks_maximum_rate() {
        let modes = [mode(60, 1), mode(144, 1), mode(120_000, 1000)];
        assert_eq!(pick_refresh_rate(&modes), 144.0);
    }

    #[test]
    fn fractional_rates_compare_correctly() {
        let modes = [mode(59_940, 1000), mode(60, 1)];
        assert_eq!(pick_refresh_rate(&modes), 60.0);
    }

    #[test]
    fn empty_list_defaults_to_60() {
        assert_eq!(pick_refresh_rate(&[]), DEFAULT_REFRESH_HZ);
    }

    #[test]
    fn all_zero_rates_default_to_60() {
        let modes = [mode(0, 1), mode(0, 1)];
        assert_eq!(pick_refresh_rate(&modes), DEFAULT_REFRESH_HZ);
    }

    #[test]
    fn zero_denominator_is_skipped_not_divided() {
        let modes = [mode(144, 0), mode(75, 1)];
        assert_eq!(pick_refresh_rate(&modes), 75.0);
    }

    #[test]
    fn rates_below_default_still_yield_60() {
        let modes = [mode(30, 1)];
        assert_eq!(pick_refresh_rate(&modes), DEFAULT_REFRESH_HZ);
    }
}
