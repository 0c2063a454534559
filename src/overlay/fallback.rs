//! Adapter fallback policy for device creation.
//!
//! Kept free of any D3D types so the retry rules are testable without a
//! GPU: hardware first, and exactly one software (WARP) retry, taken only
//! when the hardware attempt was rejected as unsupported.

use thiserror::Error;

/// Which adapter a creation attempt should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Hardware,
    /// WARP software rasteriser.
    Software,
}

/// Device-creation failure, split by whether the fallback applies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The adapter rejected the requested configuration
    /// (`DXGI_ERROR_UNSUPPORTED`); the one condition that triggers the
    /// software retry.
    #[error("requested device configuration is unsupported by the adapter")]
    Unsupported,
    /// Any other creation failure; reported as-is, no retry.
    #[error("device creation failed: {0}")]
    Creation(String),
}

/// Run `attempt` against the hardware adapter, retrying once on WARP iff
/// the hardware attempt failed with [`DeviceError::Unsupported`].
pub fn create_with_fallback<T>(
    mut attempt: impl FnMut(AdapterKind) -> Result<T, DeviceError>,
) -> Result<T, DeviceError> {
    match attempt(AdapterKind::Hardware) {
        Err(DeviceError::Unsupported) => {
            log::warn!("hardware device unsupported; retrying on the WARP software adapter");
            attempt(AdapterKind::Software)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_success_makes_one_attempt() {
        let mut attempts = Vec::new();
        let out = create_with_fallback(|kind| {
            attempts.push(kind);
            Ok::<_, DeviceError>(7)
        });
        assert_eq!(out, Ok(7));
        assert_eq!(attempts, [AdapterKind::Hardware]);
    }

    #[test]
    fn unsupported_retries_software_exactly_once() {
        let mut attempts = Vec::new();
        let out = create_with_fallback(|kind| {
            attempts.push(kind);
            match kind {
                AdapterKind::Hardware => Err(DeviceError::Unsupported),
                AdapterKind::Software => Ok(42),
            }
        });
        assert_eq!(out, Ok(42));
        assert_eq!(attempts, [AdapterKind::Hardware, AdapterKind::Software]);
    }

    #[test]
    fn other_failures_do_not_fall_back() {
        let mut attempts = Vec::new();
        let out: Result<(), _> = create_with_fallback(|kind| {
            attempts.push(kind);
            Err(DeviceError::Creation("out of memory".into()))
        });
        assert_eq!(out, Err(DeviceError::Creation("out of memory".into())));
        assert_eq!(attempts, [AdapterKind::Hardware]);
    }

    #[test]
    fn software_failure_is_final() {
        let out: Result<(), _> = create_with_fallback(|kind| match kind {
            AdapterKind::Hardware => Err(DeviceError::Unsupported),
            AdapterKind::Software => Err(DeviceError::Unsupported),
        });
        assert_eq!(out, Err(DeviceError::Unsupported));
    }
}
