//! Maps `Box<dyn Error>` from trait boundaries to typed `CamError`.
//!
//! The traits in `camhelper_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `camhelper_hardware::HwError`.

use crate::error::CamError;

/// Map a trait-boundary error to a typed `CamError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> CamError {
    #[cfg(feature = "hardware-errors")]
    {
        use camhelper_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Register { .. } | HwError::Io(_) => CamError::Io(hw.to_string()),
                other => CamError::HardwareFault(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return CamError::Io(io.to_string());
    }

    let s = e.to_string();
    if s.to_lowercase().contains("permission denied") {
        CamError::Io(s)
    } else {
        CamError::Hardware(s)
    }
}
