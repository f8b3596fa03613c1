//! Shared utilities for the exported entry points.

use std::panic::{self, AssertUnwindSafe};

use crate::error::BridgeError;

/// Runs `f`, turning a panic into `BridgeError::Panic` so it never unwinds
/// across an `extern` boundary.
pub(crate) fn guard<T>(
    operation: &'static str,
    f: impl FnOnce() -> Result<T, BridgeError>,
) -> Result<T, BridgeError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            log::error!("panic caught at the native boundary in {operation}");
            Err(BridgeError::Panic(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_results() {
        assert_eq!(guard("ok", || Ok(7)).unwrap(), 7);
        let err = guard::<()>("err", || Err(BridgeError::NotLoaded)).unwrap_err();
        assert!(matches!(err, BridgeError::NotLoaded));
    }

    #[test]
    fn panic_becomes_error() {
        let err = guard::<()>("exploding", || panic!("boom")).unwrap_err();
        assert!(matches!(err, BridgeError::Panic("exploding")));
        assert_eq!(err.to_string(), "panic while running exploding");
    }
}
