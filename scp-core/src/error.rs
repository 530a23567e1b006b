//! Error types for the dual-bound engine.

use thiserror::Error;

/// Errors that can occur while building an instance or running a driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScpError {
    /// Instance data is structurally inconsistent
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),

    /// A buffer could not be allocated
    #[error("Out of memory allocating {what} ({len} elements)")]
    OutOfMemory {
        /// Which buffer failed.
        what: &'static str,
        /// Requested length in elements.
        len: usize,
    },

    /// Tuning parameters out of range
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Results were requested before any optimization run completed
    #[error("No optimization run has completed yet")]
    NoResult,
}

/// Result type for dual-bound operations.
pub type ScpResult<T> = Result<T, ScpError>;

/// Allocate a vector of `len` copies of `value`, reporting allocation
/// failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T, what: &'static str) -> ScpResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ScpError::OutOfMemory { what, len })?;
    buf.resize(len, value);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_filled() {
        let v = try_filled(4, 1.5_f64, "test").unwrap();
        assert_eq!(v, vec![1.5; 4]);
    }

    #[test]
    fn test_try_filled_reports_exhaustion() {
        let err = try_filled::<f64>(usize::MAX, 0.0, "huge").unwrap_err();
        assert_eq!(err, ScpError::OutOfMemory { what: "huge", len: usize::MAX });
        assert!(err.to_string().contains("huge"));
    }
}
