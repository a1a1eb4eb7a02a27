//! Error type for checked array access and persisted-state restore.
//!
//! A failed compare-and-set is not an error: it is reported as `false` (or
//! `Err(observed)` from `compare_exchange_with`) and never reaches this type.

use core::fmt;

/// Errors raised by atomic arrays.
///
/// Both variants signal caller error rather than contention. They are raised
/// before any slot is read, written or created, and nothing in this crate
/// retries them internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicError {
    /// An array accessor was called with `index >= len`.
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// The array length.
        len: usize,
    },
    /// A persisted payload was not an array, or held elements of the wrong kind.
    InvalidRestoredState {
        /// Human-readable description of the mismatch.
        reason: String,
    },
}

impl AtomicError {
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        #[cfg(feature = "tracing")]
        tracing::warn!(%reason, "rejected persisted atomic array state");
        Self::InvalidRestoredState { reason }
    }
}

impl fmt::Display for AtomicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for atomic array of length {len}")
            }
            Self::InvalidRestoredState { reason } => {
                write!(f, "invalid restored atomic array state: {reason}")
            }
        }
    }
}

impl std::error::Error for AtomicError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_index_and_length() {
        let err = AtomicError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "index 7 out of range for atomic array of length 3"
        );
    }

    #[test]
    fn invalid_state_carries_reason() {
        let err = AtomicError::invalid_state("expected an array, found a string");
        assert_eq!(
            err,
            AtomicError::InvalidRestoredState {
                reason: "expected an array, found a string".to_owned()
            }
        );
        assert!(err.to_string().ends_with("found a string"));
    }
}
