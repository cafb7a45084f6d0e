use thiserror::Error;

/// Failures raised by iterator constructors and derived operations.
///
/// `next` itself never fails; exhaustion is reported as `None`. Every variant
/// here is raised synchronously at the offending call and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IterError {
    /// A count argument was negative (or zero where at least one is required).
    #[error("invalid argument to {operation}: {reason}")]
    InvalidArgument {
        /// Operation that rejected the argument (`take`, `drop`, ...).
        operation: &'static str,
        /// Human readable reason.
        reason: String,
    },

    /// `length` was requested on an iterator whose size is not finite/known.
    #[error("length is undefined for an iterator of size {0}")]
    UndefinedLength(String),

    /// The iterator cannot be traversed backwards.
    #[error("reverse iteration is not supported: {0}")]
    UnsupportedReverse(String),

    /// A stateful cursor was popped after it ran out of elements.
    #[error("end of sequence")]
    EndOfSequence,

    /// A positional request fell outside the available elements.
    #[error("index out of bounds: {0}")]
    OutOfBounds(String),

    /// Computing a size overflowed `usize`.
    #[error("arithmetic overflow while computing {0}")]
    ArithmeticOverflow(String),
}

impl IterError {
    /// Helper for rejecting a negative count.
    pub fn negative_count(operation: &'static str, n: isize) -> Self {
        IterError::InvalidArgument {
            operation,
            reason: format!("count must be non-negative, got {}", n),
        }
    }

    /// Helper for constructing out-of-bounds errors.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        IterError::OutOfBounds(msg.into())
    }
}

/// Validate a signed count coming from a runtime-facing API.
pub(crate) fn checked_count(operation: &'static str, n: isize) -> Result<usize, IterError> {
    usize::try_from(n).map_err(|_| IterError::negative_count(operation, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_rejected() {
        let err = checked_count("take", -3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument to take: count must be non-negative, got -3"
        );
        assert_eq!(checked_count("drop", 4), Ok(4));
    }
}
