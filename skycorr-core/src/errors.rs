//! Error types for correlation measurements.
//!
//! One unified error type [`CorrError`] covers the failure modes of this
//! workspace: rejected index/bin configurations, operations issued out of
//! order, numerical failures, and catalog data problems.
//!
//! | Variant | Use Case | Recoverable? |
//! |---------|----------|--------------|
//! | [`InvalidConfiguration`](CorrError::InvalidConfiguration) | Degenerate bounds, bad depth, bad bin edges | No |
//! | [`PreconditionViolation`](CorrError::PreconditionViolation) | Query before statistics aggregation | No |
//! | [`MathError`](CorrError::MathError) | Non-convergent integration | No |
//! | [`DataError`](CorrError::DataError) | Catalog file I/O and parsing | Yes |
//!
//! Most fallible functions return [`CorrResult<T>`]. Use the constructor
//! methods for consistent error creation.

use thiserror::Error;

/// Unified error type for sky correlation measurements.
#[derive(Error, Debug)]
pub enum CorrError {
    /// A structural parameter was rejected at construction time.
    #[error("Invalid configuration in {context}: {message}")]
    InvalidConfiguration { context: String, message: String },

    /// An operation was issued before its prerequisite completed.
    #[error("Precondition violated in {operation}: {message}")]
    PreconditionViolation { operation: String, message: String },

    /// A numerical computation failed.
    #[error("Math error in {operation}: {message}")]
    MathError { operation: String, message: String },

    /// Catalog data access failure (file I/O or record parsing).
    ///
    /// This is the only recoverable variant — an alternate file or a
    /// corrected record may succeed.
    #[error("Data error ({path} - {operation}): {message}")]
    DataError {
        path: String,
        operation: String,
        message: String,
    },
}

/// Convenience alias for `Result<T, CorrError>`.
pub type CorrResult<T> = Result<T, CorrError>;

impl CorrError {
    /// Creates an [`InvalidConfiguration`](Self::InvalidConfiguration) error.
    pub fn invalid_configuration(context: &str, reason: &str) -> Self {
        Self::InvalidConfiguration {
            context: context.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates a [`PreconditionViolation`](Self::PreconditionViolation) error.
    pub fn precondition_violation(operation: &str, reason: &str) -> Self {
        Self::PreconditionViolation {
            operation: operation.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates a [`MathError`](Self::MathError).
    pub fn math_error(operation: &str, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates a [`DataError`](Self::DataError) (the only recoverable variant).
    pub fn data_error(path: &str, operation: &str, reason: &str) -> Self {
        Self::DataError {
            path: path.to_string(),
            operation: operation.to_string(),
            message: reason.to_string(),
        }
    }

    /// Returns `true` if retrying with different input might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_message() {
        let err = CorrError::invalid_configuration("SkyBounds::new", "min_ra >= max_ra");
        assert_eq!(
            err.to_string(),
            "Invalid configuration in SkyBounds::new: min_ra >= max_ra"
        );
    }

    #[test]
    fn test_precondition_violation_message() {
        let err = CorrError::precondition_violation("find_sources", "tree not aggregated");
        assert!(err.to_string().contains("find_sources"));
        assert!(err.to_string().contains("not aggregated"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(CorrError::data_error("cat.dat", "parse", "bad float").is_recoverable());
        assert!(!CorrError::math_error("integrate", "no convergence").is_recoverable());
        assert!(!CorrError::invalid_configuration("depth", "zero").is_recoverable());
    }

    #[test]
    fn test_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<CorrError>();
        _assert_sync::<CorrError>();
    }
}
