//! Smoke-test error types.
//!
//! [`SmokeError`] is the single error type returned by the waiter, the
//! runner and the configuration loader. The binary maps any variant to a
//! non-zero process exit status.

/// Errors raised while waiting for the database or running the smoke test.
///
/// # Error Codes
///
/// | Code | Variant               | Phase              |
/// |------|-----------------------|--------------------|
/// | 1001 | `Config`              | startup            |
/// | 2001 | `ConnectionExhausted` | connection waiter  |
/// | 3001 | `OperationFailed`     | smoke-test runner  |
/// | 3002 | `Output`              | smoke-test runner  |
#[derive(Debug, thiserror::Error)]
pub enum SmokeError {
    /// An environment variable was set to a value that cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Every connection attempt in the retry budget failed.
    #[error("could not connect to the database after {attempts} attempts: {source}")]
    ConnectionExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Error observed on the final attempt.
        #[source]
        source: sqlx::Error,
    },

    /// A database statement failed during table setup, insert or query.
    #[error("{operation} failed: {source}")]
    OperationFailed {
        /// Short name of the step that failed (e.g. `"create table"`).
        operation: &'static str,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// Writing the probe records to the output failed.
    #[error("failed to print probe records: {0}")]
    Output(#[from] std::io::Error),
}

impl SmokeError {
    /// Wraps a driver error raised by the named step.
    #[must_use]
    pub const fn operation(operation: &'static str, source: sqlx::Error) -> Self {
        Self::OperationFailed { operation, source }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Config(_) => 1001,
            Self::ConnectionExhausted { .. } => 2001,
            Self::OperationFailed { .. } => 3001,
            Self::Output(_) => 3002,
        }
    }
}
