//! Error types for the optimization engine

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running an optimization.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A hyperparameter or setting is outside its valid range
    #[error("invalid configuration '{arg}': {reason}")]
    InvalidConfig {
        /// Setting name
        arg: &'static str,
        /// Why it's invalid
        reason: String,
    },

    /// Two sequences that must agree in length do not
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        /// What was being compared
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// A component was used before it was initialized
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Description of what went wrong
        reason: String,
    },

    /// Configuration file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(arg: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            arg,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_reset(name: &str) -> Self {
        Error::InvalidState {
            reason: format!("{name} used before reset()"),
        }
    }
}
