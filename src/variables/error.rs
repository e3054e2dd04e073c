//! Global variable error types.

use thiserror::Error;

/// Errors that can occur when accessing global variables
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    /// The key has no value or no lock registered
    #[error("Global variable '{key}' does not exist")]
    KeyNotFound { key: String },

    /// The presented token does not belong to the current lock holder
    #[error("Wrong access key for global variable '{key}'")]
    WrongAccessKey { key: String },
}

impl VariableError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn wrong_key(key: &str) -> Self {
        Self::WrongAccessKey {
            key: key.to_string(),
        }
    }
}
