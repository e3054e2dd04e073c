//! Build errors for container builders.

use crate::config::ConfigError;
use crate::container::StateError;
use thiserror::Error;

/// Errors that can occur when building a container state.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Container name not specified or blank")]
    MissingName,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Definition rejected: {0}")]
    Definition(#[from] StateError),
}
