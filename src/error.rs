use thiserror::Error;

use crate::sim::error::SimError;
use crate::types::error::{DescriptorError, TypeIdError};

/// Result type for vtrewrite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced to the rewriting pass
#[derive(Error, Debug)]
pub enum Error {
    #[error("Type id error: {0}")]
    TypeId(#[from] TypeIdError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// True for errors that must abort the current method's rewrite
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Error::Config { .. })
    }
}
