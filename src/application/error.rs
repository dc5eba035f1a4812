use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

/// Top-level failures that stop the binary. Fragment-level problems never
/// reach this type; the loader absorbs them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
