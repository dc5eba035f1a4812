//! Collaborator traits the fragment loader drives.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::fragments::{FragmentId, TargetId};

/// Recoverable fetch failures. Both leave the fragment eligible for the next
/// pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("fragment not found")]
    NotFound,
    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound => "not_found",
            FetchError::Transport { .. } => "transport",
        }
    }
}

/// Storage the fragment text is read from, addressed by fragment id.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Return the fragment body as UTF-8 text.
    async fn fetch(&self, fragment: &FragmentId) -> Result<String, FetchError>;
}

/// What to place into a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundContent {
    /// Replace the target's content with this HTML.
    Html(String),
    /// The fragment exists but is empty: leave the target content alone and
    /// only settle its container.
    Plain,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("no element with id `{target}` on the page")]
    MissingTarget { target: TargetId },
    #[error("element `{target}` has no enclosing fragment container")]
    MissingContainer { target: TargetId },
    #[error("page rewrite failed: {message}")]
    Rewrite { message: String },
}

/// Places rendered fragments into the page and marks the enclosing
/// container as settled, as one update.
pub trait TargetBinder {
    fn bind(
        &mut self,
        fragment: &FragmentId,
        target: &TargetId,
        content: BoundContent,
    ) -> Result<(), BindError>;
}
