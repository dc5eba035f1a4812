use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tracing::trace;

use crate::{
    application::ports::{ContentSource, FetchError},
    domain::fragments::FragmentId,
};

use super::{decode_body, plain_file_name};

/// Reads fragments from files directly under a content directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn fetch(&self, fragment: &FragmentId) -> Result<String, FetchError> {
        let path = self.root.join(plain_file_name(fragment)?);
        trace!(target: "hydrator::content", path = %path.display(), "reading fragment");

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(decode_body(&bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(err) => Err(FetchError::transport(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }
}
