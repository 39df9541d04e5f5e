// src/deliver/file.rs
use std::path::PathBuf;

use async_trait::async_trait;

use super::{DeliveryError, DigestSender};
use crate::render::RenderedDigest;

/// Writes the HTML body to disk instead of mailing it (local previews).
pub struct FileSender {
    path: PathBuf,
}

impl FileSender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DigestSender for FileSender {
    async fn send(&self, digest: &RenderedDigest, recipient: &str) -> Result<(), DeliveryError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| DeliveryError::Transport(format!("{}: {e}", dir.display())))?;
        }
        tokio::fs::write(&self.path, digest.html.as_bytes())
            .await
            .map_err(|e| DeliveryError::Transport(format!("{}: {e}", self.path.display())))?;
        tracing::info!(path = %self.path.display(), recipient, "digest written to file");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
