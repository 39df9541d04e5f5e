// src/deliver/mod.rs
pub mod email;
pub mod file;

use async_trait::async_trait;

use crate::render::RenderedDigest;

pub use email::SmtpSender;
pub use file::FileSender;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("could not build message: {0}")]
    Build(String),
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Hands a rendered digest to its destination. Called at most once per run.
#[async_trait]
pub trait DigestSender: Send + Sync {
    async fn send(&self, digest: &RenderedDigest, recipient: &str) -> Result<(), DeliveryError>;
    fn name(&self) -> &'static str;
}
