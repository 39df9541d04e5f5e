// src/deliver/email.rs
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{DeliveryError, DigestSender};
use crate::config::SmtpConfig;
use crate::render::RenderedDigest;

pub struct SmtpSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

impl SmtpSender {
    pub fn from_config(cfg: &SmtpConfig) -> Result<Self, DeliveryError> {
        let from = parse_mailbox(&cfg.from)?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
            .map_err(|e| DeliveryError::Transport(format!("invalid SMTP_HOST: {e}")))?;
        if let (Some(user), Some(pass)) = (&cfg.user, &cfg.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

/// Build the HTML message without sending it.
pub fn build_message(
    from: &Mailbox,
    digest: &RenderedDigest,
    recipient: &str,
) -> Result<Message, DeliveryError> {
    let to = parse_mailbox(recipient)?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(digest.subject.clone())
        .header(header::ContentType::TEXT_HTML)
        .body(digest.html.clone())
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

#[async_trait]
impl DigestSender for SmtpSender {
    async fn send(&self, digest: &RenderedDigest, recipient: &str) -> Result<(), DeliveryError> {
        let msg = build_message(&self.from, digest, recipient)?;
        self.mailer
            .send(msg)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        tracing::info!(recipient, subject = %digest.subject, "digest email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
