//! Outbound channel boundary.
//!
//! The relay and admin layers talk to the chat platform only through the
//! [`Outbound`] trait, so they can be driven by the Telegram adapter in
//! production and by a recording mock in tests.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::relay::Content;

/// A send to one recipient failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("delivery to {recipient} failed: {reason}")]
pub struct DeliveryError {
    /// Recipient user id.
    pub recipient: i64,
    /// Transport-provided reason.
    pub reason: String,
}

impl DeliveryError {
    pub fn new(recipient: i64, reason: impl Into<String>) -> Self {
        Self {
            recipient,
            reason: reason.into(),
        }
    }
}

/// Result of a single outbound send.
pub type DeliveryResult = std::result::Result<(), DeliveryError>;

/// An inline button carrying an action token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// Sends to chat-platform users, addressed by user id.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, to: i64, text: &str) -> DeliveryResult;

    /// Send a text message with rows of inline buttons.
    async fn send_menu(&self, to: i64, text: &str, rows: &[Vec<Button>]) -> DeliveryResult;

    /// Send `content`, reusing its media reference.
    ///
    /// `caption` replaces the content's own caption on captioned kinds and
    /// the body on text. Kinds without a caption ignore it.
    async fn send_content(&self, to: i64, content: &Content, caption: Option<&str>)
        -> DeliveryResult;

    /// Forward an original message as-is.
    async fn forward(&self, to: i64, from_chat: i64, message_id: i32) -> DeliveryResult;

    /// Send an in-memory document.
    async fn send_file(&self, to: i64, file_name: &str, bytes: Vec<u8>) -> DeliveryResult;
}

/// Send a best-effort text notice. Failures are logged and swallowed.
pub async fn notify(outbound: &dyn Outbound, to: i64, text: &str) {
    if let Err(e) = outbound.send_text(to, text).await {
        warn!(recipient = to, error = %e, "Failed to send notice");
    }
}

/// Send a best-effort menu. Failures are logged and swallowed.
pub async fn notify_menu(outbound: &dyn Outbound, to: i64, text: &str, rows: &[Vec<Button>]) {
    if let Err(e) = outbound.send_menu(to, text, rows).await {
        warn!(recipient = to, error = %e, "Failed to send menu");
    }
}
