//! Outbound message delivery port.
//!
//! The domain treats delivery as a black box: one call per message, success
//! or failure. Transport details stay in the outbound adapters.

use async_trait::async_trait;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// The message could not be built from its parts.
        InvalidMessage { message: String } => "message could not be built: {message}",
        /// The transport refused or failed to deliver the message.
        Delivery { message: String } => "message delivery failed: {message}",
    }
}

/// Plain-text message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: Email,
    pub subject: String,
    pub body: String,
}

/// Port for delivering messages to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` once.
    async fn send(&self, message: &OutgoingMessage) -> Result<(), NotifierError>;
}
