//! Notifier that logs each message instead of sending it.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notifier, NotifierError, OutgoingMessage};

/// Logs outgoing messages at `info` level, body included.
///
/// Only suitable where the log is private: confirmation codes appear in it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), NotifierError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "outgoing message"
        );
        Ok(())
    }
}
