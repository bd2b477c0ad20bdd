//! Delivery adapters for the [`Notifier`](crate::domain::ports::Notifier) port.
//!
//! - [`TracingNotifier`] writes messages to the log; the development default.
//! - [`SmtpNotifier`] relays messages through an SMTP server with `lettre`.
//! - [`ConfiguredNotifier`] picks one of the two at start-up.

mod smtp;
mod tracing_notifier;

use async_trait::async_trait;

use crate::domain::ports::{Notifier, NotifierError, OutgoingMessage};

pub use smtp::{SmtpConfig, SmtpNotifier};
pub use tracing_notifier::TracingNotifier;

/// Notifier chosen from configuration.
#[derive(Clone)]
pub enum ConfiguredNotifier {
    Tracing(TracingNotifier),
    Smtp(SmtpNotifier),
}

impl ConfiguredNotifier {
    /// Use SMTP when a relay is configured, the log otherwise.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, NotifierError> {
        match smtp {
            Some(config) => SmtpNotifier::new(config).map(Self::Smtp),
            None => Ok(Self::Tracing(TracingNotifier)),
        }
    }

    /// Transport name for start-up logs.
    pub const fn transport(&self) -> &'static str {
        match self {
            Self::Tracing(_) => "log",
            Self::Smtp(_) => "smtp",
        }
    }
}

#[async_trait]
impl Notifier for ConfiguredNotifier {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), NotifierError> {
        match self {
            Self::Tracing(notifier) => notifier.send(message).await,
            Self::Smtp(notifier) => notifier.send(message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Email;

    #[test]
    fn missing_relay_falls_back_to_the_log() {
        let notifier = ConfiguredNotifier::from_config(None).expect("log notifier");
        assert_eq!(notifier.transport(), "log");
    }

    #[tokio::test]
    async fn configured_relay_selects_smtp() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_owned(),
            port: 465,
            username: None,
            password: None,
            from: "from@yamdb.com".to_owned(),
        };
        let notifier = ConfiguredNotifier::from_config(Some(&config)).expect("smtp notifier");
        assert_eq!(notifier.transport(), "smtp");
    }

    #[tokio::test]
    async fn log_transport_delivers() {
        let message = OutgoingMessage {
            to: Email::new("ada@example.com").expect("email"),
            subject: "Your confirmation code".to_owned(),
            body: "Your confirmation code: 123456".to_owned(),
        };
        let notifier = ConfiguredNotifier::Tracing(TracingNotifier);
        assert_eq!(notifier.send(&message).await, Ok(()));
    }
}
