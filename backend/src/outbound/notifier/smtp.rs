//! SMTP delivery through `lettre`'s async transport.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::ports::{Notifier, NotifierError, OutgoingMessage};

/// Connection details for the SMTP relay.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, optionally with a display name.
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Sends plain-text messages over an implicit-TLS SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn parse_mailbox(raw: &str, role: &str) -> Result<Mailbox, NotifierError> {
    raw.parse::<Mailbox>()
        .map_err(|err| NotifierError::invalid_message(format!("invalid {role} address: {err}")))
}

impl SmtpNotifier {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifierError> {
        let from = parse_mailbox(&config.from, "sender")?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|err| NotifierError::delivery(err.to_string()))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), NotifierError> {
        let to = parse_mailbox(message.to.as_str(), "recipient")?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| NotifierError::invalid_message(err.to_string()))?;
        let response = self
            .transport
            .send(email)
            .await
            .map_err(|err| NotifierError::delivery(err.to_string()))?;
        debug!(code = %response.code(), "smtp relay accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn invalid_sender_addresses_are_rejected_up_front() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_owned(),
            port: 465,
            username: None,
            password: None,
            from: "not an address".to_owned(),
        };
        let Err(error) = SmtpNotifier::new(&config) else {
            panic!("sender address should be rejected");
        };
        assert!(matches!(error, NotifierError::InvalidMessage { .. }));
    }

    #[rstest]
    #[case("from@yamdb.com")]
    #[case("YaMDb <from@yamdb.com>")]
    fn sender_addresses_accept_display_names(#[case] raw: &str) {
        assert!(parse_mailbox(raw, "sender").is_ok());
    }

    #[rstest]
    fn debug_output_hides_the_password() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_owned(),
            port: 465,
            username: Some("mailer".to_owned()),
            password: Some("hunter2".to_owned()),
            from: "from@yamdb.com".to_owned(),
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
