//! Driving port for the confirmation-code sign-in flow.
//!
//! Inbound adapters call this port to register accounts, exchange codes for
//! bearer tokens and resolve the caller of each request.

use async_trait::async_trait;

use crate::domain::policy::Actor;
use crate::domain::{ConfirmationCode, Email, Error, SessionToken, Username};

/// Username and email pair submitted at signup and echoed back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
}

/// Bearer token issued for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub username: Username,
    pub token: SessionToken,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Create or reuse the account and deliver a fresh confirmation code.
    async fn request_code(&self, registration: &Registration) -> Result<Registration, Error>;

    /// Exchange a confirmation code for a bearer token.
    async fn exchange_code(
        &self,
        username: &Username,
        code: &ConfirmationCode,
    ) -> Result<IssuedToken, Error>;

    /// Resolve the caller from an optional bearer token.
    ///
    /// A missing token yields [`Actor::Anonymous`]; a token that fails
    /// verification or names a deleted account is `Unauthorized`.
    async fn resolve_actor(&self, token: Option<SessionToken>) -> Result<Actor, Error>;
}
