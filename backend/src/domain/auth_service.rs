//! Confirmation-code authenticator.
//!
//! Implements the [`Authenticator`] driving port over the identity store,
//! the notifier and the token signer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::policy::{Actor, Principal};
use crate::domain::ports::{
    Authenticator, IssuedToken, Notifier, OutgoingMessage, Registration, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    CodeGenerator, ConfirmationCode, Error, NewUser, SessionToken, TokenSigner, User, Username,
};

/// Subject line of confirmation code messages.
pub const CONFIRMATION_SUBJECT: &str = "Your confirmation code";

/// Behavioural switches for the sign-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    /// Clear a code after its first successful exchange.
    pub single_use_codes: bool,
    /// Fail signup when the code cannot be delivered.
    pub fail_on_delivery_error: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            single_use_codes: true,
            fail_on_delivery_error: true,
        }
    }
}

/// Authenticator backed by a user repository and a notifier.
#[derive(Clone)]
pub struct AuthService<U, N> {
    users: Arc<U>,
    notifier: Arc<N>,
    codes: Arc<dyn CodeGenerator>,
    signer: TokenSigner,
    settings: AuthSettings,
}

impl<U, N> AuthService<U, N> {
    /// Create a new service.
    pub fn new(
        users: Arc<U>,
        notifier: Arc<N>,
        codes: Arc<dyn CodeGenerator>,
        signer: TokenSigner,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            notifier,
            codes,
            signer,
            settings,
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => Error::field_conflict(
            "username",
            "duplicate_username",
            format!("username {username} is already taken"),
        ),
        UserPersistenceError::DuplicateEmail { email } => Error::field_conflict(
            "email",
            "duplicate_email",
            format!("email {email} is already registered"),
        ),
    }
}

impl<U, N> AuthService<U, N>
where
    U: UserRepository,
    N: Notifier,
{
    async fn find_or_create(&self, registration: &Registration) -> Result<User, Error> {
        let by_username = self
            .users
            .find_by_username(&registration.username)
            .await
            .map_err(map_user_error)?;
        if let Some(user) = by_username {
            if user.email == registration.email {
                return Ok(user);
            }
            return Err(map_user_error(UserPersistenceError::duplicate_username(
                registration.username.as_str(),
            )));
        }

        let by_email = self
            .users
            .find_by_email(&registration.email)
            .await
            .map_err(map_user_error)?;
        if by_email.is_some() {
            return Err(map_user_error(UserPersistenceError::duplicate_email(
                registration.email.as_str(),
            )));
        }

        let new_user = NewUser::signup(registration.username.clone(), registration.email.clone());
        let user = self.users.create(&new_user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, username = %user.username, "account registered");
        Ok(user)
    }

    async fn deliver(&self, user: &User, code: &ConfirmationCode) -> Result<(), Error> {
        let message = OutgoingMessage {
            to: user.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_owned(),
            body: format!("Your confirmation code: {}", code.expose()),
        };
        match self.notifier.send(&message).await {
            Ok(()) => Ok(()),
            Err(error) if self.settings.fail_on_delivery_error => Err(
                Error::service_unavailable(format!("confirmation code delivery failed: {error}")),
            ),
            Err(error) => {
                warn!(user_id = %user.id, %error, "confirmation code delivery failed");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<U, N> Authenticator for AuthService<U, N>
where
    U: UserRepository,
    N: Notifier,
{
    async fn request_code(&self, registration: &Registration) -> Result<Registration, Error> {
        let user = self.find_or_create(registration).await?;

        let code = self.codes.generate();
        let stored = self
            .users
            .store_confirmation_code(user.id, &code.digest())
            .await
            .map_err(map_user_error)?;
        if !stored {
            return Err(Error::not_found(format!(
                "user {} not found",
                user.username
            )));
        }

        self.deliver(&user, &code).await?;
        info!(user_id = %user.id, "confirmation code issued");
        Ok(Registration {
            username: user.username,
            email: user.email,
        })
    }

    async fn exchange_code(
        &self,
        username: &Username,
        code: &ConfirmationCode,
    ) -> Result<IssuedToken, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {username} not found")))?;

        let matched = self
            .users
            .consume_confirmation_code(user.id, &code.digest(), self.settings.single_use_codes)
            .await
            .map_err(map_user_error)?;
        if !matched {
            return Err(Error::invalid_credentials("invalid confirmation code").with_details(
                serde_json::json!({
                    "field": "confirmation_code",
                    "code": "invalid_confirmation_code",
                }),
            ));
        }

        let token = self
            .signer
            .issue(&user)
            .map_err(|err| Error::internal(format!("token issue failed: {err}")))?;
        info!(user_id = %user.id, "bearer token issued");
        Ok(IssuedToken {
            username: user.username,
            token,
        })
    }

    async fn resolve_actor(&self, token: Option<SessionToken>) -> Result<Actor, Error> {
        let Some(token) = token else {
            return Ok(Actor::Anonymous);
        };
        let claims = self.signer.verify(token.expose()).map_err(|err| {
            warn!(error = %err, "bearer token rejected");
            Error::unauthorized("invalid or expired token")
        })?;
        let user = self
            .users
            .find_by_id(claims.user_id())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("token subject no longer exists"))?;
        Ok(Actor::Authenticated(Principal::from_user(&user)))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
