//! Driving port for account administration and the caller's own profile.

use async_trait::async_trait;

use crate::domain::policy::Actor;
use crate::domain::{Error, NewUser, User, UserPatch, Username};

/// Domain use-case port for managing accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Accounts ordered by username, optionally filtered by username.
    async fn list_users(&self, actor: &Actor, search: Option<String>) -> Result<Vec<User>, Error>;

    /// Fetch one account.
    async fn get_user(&self, actor: &Actor, username: &Username) -> Result<User, Error>;

    /// Create an account with an explicit role.
    async fn create_user(&self, actor: &Actor, user: NewUser) -> Result<User, Error>;

    /// Update an account, including its role.
    async fn update_user(
        &self,
        actor: &Actor,
        username: &Username,
        patch: UserPatch,
    ) -> Result<User, Error>;

    /// Delete an account and everything it authored.
    async fn delete_user(&self, actor: &Actor, username: &Username) -> Result<(), Error>;

    /// The caller's own account.
    async fn get_me(&self, actor: &Actor) -> Result<User, Error>;

    /// Update the caller's own account. Any submitted role is ignored.
    async fn update_me(&self, actor: &Actor, patch: UserPatch) -> Result<User, Error>;
}
