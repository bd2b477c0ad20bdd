//! Port abstraction for the identity store and its errors.
use async_trait::async_trait;

use crate::domain::{CodeDigest, Email, NewUser, User, UserId, UserPatch, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username {username} is already taken",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Identity store port.
///
/// Confirmation code digests never leave the adapter: they are written with
/// [`UserRepository::store_confirmation_code`] and checked with
/// [`UserRepository::consume_confirmation_code`], each a single atomic
/// operation per user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All accounts ordered by username, optionally filtered by a
    /// case-insensitive username substring.
    async fn list(&self, search: Option<String>) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Insert an account. Unique violations map to the duplicate variants.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Apply a partial update; `None` when the account does not exist.
    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove an account together with its reviews and comments.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Replace the account's active confirmation code.
    ///
    /// Returns `false` when the account does not exist.
    async fn store_confirmation_code(
        &self,
        id: UserId,
        digest: &CodeDigest,
    ) -> Result<bool, UserPersistenceError>;

    /// Compare `digest` with the active code; when it matches and `clear` is
    /// set, remove the code in the same operation.
    async fn consume_confirmation_code(
        &self,
        id: UserId,
        digest: &CodeDigest,
        clear: bool,
    ) -> Result<bool, UserPersistenceError>;
}
