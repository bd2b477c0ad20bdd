//! PostgreSQL-backed [`UserRepository`] implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    CodeDigest, Email, NewUser, PersonName, Role, User, UserId, UserPatch, Username,
};

use super::diesel_error_mapping::{DbFailure, classify, contains_pattern, pool_message};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed identity store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_message(error))
}

/// Map Diesel failures, recognising the username and email constraints.
///
/// The offending value is not echoed back by PostgreSQL reliably, so callers
/// pass the value they attempted to write.
fn map_diesel_error(
    error: diesel::result::Error,
    username: Option<&Username>,
    email: Option<&Email>,
) -> UserPersistenceError {
    match classify(error) {
        DbFailure::UniqueViolation(violation) if violation.is("users_username_key") => {
            UserPersistenceError::duplicate_username(username.map_or("", Username::as_str))
        }
        DbFailure::UniqueViolation(violation) if violation.is("users_email_key") => {
            UserPersistenceError::duplicate_email(email.map_or("", Email::as_str))
        }
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::UniqueViolation(_) | DbFailure::ForeignKeyViolation(_) => {
            UserPersistenceError::query("constraint violation")
        }
        DbFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn read_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(error, None, None)
}

fn to_domain(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(UserPersistenceError::query)
}

impl<'a> From<&'a UserPatch> for UserChangeset<'a> {
    fn from(patch: &'a UserPatch) -> Self {
        Self {
            username: patch.username.as_ref().map(Username::as_str),
            email: patch.email.as_ref().map(Email::as_str),
            role: patch.role.map(Role::as_str),
            first_name: patch.first_name.as_ref().map(PersonName::as_str),
            last_name: patch.last_name.as_ref().map(PersonName::as_str),
            bio: patch.bio.as_deref(),
        }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self, search: Option<String>) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .select(UserRow::as_select())
            .order_by((users::username, users::id))
            .into_boxed();
        if let Some(needle) = search.as_deref() {
            query = query.filter(users::username.ilike(contains_pattern(needle)));
        }
        let rows: Vec<UserRow> = query.load(&mut conn).await.map_err(read_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        row.map(to_domain).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        row.map(to_domain).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        row.map(to_domain).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            username: user.username.as_str(),
            email: user.email.as_str(),
            role: user.role.as_str(),
            first_name: user.profile.first_name.as_str(),
            last_name: user.profile.last_name.as_str(),
            bio: user.profile.bio.as_str(),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(&user.username), Some(&user.email)))?;
        debug!(user_id = row.id, "inserted user");
        to_domain(row)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserChangeset::from(patch);
        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, patch.username.as_ref(), patch.email.as_ref()))?;
        row.map(to_domain).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(read_error)?;
        Ok(deleted > 0)
    }

    async fn store_confirmation_code(
        &self,
        id: UserId,
        digest: &CodeDigest,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set(users::confirmation_code.eq(Some(digest.as_str())))
            .execute(&mut conn)
            .await
            .map_err(read_error)?;
        Ok(updated > 0)
    }

    async fn consume_confirmation_code(
        &self,
        id: UserId,
        digest: &CodeDigest,
        clear: bool,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let matching = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::confirmation_code.eq(digest.as_str()));
        if clear {
            // Compare-and-clear in one statement so a code is accepted once.
            let cleared = diesel::update(matching)
                .set(users::confirmation_code.eq(None::<String>))
                .execute(&mut conn)
                .await
                .map_err(read_error)?;
            return Ok(cleared > 0);
        }
        diesel::select(diesel::dsl::exists(matching))
            .get_result(&mut conn)
            .await
            .map_err(read_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::diesel_error_mapping::test_support::violation;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(error, UserPersistenceError::Connection { .. }));
        assert!(error.to_string().contains("connection refused"));
    }

    #[rstest]
    fn username_constraint_maps_to_duplicate_username() {
        let username = Username::new("ada").expect("username");
        let error = map_diesel_error(
            violation(DatabaseErrorKind::UniqueViolation, "users_username_key"),
            Some(&username),
            None,
        );
        assert_eq!(error, UserPersistenceError::duplicate_username("ada"));
    }

    #[rstest]
    fn email_constraint_maps_to_duplicate_email() {
        let email = Email::new("ada@example.com").expect("email");
        let error = map_diesel_error(
            violation(DatabaseErrorKind::UniqueViolation, "users_email_key"),
            None,
            Some(&email),
        );
        assert_eq!(error, UserPersistenceError::duplicate_email("ada@example.com"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let error = read_error(diesel::result::Error::NotFound);
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn empty_patches_produce_an_empty_changeset() {
        let patch = UserPatch::default();
        let changeset = UserChangeset::from(&patch);
        assert!(changeset.username.is_none() && changeset.bio.is_none());
    }
}
