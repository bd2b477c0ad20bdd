//! Account administration and the caller's own profile.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::auth_service::map_user_error;
use crate::domain::policy::{Action, Actor, Resource, authorize};
use crate::domain::ports::{UserAdministration, UserRepository};
use crate::domain::{Error, NewUser, Role, User, UserPatch, Username};

/// Implements [`UserAdministration`] over a user repository.
#[derive(Clone)]
pub struct UserAdminService<U> {
    users: Arc<U>,
}

impl<U> UserAdminService<U> {
    /// Create a new service.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

fn user_not_found(username: &Username) -> Error {
    Error::not_found(format!("user {username} not found"))
}

impl<U> UserAdminService<U>
where
    U: UserRepository,
{
    async fn load(&self, username: &Username) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(username))
    }
}

#[async_trait]
impl<U> UserAdministration for UserAdminService<U>
where
    U: UserRepository,
{
    async fn list_users(&self, actor: &Actor, search: Option<String>) -> Result<Vec<User>, Error> {
        authorize(actor, Action::Read, Resource::UserAccount)?;
        self.users.list(search).await.map_err(map_user_error)
    }

    async fn get_user(&self, actor: &Actor, username: &Username) -> Result<User, Error> {
        authorize(actor, Action::Read, Resource::UserAccount)?;
        self.load(username).await
    }

    async fn create_user(&self, actor: &Actor, user: NewUser) -> Result<User, Error> {
        authorize(actor, Action::Create, Resource::UserAccount)?;
        if user.role != Role::User {
            authorize(actor, Action::AssignRole, Resource::UserAccount)?;
        }
        let created = self.users.create(&user).await.map_err(map_user_error)?;
        info!(user_id = %created.id, role = %created.role, "account created by administrator");
        Ok(created)
    }

    async fn update_user(
        &self,
        actor: &Actor,
        username: &Username,
        patch: UserPatch,
    ) -> Result<User, Error> {
        authorize(actor, Action::Update, Resource::UserAccount)?;
        if patch.role.is_some() {
            authorize(actor, Action::AssignRole, Resource::UserAccount)?;
        }
        let existing = self.load(username).await?;
        self.users
            .update(existing.id, &patch)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(username))
    }

    async fn delete_user(&self, actor: &Actor, username: &Username) -> Result<(), Error> {
        authorize(actor, Action::Delete, Resource::UserAccount)?;
        let existing = self.load(username).await?;
        if self
            .users
            .delete(existing.id)
            .await
            .map_err(map_user_error)?
        {
            info!(user_id = %existing.id, "account deleted");
            Ok(())
        } else {
            Err(user_not_found(username))
        }
    }

    async fn get_me(&self, actor: &Actor) -> Result<User, Error> {
        let principal = actor.require_principal()?;
        authorize(
            actor,
            Action::Read,
            Resource::Profile {
                owner: principal.user_id,
            },
        )?;
        self.users
            .find_by_id(principal.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(&principal.username))
    }

    async fn update_me(&self, actor: &Actor, patch: UserPatch) -> Result<User, Error> {
        let principal = actor.require_principal()?;
        authorize(
            actor,
            Action::Update,
            Resource::Profile {
                owner: principal.user_id,
            },
        )?;
        let patch = UserPatch {
            role: None,
            ..patch
        };
        self.users
            .update(principal.user_id, &patch)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(&principal.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockUserRepository, UserPersistenceError};
    use crate::domain::policy::Principal;
    use crate::domain::{Email, ErrorCode, UserId, UserProfile};
    use rstest::{fixture, rstest};

    fn account(id: i64, username: &str, role: Role) -> User {
        User {
            id: UserId::new(id),
            username: Username::new(username).expect("username"),
            email: Email::new(format!("{username}@example.com")).expect("email"),
            role,
            is_staff: false,
            profile: UserProfile::default(),
        }
    }

    fn actor_for(user: &User) -> Actor {
        Actor::Authenticated(Principal::from_user(user))
    }

    #[fixture]
    fn admin() -> Actor {
        actor_for(&account(1, "root", Role::Admin))
    }

    #[fixture]
    fn member() -> Actor {
        actor_for(&account(2, "ada", Role::User))
    }

    #[rstest]
    #[tokio::test]
    async fn listing_accounts_requires_admin(member: Actor) {
        let mut users = MockUserRepository::new();
        users.expect_list().never();
        let service = UserAdminService::new(Arc::new(users));

        let anonymous = service
            .list_users(&Actor::Anonymous, None)
            .await
            .expect_err("anonymous denied");
        assert_eq!(anonymous.code(), ErrorCode::Unauthorized);
        let forbidden = service
            .list_users(&member, None)
            .await
            .expect_err("member denied");
        assert_eq!(forbidden.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn admins_list_accounts_with_search(admin: Actor) {
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .withf(|search| search.as_deref() == Some("ad"))
            .times(1)
            .returning(|_| Ok(vec![account(2, "ada", Role::User)]));
        let service = UserAdminService::new(Arc::new(users));

        let listed = service
            .list_users(&admin, Some("ad".to_owned()))
            .await
            .expect("listed");
        assert_eq!(listed.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn admins_assign_roles(admin: Actor) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(account(2, "ada", Role::User))));
        users
            .expect_update()
            .withf(|id, patch| *id == UserId::new(2) && patch.role == Some(Role::Moderator))
            .times(1)
            .returning(|_, _| Ok(Some(account(2, "ada", Role::Moderator))));
        let service = UserAdminService::new(Arc::new(users));

        let patch = UserPatch {
            role: Some(Role::Moderator),
            ..UserPatch::default()
        };
        let updated = service
            .update_user(&admin, &Username::new("ada").expect("username"), patch)
            .await
            .expect("updated");
        assert_eq!(updated.role, Role::Moderator);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_accounts_are_not_found(admin: Actor) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        let service = UserAdminService::new(Arc::new(users));

        let error = service
            .delete_user(&admin, &Username::new("ghost").expect("username"))
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_usernames_conflict_on_create(admin: Actor) {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .returning(|_| Err(UserPersistenceError::duplicate_username("ada")));
        let service = UserAdminService::new(Arc::new(users));

        let new_user = NewUser::signup(
            Username::new("ada").expect("username"),
            Email::new("ada@example.com").expect("email"),
        );
        let error = service
            .create_user(&admin, new_user)
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.detail_code(), Some("duplicate_username"));
    }

    #[rstest]
    #[tokio::test]
    async fn self_updates_drop_the_submitted_role(member: Actor) {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .withf(|id, patch| *id == UserId::new(2) && patch.role.is_none() && patch.bio.is_some())
            .times(1)
            .returning(|_, _| Ok(Some(account(2, "ada", Role::User))));
        let service = UserAdminService::new(Arc::new(users));

        let patch = UserPatch {
            role: Some(Role::Admin),
            bio: Some("hello".to_owned()),
            ..UserPatch::default()
        };
        let updated = service.update_me(&member, patch).await.expect("updated");
        assert_eq!(updated.role, Role::User);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_reads_require_authentication() {
        let service = UserAdminService::new(Arc::new(MockUserRepository::new()));
        let error = service
            .get_me(&Actor::Anonymous)
            .await
            .expect_err("anonymous");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }
}
