//! [`UserRepository`] for the memory store.

use async_trait::async_trait;

use super::{MemoryStore, State, StoredUser, next};
use crate::domain::catalogue::contains_ignore_case;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CodeDigest, Email, NewUser, User, UserId, UserPatch, Username};

impl State {
    fn check_user_unique(
        &self,
        id: Option<UserId>,
        username: Option<&Username>,
        email: Option<&Email>,
    ) -> Result<(), UserPersistenceError> {
        for stored in self.users.values().filter(|s| Some(s.user.id) != id) {
            if let Some(username) = username.filter(|u| **u == stored.user.username) {
                return Err(UserPersistenceError::duplicate_username(username.as_str()));
            }
            if let Some(email) = email.filter(|e| **e == stored.user.email) {
                return Err(UserPersistenceError::duplicate_email(email.as_str()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self, search: Option<String>) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|stored| {
                search
                    .as_deref()
                    .is_none_or(|needle| contains_ignore_case(stored.user.username.as_str(), needle))
            })
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().await;
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().await;
        Ok(state
            .users
            .values()
            .find(|stored| &stored.user.username == username)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().await;
        Ok(state
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| stored.user.clone()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock().await;
        state.check_user_unique(None, Some(&user.username), Some(&user.email))?;
        let id = UserId::new(next(&mut state.sequences.users));
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_staff: false,
            profile: user.profile.clone(),
        };
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                code: None,
            },
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock().await;
        state.check_user_unique(Some(id), patch.username.as_ref(), patch.email.as_ref())?;
        Ok(state.users.get_mut(&id).map(|stored| {
            patch.apply_to(&mut stored.user);
            stored.user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.remove_reviews_where(|review| review.author_id == id);
        state.comments.retain(|_, comment| comment.author_id != id);
        Ok(true)
    }

    async fn store_confirmation_code(
        &self,
        id: UserId,
        digest: &CodeDigest,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().await;
        let Some(stored) = state.users.get_mut(&id) else {
            return Ok(false);
        };
        stored.code = Some(digest.clone());
        Ok(true)
    }

    async fn consume_confirmation_code(
        &self,
        id: UserId,
        digest: &CodeDigest,
        clear: bool,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().await;
        let Some(stored) = state.users.get_mut(&id) else {
            return Ok(false);
        };
        if stored.code.as_ref() != Some(digest) {
            return Ok(false);
        }
        if clear {
            stored.code = None;
        }
        Ok(true)
    }
}
