//! Port abstraction for title persistence.
use async_trait::async_trait;

use crate::domain::{NewTitle, Title, TitleFilter, TitleId, TitlePatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by title repository adapters.
    pub enum TitlePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "title repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "title repository query failed: {message}",
        /// Referenced category slug does not exist.
        UnknownCategory { slug: String } => "category {slug} does not exist",
        /// Referenced genre slug does not exist.
        UnknownGenre { slug: String } => "genre {slug} does not exist",
    }
}

/// Title store. Every title returned carries a rating derived from the
/// review scores visible in the same read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleRepository: Send + Sync {
    /// Titles matching `filter`, ordered by name then id.
    async fn list(&self, filter: &TitleFilter) -> Result<Vec<Title>, TitlePersistenceError>;

    /// Fetch a title by identifier.
    async fn find_by_id(&self, id: TitleId) -> Result<Option<Title>, TitlePersistenceError>;

    /// Insert a title, resolving taxonomy slugs.
    async fn create(&self, title: &NewTitle) -> Result<Title, TitlePersistenceError>;

    /// Apply a partial update; `None` when the title does not exist.
    async fn update(
        &self,
        id: TitleId,
        patch: &TitlePatch,
    ) -> Result<Option<Title>, TitlePersistenceError>;

    /// Remove a title together with its reviews and their comments.
    async fn delete(&self, id: TitleId) -> Result<bool, TitlePersistenceError>;
}
