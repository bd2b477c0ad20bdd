//! [`TitleRepository`] for the memory store.

use async_trait::async_trait;

use super::{MemoryStore, State, StoredTitle, next};
use crate::domain::ports::{TitlePersistenceError, TitleRepository};
use crate::domain::{
    NewTitle, Slug, TaxonId, TaxonomyKind, Title, TitleFilter, TitleId, TitlePatch,
};

impl State {
    fn resolve_slug(&self, kind: TaxonomyKind, slug: &Slug) -> Option<TaxonId> {
        self.taxa
            .values()
            .find(|taxon| taxon.kind == kind && &taxon.slug == slug)
            .map(|taxon| taxon.id)
    }

    fn resolve_category(&self, slug: &Slug) -> Result<TaxonId, TitlePersistenceError> {
        self.resolve_slug(TaxonomyKind::Category, slug)
            .ok_or_else(|| TitlePersistenceError::unknown_category(slug.as_str()))
    }

    fn resolve_genres(&self, slugs: &[Slug]) -> Result<Vec<TaxonId>, TitlePersistenceError> {
        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let id = self
                .resolve_slug(TaxonomyKind::Genre, slug)
                .ok_or_else(|| TitlePersistenceError::unknown_genre(slug.as_str()))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl TitleRepository for MemoryStore {
    async fn list(&self, filter: &TitleFilter) -> Result<Vec<Title>, TitlePersistenceError> {
        let state = self.lock().await;
        let mut titles: Vec<Title> = state
            .titles
            .values()
            .map(|stored| state.hydrate_title(stored))
            .filter(|title| filter.matches(title))
            .collect();
        titles.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(titles)
    }

    async fn find_by_id(&self, id: TitleId) -> Result<Option<Title>, TitlePersistenceError> {
        let state = self.lock().await;
        Ok(state
            .titles
            .get(&id)
            .map(|stored| state.hydrate_title(stored)))
    }

    async fn create(&self, title: &NewTitle) -> Result<Title, TitlePersistenceError> {
        let mut state = self.lock().await;
        let category = title
            .category
            .as_ref()
            .map(|slug| state.resolve_category(slug))
            .transpose()?;
        let genres = state.resolve_genres(&title.genres)?;
        let id = TitleId::new(next(&mut state.sequences.titles));
        let stored = StoredTitle {
            id,
            name: title.name.clone(),
            year: title.year,
            description: title.description.clone(),
            category,
            genres,
        };
        let created = state.hydrate_title(&stored);
        state.titles.insert(id, stored);
        Ok(created)
    }

    async fn update(
        &self,
        id: TitleId,
        patch: &TitlePatch,
    ) -> Result<Option<Title>, TitlePersistenceError> {
        let mut state = self.lock().await;
        let category = match &patch.category {
            Some(Some(slug)) => Some(Some(state.resolve_category(slug)?)),
            Some(None) => Some(None),
            None => None,
        };
        let genres = patch
            .genres
            .as_deref()
            .map(|slugs| state.resolve_genres(slugs))
            .transpose()?;

        let Some(stored) = state.titles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            stored.name = name.clone();
        }
        if let Some(year) = patch.year {
            stored.year = year;
        }
        if let Some(description) = &patch.description {
            stored.description = description.clone();
        }
        if let Some(category) = category {
            stored.category = category;
        }
        if let Some(genres) = genres {
            stored.genres = genres;
        }
        let snapshot = stored.clone();
        Ok(Some(state.hydrate_title(&snapshot)))
    }

    async fn delete(&self, id: TitleId) -> Result<bool, TitlePersistenceError> {
        let mut state = self.lock().await;
        if state.titles.remove(&id).is_none() {
            return Ok(false);
        }
        state.remove_reviews_where(|review| review.title_id == id);
        Ok(true)
    }
}
