//! [`TaxonomyRepository`] for the memory store.

use async_trait::async_trait;

use super::{MemoryStore, next};
use crate::domain::catalogue::contains_ignore_case;
use crate::domain::ports::{TaxonomyPersistenceError, TaxonomyRepository};
use crate::domain::{NewTaxon, Slug, Taxon, TaxonId, TaxonomyKind};

#[async_trait]
impl TaxonomyRepository for MemoryStore {
    async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
    ) -> Result<Vec<Taxon>, TaxonomyPersistenceError> {
        let state = self.lock().await;
        let mut taxa: Vec<Taxon> = state
            .taxa
            .values()
            .filter(|taxon| taxon.kind == kind)
            .filter(|taxon| {
                search
                    .as_deref()
                    .is_none_or(|needle| contains_ignore_case(taxon.name.as_str(), needle))
            })
            .cloned()
            .collect();
        taxa.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(taxa)
    }

    async fn find_by_slug(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<Option<Taxon>, TaxonomyPersistenceError> {
        let state = self.lock().await;
        Ok(state
            .taxa
            .values()
            .find(|taxon| taxon.kind == kind && &taxon.slug == slug)
            .cloned())
    }

    async fn create(&self, taxon: &NewTaxon) -> Result<Taxon, TaxonomyPersistenceError> {
        let mut state = self.lock().await;
        for existing in state.taxa.values().filter(|t| t.kind == taxon.kind) {
            if existing.slug == taxon.slug {
                return Err(TaxonomyPersistenceError::duplicate_slug(taxon.slug.as_str()));
            }
            if existing.name == taxon.name {
                return Err(TaxonomyPersistenceError::duplicate_name(taxon.name.as_str()));
            }
        }
        let id = TaxonId::new(next(&mut state.sequences.taxa));
        let created = Taxon {
            id,
            kind: taxon.kind,
            name: taxon.name.clone(),
            slug: taxon.slug.clone(),
        };
        state.taxa.insert(id, created.clone());
        Ok(created)
    }

    async fn delete(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<bool, TaxonomyPersistenceError> {
        let mut state = self.lock().await;
        let Some(id) = state
            .taxa
            .values()
            .find(|taxon| taxon.kind == kind && &taxon.slug == slug)
            .map(|taxon| taxon.id)
        else {
            return Ok(false);
        };
        state.taxa.remove(&id);
        for title in state.titles.values_mut() {
            match kind {
                TaxonomyKind::Category => {
                    if title.category == Some(id) {
                        title.category = None;
                    }
                }
                TaxonomyKind::Genre => title.genres.retain(|genre| *genre != id),
            }
        }
        Ok(true)
    }
}
