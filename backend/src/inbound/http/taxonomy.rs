//! Category and genre handlers.
//!
//! ```text
//! GET    /api/v1/categories?search=fil
//! POST   /api/v1/categories {"name":"Films","slug":"films"}
//! DELETE /api/v1/categories/{slug}
//! GET    /api/v1/genres
//! POST   /api/v1/genres {"name":"Drama","slug":"drama"}
//! DELETE /api/v1/genres/{slug}
//! ```
//!
//! Both taxonomies share one request/response shape; the handlers differ
//! only in the [`TaxonomyKind`] they pass to the catalogue port.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::policy::{Action, Resource};
use crate::domain::{Error, NewTaxon, Taxon, TaxonomyKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_name, parse_slug, require};

const NAME: FieldName = FieldName::new("name");
const SLUG: FieldName = FieldName::new("slug");

/// Category or genre as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TaxonResponse {
    #[schema(example = "Drama")]
    pub name: String,
    #[schema(example = "drama")]
    pub slug: String,
}

impl From<Taxon> for TaxonResponse {
    fn from(value: Taxon) -> Self {
        Self {
            name: value.name.into(),
            slug: value.slug.into(),
        }
    }
}

/// Body for creating a category or genre.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTaxonRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CreateTaxonRequest {
    fn into_new_taxon(self, kind: TaxonomyKind) -> Result<NewTaxon, Error> {
        Ok(NewTaxon {
            kind,
            name: parse_name(&require(self.name, NAME)?, NAME)?,
            slug: parse_slug(&require(self.slug, SLUG)?, SLUG)?,
        })
    }
}

/// Name search for taxonomy listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaxonSearch {
    /// Case-insensitive name substring.
    pub search: Option<String>,
}

/// Path segment naming a category or genre.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct SlugPath {
    pub slug: String,
}

async fn list(
    state: &HttpState,
    actor: &CurrentActor,
    kind: TaxonomyKind,
    search: TaxonSearch,
) -> ApiResult<web::Json<Vec<TaxonResponse>>> {
    let taxa = state
        .catalogue
        .list_taxa(actor.actor(), kind, search.search)
        .await?;
    Ok(web::Json(taxa.into_iter().map(TaxonResponse::from).collect()))
}

async fn create(
    state: &HttpState,
    actor: &CurrentActor,
    kind: TaxonomyKind,
    payload: CreateTaxonRequest,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Create, Resource::taxonomy(kind))?;
    let taxon = payload.into_new_taxon(kind)?;
    let created = state.catalogue.create_taxon(actor, taxon).await?;
    Ok(HttpResponse::Created().json(TaxonResponse::from(created)))
}

async fn delete(
    state: &HttpState,
    actor: &CurrentActor,
    kind: TaxonomyKind,
    path: &SlugPath,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Delete, Resource::taxonomy(kind))?;
    let slug = parse_slug(&path.slug, SLUG)?;
    state.catalogue.delete_taxon(actor, kind, &slug).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List categories ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(TaxonSearch),
    responses((status = 200, description = "Categories", body = [TaxonResponse])),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
pub async fn list_categories(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<TaxonSearch>,
) -> ApiResult<web::Json<Vec<TaxonResponse>>> {
    list(&state, &actor, TaxonomyKind::Category, query.into_inner()).await
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateTaxonRequest,
    responses(
        (status = 201, description = "Created", body = TaxonResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name or slug taken", body = Error)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
pub async fn create_category(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateTaxonRequest>,
) -> ApiResult<HttpResponse> {
    create(&state, &actor, TaxonomyKind::Category, payload.into_inner()).await
}

/// Delete a category; its titles keep existing without one.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    params(SlugPath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
pub async fn delete_category(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<SlugPath>,
) -> ApiResult<HttpResponse> {
    delete(&state, &actor, TaxonomyKind::Category, &path).await
}

/// List genres ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/genres",
    params(TaxonSearch),
    responses((status = 200, description = "Genres", body = [TaxonResponse])),
    tags = ["genres"],
    operation_id = "listGenres",
    security([])
)]
pub async fn list_genres(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<TaxonSearch>,
) -> ApiResult<web::Json<Vec<TaxonResponse>>> {
    list(&state, &actor, TaxonomyKind::Genre, query.into_inner()).await
}

/// Create a genre.
#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = CreateTaxonRequest,
    responses(
        (status = 201, description = "Created", body = TaxonResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name or slug taken", body = Error)
    ),
    tags = ["genres"],
    operation_id = "createGenre"
)]
pub async fn create_genre(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateTaxonRequest>,
) -> ApiResult<HttpResponse> {
    create(&state, &actor, TaxonomyKind::Genre, payload.into_inner()).await
}

/// Delete a genre; titles lose the association only.
#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(SlugPath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["genres"],
    operation_id = "deleteGenre"
)]
pub async fn delete_genre(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<SlugPath>,
) -> ApiResult<HttpResponse> {
    delete(&state, &actor, TaxonomyKind::Genre, &path).await
}
