//! Title handlers.
//!
//! ```text
//! GET    /api/v1/titles?name=dune&category=books&genre=sci-fi&year=1965
//! POST   /api/v1/titles {"name":"Dune","year":1965,"category":"books","genre":["sci-fi"]}
//! GET    /api/v1/titles/{title_id}
//! PATCH  /api/v1/titles/{title_id} {"category":null}
//! DELETE /api/v1/titles/{title_id}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::policy::{Action, Resource};
use crate::domain::{Error, NewTitle, Title, TitleFilter, TitleId, TitlePatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::taxonomy::TaxonResponse;
use crate::inbound::http::validation::{FieldName, parse_name, parse_slug, parse_slugs, require};

const NAME: FieldName = FieldName::new("name");
const YEAR: FieldName = FieldName::new("year");
const CATEGORY: FieldName = FieldName::new("category");
const GENRE: FieldName = FieldName::new("genre");

/// Title with its taxonomy entries and derived rating.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct TitleResponse {
    pub id: i64,
    #[schema(example = "Dune")]
    pub name: String,
    #[schema(example = 1965)]
    pub year: i32,
    /// Mean review score; `null` until the title is reviewed.
    #[schema(example = 8.5)]
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<TaxonResponse>,
    pub category: Option<TaxonResponse>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id.get(),
            name: title.name.into(),
            year: title.year,
            rating: title.rating.value(),
            description: title.description,
            genre: title.genres.into_iter().map(TaxonResponse::from).collect(),
            category: title.category.map(TaxonResponse::from),
        }
    }
}

/// Body for creating a title; taxonomy entries are referenced by slug.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTitleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

impl TryFrom<CreateTitleRequest> for NewTitle {
    type Error = Error;

    fn try_from(value: CreateTitleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse_name(&require(value.name, NAME)?, NAME)?,
            year: require(value.year, YEAR)?,
            description: value.description,
            category: value
                .category
                .map(|raw| parse_slug(&raw, CATEGORY))
                .transpose()?,
            genres: parse_slugs(&value.genre, GENRE)?,
        })
    }
}

/// Distinguish an explicit `null` from an absent field.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial title update. `null` clears the description or category.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateTitleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    /// Replaces the whole genre list when present.
    #[serde(default)]
    pub genre: Option<Vec<String>>,
}

impl TryFrom<UpdateTitleRequest> for TitlePatch {
    type Error = Error;

    fn try_from(value: UpdateTitleRequest) -> Result<Self, Self::Error> {
        let category = match value.category {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_slug(&raw, CATEGORY)?)),
        };
        Ok(Self {
            name: value.name.map(|raw| parse_name(&raw, NAME)).transpose()?,
            year: value.year,
            description: value.description,
            category,
            genres: value
                .genre
                .map(|raw| parse_slugs(&raw, GENRE))
                .transpose()?,
        })
    }
}

/// Listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TitleQuery {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

impl TryFrom<TitleQuery> for TitleFilter {
    type Error = Error;

    fn try_from(value: TitleQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            category: value
                .category
                .map(|raw| parse_slug(&raw, CATEGORY))
                .transpose()?,
            genre: value
                .genre
                .map(|raw| parse_slug(&raw, GENRE))
                .transpose()?,
            year: value.year,
        })
    }
}

/// Path segment naming a title.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct TitlePath {
    pub title_id: i64,
}

impl TitlePath {
    fn id(self) -> TitleId {
        TitleId::new(self.title_id)
    }
}

/// List titles ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/titles",
    params(TitleQuery),
    responses(
        (status = 200, description = "Titles", body = [TitleResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["titles"],
    operation_id = "listTitles",
    security([])
)]
pub async fn list_titles(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<TitleQuery>,
) -> ApiResult<web::Json<Vec<TitleResponse>>> {
    let filter = TitleFilter::try_from(query.into_inner())?;
    let titles = state.catalogue.list_titles(actor.actor(), filter).await?;
    Ok(web::Json(titles.into_iter().map(TitleResponse::from).collect()))
}

/// Create a title.
#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = CreateTitleRequest,
    responses(
        (status = 201, description = "Created", body = TitleResponse),
        (status = 400, description = "Invalid request or unknown slug", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["titles"],
    operation_id = "createTitle"
)]
pub async fn create_title(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateTitleRequest>,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Create, Resource::Title)?;
    let title = NewTitle::try_from(payload.into_inner())?;
    let created = state.catalogue.create_title(actor, title).await?;
    Ok(HttpResponse::Created().json(TitleResponse::from(created)))
}

/// Fetch one title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}",
    params(TitlePath),
    responses(
        (status = 200, description = "Title", body = TitleResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["titles"],
    operation_id = "getTitle",
    security([])
)]
pub async fn get_title(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<TitlePath>,
) -> ApiResult<web::Json<TitleResponse>> {
    let title = state.catalogue.get_title(actor.actor(), path.id()).await?;
    Ok(web::Json(title.into()))
}

/// Partially update a title.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}",
    params(TitlePath),
    request_body = UpdateTitleRequest,
    responses(
        (status = 200, description = "Updated", body = TitleResponse),
        (status = 400, description = "Invalid request or unknown slug", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["titles"],
    operation_id = "updateTitle"
)]
pub async fn update_title(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<TitlePath>,
    payload: web::Json<UpdateTitleRequest>,
) -> ApiResult<web::Json<TitleResponse>> {
    let actor = actor.permit(Action::Update, Resource::Title)?;
    let patch = TitlePatch::try_from(payload.into_inner())?;
    let title = state
        .catalogue
        .update_title(actor, path.id(), patch)
        .await?;
    Ok(web::Json(title.into()))
}

/// Delete a title with its reviews and comments.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}",
    params(TitlePath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["titles"],
    operation_id = "deleteTitle"
)]
pub async fn delete_title(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<TitlePath>,
) -> ApiResult<HttpResponse> {
    state.catalogue.delete_title(actor.actor(), path.id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Actor;
    use crate::domain::{CatalogueName, Rating, Role, Score, Slug, Taxon, TaxonId, TaxonomyKind};
    use crate::inbound::http::test_utils::{MockPorts, json_body, principal, resolving_auth};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn genre(slug: &str) -> Taxon {
        Taxon {
            id: TaxonId::new(3),
            kind: TaxonomyKind::Genre,
            name: CatalogueName::new(slug.to_uppercase()).expect("name"),
            slug: Slug::new(slug).expect("slug"),
        }
    }

    fn title(id: i64) -> Title {
        Title {
            id: TitleId::new(id),
            name: CatalogueName::new("Dune").expect("name"),
            year: 1965,
            description: None,
            category: None,
            genres: vec![genre("scifi")],
            rating: Rating::from_scores([8, 9].map(|s| Score::new(s).expect("score"))),
        }
    }

    async fn send(ports: MockPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new().app_data(ports.into_state()).service(
                web::scope("/api/v1")
                    .service(
                        web::resource("/titles")
                            .route(web::get().to(list_titles))
                            .route(web::post().to(create_title)),
                    )
                    .service(
                        web::resource("/titles/{title_id}")
                            .route(web::get().to(get_title))
                            .route(web::patch().to(update_title))
                            .route(web::delete().to(delete_title)),
                    ),
            ),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    #[actix_web::test]
    async fn titles_are_listed_with_filters_and_ratings() {
        let mut ports = MockPorts {
            auth: resolving_auth(Actor::Anonymous),
            ..MockPorts::default()
        };
        ports
            .catalogue
            .expect_list_titles()
            .withf(|_, filter| {
                filter.genre.as_ref().map(Slug::as_str) == Some("scifi")
                    && filter.year == Some(1965)
                    && filter.name.as_deref() == Some("du")
            })
            .times(1)
            .returning(|_, _| Ok(vec![title(1)]));

        let (status, body) = send(
            ports,
            actix_test::TestRequest::get().uri("/api/v1/titles?name=du&genre=scifi&year=1965"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "id": 1,
                "name": "Dune",
                "year": 1965,
                "rating": 8.5,
                "description": null,
                "genre": [{"name": "SCIFI", "slug": "scifi"}],
                "category": null
            }])
        );
    }

    #[actix_web::test]
    async fn create_title_resolves_slugs_through_the_port() {
        let mut ports = MockPorts {
            auth: resolving_auth(principal(1, Role::Admin)),
            ..MockPorts::default()
        };
        ports
            .catalogue
            .expect_create_title()
            .withf(|_, new| {
                new.category.as_ref().map(Slug::as_str) == Some("books")
                    && new.genres.iter().map(Slug::as_str).eq(["scifi"])
            })
            .times(1)
            .returning(|_, _| Ok(title(4)));

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post().uri("/api/v1/titles").set_json(json!({
                "name": "Dune",
                "year": 1965,
                "category": "books",
                "genre": ["scifi"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 4);
    }

    #[rstest]
    #[case(json!({}), None)]
    #[case(json!({"category": null}), Some(None))]
    #[case(json!({"category": "films"}), Some(Some("films")))]
    #[actix_web::test]
    async fn patch_distinguishes_absent_from_null(
        #[case] payload: Value,
        #[case] expected: Option<Option<&'static str>>,
    ) {
        let mut ports = MockPorts {
            auth: resolving_auth(principal(1, Role::Admin)),
            ..MockPorts::default()
        };
        ports
            .catalogue
            .expect_update_title()
            .withf(move |_, id, patch| {
                let category = patch
                    .category
                    .as_ref()
                    .map(|inner| inner.as_ref().map(Slug::as_str));
                *id == TitleId::new(2) && category == expected
            })
            .times(1)
            .returning(|_, id, _| Ok(title(id.get())));

        let (status, _) = send(
            ports,
            actix_test::TestRequest::patch()
                .uri("/api/v1/titles/2")
                .set_json(payload),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_year_is_a_field_error() {
        let mut ports = MockPorts {
            auth: resolving_auth(principal(1, Role::Admin)),
            ..MockPorts::default()
        };
        ports.catalogue.expect_create_title().never();

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/titles")
                .set_json(json!({"name": "Dune"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], json!({"field": "year", "code": "missing_field"}));
    }

    #[rstest]
    #[case(Actor::Anonymous, StatusCode::UNAUTHORIZED, "unauthorized")]
    #[case(principal(7, Role::User), StatusCode::FORBIDDEN, "forbidden")]
    #[case(principal(7, Role::Moderator), StatusCode::FORBIDDEN, "forbidden")]
    #[actix_web::test]
    async fn callers_without_rights_are_denied_before_the_body_is_checked(
        #[case] caller: Actor,
        #[case] expected: StatusCode,
        #[case] code: &str,
    ) {
        let mut ports = MockPorts {
            auth: resolving_auth(caller),
            ..MockPorts::default()
        };
        ports.catalogue.expect_create_title().never();

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/titles")
                .set_json(json!({"name": "Heat"})),
        )
        .await;
        assert_eq!(status, expected);
        assert_eq!(body["code"], code);
        assert!(body["details"].is_null());
    }

    #[rstest]
    #[case(Actor::Anonymous, StatusCode::UNAUTHORIZED)]
    #[case(principal(7, Role::User), StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn title_patches_are_denied_before_validation(
        #[case] caller: Actor,
        #[case] expected: StatusCode,
    ) {
        let mut ports = MockPorts {
            auth: resolving_auth(caller),
            ..MockPorts::default()
        };
        ports.catalogue.expect_update_title().never();

        let (status, _) = send(
            ports,
            actix_test::TestRequest::patch()
                .uri("/api/v1/titles/2")
                .set_json(json!({"genre": ["Not A Slug"]})),
        )
        .await;
        assert_eq!(status, expected);
    }

    #[actix_web::test]
    async fn titles_cannot_be_replaced_wholesale() {
        let ports = MockPorts {
            auth: resolving_auth(principal(1, Role::Admin)),
            ..MockPorts::default()
        };
        let (status, _) = send(ports, actix_test::TestRequest::put().uri("/api/v1/titles/2")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
