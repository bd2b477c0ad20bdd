//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `#[utoipa::path]` handler of the inbound HTTP
//! layer together with the request and response DTOs. The document backs
//! Swagger UI in debug builds and is exported by `openapi-dump`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::auth::{SignupRequest, SignupResponse, TokenRequest, TokenResponse};
use crate::inbound::http::comments::{CommentRequest, CommentResponse};
use crate::inbound::http::reviews::{CreateReviewRequest, ReviewResponse, UpdateReviewRequest};
use crate::inbound::http::taxonomy::{CreateTaxonRequest, TaxonResponse};
use crate::inbound::http::titles::{CreateTitleRequest, TitleResponse, UpdateTitleRequest};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserResponse};

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Register the bearer token scheme issued by `POST /api/v1/auth/token`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.description = Some("Token issued by POST /api/v1/auth/token.".to_owned());
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "YaMDb API",
        description = "Reviews, ratings and comments for a catalogue of titles."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::obtain_token,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::get_me,
        crate::inbound::http::users::update_me,
        crate::inbound::http::taxonomy::list_categories,
        crate::inbound::http::taxonomy::create_category,
        crate::inbound::http::taxonomy::delete_category,
        crate::inbound::http::taxonomy::list_genres,
        crate::inbound::http::taxonomy::create_genre,
        crate::inbound::http::taxonomy::delete_genre,
        crate::inbound::http::titles::list_titles,
        crate::inbound::http::titles::create_title,
        crate::inbound::http::titles::get_title,
        crate::inbound::http::titles::update_title,
        crate::inbound::http::titles::delete_title,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::create_comment,
        crate::inbound::http::comments::get_comment,
        crate::inbound::http::comments::update_comment,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        SignupRequest,
        SignupResponse,
        TokenRequest,
        TokenResponse,
        UserResponse,
        CreateUserRequest,
        UpdateUserRequest,
        TaxonResponse,
        CreateTaxonRequest,
        TitleResponse,
        CreateTitleRequest,
        UpdateTitleRequest,
        ReviewResponse,
        CreateReviewRequest,
        UpdateReviewRequest,
        CommentResponse,
        CommentRequest,
    )),
    tags(
        (name = "auth", description = "Confirmation-code sign-up and token exchange"),
        (name = "users", description = "Account administration and the caller's profile"),
        (name = "categories", description = "Title categories"),
        (name = "genres", description = "Title genres"),
        (name = "titles", description = "Catalogue titles and their ratings"),
        (name = "reviews", description = "Scored reviews of titles"),
        (name = "comments", description = "Comments on reviews"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
