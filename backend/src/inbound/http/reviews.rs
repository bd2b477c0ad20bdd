//! Review handlers, nested under their title.
//!
//! ```text
//! GET    /api/v1/titles/{title_id}/reviews
//! POST   /api/v1/titles/{title_id}/reviews {"text":"Great","score":9}
//! GET    /api/v1/titles/{title_id}/reviews/{review_id}
//! PATCH  /api/v1/titles/{title_id}/reviews/{review_id} {"score":7}
//! DELETE /api/v1/titles/{title_id}/reviews/{review_id}
//! ```
//!
//! Score and text are forwarded raw; the review ledger validates them after
//! its existence and uniqueness checks so those errors take precedence.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::policy::{Action, Resource};
use crate::domain::ports::{ReviewChanges, ReviewDraft};
use crate::domain::{Error, Review, ReviewId, TitleId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::titles::TitlePath;
use crate::inbound::http::validation::{FieldName, require};

const TEXT: FieldName = FieldName::new("text");
const SCORE: FieldName = FieldName::new("score");

/// Review as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    /// Identifier of the reviewed title.
    pub title: i64,
    /// Username of the author.
    #[schema(example = "ada")]
    pub author: String,
    pub text: String,
    #[schema(example = 9)]
    pub score: u8,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.get(),
            title: review.title_id.get(),
            author: review.author.username.into(),
            text: review.text.as_str().to_owned(),
            score: review.score.get(),
            pub_date: review.pub_date,
        }
    }
}

/// Body for reviewing a title.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Integer between 1 and 10.
    #[serde(default)]
    pub score: Option<i64>,
}

impl TryFrom<CreateReviewRequest> for ReviewDraft {
    type Error = Error;

    fn try_from(value: CreateReviewRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            text: require(value.text, TEXT)?,
            score: require(value.score, SCORE)?,
        })
    }
}

/// Partial review update. The author and title cannot change.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

impl From<UpdateReviewRequest> for ReviewChanges {
    fn from(value: UpdateReviewRequest) -> Self {
        Self {
            text: value.text,
            score: value.score,
        }
    }
}

/// Path segments naming a review.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ReviewPath {
    pub title_id: i64,
    pub review_id: i64,
}

impl ReviewPath {
    pub(crate) const fn title_id(self) -> TitleId {
        TitleId::new(self.title_id)
    }

    pub(crate) const fn review_id(self) -> ReviewId {
        ReviewId::new(self.review_id)
    }
}

/// Reviews of a title, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    params(TitlePath),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 404, description = "Title not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<TitlePath>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let title_id = TitleId::new(path.title_id);
    let reviews = state.reviews.list_reviews(actor.actor(), title_id).await?;
    Ok(web::Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// Review a title as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    params(TitlePath),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Created", body = ReviewResponse),
        (status = 400, description = "Invalid score or text", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Title not found", body = Error),
        (status = 409, description = "Title already reviewed by the caller", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
pub async fn create_review(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<TitlePath>,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Create, Resource::NewReview)?;
    let draft = ReviewDraft::try_from(payload.into_inner())?;
    let review = state
        .reviews
        .create_review(actor, TitleId::new(path.title_id), draft)
        .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

/// Fetch one review of a title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(ReviewPath),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getReview",
    security([])
)]
pub async fn get_review(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<ReviewPath>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let review = state
        .reviews
        .get_review(actor.actor(), path.title_id(), path.review_id())
        .await?;
    Ok(web::Json(review.into()))
}

/// Change the text or score of a review.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(ReviewPath),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated", body = ReviewResponse),
        (status = 400, description = "Invalid score or text", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
pub async fn update_review(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<ReviewPath>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let review = state
        .reviews
        .update_review(
            actor.actor(),
            path.title_id(),
            path.review_id(),
            payload.into_inner().into(),
        )
        .await?;
    Ok(web::Json(review.into()))
}

/// Delete a review and its comments.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(ReviewPath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
pub async fn delete_review(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<ReviewPath>,
) -> ApiResult<HttpResponse> {
    state
        .reviews
        .delete_review(actor.actor(), path.title_id(), path.review_id())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
