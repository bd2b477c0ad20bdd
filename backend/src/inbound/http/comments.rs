//! Comment handlers, nested under their review.
//!
//! ```text
//! GET    /api/v1/titles/{title_id}/reviews/{review_id}/comments
//! POST   /api/v1/titles/{title_id}/reviews/{review_id}/comments {"text":"Agreed"}
//! GET    /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
//! PATCH  /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
//! DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
//! ```

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::policy::{Action, Resource};
use crate::domain::ports::ThreadRef;
use crate::domain::{Comment, CommentId, Error, ReviewId, TitleId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::reviews::ReviewPath;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

const TEXT: FieldName = FieldName::new("text");

/// Comment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    /// Username of the author.
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.get(),
            text: comment.text.as_str().to_owned(),
            author: comment.author.username.into(),
            pub_date: comment.pub_date,
        }
    }
}

/// Body for creating or editing a comment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Path segments naming a comment.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CommentPath {
    pub title_id: i64,
    pub review_id: i64,
    pub comment_id: i64,
}

impl CommentPath {
    const fn thread(self) -> ThreadRef {
        ThreadRef {
            title_id: TitleId::new(self.title_id),
            review_id: ReviewId::new(self.review_id),
        }
    }

    const fn comment_id(self) -> CommentId {
        CommentId::new(self.comment_id)
    }
}

const fn thread_of(path: ReviewPath) -> ThreadRef {
    ThreadRef {
        title_id: path.title_id(),
        review_id: path.review_id(),
    }
}

/// Comments of a review, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(ReviewPath),
    responses(
        (status = 200, description = "Comments", body = [CommentResponse]),
        (status = 404, description = "Review not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
pub async fn list_comments(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<ReviewPath>,
) -> ApiResult<web::Json<Vec<CommentResponse>>> {
    let comments = state
        .comments
        .list_comments(actor.actor(), thread_of(*path))
        .await?;
    Ok(web::Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// Comment on a review as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(ReviewPath),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Created", body = CommentResponse),
        (status = 400, description = "Invalid text", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Review not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
pub async fn create_comment(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<ReviewPath>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Create, Resource::NewComment)?;
    let text = require(payload.into_inner().text, TEXT)?;
    let comment = state
        .comments
        .create_comment(actor, thread_of(*path), text)
        .await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

/// Fetch one comment.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(CommentPath),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "getComment",
    security([])
)]
pub async fn get_comment(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<CommentPath>,
) -> ApiResult<web::Json<CommentResponse>> {
    let comment = state
        .comments
        .get_comment(actor.actor(), path.thread(), path.comment_id())
        .await?;
    Ok(web::Json(comment.into()))
}

/// Replace the text of a comment.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(CommentPath),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated", body = CommentResponse),
        (status = 400, description = "Invalid text", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
pub async fn update_comment(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<CommentPath>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<CommentResponse>> {
    let actor = actor.signed_in()?;
    let text = require(payload.into_inner().text, TEXT)?;
    let comment = state
        .comments
        .update_comment(actor, path.thread(), path.comment_id(), text)
        .await?;
    Ok(web::Json(comment.into()))
}

/// Delete a comment.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(CommentPath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<CommentPath>,
) -> ApiResult<HttpResponse> {
    state
        .comments
        .delete_comment(actor.actor(), path.thread(), path.comment_id())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Actor;
    use crate::domain::{Attribution, BodyText, Role, UserId, Username};
    use crate::inbound::http::test_utils::{MockPorts, json_body, principal, resolving_auth};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::TimeZone as _;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn comment(id: i64) -> Comment {
        Comment {
            id: CommentId::new(id),
            review_id: ReviewId::new(3),
            author: Attribution {
                user_id: UserId::new(4),
                username: Username::new("grace").expect("username"),
            },
            text: BodyText::new("Agreed").expect("text"),
            pub_date: Utc
                .with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
                .single()
                .expect("timestamp"),
        }
    }

    async fn send(ports: MockPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new().app_data(ports.into_state()).service(
                web::scope("/api/v1")
                    .service(
                        web::resource("/titles/{title_id}/reviews/{review_id}/comments")
                            .route(web::get().to(list_comments))
                            .route(web::post().to(create_comment)),
                    )
                    .service(
                        web::resource(
                            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
                        )
                        .route(web::get().to(get_comment))
                        .route(web::patch().to(update_comment))
                        .route(web::delete().to(delete_comment)),
                    ),
            ),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    #[actix_web::test]
    async fn comments_are_listed_for_the_addressed_thread() {
        let mut ports = MockPorts {
            auth: resolving_auth(Actor::Anonymous),
            ..MockPorts::default()
        };
        ports
            .comments
            .expect_list_comments()
            .withf(|_, thread| {
                thread.title_id == TitleId::new(1) && thread.review_id == ReviewId::new(3)
            })
            .times(1)
            .returning(|_, _| Ok(vec![comment(8)]));

        let (status, body) = send(
            ports,
            actix_test::TestRequest::get().uri("/api/v1/titles/1/reviews/3/comments"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "id": 8,
                "text": "Agreed",
                "author": "grace",
                "pub_date": "2026-03-02T10:00:00Z"
            }])
        );
    }

    #[actix_web::test]
    async fn create_comment_forwards_the_text() {
        let mut ports = MockPorts {
            auth: resolving_auth(principal(4, Role::User)),
            ..MockPorts::default()
        };
        ports
            .comments
            .expect_create_comment()
            .withf(|_, _, text| text == "Agreed")
            .times(1)
            .returning(|_, _, _| Ok(comment(9)));

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/titles/1/reviews/3/comments")
                .set_json(json!({"text": "Agreed"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 9);
    }

    #[actix_web::test]
    async fn missing_text_is_a_field_error() {
        let mut ports = MockPorts {
            auth: resolving_auth(principal(4, Role::User)),
            ..MockPorts::default()
        };
        ports.comments.expect_create_comment().never();

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/titles/1/reviews/3/comments")
                .set_json(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], json!({"field": "text", "code": "missing_field"}));
    }

    #[actix_web::test]
    async fn non_authors_are_forbidden_from_editing() {
        let mut ports = MockPorts {
            auth: resolving_auth(principal(5, Role::User)),
            ..MockPorts::default()
        };
        ports
            .comments
            .expect_update_comment()
            .withf(|_, _, comment_id, _| *comment_id == CommentId::new(8))
            .returning(|_, _, _, _| {
                Err(Error::forbidden("you do not have permission to perform this action"))
            });

        let (status, _) = send(
            ports,
            actix_test::TestRequest::patch()
                .uri("/api/v1/titles/1/reviews/3/comments/8")
                .set_json(json!({"text": "Edited"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn put_is_not_allowed() {
        let ports = MockPorts {
            auth: resolving_auth(principal(4, Role::User)),
            ..MockPorts::default()
        };
        let (status, _) = send(
            ports,
            actix_test::TestRequest::put()
                .uri("/api/v1/titles/1/reviews/3/comments/8")
                .set_json(json!({"text": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[rstest]
    #[case(actix_test::TestRequest::post().uri("/api/v1/titles/1/reviews/3/comments"))]
    #[case(actix_test::TestRequest::patch().uri("/api/v1/titles/1/reviews/3/comments/8"))]
    #[actix_web::test]
    async fn anonymous_writes_are_denied_before_the_body_is_checked(
        #[case] request: actix_test::TestRequest,
    ) {
        let mut ports = MockPorts {
            auth: resolving_auth(Actor::Anonymous),
            ..MockPorts::default()
        };
        ports.comments.expect_create_comment().never();
        ports.comments.expect_update_comment().never();

        let (status, body) = send(ports, request.set_json(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["details"].is_null());
    }
}
