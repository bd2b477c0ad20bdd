//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users?search=ad
//! POST   /api/v1/users {"username":"ada","email":"ada@example.com","role":"moderator"}
//! GET    /api/v1/users/{username}
//! PATCH  /api/v1/users/{username} {"role":"admin"}
//! DELETE /api/v1/users/{username}
//! GET    /api/v1/users/me
//! PATCH  /api/v1/users/me {"bio":"..."}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::policy::{Action, Resource};
use crate::domain::{Error, NewUser, Role, User, UserPatch, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_email, parse_person_name, parse_role, parse_username, require,
};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const ROLE: FieldName = FieldName::new("role");
const FIRST_NAME: FieldName = FieldName::new("first_name");
const LAST_NAME: FieldName = FieldName::new("last_name");

/// Account as returned by the users endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let UserProfile {
            first_name,
            last_name,
            bio,
        } = user.profile;
        Self {
            username: user.username.into(),
            email: user.email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            bio,
            role: user.role,
        }
    }
}

/// Account creation body for administrators.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Defaults to `user`.
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let username = parse_username(&require(value.username, USERNAME)?, USERNAME)?;
        let email = parse_email(&require(value.email, EMAIL)?, EMAIL)?;
        let role = value
            .role
            .map(|raw| parse_role(&raw, ROLE))
            .transpose()?
            .unwrap_or_default();
        let first_name = value
            .first_name
            .map(|raw| parse_person_name(raw, FIRST_NAME))
            .transpose()?
            .unwrap_or_default();
        let last_name = value
            .last_name
            .map(|raw| parse_person_name(raw, LAST_NAME))
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            username,
            email,
            role,
            profile: UserProfile {
                first_name,
                last_name,
                bio: value.bio.unwrap_or_default(),
            },
        })
    }
}

/// Partial account update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Honoured for administrators only; ignored on `/users/me`.
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            username: value
                .username
                .map(|raw| parse_username(&raw, USERNAME))
                .transpose()?,
            email: value
                .email
                .map(|raw| parse_email(&raw, EMAIL))
                .transpose()?,
            role: value.role.map(|raw| parse_role(&raw, ROLE)).transpose()?,
            first_name: value
                .first_name
                .map(|raw| parse_person_name(raw, FIRST_NAME))
                .transpose()?,
            last_name: value
                .last_name
                .map(|raw| parse_person_name(raw, LAST_NAME))
                .transpose()?,
            bio: value.bio,
        })
    }
}

/// Username search for the account listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearch {
    /// Case-insensitive username substring.
    pub search: Option<String>,
}

/// Path segment naming an account.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UsernamePath {
    pub username: String,
}

/// List accounts ordered by username.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserSearch),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<UserSearch>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state
        .users
        .list_users(actor.actor(), query.into_inner().search)
        .await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create an account with an explicit role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Create, Resource::UserAccount)?;
    let new_user = NewUser::try_from(payload.into_inner())?;
    let user = state.users.create_user(actor, new_user).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Fetch one account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(UsernamePath),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
pub async fn get_user(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<UsernamePath>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = actor.permit(Action::Read, Resource::UserAccount)?;
    let username = parse_username(&path.username, USERNAME)?;
    let user = state.users.get_user(actor, &username).await?;
    Ok(web::Json(user.into()))
}

/// Update an account, including its role.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    params(UsernamePath),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
pub async fn update_user(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<UsernamePath>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = actor.permit(Action::Update, Resource::UserAccount)?;
    let username = parse_username(&path.username, USERNAME)?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state
        .users
        .update_user(actor, &username, patch)
        .await?;
    Ok(web::Json(user.into()))
}

/// Delete an account together with its reviews and comments.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(UsernamePath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<UsernamePath>,
) -> ApiResult<HttpResponse> {
    let actor = actor.permit(Action::Delete, Resource::UserAccount)?;
    let username = parse_username(&path.username, USERNAME)?;
    state.users.delete_user(actor, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getMe"
)]
pub async fn get_me(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get_me(actor.actor()).await?;
    Ok(web::Json(user.into()))
}

/// Update the caller's own account; a submitted role is ignored.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateMe"
)]
pub async fn update_me(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = actor.signed_in()?;
    let mut request = payload.into_inner();
    request.role = None;
    let patch = UserPatch::try_from(request)?;
    let user = state.users.update_me(actor, patch).await?;
    Ok(web::Json(user.into()))
}

#[cfg(test)]
mod tests;
