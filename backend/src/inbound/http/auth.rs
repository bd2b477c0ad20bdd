//! Sign-in handlers.
//!
//! ```text
//! POST /api/v1/auth/signup {"username":"ada","email":"ada@example.com"}
//! POST /api/v1/auth/token  {"username":"ada","confirmation_code":"123456"}
//! ```

use actix_web::web;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::Registration;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_confirmation_code, parse_email, parse_username, require,
};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const CONFIRMATION_CODE: FieldName = FieldName::new("confirmation_code");

/// Signup request body; also used to request a fresh code.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

/// Echo of the registered username and email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

impl From<Registration> for SignupResponse {
    fn from(value: Registration) -> Self {
        Self {
            username: value.username.into(),
            email: value.email.into(),
        }
    }
}

/// Token exchange request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    #[schema(example = "123456")]
    pub confirmation_code: Option<String>,
}

/// Bearer token for the `Authorization` header.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Register (or re-register) an account and send a confirmation code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = SignupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email already taken", body = Error),
        (status = 503, description = "Code delivery failed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<SignupResponse>> {
    let SignupRequest { username, email } = payload.into_inner();
    let username = parse_username(&require(username, USERNAME)?, USERNAME)?;
    let email = parse_email(&require(email, EMAIL)?, EMAIL)?;
    let registration = state
        .auth
        .request_code(&Registration { username, email })
        .await?;
    Ok(web::Json(registration.into()))
}

/// Exchange a confirmation code for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request or wrong code", body = Error),
        (status = 404, description = "Unknown username", body = Error)
    ),
    tags = ["auth"],
    operation_id = "obtainToken",
    security([])
)]
pub async fn obtain_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let TokenRequest {
        username,
        confirmation_code,
    } = payload.into_inner();
    let username = parse_username(&require(username, USERNAME)?, USERNAME)?;
    let code = parse_confirmation_code(
        &require(confirmation_code, CONFIRMATION_CODE)?,
        CONFIRMATION_CODE,
    )?;
    let issued = state.auth.exchange_code(&username, &code).await?;
    Ok(web::Json(TokenResponse {
        token: issued.token.expose().to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{IssuedToken, MockAuthenticator};
    use crate::domain::{ErrorCode, SessionToken};
    use crate::inbound::http::test_utils::{MockPorts, json_body};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn app_state(auth: MockAuthenticator) -> web::Data<HttpState> {
        MockPorts {
            auth,
            ..MockPorts::default()
        }
        .into_state()
    }

    async fn post(auth: MockAuthenticator, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(app_state(auth))
                .route("/api/v1/auth/signup", web::post().to(signup))
                .route("/api/v1/auth/token", web::post().to(obtain_token)),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    #[actix_web::test]
    async fn signup_echoes_the_registration() {
        let mut auth = MockAuthenticator::new();
        auth.expect_request_code()
            .withf(|reg| reg.username.as_str() == "ada" && reg.email.as_str() == "ada@example.com")
            .times(1)
            .returning(|reg| Ok(reg.clone()));

        let (status, body) = post(
            auth,
            "/api/v1/auth/signup",
            json!({"username": "ada", "email": "ada@example.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"username": "ada", "email": "ada@example.com"}));
    }

    #[rstest]
    #[case(json!({"username": "me", "email": "me@example.com"}), "username", "reserved_username")]
    #[case(json!({"email": "ada@example.com"}), "username", "missing_field")]
    #[case(json!({"username": "ada", "email": "not-an-email"}), "email", "invalid_email")]
    #[actix_web::test]
    async fn signup_rejects_invalid_fields_before_the_port(
        #[case] payload: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut auth = MockAuthenticator::new();
        auth.expect_request_code().never();

        let (status, body) = post(auth, "/api/v1/auth/signup", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }

    #[actix_web::test]
    async fn token_exchange_returns_the_bearer_token() {
        let mut auth = MockAuthenticator::new();
        auth.expect_exchange_code()
            .withf(|username, code| username.as_str() == "ada" && code.expose() == "123456")
            .times(1)
            .returning(|username, _| {
                Ok(IssuedToken {
                    username: username.clone(),
                    token: SessionToken::new("v1.payload.sig").expect("token"),
                })
            });

        let (status, body) = post(
            auth,
            "/api/v1/auth/token",
            json!({"username": "ada", "confirmation_code": "123456"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"token": "v1.payload.sig"}));
    }

    #[actix_web::test]
    async fn wrong_codes_map_to_bad_request() {
        let mut auth = MockAuthenticator::new();
        auth.expect_exchange_code()
            .returning(|_, _| Err(Error::invalid_credentials("confirmation code is invalid")));

        let (status, body) = post(
            auth,
            "/api/v1/auth/token",
            json!({"username": "ada", "confirmation_code": "000000"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!(ErrorCode::InvalidCredentials));
    }
}
