//! Tests for users API handlers.

use super::*;
use crate::domain::policy::Actor;
use crate::domain::{Email, ErrorCode, UserId, Username};
use crate::inbound::http::test_utils::{MockPorts, TEST_BEARER, json_body, principal, resolving_auth};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn account(id: i64, username: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        username: Username::new(username).expect("username"),
        email: Email::new(format!("{username}@example.com")).expect("email"),
        role,
        is_staff: false,
        profile: UserProfile::default(),
    }
}

#[fixture]
fn admin() -> Actor {
    principal(1, Role::Admin)
}

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(ports.into_state()).service(
        web::scope("/api/v1")
            .service(
                web::resource("/users")
                    .route(web::get().to(list_users))
                    .route(web::post().to(create_user)),
            )
            .service(
                web::resource("/users/me")
                    .route(web::get().to(get_me))
                    .route(web::patch().to(update_me)),
            )
            .service(
                web::resource("/users/{username}")
                    .route(web::get().to(get_user))
                    .route(web::patch().to(update_user))
                    .route(web::delete().to(delete_user)),
            ),
    )
}

async fn send(ports: MockPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        request.insert_header(("Authorization", TEST_BEARER)).to_request(),
    )
    .await;
    let status = response.status();
    (status, json_body(response).await)
}

#[rstest]
#[actix_web::test]
async fn list_users_returns_snake_case_accounts(admin: Actor) {
    let mut ports = MockPorts {
        auth: resolving_auth(admin),
        ..MockPorts::default()
    };
    ports
        .users
        .expect_list_users()
        .withf(|_, search| search.as_deref() == Some("ad"))
        .times(1)
        .returning(|_, _| Ok(vec![account(2, "ada", Role::Moderator)]));

    let (status, body) = send(ports, actix_test::TestRequest::get().uri("/api/v1/users?search=ad")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "username": "ada",
            "email": "ada@example.com",
            "first_name": "",
            "last_name": "",
            "bio": "",
            "role": "moderator"
        }])
    );
}

#[rstest]
#[actix_web::test]
async fn create_user_returns_created_with_role(admin: Actor) {
    let mut ports = MockPorts {
        auth: resolving_auth(admin),
        ..MockPorts::default()
    };
    ports
        .users
        .expect_create_user()
        .withf(|_, user| user.role == Role::Admin && user.profile.bio == "hello")
        .times(1)
        .returning(|_, user| {
            let mut created = account(5, user.username.as_str(), user.role);
            created.profile = user.profile;
            Ok(created)
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "username": "grace",
            "email": "grace@example.com",
            "role": "admin",
            "bio": "hello"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["bio"], "hello");
}

#[rstest]
#[case(json!({"email": "grace@example.com"}), "username", "missing_field")]
#[case(json!({"username": "grace", "email": "grace@example.com", "role": "root"}), "role", "unknown_role")]
#[case(json!({"username": "me", "email": "grace@example.com"}), "username", "reserved_username")]
#[actix_web::test]
async fn create_user_validates_fields(
    admin: Actor,
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut ports = MockPorts {
        auth: resolving_auth(admin),
        ..MockPorts::default()
    };
    ports.users.expect_create_user().never();

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post().uri("/api/v1/users").set_json(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn me_routes_take_precedence_over_usernames() {
    let member = principal(7, Role::User);
    let mut ports = MockPorts {
        auth: resolving_auth(member),
        ..MockPorts::default()
    };
    ports
        .users
        .expect_get_me()
        .times(1)
        .returning(|_| Ok(account(7, "user7", Role::User)));
    ports.users.expect_get_user().never();

    let (status, body) = send(ports, actix_test::TestRequest::get().uri("/api/v1/users/me")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "user7");
}

#[rstest]
#[actix_web::test]
async fn update_me_never_forwards_a_role() {
    let member = principal(7, Role::User);
    let mut ports = MockPorts {
        auth: resolving_auth(member),
        ..MockPorts::default()
    };
    ports
        .users
        .expect_update_me()
        .withf(|_, patch| patch.role.is_none() && patch.bio.as_deref() == Some("new bio"))
        .times(1)
        .returning(|_, patch| {
            let mut user = account(7, "user7", Role::User);
            patch.apply_to(&mut user);
            Ok(user)
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .set_json(json!({"role": "admin", "bio": "new bio"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
    assert_eq!(body["bio"], "new bio");
}

#[rstest]
#[actix_web::test]
async fn deleting_me_is_not_allowed() {
    let ports = MockPorts {
        auth: resolving_auth(principal(7, Role::User)),
        ..MockPorts::default()
    };
    let (status, _) = send(ports, actix_test::TestRequest::delete().uri("/api/v1/users/me")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[rstest]
#[actix_web::test]
async fn delete_user_returns_no_content(admin: Actor) {
    let mut ports = MockPorts {
        auth: resolving_auth(admin),
        ..MockPorts::default()
    };
    ports
        .users
        .expect_delete_user()
        .withf(|_, username| username.as_str() == "ada")
        .times(1)
        .returning(|_, _| Ok(()));

    let (status, body) = send(ports, actix_test::TestRequest::delete().uri("/api/v1/users/ada")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[rstest]
#[actix_web::test]
async fn policy_denials_surface_as_forbidden() {
    let mut ports = MockPorts {
        auth: resolving_auth(principal(7, Role::User)),
        ..MockPorts::default()
    };
    ports.users.expect_get_user().never();

    let (status, body) = send(ports, actix_test::TestRequest::get().uri("/api/v1/users/ada")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!(ErrorCode::Forbidden));
}

#[rstest]
#[case(Actor::Anonymous, StatusCode::UNAUTHORIZED)]
#[case(principal(7, Role::User), StatusCode::FORBIDDEN)]
#[case(principal(7, Role::Moderator), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn account_creation_is_denied_before_the_body_is_checked(
    #[case] caller: Actor,
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts {
        auth: resolving_auth(caller),
        ..MockPorts::default()
    };
    ports.users.expect_create_user().never();

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({"username": "ada"})),
    )
    .await;
    assert_eq!(status, expected);
    assert!(body["details"].is_null());
}

#[rstest]
#[actix_web::test]
async fn anonymous_profile_updates_are_unauthorized() {
    let mut ports = MockPorts {
        auth: resolving_auth(Actor::Anonymous),
        ..MockPorts::default()
    };
    ports.users.expect_update_me().never();

    let (status, _) = send(
        ports,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .set_json(json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
