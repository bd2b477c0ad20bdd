//! Shared harness for HTTP integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the app wiring lives here: the real services over a [`MemoryStore`], a
//! fixed confirmation code and a log-only notifier.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test as actix_test, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use yamdb::Trace;
use yamdb::domain::ports::UserRepository;
use yamdb::domain::{
    AuthService, AuthSettings, CatalogueService, CommentThreadService, Email, FixedCodeGenerator,
    NewUser, ReviewLedgerService, Role, TokenSigner, UserAdminService, UserProfile, Username,
};
use yamdb::inbound::http::routes;
use yamdb::inbound::http::state::HttpState;
use yamdb::outbound::memory::MemoryStore;
use yamdb::outbound::notifier::TracingNotifier;

/// Code every sign-up receives.
pub const CONFIRMATION_CODE: &str = "246810";

fn http_state(store: &MemoryStore) -> HttpState {
    let store = Arc::new(store.clone());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let signer = TokenSigner::new(
        b"integration-test-secret".to_vec(),
        Duration::from_secs(3_600),
        clock.clone(),
    );
    HttpState {
        auth: Arc::new(AuthService::new(
            store.clone(),
            Arc::new(TracingNotifier),
            Arc::new(FixedCodeGenerator(246_810)),
            signer,
            AuthSettings::default(),
        )),
        users: Arc::new(UserAdminService::new(store.clone())),
        catalogue: Arc::new(CatalogueService::new(store.clone(), store.clone())),
        reviews: Arc::new(ReviewLedgerService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        )),
        comments: Arc::new(CommentThreadService::new(store.clone(), store, clock)),
    }
}

/// Response status and decoded JSON body (`Null` when empty).
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process API bound to a fresh store.
pub struct TestApi<S> {
    service: S,
    store: MemoryStore,
}

/// Build the app exactly as the server does, minus the socket.
pub async fn spawn_api()
-> TestApi<impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>> {
    let store = MemoryStore::new();
    let service = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(http_state(&store)))
            .wrap(Trace)
            .configure(routes::configure),
    )
    .await;
    TestApi { service, store }
}

impl<S> TestApi<S>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    /// Send a request, optionally authenticated and with a JSON body.
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut request = actix_test::TestRequest::default().method(method).uri(uri);
        if let Some(token) = token {
            request = request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
        }
        if let Some(body) = body {
            request = request.set_json(body);
        }
        let response = actix_test::call_service(&self.service, request.to_request()).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        Reply { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Sign up `username` (if new) and exchange the code for a token.
    pub async fn login(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let signup = self
            .post(
                "/api/v1/auth/signup",
                None,
                json!({"username": username, "email": email}),
            )
            .await;
        assert_eq!(signup.status, StatusCode::OK, "signup: {}", signup.body);

        let token = self
            .post(
                "/api/v1/auth/token",
                None,
                json!({"username": username, "confirmation_code": CONFIRMATION_CODE}),
            )
            .await;
        assert_eq!(token.status, StatusCode::OK, "token: {}", token.body);
        token.body["token"].as_str().expect("token string").to_owned()
    }

    /// Seed an account with `role` directly in the store, then log in.
    pub async fn login_as(&self, username: &str, role: Role) -> String {
        let new_user = NewUser {
            username: Username::new(username).expect("username"),
            email: Email::new(format!("{username}@example.com")).expect("email"),
            role,
            profile: UserProfile::default(),
        };
        self.store.create(&new_user).await.expect("seed account");
        self.login(username).await
    }

    /// Create a category, a genre and a title; return the title id.
    pub async fn seed_title(&self, admin: &str, name: &str) -> i64 {
        for (uri, slug) in [("/api/v1/categories", "film"), ("/api/v1/genres", "drama")] {
            let taxon = self
                .post(uri, Some(admin), json!({"name": slug, "slug": slug}))
                .await;
            assert!(
                taxon.status == StatusCode::CREATED || taxon.status == StatusCode::CONFLICT,
                "taxon: {}",
                taxon.body
            );
        }
        let title = self
            .post(
                "/api/v1/titles",
                Some(admin),
                json!({"name": name, "year": 1994, "category": "film", "genre": ["drama"]}),
            )
            .await;
        assert_eq!(title.status, StatusCode::CREATED, "title: {}", title.body);
        title.body["id"].as_i64().expect("title id")
    }
}
