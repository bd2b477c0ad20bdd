//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test as actix_test;
use actix_web::web;
use serde_json::Value;

use crate::domain::policy::{Actor, Principal};
use crate::domain::ports::{
    MockAuthenticator, MockCatalogue, MockCommentThreads, MockReviewLedger,
    MockUserAdministration,
};
use crate::domain::{Role, UserId, Username};
use crate::inbound::http::state::HttpState;

/// Bearer header value accepted by [`resolving_auth`].
pub const TEST_BEARER: &str = "Bearer v1.test.token";

/// Mock bundle used to assemble [`HttpState`] for handler tests.
#[derive(Default)]
pub struct MockPorts {
    pub auth: MockAuthenticator,
    pub users: MockUserAdministration,
    pub catalogue: MockCatalogue,
    pub reviews: MockReviewLedger,
    pub comments: MockCommentThreads,
}

impl MockPorts {
    /// Wrap the mocks as shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            catalogue: Arc::new(self.catalogue),
            reviews: Arc::new(self.reviews),
            comments: Arc::new(self.comments),
        })
    }
}

/// Authenticated actor with the given id and role.
pub fn principal(id: i64, role: Role) -> Actor {
    Actor::Authenticated(Principal {
        user_id: UserId::new(id),
        username: Username::new(format!("user{id}")).expect("fixture username"),
        role,
        is_staff: false,
    })
}

/// Authenticator mock resolving every request to `actor`.
pub fn resolving_auth(actor: Actor) -> MockAuthenticator {
    let mut auth = MockAuthenticator::new();
    auth.expect_resolve_actor()
        .returning(move |_| Ok(actor.clone()));
    auth
}

/// Read and decode a JSON response body; empty bodies decode as `null`.
pub async fn json_body<B>(response: ServiceResponse<B>) -> Value
where
    B: MessageBody,
{
    let bytes = actix_test::read_body(response).await;
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
