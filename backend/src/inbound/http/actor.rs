//! Bearer token extraction.
//!
//! Resolves the `Authorization: Bearer <token>` header into a domain
//! [`Actor`] so handlers never touch headers or tokens themselves. Requests
//! without the header are anonymous; the policy engine decides what they may
//! do.
//!
//! Write handlers consult the policy through [`CurrentActor::permit`] before
//! decoding their payload, so callers without rights never learn the shape of
//! a valid body.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::policy::{Action, Actor, Resource, authorize};
use crate::domain::{Error, SessionToken};
use crate::inbound::http::state::HttpState;

const BEARER_SCHEME: &str = "Bearer";

/// Caller of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    /// Borrow the resolved actor.
    pub fn actor(&self) -> &Actor {
        &self.0
    }

    /// Evaluate the policy for `action` on `resource` and return the actor
    /// when it is allowed.
    pub fn permit(&self, action: Action, resource: Resource) -> Result<&Actor, Error> {
        authorize(&self.0, action, resource)?;
        Ok(&self.0)
    }

    /// Require an authenticated caller. Used where the decision depends on a
    /// stored owner that only the service can load.
    pub fn signed_in(&self) -> Result<&Actor, Error> {
        self.0.require_principal()?;
        Ok(&self.0)
    }
}

fn malformed() -> Error {
    Error::unauthorized("authorization header must use the Bearer scheme")
}

/// Read the bearer token, if any, from request headers.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<Option<SessionToken>, Error> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| malformed())?;
    let (scheme, token) = raw.trim().split_once(' ').ok_or_else(malformed)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(malformed());
    }
    SessionToken::new(token.trim())
        .map(Some)
        .map_err(|_| malformed())
}

impl FromRequest for CurrentActor {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token.inspect_err(|err| warn!(error = %err, "rejected authorization header"))?;
            let actor = state.auth.resolve_actor(token).await?;
            Ok(Self(actor))
        })
    }
}
