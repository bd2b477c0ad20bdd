//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Authenticator, Catalogue, CommentThreads, ReviewLedger, UserAdministration,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, token exchange and bearer resolution.
    pub auth: Arc<dyn Authenticator>,
    pub users: Arc<dyn UserAdministration>,
    /// Categories, genres and titles.
    pub catalogue: Arc<dyn Catalogue>,
    pub reviews: Arc<dyn ReviewLedger>,
    pub comments: Arc<dyn CommentThreads>,
}
