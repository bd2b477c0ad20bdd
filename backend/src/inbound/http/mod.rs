//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate JSON payloads into domain values, resolve the caller
//! through [`actor::CurrentActor`] and delegate to the driving ports held in
//! [`state::HttpState`]. Routing lives in [`routes`].

pub mod actor;
pub mod auth;
pub mod comments;
pub mod error;
pub mod health;
pub mod reviews;
pub mod routes;
pub mod state;
pub mod taxonomy;
#[cfg(test)]
pub mod test_utils;
pub mod titles;
pub mod users;
pub mod validation;

pub use error::ApiResult;
