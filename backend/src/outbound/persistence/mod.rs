//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Policy and validation live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Constraints as truth**: uniqueness and cascades are enforced by the
//!   schema in `backend/migrations`; violations are mapped to port errors by
//!   constraint name.
//!
//! # Example
//!
//! ```ignore
//! use yamdb::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/yamdb")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! ```

mod diesel_comment_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_review_repository;
mod diesel_taxonomy_repository;
mod diesel_title_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_taxonomy_repository::DieselTaxonomyRepository;
pub use diesel_title_repository::DieselTitleRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
