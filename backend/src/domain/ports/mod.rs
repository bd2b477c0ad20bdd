//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, notifier) are implemented by outbound
//! adapters and return typed errors built with [`define_port_error!`].
//! Driving ports are implemented by the domain services and consumed by the
//! inbound HTTP adapter; they speak the transport-agnostic [`Error`].
//!
//! [`Error`]: crate::domain::Error

mod macros;
pub(crate) use macros::define_port_error;

mod authenticator;
mod catalogue;
mod comment_repository;
mod comment_threads;
mod notifier;
mod review_ledger;
mod review_repository;
mod taxonomy_repository;
mod title_repository;
mod user_administration;
mod user_repository;

#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::{Authenticator, IssuedToken, Registration};
pub use catalogue::Catalogue;
#[cfg(test)]
pub use catalogue::MockCatalogue;
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentPersistenceError, CommentRepository};
#[cfg(test)]
pub use comment_threads::MockCommentThreads;
pub use comment_threads::{CommentThreads, ThreadRef};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notifier, NotifierError, OutgoingMessage};
#[cfg(test)]
pub use review_ledger::MockReviewLedger;
pub use review_ledger::{ReviewChanges, ReviewDraft, ReviewLedger};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewPersistenceError, ReviewRepository};
#[cfg(test)]
pub use taxonomy_repository::MockTaxonomyRepository;
pub use taxonomy_repository::{TaxonomyPersistenceError, TaxonomyRepository};
#[cfg(test)]
pub use title_repository::MockTitleRepository;
pub use title_repository::{TitlePersistenceError, TitleRepository};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::UserAdministration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
