//! Domain primitives, policy and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, the access control policy engine, and the services that
//! implement the driving ports. Nothing in here knows about actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Role and field newtypes: the identity model.
//! - Taxon, Title, Rating: the catalogue model.
//! - Review, Comment, Score: the review ledger model.
//! - policy: the `decide` / `authorize` engine.
//! - ports: driven and driving port traits.

pub mod auth;
pub mod auth_service;
pub mod catalogue;
pub mod catalogue_service;
pub mod comment_thread_service;
pub mod comments;
pub mod error;
pub mod policy;
pub mod ports;
pub mod review_ledger_service;
pub mod reviews;
pub mod session_token;
pub mod slug;
pub mod trace_id;
pub mod user;
pub mod user_admin_service;

pub use self::auth::{
    AuthValidationError, CONFIRMATION_CODE_MAX, CONFIRMATION_CODE_MIN, CodeDigest, CodeGenerator,
    ConfirmationCode, FixedCodeGenerator, RandomCodeGenerator, SessionToken,
};
pub use self::auth_service::{AuthService, AuthSettings, CONFIRMATION_SUBJECT};
pub use self::catalogue::{
    CATALOGUE_NAME_MAX, CatalogueName, CatalogueValidationError, NewTaxon, NewTitle, Rating,
    Taxon, TaxonId, TaxonomyKind, Title, TitleFilter, TitleId, TitlePatch,
};
pub use self::catalogue_service::CatalogueService;
pub use self::comment_thread_service::CommentThreadService;
pub use self::comments::{Comment, CommentId, NewComment};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::review_ledger_service::ReviewLedgerService;
pub use self::reviews::{
    Attribution, BodyText, NewReview, Review, ReviewId, ReviewPatch, ReviewValidationError,
    SCORE_MAX, SCORE_MIN, Score,
};
pub use self::session_token::{TokenClaims, TokenError, TokenSigner};
pub use self::slug::{SLUG_MAX, Slug, SlugValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, NewUser, PERSON_NAME_MAX, PersonName, RESERVED_USERNAME, Role, USERNAME_MAX,
    User, UserId, UserPatch, UserProfile, UserValidationError, Username,
};
pub use self::user_admin_service::UserAdminService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use yamdb::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
