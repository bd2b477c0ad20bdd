//! Access control policy engine.
//!
//! Every authorisation decision in the crate goes through [`decide`], a pure
//! function of the actor, the attempted action and the target resource.
//! Services call [`authorize`] to turn a denial into a domain [`Error`].
//!
//! Precedence, first match wins:
//! 1. Reads of public resources (categories, genres, titles, reviews,
//!    comments) are allowed for everyone.
//! 2. Anonymous actors are denied everything else.
//! 3. Any authenticated actor may create a review or a comment.
//! 4. Review and comment authors may update or delete their own entries.
//! 5. Moderators and admins may update or delete any review or comment.
//! 6. Category, genre, title and user account management requires the
//!    admin role or the staff flag.
//! 7. Authenticated actors may read and update their own profile.
//!
//! Anything else is denied.

use super::{Error, Role, TaxonomyKind, User, UserId, Username};

/// Authenticated identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: Username,
    pub role: Role,
    pub is_staff: bool,
}

impl Principal {
    /// Principal for an account, using its current role.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            is_staff: user.is_staff,
        }
    }

    /// Whether the principal holds administrative rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_staff
    }

    /// Whether the principal may moderate other people's content.
    #[must_use]
    pub fn is_moderator(&self) -> bool {
        matches!(self.role, Role::Moderator | Role::Admin)
    }
}

/// Caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated(Principal),
}

impl Actor {
    /// The principal, when the actor is authenticated.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }

    /// The principal, or an `Unauthorized` error for anonymous callers.
    pub fn require_principal(&self) -> Result<&Principal, Error> {
        self.principal()
            .ok_or_else(|| Error::unauthorized("authentication required"))
    }
}

/// Operation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Changing an account's role.
    AssignRole,
}

/// Target of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Genre,
    Title,
    /// A review attributed to `author`.
    Review { author: UserId },
    /// Creating a review; the author will be the actor.
    NewReview,
    /// A comment attributed to `author`.
    Comment { author: UserId },
    /// Creating a comment; the author will be the actor.
    NewComment,
    /// Any account managed through the administrative user endpoints.
    UserAccount,
    /// The profile owned by `owner`.
    Profile { owner: UserId },
}

impl Resource {
    /// Resource naming a whole taxonomy.
    #[must_use]
    pub const fn taxonomy(kind: TaxonomyKind) -> Self {
        match kind {
            TaxonomyKind::Category => Self::Category,
            TaxonomyKind::Genre => Self::Genre,
        }
    }

    const fn is_public(self) -> bool {
        matches!(
            self,
            Self::Category
                | Self::Genre
                | Self::Title
                | Self::Review { .. }
                | Self::NewReview
                | Self::Comment { .. }
                | Self::NewComment
        )
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The actor is anonymous and must authenticate first.
    Unauthenticated,
    /// The actor is authenticated but lacks the required rights.
    Forbidden,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// Whether access is granted.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// # Examples
/// ```
/// use yamdb::domain::policy::{decide, Action, Actor, Decision, DenyReason, Resource};
///
/// assert_eq!(decide(&Actor::Anonymous, Action::Read, Resource::Title), Decision::Allow);
/// assert_eq!(
///     decide(&Actor::Anonymous, Action::Create, Resource::Title),
///     Decision::Deny(DenyReason::Unauthenticated),
/// );
/// ```
#[must_use]
pub fn decide(actor: &Actor, action: Action, resource: Resource) -> Decision {
    if action == Action::Read && resource.is_public() {
        return Decision::Allow;
    }
    let Some(principal) = actor.principal() else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };
    let allowed = match (resource, action) {
        (Resource::NewReview | Resource::NewComment, Action::Create) => true,
        (
            Resource::Review { author } | Resource::Comment { author },
            Action::Update | Action::Delete,
        ) => author == principal.user_id || principal.is_moderator(),
        (
            Resource::Category | Resource::Genre | Resource::Title,
            Action::Create | Action::Update | Action::Delete,
        )
        | (Resource::UserAccount, _) => principal.is_admin(),
        (Resource::Profile { owner }, Action::Read | Action::Update) => {
            owner == principal.user_id
        }
        _ => false,
    };
    if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// Evaluate the policy and map a denial onto the error taxonomy.
///
/// Anonymous denials become `Unauthorized`; authenticated denials become
/// `Forbidden`.
pub fn authorize(actor: &Actor, action: Action, resource: Resource) -> Result<(), Error> {
    match decide(actor, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::Unauthenticated) => {
            Err(Error::unauthorized("authentication required"))
        }
        Decision::Deny(DenyReason::Forbidden) => Err(Error::forbidden(
            "you do not have permission to perform this action",
        )),
    }
}
