//! Signed, self-contained bearer tokens.
//!
//! Tokens take the form `v1.<payload>.<signature>` where the payload is the
//! base64url JSON encoding of [`TokenClaims`] and the signature is an
//! HMAC-SHA256 over the encoded payload. Verification needs only the secret
//! and a clock, never a store lookup.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{SessionToken, User, UserId};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: &str = "v1";
const MAX_TOKEN_LEN: usize = 2048;

/// Identity carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user identifier.
    pub sub: i64,
    pub username: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Subject as a typed identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Reasons a token fails to verify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token version is not supported")]
    UnsupportedVersion,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token could not be encoded: {message}")]
    Encoding { message: String },
}

/// Issues and verifies bearer tokens with a shared secret.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use mockable::DefaultClock;
/// use yamdb::domain::{Email, Role, TokenSigner, User, UserId, UserProfile, Username};
///
/// let signer = TokenSigner::new(b"secret".to_vec(), Duration::from_secs(60), Arc::new(DefaultClock));
/// let user = User {
///     id: UserId::new(7),
///     username: Username::new("ada").expect("username"),
///     email: Email::new("ada@example.com").expect("email"),
///     role: Role::User,
///     is_staff: false,
///     profile: UserProfile::default(),
/// };
/// let token = signer.issue(&user).expect("token issues");
/// let claims = signer.verify(token.expose()).expect("token verifies");
/// assert_eq!(claims.user_id(), UserId::new(7));
/// ```
#[derive(Clone)]
pub struct TokenSigner {
    secret: Arc<Zeroizing<Vec<u8>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    /// Build a signer from a secret, a token lifetime and a clock.
    pub fn new(secret: Vec<u8>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Arc::new(Zeroizing::new(secret)),
            ttl,
            clock,
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.as_slice()).map_err(|err| TokenError::Encoding {
            message: err.to_string(),
        })
    }

    /// Issue a token for the given account.
    pub fn issue(&self, user: &User) -> Result<SessionToken, TokenError> {
        let now = self.clock.utc().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub: user.id.get(),
            username: user.username.as_str().to_owned(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &TokenClaims) -> Result<SessionToken, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|err| TokenError::Encoding {
            message: err.to_string(),
        })?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        let signature_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        SessionToken::new(format!("{TOKEN_VERSION}.{payload_part}.{signature_part}")).map_err(
            |err| TokenError::Encoding {
                message: err.to_string(),
            },
        )
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::Malformed);
        }
        let mut parts = token.split('.');
        let (version, payload_part, signature_part) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(version), Some(payload), Some(signature), None) => {
                    (version, payload, signature)
                }
                _ => return Err(TokenError::Malformed),
            };
        if version != TOKEN_VERSION {
            return Err(TokenError::UnsupportedVersion);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_part)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, Role, UserProfile, Username};
    use crate::test_support::MutableClock;
    use chrono::{TimeZone as _, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        ))
    }

    fn signer(clock: &Arc<MutableClock>, secret: &[u8]) -> TokenSigner {
        TokenSigner::new(secret.to_vec(), Duration::from_secs(3600), clock.clone())
    }

    fn user() -> User {
        User {
            id: UserId::new(42),
            username: Username::new("grace").expect("username"),
            email: Email::new("grace@example.com").expect("email"),
            role: Role::Moderator,
            is_staff: false,
            profile: UserProfile::default(),
        }
    }

    #[rstest]
    fn issued_tokens_verify_with_the_same_secret(clock: Arc<MutableClock>) {
        let signer = signer(&clock, b"top-secret");
        let token = signer.issue(&user()).expect("issue token");

        let claims = signer.verify(token.expose()).expect("verify token");
        assert_eq!(claims.user_id(), UserId::new(42));
        assert_eq!(claims.username, "grace");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(token.expose().starts_with("v1."));
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected(clock: Arc<MutableClock>) {
        let token = signer(&clock, b"first").issue(&user()).expect("issue token");
        let result = signer(&clock, b"second").verify(token.expose());
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[rstest]
    fn tokens_expire_after_their_lifetime(clock: Arc<MutableClock>) {
        let signer = signer(&clock, b"top-secret");
        let token = signer.issue(&user()).expect("issue token");

        clock.advance_seconds(3599);
        assert!(signer.verify(token.expose()).is_ok());
        clock.advance_seconds(1);
        assert_eq!(signer.verify(token.expose()), Err(TokenError::Expired));
    }

    #[rstest]
    fn tampered_payloads_fail_signature_checks(clock: Arc<MutableClock>) {
        let signer = signer(&clock, b"top-secret");
        let token = signer.issue(&user()).expect("issue token");
        let forged_claims = TokenClaims {
            sub: 1,
            username: "admin".to_owned(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).expect("encode claims"));
        let signature = token.expose().rsplit('.').next().expect("signature part");
        let forged = format!("v1.{forged_payload}.{signature}");

        assert_eq!(signer.verify(&forged), Err(TokenError::BadSignature));
    }

    #[rstest]
    #[case("", TokenError::Malformed)]
    #[case("v1.only-two", TokenError::Malformed)]
    #[case("v2.a.b", TokenError::UnsupportedVersion)]
    #[case("v1.a.b.c", TokenError::Malformed)]
    #[case("v1.payload.!!!", TokenError::Malformed)]
    fn malformed_tokens_are_rejected(
        clock: Arc<MutableClock>,
        #[case] raw: &str,
        #[case] expected: TokenError,
    ) {
        assert_eq!(signer(&clock, b"top-secret").verify(raw), Err(expected));
    }
}
