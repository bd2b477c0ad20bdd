//! Authentication primitives: confirmation codes and bearer tokens.
//!
//! Confirmation codes are short numeric secrets delivered out of band. Only
//! their SHA-256 digest is ever handed to the identity store.

use std::fmt;

use rand::Rng as _;
use sha2::{Digest as _, Sha256};
use zeroize::Zeroizing;

/// Smallest code the generator may produce.
pub const CONFIRMATION_CODE_MIN: u32 = 100_000;
/// Largest code the generator may produce.
pub const CONFIRMATION_CODE_MAX: u32 = 999_999;

/// Validation errors for authentication payload values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Confirmation code was blank once trimmed.
    EmptyConfirmationCode,
    /// Bearer token was blank once trimmed.
    EmptyToken,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyConfirmationCode => write!(f, "confirmation code must not be empty"),
            Self::EmptyToken => write!(f, "token must not be empty"),
        }
    }
}

impl AuthValidationError {
    /// Stable machine-readable code reported in error details.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        "blank"
    }
}

impl std::error::Error for AuthValidationError {}

/// One-time numeric code proving control of an email address.
///
/// The raw value is zeroised on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use yamdb::domain::ConfirmationCode;
///
/// let code = ConfirmationCode::new(" 123456 ").expect("non-empty code");
/// assert_eq!(code.expose(), "123456");
/// assert_eq!(code.digest(), ConfirmationCode::from_number(123_456).digest());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationCode(Zeroizing<String>);

impl ConfirmationCode {
    /// Wrap caller-supplied input, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuthValidationError::EmptyConfirmationCode);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Build a code from a generated number.
    #[must_use]
    pub fn from_number(value: u32) -> Self {
        Self(Zeroizing::new(value.to_string()))
    }

    /// Raw code for inclusion in the delivery message.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Digest stored in place of the code.
    #[must_use]
    pub fn digest(&self) -> CodeDigest {
        let hash = Sha256::digest(self.0.as_bytes());
        CodeDigest(hex::encode(hash))
    }
}

impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationCode(****)")
    }
}

/// Hex-encoded SHA-256 digest of a confirmation code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeDigest(String);

impl CodeDigest {
    /// Rehydrate a digest loaded from storage.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Source of fresh confirmation codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Produce a new code in the range `100000..=999999`.
    fn generate(&self) -> ConfirmationCode;
}

/// Generator backed by the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> ConfirmationCode {
        let value = rand::thread_rng().gen_range(CONFIRMATION_CODE_MIN..=CONFIRMATION_CODE_MAX);
        ConfirmationCode::from_number(value)
    }
}

/// Generator that always yields the same code; for tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedCodeGenerator(pub u32);

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> ConfirmationCode {
        ConfirmationCode::from_number(self.0)
    }
}

/// Opaque bearer token returned by a successful code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Wrap a raw token value, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, AuthValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AuthValidationError::EmptyToken);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Token text as sent in the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(****)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn random_codes_stay_within_six_digits() {
        let generator = RandomCodeGenerator;
        for _ in 0..256 {
            let code = generator.generate();
            let value: u32 = code.expose().parse().expect("numeric code");
            assert!((CONFIRMATION_CODE_MIN..=CONFIRMATION_CODE_MAX).contains(&value));
            assert_eq!(code.expose().len(), 6);
        }
    }

    #[rstest]
    fn digests_differ_per_code_and_hide_the_value() {
        let first = ConfirmationCode::from_number(123_456).digest();
        let second = ConfirmationCode::from_number(654_321).digest();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 64);
        assert!(!first.as_str().contains("123456"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_codes_are_rejected(#[case] raw: &str) {
        assert_eq!(
            ConfirmationCode::new(raw),
            Err(AuthValidationError::EmptyConfirmationCode)
        );
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let code = ConfirmationCode::from_number(123_456);
        let token = SessionToken::new("v1.abc.def").expect("token");
        assert!(!format!("{code:?}").contains("123456"));
        assert!(!format!("{token:?}").contains("abc"));
    }
}
