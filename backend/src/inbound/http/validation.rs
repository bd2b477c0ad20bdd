//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs carry raw client values; these helpers turn them into domain
//! newtypes and report failures as `invalid_request` errors whose details
//! name the offending field.

use serde_json::json;

use crate::domain::{
    AuthValidationError, CatalogueName, CatalogueValidationError, ConfirmationCode, Email, Error,
    PersonName, Role, Slug, SlugValidationError, UserValidationError, Username,
};

/// Validation error codes raised by the adapter itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Domain validation errors that expose a stable detail code.
pub(crate) trait FieldViolation: std::fmt::Display {
    fn detail_code(&self) -> &'static str;
}

macro_rules! field_violation {
    ($($ty:ty),+ $(,)?) => {
        $(impl FieldViolation for $ty {
            fn detail_code(&self) -> &'static str {
                self.code()
            }
        })+
    };
}

field_violation!(
    UserValidationError,
    SlugValidationError,
    CatalogueValidationError,
    AuthValidationError,
);

/// Report a domain validation failure against `field`.
pub(crate) fn field_error(field: FieldName, err: &impl FieldViolation) -> Error {
    Error::invalid_field(field.as_str(), err.detail_code(), err.to_string())
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Require an optional value, reporting `missing_field` when absent.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_username(value: &str, field: FieldName) -> Result<Username, Error> {
    Username::new(value).map_err(|err| field_error(field, &err))
}

pub(crate) fn parse_email(value: &str, field: FieldName) -> Result<Email, Error> {
    Email::new(value).map_err(|err| field_error(field, &err))
}

pub(crate) fn parse_person_name(value: String, field: FieldName) -> Result<PersonName, Error> {
    PersonName::new(value).map_err(|err| field_error(field, &err))
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    value.parse().map_err(|err| field_error(field, &err))
}

pub(crate) fn parse_slug(value: &str, field: FieldName) -> Result<Slug, Error> {
    Slug::new(value).map_err(|err| field_error(field, &err))
}

pub(crate) fn parse_slugs(values: &[String], field: FieldName) -> Result<Vec<Slug>, Error> {
    values
        .iter()
        .map(|value| parse_slug(value, field))
        .collect()
}

pub(crate) fn parse_name(value: &str, field: FieldName) -> Result<CatalogueName, Error> {
    CatalogueName::new(value).map_err(|err| field_error(field, &err))
}

pub(crate) fn parse_confirmation_code(
    value: &str,
    field: FieldName,
) -> Result<ConfirmationCode, Error> {
    ConfirmationCode::new(value).map_err(|err| field_error(field, &err))
}
