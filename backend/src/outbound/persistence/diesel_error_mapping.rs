//! Shared classification of pool and Diesel failures.
//!
//! Repositories translate a [`DbFailure`] into their own port error, looking
//! at the violated constraint to pick the precise variant.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Failure classes the repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// A unique constraint rejected the write.
    UniqueViolation(Violation),
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation(Violation),
    /// The connection dropped mid-operation.
    Connection(&'static str),
    /// Any other failure.
    Query(&'static str),
}

/// Constraint details reported by PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Violation {
    constraint: Option<String>,
    message: String,
}

impl Violation {
    /// Whether the violated constraint is `name`.
    ///
    /// Falls back to the error message when the server did not report a
    /// constraint name.
    pub(crate) fn is(&self, name: &str) -> bool {
        match self.constraint.as_deref() {
            Some(constraint) => constraint == name,
            None => self.message.contains(name),
        }
    }
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => {
            let violation = || Violation {
                constraint: info.constraint_name().map(str::to_owned),
                message: info.message().to_owned(),
            };
            match kind {
                DatabaseErrorKind::UniqueViolation => DbFailure::UniqueViolation(violation()),
                DatabaseErrorKind::ForeignKeyViolation => {
                    DbFailure::ForeignKeyViolation(violation())
                }
                DatabaseErrorKind::ClosedConnection => {
                    DbFailure::Connection("database connection error")
                }
                _ => DbFailure::Query("database error"),
            }
        }
        _ => DbFailure::Query("database error"),
    }
}

/// Escape `needle` for a `LIKE` pattern and wrap it in wildcards.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fake PostgreSQL error payloads for mapping tests.
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

    struct ConstraintInfo(&'static str);

    impl DatabaseErrorInformation for ConstraintInfo {
        fn message(&self) -> &str {
            "constraint violated"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    /// A database error naming `constraint`.
    pub(crate) fn violation(kind: DatabaseErrorKind, constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(ConstraintInfo(constraint)))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::violation;
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unique_violations_keep_the_constraint_name() {
        let failure = classify(violation(
            DatabaseErrorKind::UniqueViolation,
            "users_email_key",
        ));
        let DbFailure::UniqueViolation(violation) = failure else {
            panic!("expected a unique violation, got {failure:?}");
        };
        assert!(violation.is("users_email_key"));
        assert!(!violation.is("users_username_key"));
    }

    #[rstest]
    fn constraint_lookup_falls_back_to_the_message() {
        let failure = classify(DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("insert violates foreign key constraint \"reviews_title_id_fkey\"".to_owned()),
        ));
        let DbFailure::ForeignKeyViolation(violation) = failure else {
            panic!("expected a foreign key violation, got {failure:?}");
        };
        assert!(violation.is("reviews_title_id_fkey"));
    }

    #[rstest]
    #[case(DieselError::NotFound, DbFailure::Query("record not found"))]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, Box::new("gone".to_owned())),
        DbFailure::Connection("database connection error")
    )]
    #[case(DieselError::RollbackTransaction, DbFailure::Query("database error"))]
    fn other_errors_collapse_into_generic_classes(
        #[case] error: DieselError,
        #[case] expected: DbFailure,
    ) {
        assert_eq!(classify(error), expected);
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(
            pool_message(PoolError::checkout("connection refused")),
            "connection refused"
        );
    }

    #[rstest]
    #[case("drama", "%drama%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b", "%a\\_b%")]
    fn like_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(needle), expected);
    }
}
