//! Error types for the gym console.
//!
//! Every repository and workflow call returns an [`AppResult`]. Errors are
//! converted into operator-facing text in exactly one place,
//! [`AppError::operator_message`], which also logs them.

use thiserror::Error;

/// Coarse error classes reported back to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input, detected before any write.
    Validation,
    /// A business rule failed on a read (missing row, active membership, ...).
    Precondition,
    /// The store rejected a write on a uniqueness or referential rule.
    ConstraintViolation,
    /// Unexpected store or I/O failure.
    OperationalFailure,
}

/// Kind of store constraint that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
}

/// Column a constraint violation could be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstrainedField {
    PhoneNumber,
    Email,
    OfficeLocation,
    PlanType,
    ActiveMembership,
}

impl ConstrainedField {
    /// Attribute a constraint name to a column, if it names one.
    pub fn from_constraint_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.contains("phone") {
            Some(Self::PhoneNumber)
        } else if name.contains("email") {
            Some(Self::Email)
        } else if name.contains("office_location") {
            Some(Self::OfficeLocation)
        } else if name.contains("one_active") {
            Some(Self::ActiveMembership)
        } else if name.contains("plan_type") {
            Some(Self::PlanType)
        } else {
            None
        }
    }
}

/// A uniqueness or referential failure reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.describe())]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub field: Option<ConstrainedField>,
    /// Raw constraint name as reported by the store, when available.
    pub constraint: Option<String>,
}

impl ConstraintViolation {
    pub fn unique(field: Option<ConstrainedField>, constraint: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Unique,
            field,
            constraint: Some(constraint.into()),
        }
    }

    pub fn foreign_key(constraint: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::ForeignKey,
            field: None,
            constraint: Some(constraint.into()),
        }
    }

    fn describe(&self) -> String {
        match (self.kind, self.field) {
            (ConstraintKind::Unique, Some(ConstrainedField::PhoneNumber)) => {
                "This phone number is already in use. Phone numbers must be unique.".to_string()
            }
            (ConstraintKind::Unique, Some(ConstrainedField::Email)) => {
                "This email is already in use. Email addresses must be unique.".to_string()
            }
            (ConstraintKind::Unique, Some(ConstrainedField::OfficeLocation)) => {
                "A manager with this office location already exists. Office locations must be unique."
                    .to_string()
            }
            (ConstraintKind::Unique, Some(ConstrainedField::PlanType)) => {
                "This plan type already exists.".to_string()
            }
            (ConstraintKind::Unique, Some(ConstrainedField::ActiveMembership)) => {
                "Member already has an Active membership.".to_string()
            }
            (ConstraintKind::Unique, None) => format!(
                "Duplicate entry detected ({}).",
                self.constraint.as_deref().unwrap_or("unknown constraint")
            ),
            (ConstraintKind::ForeignKey, _) => format!(
                "Referenced record does not exist ({}).",
                self.constraint.as_deref().unwrap_or("unknown constraint")
            ),
            (ConstraintKind::Check, _) => format!(
                "Value rejected by the database ({}).",
                self.constraint.as_deref().unwrap_or("unknown constraint")
            ),
        }
    }
}

/// Application-level errors for the gym console.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Member below the minimum age
    #[error("Age restriction: member is {age} years old, members must be at least 16")]
    AgeRestriction { age: i32 },

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Business precondition failed
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Uniqueness / referential violation
    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Store failure that did not originate in sqlx
    #[error("Operational failure: {0}")]
    Operational(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Console I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Class of this error in the workflow taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::AgeRestriction { .. } => ErrorKind::Validation,
            AppError::NotFound(_) | AppError::Precondition(_) => ErrorKind::Precondition,
            AppError::Constraint(_) => ErrorKind::ConstraintViolation,
            AppError::Database(_)
            | AppError::Operational(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Io(_) => ErrorKind::OperationalFailure,
        }
    }

    /// Text shown to the operator for this error.
    pub fn operator_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Error: {}", msg),
            AppError::AgeRestriction { age } => format!(
                "Error: This member is under 16 years old ({} years). Members must be at least 16 years old.",
                age
            ),
            AppError::NotFound(msg) | AppError::Precondition(msg) => format!("Error: {}", msg),
            AppError::Constraint(violation) => {
                tracing::warn!(constraint = ?violation.constraint, "Constraint violation");
                format!("Error: {}", violation)
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                format!("Error: Database error occurred. {}", e)
            }
            AppError::Operational(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Operation failed");
                format!("Error: Transaction failed. {}", msg)
            }
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                format!("Error: {}", msg)
            }
            AppError::Io(e) => {
                tracing::error!(error = %e, "Console I/O error");
                format!("Error: {}", e)
            }
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind as DbKind;

        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            let field = ConstrainedField::from_constraint_name(&constraint);
            let kind = match db_err.kind() {
                DbKind::UniqueViolation => Some(ConstraintKind::Unique),
                DbKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                DbKind::CheckViolation => Some(ConstraintKind::Check),
                _ => None,
            };
            if let Some(kind) = kind {
                return AppError::Constraint(ConstraintViolation {
                    kind,
                    field,
                    constraint: Some(constraint).filter(|c| !c.is_empty()),
                });
            }
        }
        AppError::Database(err)
    }
}

impl From<envy::Error> for AppError {
    fn from(err: envy::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<dotenvy::Error> for AppError {
    fn from(err: dotenvy::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = AppError::NotFound("Member with ID 7 does not exist.".to_string());
        assert_eq!(
            err.to_string(),
            "Resource not found: Member with ID 7 does not exist."
        );
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation("Invalid email format.".to_string());
        assert_eq!(err.to_string(), "Validation error: Invalid email format.");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_age_restriction_is_validation() {
        let err = AppError::AgeRestriction { age: 12 };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.operator_message().contains("(12 years)"));
    }

    #[test]
    fn test_constraint_field_from_name() {
        assert_eq!(
            ConstrainedField::from_constraint_name("gym_member_phone_number_key"),
            Some(ConstrainedField::PhoneNumber)
        );
        assert_eq!(
            ConstrainedField::from_constraint_name("staff_member_email_key"),
            Some(ConstrainedField::Email)
        );
        assert_eq!(
            ConstrainedField::from_constraint_name("manager_office_location_key"),
            Some(ConstrainedField::OfficeLocation)
        );
        assert_eq!(
            ConstrainedField::from_constraint_name("membership_one_active_per_member"),
            Some(ConstrainedField::ActiveMembership)
        );
        assert_eq!(ConstrainedField::from_constraint_name("plan_pkey"), None);
    }

    #[test]
    fn test_constraint_messages() {
        let phone = ConstraintViolation::unique(
            Some(ConstrainedField::PhoneNumber),
            "gym_member_phone_number_key",
        );
        assert!(phone.to_string().contains("phone number is already in use"));

        let generic = ConstraintViolation::unique(None, "some_key");
        assert_eq!(generic.to_string(), "Duplicate entry detected (some_key).");

        let err: AppError = phone.into();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[derive(Debug, Error)]
    #[error("stub database error")]
    struct StubDbError {
        kind: sqlx::error::ErrorKind,
        constraint: Option<&'static str>,
    }

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "stub database error"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            use sqlx::error::ErrorKind as K;
            match self.kind {
                K::UniqueViolation => K::UniqueViolation,
                K::ForeignKeyViolation => K::ForeignKeyViolation,
                K::NotNullViolation => K::NotNullViolation,
                K::CheckViolation => K::CheckViolation,
                _ => K::Other,
            }
        }
    }

    fn db_error(kind: sqlx::error::ErrorKind, constraint: Option<&'static str>) -> AppError {
        sqlx::Error::Database(Box::new(StubDbError { kind, constraint })).into()
    }

    #[test]
    fn test_unique_violation_is_attributed_to_field() {
        let err = db_error(
            sqlx::error::ErrorKind::UniqueViolation,
            Some("gym_member_email_key"),
        );
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        match err {
            AppError::Constraint(v) => {
                assert_eq!(v.kind, ConstraintKind::Unique);
                assert_eq!(v.field, Some(ConstrainedField::Email));
                assert_eq!(v.constraint.as_deref(), Some("gym_member_email_key"));
            }
            other => panic!("expected constraint violation, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_and_check_violations() {
        let fk = db_error(
            sqlx::error::ErrorKind::ForeignKeyViolation,
            Some("payment_member_id_fkey"),
        );
        assert!(matches!(
            fk,
            AppError::Constraint(ConstraintViolation {
                kind: ConstraintKind::ForeignKey,
                ..
            })
        ));
        assert!(fk
            .operator_message()
            .contains("Referenced record does not exist (payment_member_id_fkey)"));

        let check = db_error(sqlx::error::ErrorKind::CheckViolation, None);
        match check {
            AppError::Constraint(v) => {
                assert_eq!(v.kind, ConstraintKind::Check);
                assert_eq!(v.constraint, None);
                assert_eq!(
                    v.to_string(),
                    "Value rejected by the database (unknown constraint)."
                );
            }
            other => panic!("expected constraint violation, got {:?}", other),
        }
    }

    #[test]
    fn test_other_database_error_is_operational() {
        let err = db_error(sqlx::error::ErrorKind::Other, None);
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.kind(), ErrorKind::OperationalFailure);
    }

    #[test]
    fn test_non_database_sqlx_error_is_operational() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.kind(), ErrorKind::OperationalFailure);
    }
}
