use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuditError {
    /// Short, stable name of the error kind, used in trail entries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::NotFound(_) => "NotFound",
            AuditError::InvalidTransition(_) => "InvalidTransition",
            AuditError::ValidationError(_) => "ValidationError",
            AuditError::ConflictError(_) => "ConflictError",
            AuditError::DatabaseError(_) => "DatabaseError",
            AuditError::InternalError(_) => "InternalError",
        }
    }
}

impl From<validator::ValidationErrors> for AuditError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuditError::ValidationError(errors.to_string())
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
