use thiserror::Error;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Failure kinds surfaced by the access objects. The API layer maps each
/// kind to its own status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(what: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{what} not found: {id}"))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Validation(_) => "validation",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Internal(_) => "internal",
        }
    }
}

/// Returns true when the error chain bottoms out in a SQLite constraint
/// violation (unique index, check, or foreign key).
pub(crate) fn is_constraint_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        )
    })
}
