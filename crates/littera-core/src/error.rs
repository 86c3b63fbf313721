use thiserror::Error;

/// Top-level error type shared by every crate in the workspace.
///
/// Each variant corresponds to one of the six stable error kinds surfaced by
/// the Command Surface as a distinct exit code; front-end resource mappings
/// must not introduce new kinds on top of these.
#[derive(Debug, Error)]
pub enum LitteraError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LitteraError {
    /// Stable, lowercase kind name used in structured CLI/HTTP output.
    pub fn kind(&self) -> &'static str {
        match self {
            LitteraError::NotFound(_) => "not_found",
            LitteraError::Conflict(_) => "conflict",
            LitteraError::InvariantViolation(_) => "invariant_violation",
            LitteraError::InvalidInput(_) => "invalid_input",
            LitteraError::BackendUnavailable(_) => "backend_unavailable",
            LitteraError::Internal(_) => "internal",
        }
    }

    /// Process exit code for this error kind, documented in `--help`.
    pub fn exit_code(&self) -> i32 {
        match self {
            LitteraError::NotFound(_) => 1,
            LitteraError::Conflict(_) => 2,
            LitteraError::InvariantViolation(_) => 3,
            LitteraError::InvalidInput(_) => 4,
            LitteraError::BackendUnavailable(_) => 5,
            LitteraError::Internal(_) => 6,
        }
    }
}

/// Maps a raw Postgres error onto the taxonomy using its SQLSTATE code where
/// one is available. Unique-violation becomes `Conflict`; anything that
/// smells like a connectivity problem becomes `BackendUnavailable`.
impl From<tokio_postgres::Error> for LitteraError {
    fn from(e: tokio_postgres::Error) -> Self {
        if let Some(code) = e.code() {
            if *code == tokio_postgres::error::SqlState::UNIQUE_VIOLATION {
                return LitteraError::Conflict(e.to_string());
            }
            if *code == tokio_postgres::error::SqlState::FOREIGN_KEY_VIOLATION {
                return LitteraError::InvariantViolation(e.to_string());
            }
        }
        if e.is_closed() {
            return LitteraError::BackendUnavailable(e.to_string());
        }
        LitteraError::Internal(e.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for LitteraError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        LitteraError::BackendUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for LitteraError {
    fn from(e: serde_json::Error) -> Self {
        LitteraError::Internal(e.to_string())
    }
}

impl From<std::io::Error> for LitteraError {
    fn from(e: std::io::Error) -> Self {
        LitteraError::Internal(e.to_string())
    }
}

impl From<uuid::Error> for LitteraError {
    fn from(e: uuid::Error) -> Self {
        LitteraError::InvalidInput(format!("malformed id: {e}"))
    }
}

/// Convenience Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, LitteraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(LitteraError::NotFound("x".into()).exit_code(), 1);
        assert_eq!(LitteraError::Conflict("x".into()).exit_code(), 2);
        assert_eq!(LitteraError::InvariantViolation("x".into()).exit_code(), 3);
        assert_eq!(LitteraError::InvalidInput("x".into()).exit_code(), 4);
        assert_eq!(LitteraError::BackendUnavailable("x".into()).exit_code(), 5);
        assert_eq!(LitteraError::Internal("x".into()).exit_code(), 6);
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(LitteraError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(
            LitteraError::InvariantViolation("x".into()).kind(),
            "invariant_violation"
        );
    }
}
