use std::fmt::Display;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Bad value for parameter '{parameter}': {message}")]
    InvalidInput { parameter: String, message: String },

    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{op}: {message}")]
    Internal { op: String, message: String },

    #[error("database transaction timeout (after {0:?})")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by the HTTP layer and by callers deciding
/// whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unauthorized,
    Forbidden,
    Internal,
    Timeout,
}

impl Error {
    pub fn bad_parameter(parameter: &str, value: impl Display) -> Self {
        Self::InvalidInput {
            parameter: parameter.to_string(),
            message: format!("'{value}'"),
        }
    }

    pub fn invalid_input(parameter: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl Display) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn internal(op: &str, err: impl Display) -> Self {
        Self::Internal {
            op: op.to_string(),
            message: err.to_string(),
        }
    }

    /// Prefixes the operation of an internal error with `ctx`. Other kinds are
    /// returned unchanged so callers can still match on them.
    pub fn context(self, ctx: &str) -> Self {
        match self {
            Self::Internal { op, message } => Self::Internal {
                op: format!("{ctx}: {op}"),
                message,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Timeout(_) => ErrorKind::Timeout,
        }
    }
}
