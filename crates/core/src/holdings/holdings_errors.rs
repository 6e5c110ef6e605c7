//! Import-specific error taxonomy.

use thiserror::Error;

use crate::errors::Error;

/// Terminal failure of a bulk import run.
///
/// The thin API layer maps these onto HTTP statuses via [`status_code`];
/// the mapping is part of this subsystem's contract even though the HTTP
/// layer itself lives elsewhere.
///
/// [`status_code`]: ImportError::status_code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database operation failed: {0}")]
    Database(String),

    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl ImportError {
    /// Wire identifier for the error class.
    pub fn error_type(&self) -> &'static str {
        match self {
            ImportError::Validation(_) => "validation",
            ImportError::Database(_) => "database",
            ImportError::Unauthorized(_) => "unauthorized",
            ImportError::Unknown(_) => "unknown",
        }
    }

    /// HTTP status the API layer responds with for this error.
    ///
    /// Caller-caused failures map to 400, store/internal failures to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            ImportError::Validation(_) | ImportError::Unauthorized(_) => 400,
            ImportError::Database(_) | ImportError::Unknown(_) => 500,
        }
    }
}

impl From<Error> for ImportError {
    fn from(err: Error) -> Self {
        match err {
            Error::Database(db) => ImportError::Database(db.to_string()),
            Error::Validation(validation) => ImportError::Validation(validation.to_string()),
            Error::Repository(message) => ImportError::Database(message),
            Error::Unexpected(message) => ImportError::Unknown(message),
        }
    }
}
