//! Error taxonomy for the client registry.
//!
//! Driver errors are classified on conversion so callers can match on the
//! failure kind instead of inspecting SQLSTATE codes.

use thiserror::Error;

/// SQLSTATE for a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for a foreign key violation
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE for a missing database
const INVALID_CATALOG_NAME: &str = "3D000";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot reach database")]
    Connectivity(#[source] sqlx::Error),

    #[error("duplicate key: {key} already exists")]
    DuplicateKey { key: String },

    #[error("referential conflict: {detail}")]
    ReferentialConflict { detail: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("database error")]
    Database(#[source] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Coarse classification of a SQLSTATE code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SqlState {
    UniqueViolation,
    ForeignKeyViolation,
    Connection,
    Other,
}

impl SqlState {
    pub(crate) fn classify(code: &str) -> Self {
        match code {
            UNIQUE_VIOLATION => SqlState::UniqueViolation,
            FOREIGN_KEY_VIOLATION => SqlState::ForeignKeyViolation,
            INVALID_CATALOG_NAME => SqlState::Connection,
            // class 08: connection exception, class 28: invalid authorization
            c if c.starts_with("08") || c.starts_with("28") => SqlState::Connection,
            _ => SqlState::Other,
        }
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => RegistryError::Connectivity(err),
            sqlx::Error::Database(db_err) => {
                let state = db_err
                    .code()
                    .map(|code| SqlState::classify(&code))
                    .unwrap_or(SqlState::Other);

                match state {
                    SqlState::UniqueViolation => RegistryError::DuplicateKey {
                        key: db_err.constraint().unwrap_or("unique key").to_owned(),
                    },
                    SqlState::ForeignKeyViolation => RegistryError::ReferentialConflict {
                        detail: db_err.message().to_owned(),
                    },
                    SqlState::Connection => RegistryError::Connectivity(err),
                    SqlState::Other => RegistryError::Database(err),
                }
            }
            _ => RegistryError::Database(err),
        }
    }
}

impl RegistryError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        RegistryError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Rewrite a unique violation so it names the offending email
    pub(crate) fn on_duplicate_email(self, email: &str) -> Self {
        match self {
            RegistryError::DuplicateKey { .. } => RegistryError::DuplicateKey {
                key: format!("client with email '{email}'"),
            },
            other => other,
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, RegistryError::DuplicateKey { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }

    /// Process exit code for this failure kind
    pub fn exit_code(&self) -> u8 {
        match self {
            RegistryError::Database(_) => 1,
            RegistryError::Validation { .. } => 2,
            RegistryError::Config(_) | RegistryError::Connectivity(_) => 3,
            RegistryError::DuplicateKey { .. } => 4,
            RegistryError::NotFound(_) => 5,
            RegistryError::ReferentialConflict { .. } => 6,
        }
    }
}
