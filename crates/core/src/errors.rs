//! Error types for the identity export library.
//!
//! Each stage of the export has its own error type derived with `thiserror`,
//! and a top-level [`ExportError`] enum unifies them for callers that want a
//! single error type.

use thiserror::Error;

/// Code reported when none of the known identity tables exist.
pub const NO_IDENTITIES_TABLE_CODE: &str = "-1";

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for a whole export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Database errors
// ---------------------------------------------------------------------------

/// Errors from connecting to, reflecting or querying the source database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A failure reported by the database driver or server.
    #[error("{message}{}", code_suffix(.code))]
    Driver {
        code: Option<String>,
        message: String,
    },

    /// None of `people`, `users` or `irclog` exist in the database.
    #[error("no identities table found; expected one of: people, users, irclog (code -1)")]
    NoIdentitiesTable,

    /// The connection parameters could not be assembled into a URL.
    #[error("invalid connection parameters: {0}")]
    Url(String),
}

impl DatabaseError {
    /// Driver-level error code, or [`NO_IDENTITIES_TABLE_CODE`] for a
    /// database without a recognizable identities table.
    pub fn code(&self) -> Option<&str> {
        match self {
            DatabaseError::Driver { code, .. } => code.as_deref(),
            DatabaseError::NoIdentitiesTable => Some(NO_IDENTITIES_TABLE_CODE),
            DatabaseError::Url(_) => None,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" (code {code})"),
        None => String::new(),
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());
        DatabaseError::Driver {
            code,
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors while rendering or writing the identities document.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The document could not be encoded as JSON.
    #[error("failed to encode identities document: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing to the destination failed.
    #[error("failed to write identities document: {0}")]
    Io(#[from] std::io::Error),

    /// The finished temporary file could not be moved over the destination.
    #[error("failed to persist identities document to '{path}': {detail}")]
    Persist { path: String, detail: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
