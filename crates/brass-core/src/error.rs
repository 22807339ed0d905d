//! Unified error types for the Brass host contract.
//!
//! Adapters fail their startup with [`AdapterError`], bot queries and actions
//! fail with [`ApiError`], and the key-value [`Database`](crate::Database)
//! reports [`StoreError`].

use thiserror::Error;

// =============================================================================
// Store Errors
// =============================================================================

/// Errors that can occur in database operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The table was never declared with [`Database::extend`](crate::Database::extend).
    #[error("table '{0}' is not declared")]
    UnknownTable(String),

    /// A record with the same primary key already exists.
    #[error("record {key} already exists in table '{table}'")]
    Duplicate {
        /// The table name.
        table: String,
        /// The conflicting primary key.
        key: i64,
    },

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backing file holds data that cannot be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Adapter Errors
// =============================================================================

/// Errors that can occur while an adapter starts or shuts down.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The signing service could not be reached or answered garbage.
    #[error("signing service error: {0}")]
    Sign(String),

    /// Interactive or resumed login failed.
    #[error("login failed: {0}")]
    Login(String),

    /// A persisted credential blob could not be decoded.
    #[error("malformed credential in '{table}' for {uin}: {reason}")]
    Credential {
        /// The table holding the blob.
        table: String,
        /// The account the blob belongs to.
        uin: i64,
        /// Decoder message.
        reason: String,
    },

    /// Database error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bot with this ID is already registered.
    #[error("bot with ID '{id}' already exists")]
    BotExists {
        /// The duplicate bot ID.
        id: String,
    },

    /// Internal adapter error.
    #[error("adapter error: {0}")]
    Internal(String),
}

impl AdapterError {
    /// Creates an internal adapter error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Creates a login error.
    pub fn login(msg: impl Into<String>) -> Self {
        Self::Login(msg.into())
    }

    /// Creates a signing service error.
    pub fn sign(msg: impl Into<String>) -> Self {
        Self::Sign(msg.into())
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by [`Bot`](crate::Bot) queries and actions.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bot has no live client (not started, or already disposed).
    #[error("bot is not ready")]
    NotReady,

    /// An identifier could not be parsed into the protocol's numeric form.
    #[error("invalid {kind} id: '{value}'")]
    InvalidId {
        /// What the identifier names (guild, channel, user).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The underlying protocol client failed; passed through untouched.
    #[error(transparent)]
    Client(Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Creates an invalid identifier error.
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for database operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for bot API calls.
pub type ApiResult<T> = Result<T, ApiError>;
