//! Error types for tessella-board
//!
//! Covers mutation rejection (validation, cooldown, credentials), the reset
//! guard, and storage failures.

use thiserror::Error;

/// Board error type
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates outside the board
    #[error("coordinates out of bounds: ({x}, {y})")]
    OutOfBounds {
        /// Requested x coordinate
        x: i64,
        /// Requested y coordinate
        y: i64,
    },

    /// Color channel outside [0, 255]
    #[error("invalid color: ({r}, {g}, {b})")]
    InvalidColor {
        /// Requested red channel
        r: i64,
        /// Requested green channel
        g: i64,
        /// Requested blue channel
        b: i64,
    },

    /// Request carried no device credential
    #[error("missing device credential")]
    MissingCredential,

    /// Presented token has no ledger entry
    #[error("unknown device")]
    UnknownDevice,

    /// Device is still inside its cooldown window
    #[error("too soon: retry in {remaining_ms} ms")]
    TooSoon {
        /// Milliseconds until the next write is allowed
        remaining_ms: i64,
    },

    /// Reset secret did not match the configured digest
    #[error("wrong guess")]
    WrongSecret,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Persisted board is missing records (partial write detected at boot)
    #[error("incomplete board store: expected {expected} records, found {found}")]
    IncompleteStore {
        /// Records the board dimensions require
        expected: u64,
        /// Records actually present
        found: u64,
    },
}

impl Error {
    /// Stable snake_case tag for logs and protocol messages
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::InvalidColor { .. } => "invalid_color",
            Self::MissingCredential => "missing_credential",
            Self::UnknownDevice => "unknown_device",
            Self::TooSoon { .. } => "too_soon",
            Self::WrongSecret => "wrong_secret",
            Self::Database(_) => "database_error",
            Self::IncompleteStore { .. } => "incomplete_store",
        }
    }

    /// True for errors caused by the request itself rather than the server
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::IncompleteStore { .. })
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, Error>;
