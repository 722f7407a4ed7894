//! Application-wide error types.

use thiserror::Error;

/// Input data was malformed (`EX_DATAERR`).
pub const EXIT_DATAERR: u8 = 65;
/// Referenced input does not exist (`EX_NOINPUT`).
pub const EXIT_NOINPUT: u8 = 66;
/// Internal software error (`EX_SOFTWARE`).
pub const EXIT_SOFTWARE: u8 = 70;
/// Configuration error (`EX_CONFIG`).
pub const EXIT_CONFIG: u8 = 78;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Process exit status for this error, following `sysexits.h`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => EXIT_DATAERR,
            Self::NotFound(_) => EXIT_NOINPUT,
            Self::Config(_) => EXIT_CONFIG,
            Self::Internal(_) => EXIT_SOFTWARE,
        }
    }

    /// Returns the machine-readable error code logged on failure.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
