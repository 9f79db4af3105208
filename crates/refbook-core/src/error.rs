//! Error types for refbook operations.
//!
//! Not-found outcomes are ordinary, expected results of a lookup and get their
//! own variants so callers can match on them instead of parsing messages.

use thiserror::Error;

/// Result type alias for refbook operations.
pub type RefbookResult<T> = Result<T, RefbookError>;

/// Main error type for all refbook operations.
#[derive(Error, Debug)]
pub enum RefbookError {
    /// The requested directory does not exist.
    #[error("Справочник не найден")]
    DirectoryNotFound { directory_id: i64 },

    /// No version could be resolved for the directory.
    ///
    /// `label` is set when an explicit version label was requested.
    #[error("{}", version_not_found_message(.label))]
    VersionNotFound {
        directory_id: i64,
        label: Option<String>,
    },

    /// No element with the given code and value exists in the resolved version.
    #[error("Элемент не найден в указанной версии")]
    ElementNotFound { code: String, value: String },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A uniqueness or foreign key constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Network error (client side).
    #[error("Network error: {message}")]
    Network { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn version_not_found_message(label: &Option<String>) -> &'static str {
    match label {
        Some(_) => "Версия не найдена для указанного справочника",
        None => "Не найдено версий для указанного справочника",
    }
}

/// Error codes for programmatic handling.
///
/// The string form travels in HTTP error bodies, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    DirectoryNotFound,
    VersionNotFound,
    ElementNotFound,
    ValidationFailed,
    Conflict,
    DbOperationFailed,
    Configuration,
    ParseFailed,
    Network,
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DirectoryNotFound => "DIRECTORY_NOT_FOUND",
            ErrorCode::VersionNotFound => "VERSION_NOT_FOUND",
            ErrorCode::ElementNotFound => "ELEMENT_NOT_FOUND",
            ErrorCode::ValidationFailed => "VALIDATION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DbOperationFailed => "DATABASE_ERROR",
            ErrorCode::Configuration => "CONFIGURATION_ERROR",
            ErrorCode::ParseFailed => "PARSE_ERROR",
            ErrorCode::Network => "NETWORK_ERROR",
            ErrorCode::Internal => "INTERNAL_ERROR",
        }
    }

    /// Parse a code previously produced by [`ErrorCode::as_str`].
    pub fn parse(code: &str) -> Option<Self> {
        let code = match code {
            "DIRECTORY_NOT_FOUND" => ErrorCode::DirectoryNotFound,
            "VERSION_NOT_FOUND" => ErrorCode::VersionNotFound,
            "ELEMENT_NOT_FOUND" => ErrorCode::ElementNotFound,
            "VALIDATION_ERROR" => ErrorCode::ValidationFailed,
            "CONFLICT" => ErrorCode::Conflict,
            "DATABASE_ERROR" => ErrorCode::DbOperationFailed,
            "CONFIGURATION_ERROR" => ErrorCode::Configuration,
            "PARSE_ERROR" => ErrorCode::ParseFailed,
            "NETWORK_ERROR" => ErrorCode::Network,
            "INTERNAL_ERROR" => ErrorCode::Internal,
            _ => return None,
        };
        Some(code)
    }
}

impl RefbookError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Whether this error is one of the expected "record not found" outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. }
                | Self::VersionNotFound { .. }
                | Self::ElementNotFound { .. }
        )
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DirectoryNotFound { .. } => ErrorCode::DirectoryNotFound,
            Self::VersionNotFound { .. } => ErrorCode::VersionNotFound,
            Self::ElementNotFound { .. } => ErrorCode::ElementNotFound,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Database { .. } => ErrorCode::DbOperationFailed,
            Self::Configuration(_) => ErrorCode::Configuration,
            Self::Parse { .. } => ErrorCode::ParseFailed,
            Self::Network { .. } => ErrorCode::Network,
            Self::Io(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Rebuild an error from an HTTP error response (for clients).
    ///
    /// The identifying fields of not-found variants are not part of the wire
    /// format, so the caller passes what it asked for.
    pub fn from_http_status(status: u16, code: Option<&str>, message: &str) -> Self {
        match code.and_then(ErrorCode::parse) {
            Some(ErrorCode::ValidationFailed) => Self::validation(message),
            Some(ErrorCode::Conflict) => Self::Conflict {
                message: message.to_string(),
                source: None,
            },
            Some(ErrorCode::DbOperationFailed) => Self::database(message),
            Some(ErrorCode::Configuration) => Self::Configuration(message.to_string()),
            _ => match status {
                400 | 422 => Self::validation(message),
                _ => Self::Internal(format!("HTTP {}: {}", status, message)),
            },
        }
    }
}

impl From<rusqlite::Error> for RefbookError {
    fn from(err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return Self::Conflict {
                message: err.to_string(),
                source: Some(err),
            };
        }
        Self::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
