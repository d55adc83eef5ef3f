use thiserror::Error;

use crate::models::ContentType;

/// Application-wide error types.
///
/// Every failure is caught at the boundary of the action that triggered it
/// and turned into something the user can see. Nothing here is fatal.
///
/// # Error Conversion
///
/// Most errors convert automatically from their source types:
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
/// - `ValidationError` → `AppError::Validation`
///
/// # Examples
///
/// ```
/// use styragon_core::error::{AppError, ErrorKind};
/// use styragon_core::models::ContentType;
///
/// let err = AppError::DuplicateSlug {
///     content_type: ContentType::Post,
///     slug: "hello-world".to_string(),
/// };
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// Wraps every error coming from the hosted Postgres store: connection
    /// failures, query errors and constraint violations.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// HTTP call to a hosted service (storage or auth) failed.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid URL for a hosted service.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Another record of the same type already uses this slug.
    #[error("Slug '{slug}' is already used by another {content_type}")]
    DuplicateSlug {
        content_type: ContentType,
        slug: String,
    },

    /// Form or payload validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Object storage rejected or failed the upload.
    #[error("Upload failed: {0}")]
    UploadError(String),

    /// Requested record does not exist or is not published.
    #[error("{content_type} not found: {key}")]
    NotFound {
        content_type: ContentType,
        key: String,
    },

    /// A mutation was attempted without an active admin session.
    #[error("Not signed in")]
    Unauthorized,

    /// Auth service rejected the credentials or the session.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Network or connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

/// Field-level validation failures. These never reach the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown form field '{0}'")]
    UnknownField(String),

    #[error("unknown icon '{0}'")]
    UnknownIcon(String),

    #[error("cannot order {content_type} by '{field}'")]
    UnsupportedOrdering {
        content_type: ContentType,
        field: String,
    },

    #[error("{content_type} has no {flag} flag")]
    UnsupportedFlag {
        content_type: ContentType,
        flag: &'static str,
    },
}

/// Coarse error classes. Each class has one recovery strategy in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Abort the operation, keep the form, show the message inline.
    Validation,
    /// Abort the enclosing create/update; the user may retry.
    Upload,
    /// Generic failure notice; lists fall back to empty or stale results.
    Store,
    /// Dedicated "not found" page.
    NotFound,
    /// Send the user to the sign-in screen.
    Auth,
}

impl AppError {
    /// Classifies the error for the caller's recovery path.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::DuplicateSlug { .. } | AppError::Validation(_) => ErrorKind::Validation,
            AppError::UploadError(_) => ErrorKind::Upload,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Unauthorized | AppError::AuthError(_) => ErrorKind::Auth,
            _ => ErrorKind::Store,
        }
    }

    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => {
                if e.to_string().contains("connection") {
                    "Cannot connect to the content database.\n   Check DATABASE_URL and your network."
                        .to_string()
                } else {
                    "Something went wrong while talking to the content database. Please try again."
                        .to_string()
                }
            }
            AppError::DuplicateSlug { slug, .. } => {
                format!("The slug '{}' is already taken.\n   Pick a different slug or title.", slug)
            }
            AppError::Validation(e) => format!("Please fix the form: {}", e),
            AppError::UploadError(msg) => {
                format!("Failed to upload image: {}\n   Nothing was saved. Try again.", msg)
            }
            AppError::NotFound { content_type, .. } => {
                format!("The {} you're looking for doesn't exist.", content_type)
            }
            AppError::Unauthorized => "You must sign in to the admin panel first.".to_string(),
            AppError::AuthError(msg) => format!("Sign-in failed: {}", msg),
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!("Request timed out after {} seconds.\n   Try again later.", secs)
            }
            _ => self.to_string(),
        }
    }
}
