use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a ConvertKit response body cannot be decoded
pub const PARSE_FAILED_MESSAGE: &str = "Could not parse response from ConvertKit";

/// Failures raised by the remote subscriber API
///
/// Every variant keeps the text the remote service supplied, so that notes written
/// against an entry show the operator exactly what ConvertKit answered.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    /// The decoded response carried an `error` / `message` pair
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// Non-2xx response without an error pair, or a transport failure (status 0)
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// The single attempt did not complete within the client timeout
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The response body was not valid JSON or not of the expected shape
    #[error("{0}")]
    Parse(String),

    /// No API key (or secret, where one is required) was configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

impl ApiError {
    /// Creates an error from a decoded `error` / `message` pair
    pub fn api<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        ApiError::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a new HTTP error
    pub fn http<S: Into<String>>(status: u16, message: S) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates the generic parse failure
    pub fn parse_failed() -> Self {
        ApiError::Parse(PARSE_FAILED_MESSAGE.to_string())
    }

    /// The most specific human readable message available.
    ///
    /// For [`ApiError::Api`] this is the remote `message` verbatim, without the code prefix.
    pub fn remote_message(&self) -> &str {
        match self {
            ApiError::Api { message, .. } => message,
            ApiError::Http { message, .. } => message,
            ApiError::Timeout(message) => message,
            ApiError::Parse(message) => message,
            ApiError::MissingCredentials(message) => message,
        }
    }

    /// True when the remote service rejected the credentials
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Http { status, .. } => *status == 401 || *status == 403,
            ApiError::Api { code, .. } => code.eq_ignore_ascii_case("Authorization Failed"),
            ApiError::MissingCredentials(_) => true,
            _ => false,
        }
    }
}

/// Local, pre-flight failures. These never trigger a remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("No email address was specified, so the entry could not be sent to ConvertKit")]
    MissingEmail,

    #[error("The email address '{0}' is invalid, so the entry could not be sent to ConvertKit")]
    InvalidEmail(String),
}

/// Custom field metadata could not be fetched
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Custom fields could not be fetched from ConvertKit: {0}")]
pub struct MapperError(#[source] pub ApiError);

/// The remote tag list could not be fetched
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Tags could not be fetched from ConvertKit: {0}")]
pub struct TagLookupError(#[source] pub ApiError);

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum FeedError {
    /// Entry failed pre-flight validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote API failure
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Invalid settings or feed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// I/O errors (file reading, etc.)
    #[error("IO error: {0}")]
    Io(String),
}

impl FeedError {
    /// Convert from std::io::Error
    pub fn from_io(err: std::io::Error) -> Self {
        FeedError::Io(err.to_string())
    }

    /// Convert from serde_json::Error
    pub fn from_serde(err: serde_json::Error) -> Self {
        FeedError::Deserialization(err.to_string())
    }
}

/// Type alias for Result with FeedError
pub type Result<T> = std::result::Result<T, FeedError>;

/// Type alias for Result at the remote API boundary
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A non-fatal problem recorded while processing a feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Warning code (e.g., "CUSTOM_FIELDS_UNAVAILABLE", "TAG_NOT_APPLIED")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Tag the warning relates to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<u64>,

    /// Timestamp when the warning was recorded
    pub timestamp: String,
}

impl Warning {
    pub const CUSTOM_FIELDS_UNAVAILABLE: &'static str = "CUSTOM_FIELDS_UNAVAILABLE";
    pub const TAGS_UNAVAILABLE: &'static str = "TAGS_UNAVAILABLE";
    pub const TAG_NOT_APPLIED: &'static str = "TAG_NOT_APPLIED";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            tag_id: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Warning for custom field metadata that could not be fetched
    pub fn from_mapper(err: &MapperError) -> Self {
        Self::new(Self::CUSTOM_FIELDS_UNAVAILABLE, err.to_string())
    }

    /// Warning for a tag list that could not be fetched
    pub fn from_tag_lookup(err: &TagLookupError) -> Self {
        Self::new(Self::TAGS_UNAVAILABLE, err.to_string())
    }

    /// Warning for a single tag application that failed
    pub fn tag_not_applied(tag_id: u64, err: &ApiError) -> Self {
        let mut warning = Self::new(
            Self::TAG_NOT_APPLIED,
            format!("Tag {tag_id} could not be applied: {}", err.remote_message()),
        );
        warning.tag_id = Some(tag_id);
        warning
    }
}
