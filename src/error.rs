//! Error types for Visure API operations.

use thiserror::Error;

/// Errors that can occur during Visure API operations.
#[derive(Debug, Error)]
pub enum VisureError {
    /// Configuration is missing or incomplete.
    #[error("Visure configuration required: {0}")]
    ConfigMissing(String),

    /// The login response did not carry an access token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The session has been logged out.
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// API request failed.
    #[error("Visure API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// A field required for the operation is absent from the server data.
    #[error("{entity} is missing required field '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Enumeration lookup before the project's attribute types were fetched.
    #[error("Attribute types not loaded; fetch the project's attribute types first")]
    AttributeTypesNotLoaded,

    /// The server offers no relationship type between two elements.
    #[error("No available relationship types between {source_id} and {target_id}")]
    NoRelationshipTypes { source_id: i64, target_id: i64 },

    /// A requested enumerated value is not a legal option.
    #[error("'{value}' is not a valid option (valid options: {})", .valid.join(", "))]
    InvalidEnumValue { value: String, valid: Vec<String> },

    /// Unrecognized argument.
    #[error("invalid argument")]
    InvalidArgument,

    /// A value does not fit the fixed-width in-line link format.
    #[error("{field} {value} does not fit in 6 digits")]
    LinkFieldOverflow { field: &'static str, value: i64 },

    /// The project an attribute belongs to has been dropped.
    #[error("The owning project is no longer available")]
    ProjectUnavailable,
}

/// Result type alias for Visure operations.
pub type Result<T> = core::result::Result<T, VisureError>;
