//! Error types for SLD encoding and parsing.

use thiserror::Error;

/// Result type alias using SldError.
pub type SldResult<T> = Result<T, SldError>;

/// Primary error type for style encoding operations.
#[derive(Debug, Error)]
pub enum SldError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Failed to parse style request: {0}")]
    ParseError(String),

    // === Encoding Errors ===
    #[error("Schema violation in {type_name}: {message}")]
    SchemaViolation {
        type_name: &'static str,
        message: String,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid SLD document: {0}")]
    InvalidDocument(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SldError {
    /// Shorthand for a schema violation raised while marshalling a node.
    pub fn schema(type_name: &'static str, message: impl Into<String>) -> Self {
        SldError::SchemaViolation {
            type_name,
            message: message.into(),
        }
    }

    /// Get the OGC exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            SldError::MissingParameter(_) => "MissingParameterValue",
            SldError::InvalidParameter { .. } | SldError::ParseError(_) => "InvalidParameterValue",
            SldError::SchemaViolation { .. } | SldError::InvalidDocument(_) | SldError::Xml(_) => {
                "InvalidStyle"
            }
            _ => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            SldError::MissingParameter(_)
            | SldError::InvalidParameter { .. }
            | SldError::ParseError(_)
            | SldError::InvalidDocument(_)
            | SldError::Xml(_) => 400,

            SldError::SchemaViolation { .. } => 422,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for SldError {
    fn from(err: std::io::Error) -> Self {
        SldError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SldError {
    fn from(err: serde_json::Error) -> Self {
        SldError::ParseError(format!("JSON error: {}", err))
    }
}
