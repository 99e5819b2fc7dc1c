//! Error types for Xplenty API operations.

use thiserror::Error;

/// Errors that can occur during Xplenty API operations.
///
/// Field values that cannot be coerced to their declared kind are not
/// errors; they become "no value" on the resulting model.
#[derive(Debug, Error)]
pub enum XplentyError {
    /// Configuration is missing or incomplete.
    #[error("Xplenty configuration required: {0}")]
    ConfigMissing(String),

    /// The API answered with a non-success status.
    #[error("Xplenty API error ({status_code}): {message}")]
    Api {
        status_code: u16,
        message: String,
        /// Raw response body, kept for inspection.
        body: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The decoded payload does not have the shape a model needs.
    #[error("Cannot build {model} from payload: expected {expected}")]
    UnexpectedPayload {
        model: &'static str,
        expected: &'static str,
    },

    /// A resource method needs the client that fetched it, but the
    /// resource was built without one.
    #[error("{model} is not attached to a client")]
    Detached { model: &'static str },

    /// A resource method needs the resource's id, but it has none.
    #[error("{model} has no id")]
    MissingId { model: &'static str },
}

impl XplentyError {
    /// The HTTP status code, if this error came from an API response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result type alias for Xplenty operations.
pub type Result<T> = core::result::Result<T, XplentyError>;
