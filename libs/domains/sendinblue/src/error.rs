//! Error types for the Sendinblue adapter.

use crate::models::ErrorModel;
use std::fmt;
use thiserror::Error;

/// Result type for Sendinblue operations.
pub type SendinblueResult<T> = Result<T, SendinblueError>;

/// Error code returned when a contact with the same email already exists.
pub const DUPLICATE_PARAMETER: &str = "duplicate_parameter";

/// Error code returned when the requested document does not exist.
pub const DOCUMENT_NOT_FOUND: &str = "document_not_found";

/// Errors that can occur while talking to Sendinblue.
#[derive(Debug, Error)]
pub enum SendinblueError {
    /// Missing credential at initialisation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A locally set value was rejected.
    #[error("\"{field}\" {reason}")]
    InvalidConfig { field: String, reason: String },

    /// The API answered with a non-success status.
    #[error("Sendinblue API error: {0}")]
    Api(ApiError),

    /// The request never produced an API answer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The message cannot be sent as built.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// View rendering error.
    #[error("Template rendering error: {0}")]
    TemplateError(String),

    /// Reading an attachment from disk failed.
    #[error("IO error: {0}")]
    Io(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SendinblueError {
    /// Machine-readable API error code, when the error came from the API.
    pub fn code(&self) -> Option<&str> {
        match self {
            SendinblueError::Api(error) => error.code(),
            _ => None,
        }
    }
}

/// Decoded failure payload of an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: u16,
    /// Decoded `{code, message}` body, if the body was JSON.
    pub model: Option<ErrorModel>,
    /// Raw response body.
    pub body: String,
}

impl ApiError {
    /// Decode an error response body.
    pub fn from_response(status: u16, body: String) -> Self {
        let model = serde_json::from_str::<ErrorModel>(&body).ok();
        Self {
            status,
            model,
            body,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.code.as_str())
    }

    pub fn message(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.message.as_str())
    }

    pub fn is_duplicate(&self) -> bool {
        self.code() == Some(DUPLICATE_PARAMETER)
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(DOCUMENT_NOT_FOUND)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "({}) {}: {}", self.status, model.code, model.message),
            None => write!(f, "({}) {}", self.status, self.body),
        }
    }
}

impl From<ApiError> for SendinblueError {
    fn from(err: ApiError) -> Self {
        SendinblueError::Api(err)
    }
}

impl From<reqwest::Error> for SendinblueError {
    fn from(err: reqwest::Error) -> Self {
        SendinblueError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SendinblueError {
    fn from(err: serde_json::Error) -> Self {
        SendinblueError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for SendinblueError {
    fn from(err: std::io::Error) -> Self {
        SendinblueError::Io(err.to_string())
    }
}

impl From<handlebars::RenderError> for SendinblueError {
    fn from(err: handlebars::RenderError) -> Self {
        SendinblueError::TemplateError(err.to_string())
    }
}

impl From<core_config::ConfigError> for SendinblueError {
    fn from(err: core_config::ConfigError) -> Self {
        SendinblueError::Config(err.to_string())
    }
}
