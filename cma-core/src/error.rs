//! Error types for the client core.

use serde_json::Value;
use thiserror::Error;

/// Result type for client operations.
pub type CmaResult<T> = Result<T, CmaError>;

/// A non-success HTTP response, mapped by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub status_text: String,
    /// Error name from the response body's `sys.id` (e.g. `NotFound`,
    /// `VersionMismatch`). Falls back to the status text.
    pub name: String,
    /// Human-readable message from the response body.
    pub message: String,
    /// Value of the `x-contentful-request-id` response header.
    pub request_id: Option<String>,
    /// Raw `details` object from the response body.
    pub details: Option<Value>,
    /// Request method, upper-case.
    pub method: String,
    /// Request URL. Absolute when mapped from a response; the relative
    /// endpoint path (e.g. `organizations`) when the error is raised locally
    /// after a successful request, as `Organization.get` does for an ID
    /// missing from the listing.
    pub url: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.name, self.message)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (request id {request_id})")?;
        }
        Ok(())
    }
}

/// Errors produced by the client core and its transports.
#[derive(Debug, Error)]
pub enum CmaError {
    /// No handler is registered for the entity type / action pair.
    #[error("Unknown endpoint")]
    UnknownEndpoint { entity_type: String, action: String },

    /// A locally checkable precondition failed before any request was sent.
    #[error("Invalid \"{name}\" provided, {reason}")]
    Validation { name: String, reason: String },

    /// A locale's processed file never appeared within the retry budget.
    #[error("Asset is taking longer then expected to process.")]
    AssetProcessingTimeout,

    /// The remote system answered with a non-success status.
    #[error("http error: {0}")]
    Http(HttpError),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CmaError {
    /// Builds a validation error for `name`.
    pub fn validation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for unregistered entity/action pairs. Always a caller defect.
    pub fn is_routing_error(&self) -> bool {
        matches!(self, Self::UnknownEndpoint { .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_processing_timeout(&self) -> bool {
        matches!(self, Self::AssetProcessingTimeout)
    }

    /// HTTP status of a mapped response error, if this is one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }
}
