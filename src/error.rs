use reqwest::StatusCode;
use std::fmt;
use url::Url;

use crate::transport::HttpResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was missing or blank. Raised before any request.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    /// The call cannot be made in its current shape.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The API rejected the request, or the request URI could not be built.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A successful response whose body did not match the expected shape.
    #[error("failed to parse API JSON (url={uri})")]
    Parse {
        uri: Url,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error payload the API returns alongside non-success statuses:
/// `{"exception": ..., "exceptionId": ..., "requestId": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) exception: String,
    #[serde(default, rename = "exceptionId")]
    pub(crate) exception_id: Option<String>,
    #[serde(default, rename = "requestId")]
    pub(crate) request_id: Option<String>,
}

impl ErrorEnvelope {
    pub(crate) const GENERIC_MESSAGE: &'static str = "Error executing request";

    pub(crate) fn with_message(message: &str) -> Self {
        Self {
            exception: message.to_string(),
            exception_id: None,
            request_id: None,
        }
    }

    /// Reads the envelope from a response body, falling back to a generic
    /// message when the body has some other shape (or none at all).
    pub(crate) fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self::with_message(Self::GENERIC_MESSAGE))
    }
}

/// An error reported by the DATA API.
///
/// Displays as the server's message. The exception id categorizes the error
/// and the request id identifies the failed request in the server's logs.
#[derive(Debug, Clone)]
pub struct ApiError {
    message: String,
    exception_id: String,
    request_id: String,
    uri: Option<Url>,
    response: Option<HttpResponse>,
}

impl ApiError {
    pub(crate) fn from_envelope(
        envelope: ErrorEnvelope,
        uri: Option<Url>,
        response: Option<HttpResponse>,
    ) -> Self {
        Self {
            message: envelope.exception,
            exception_id: envelope.exception_id.unwrap_or_default(),
            request_id: envelope.request_id.unwrap_or_default(),
            uri,
            response,
        }
    }

    /// Builds the error for a non-success response.
    pub(crate) fn from_response(uri: Url, response: HttpResponse) -> Self {
        let envelope = ErrorEnvelope::from_body(&response.body);
        Self::from_envelope(envelope, Some(uri), Some(response))
    }

    pub(crate) fn invalid_uri() -> Self {
        Self::from_envelope(ErrorEnvelope::with_message("Invalid URI"), None, None)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Machine-readable error code; empty when the server sent none.
    pub fn exception_id(&self) -> &str {
        &self.exception_id
    }

    /// Server-assigned request id; empty when the server sent none.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The request URI that failed, if a request was made.
    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    /// The raw response, if a request was made.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(|r| r.status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}
