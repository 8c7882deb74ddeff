//! TutorHub API Gateway
//!
//! Typed request/response functions for the TutorHub scheduling backend.
//!
//! Every endpoint function builds its request body from named fields only,
//! issues exactly one HTTP call and either decodes the 2xx body or returns a
//! [`GatewayError`] carrying the status and response body. Nothing in this
//! crate retries, batches or caches.

pub mod api;
pub mod client;
pub mod types;

pub use api::{AvailabilityApi, RegistrationApi, SchedulingApi};
pub use client::{ClientOptions, Credentials, TutoringClient, DEFAULT_BASE_URL};
pub use types::{
    AppointmentRequest, DailyAvailability, Meeting, MeetingType, MyTutor, Registration,
    RegistrationReceipt, RegistrationStatus, Subject, TimeRange, TutorSuggestion,
};

use thiserror::Error;

/// A specialized `Result` type for gateway calls.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The configured base URL cannot be parsed.
    #[error("invalid API base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The request never produced a response (connection, timeout, TLS).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint label, e.g. `GET /api/subjects`.
        endpoint: String,
        /// The transport error reported by reqwest.
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} responded with HTTP {status}")]
    Status {
        /// Endpoint label, e.g. `POST /scheduling/appointments`.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body; JSON when it parses, otherwise the raw text as a
        /// JSON string. `None` when the body was empty.
        body: Option<serde_json::Value>,
    },

    /// A 2xx body did not match the expected shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode {
        /// Endpoint label.
        endpoint: String,
        /// Decoder message.
        message: String,
    },
}

impl GatewayError {
    /// Creates a `Status` error.
    #[must_use]
    pub fn status_error(
        endpoint: impl Into<String>,
        status: u16,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            body,
        }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status when the backend produced a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the error response body, if the backend sent one.
    #[must_use]
    pub const fn response_body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` for an HTTP 404 response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Interprets an error response body.
///
/// Empty bodies become `None`, JSON bodies are parsed, anything else is kept
/// verbatim as a JSON string.
#[must_use]
pub fn parse_error_body(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}
