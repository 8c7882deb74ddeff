//! Error types for the TutorHub session layer.
//!
//! User-facing failures (a rejected booking, a failed cancel) are not errors
//! here; controllers record them as messages. These variants cover
//! configuration problems, illegal controller transitions and gateway
//! failures that callers chose to propagate.

use std::path::PathBuf;

use tutorhub_gateway::GatewayError;

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur in the session layer.
///
/// Variants are grouped by subsystem and carry an actionable suggestion where
/// one exists.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your tutorhub.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// The environment variable named for the password is not set.
    #[error("Missing credential: environment variable '{var}' is not set\n\nSuggestion: Export {var} or remove the 'auth' block from tutorhub.json")]
    MissingCredential {
        /// Name of the environment variable.
        var: String,
    },

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// A controller operation was invoked in a state that does not allow it.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state or action.
        to: String,
    },

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// A gateway call failed and the caller propagated it.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `MissingCredential` error.
    #[must_use]
    pub fn missing_credential(var: impl Into<String>) -> Self {
        Self::MissingCredential { var: var.into() }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if this error comes from configuration and should stop
    /// the program before any request is made.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::MissingCredential { .. }
        )
    }
}
