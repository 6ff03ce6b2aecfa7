//! Error types for Palisade.
//!
//! [`ActionError`] is the only error type that leaves the validation
//! middleware. Engine diagnostics are converted into a
//! [`ValidationFailure`] before any handler or caller sees them.

use crate::normalize::NormalizedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name and message carried by every validation failure.
pub const VALIDATION_ERRORS: &str = "validationErrors";

/// Result type alias using [`ActionError`].
pub type ActionResult<T> = Result<T, ActionError>;

/// A request that failed schema validation.
///
/// Carries one [`NormalizedError`] per violation, in engine order.
///
/// # Example
///
/// ```
/// use palisade_core::{NormalizedError, ValidationFailure};
/// use serde_json::json;
///
/// let failure = ValidationFailure::new(vec![NormalizedError::new("x", Some(json!("a")), "notNumber")]);
/// assert_eq!(
///     failure.to_response(),
///     json!({"status": "validationErrors", "errors": [{"key": "x", "value": "a", "error": "notNumber"}]})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Error)]
#[error("validationErrors")]
pub struct ValidationFailure {
    /// The normalized violations.
    pub errors: Vec<NormalizedError>,
}

impl ValidationFailure {
    /// Creates a failure from normalized errors.
    #[must_use]
    pub fn new(errors: Vec<NormalizedError>) -> Self {
        Self { errors }
    }

    /// Returns the normalized violations.
    #[must_use]
    pub fn errors(&self) -> &[NormalizedError] {
        &self.errors
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The standard response body: `{status: "validationErrors", errors}`.
    #[must_use]
    pub fn to_response(&self) -> serde_json::Value {
        serde_json::json!({
            "status": VALIDATION_ERRORS,
            "errors": self.errors,
        })
    }
}

/// Error produced while processing an action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// The request failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// An error raised by an error handler or the action itself.
    #[error("{name}: {message}")]
    Handler {
        /// Error name, e.g. `"forbidden"`.
        name: String,
        /// Human-readable message.
        message: String,
    },
}

impl ActionError {
    /// Creates a validation error from normalized errors.
    #[must_use]
    pub fn validation(errors: Vec<NormalizedError>) -> Self {
        Self::Validation(ValidationFailure::new(errors))
    }

    /// Creates a handler error.
    #[must_use]
    pub fn handler(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the error name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Validation(_) => VALIDATION_ERRORS,
            Self::Handler { name, .. } => name,
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(_) => VALIDATION_ERRORS,
            Self::Handler { message, .. } => message,
        }
    }

    /// Returns the normalized violations; empty for handler errors.
    #[must_use]
    pub fn errors(&self) -> &[NormalizedError] {
        match self {
            Self::Validation(failure) => failure.errors(),
            Self::Handler { .. } => &[],
        }
    }

    /// Returns the validation failure, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            Self::Handler { .. } => None,
        }
    }

    /// Returns `true` for validation failures.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Converts this error to a serializable envelope.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            name: self.name().to_string(),
            message: self.message().to_string(),
            errors: self.errors().to_vec(),
        }
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Handler {
            name: "Error".to_string(),
            message: format!("{err:#}"),
        }
    }
}

/// Serializable form of an [`ActionError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error name.
    pub name: String,
    /// Error message.
    pub message: String,
    /// Normalized violations, omitted when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<NormalizedError>,
}
