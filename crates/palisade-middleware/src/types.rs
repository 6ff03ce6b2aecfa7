//! Common types used throughout the middleware pipeline.

use palisade_core::ActionError;
use serde_json::Value;

/// The action payload flowing through the pipeline.
pub type Request = Value;

/// The result of running an action: its response, or the error that ended it.
pub type Outcome = Result<Value, ActionError>;

/// The result of an error handler.
///
/// - `Ok(Some(response))` resolves the action with `response`
/// - `Ok(None)` declines; the next handler sees the same error
/// - `Err(error)` replaces the running error
pub type HandlerOutcome = Result<Option<Value>, ActionError>;

/// Extension trait for inspecting outcomes.
pub trait OutcomeExt {
    /// Returns the validation failure if the action was rejected by validation.
    fn validation_failure(&self) -> Option<&palisade_core::ValidationFailure>;
}

impl OutcomeExt for Outcome {
    fn validation_failure(&self) -> Option<&palisade_core::ValidationFailure> {
        self.as_ref().err().and_then(ActionError::as_validation)
    }
}
