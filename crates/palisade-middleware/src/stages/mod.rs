//! Pipeline stages.
//!
//! - [`validation`] - Validates the action payload and routes failures
//!   through the error handler chain

pub mod validation;

pub use validation::{RouteValidation, ValidationBuilder, ValidationMiddleware, ValidationOutcome};
