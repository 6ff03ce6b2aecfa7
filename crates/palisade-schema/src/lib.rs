//! # Palisade Schema
//!
//! Declarative rules and the engine that checks JSON values against them.
//!
//! - [`Rule`] - Chainable rule builder (`Rule::object().key("x", Rule::number())`)
//! - [`EngineOptions`] - Coercion, early-abort and unknown-key behaviour
//! - [`FailureReport`] - Ordered list of structured [`FailureDetail`]s
//! - [`FailureKind`] - Stable `category.rule` identifier of a violated constraint
//!
//! Validation never panics on input. A passing value comes back coerced
//! (numeric strings become numbers, dates become RFC 3339 strings, and so on)
//! and validating that output again yields the same value.

#![doc(html_root_url = "https://docs.rs/palisade-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod formats;
mod options;
mod report;
mod rule;

pub use options::{EngineOptions, EngineOverrides};
pub use report::{Category, FailureContext, FailureDetail, FailureKind, FailureReport};
pub use rule::{Case, IpVersion, Limit, Presence, RenameOptions, Rule};
