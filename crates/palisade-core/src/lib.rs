//! # Palisade Core
//!
//! Core types shared by the Palisade crates:
//!
//! - [`ActionError`] - The error type surfaced by validated actions
//! - [`ValidationFailure`] - Normalized violations plus the standard response body
//! - [`NormalizedError`] - One `{key, value, error}` record
//! - [`normalize`] / [`normalize_with`] - Engine report to normalized records
//! - [`Vocabulary`] - Failure kind to error code table
//! - [`ActionContext`] - Per-invocation context with typed extensions
//! - [`ActionInfo`] - Owned request ID, action name and start time
//! - [`RequestId`] - UUID v7 request identifier
//! - [`HandlerPolicy`] - How error handler results become an outcome

#![doc(html_root_url = "https://docs.rs/palisade-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod normalize;
mod policy;
mod vocabulary;

pub use context::{ActionContext, ActionInfo, RequestId};
pub use error::{ActionError, ActionResult, ErrorEnvelope, ValidationFailure, VALIDATION_ERRORS};
pub use normalize::{normalize, normalize_with, NormalizedError, PEER_SENTINEL, ROOT_KEY};
pub use policy::{HandlerPolicy, UnknownPolicy};
pub use vocabulary::{Vocabulary, UNKNOWN_ERROR};
