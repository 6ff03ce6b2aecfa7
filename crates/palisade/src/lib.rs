//! # Palisade
//!
//! **Request validation middleware for async action pipelines**
//!
//! - **Declarative rules** – `Rule::object().key("x", Rule::number().required())`
//! - **Stable error codes** – Engine failures become `{key, value, error}` records
//! - **Handler chain** – Route and global handlers resolve, decline or replace failures
//! - **Observability** – `tracing` events and Prometheus metrics
//!
//! ## Quick Start
//!
//! ```
//! use palisade::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let validation = ValidationMiddleware::builder()
//!     .route("add", RouteValidation::fields([("x", Rule::number().required()), ("y", Rule::number().required())]))
//!     .build();
//! let pipeline = Pipeline::builder().stage(validation).build();
//!
//! let outcome = pipeline
//!     .invoke(ActionContext::new("add"), json!({"x": "a", "y": "b"}), |_ctx, req| {
//!         Box::pin(async move { Ok(req) })
//!     })
//!     .await;
//!
//! let failure = outcome.validation_failure().unwrap();
//! assert_eq!(failure.errors()[0].error, "notNumber");
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! payload → ValidationMiddleware ─ok─→ action handler → Outcome
//!                  │
//!                  └─fail─→ normalize → route handler → global handler
//! ```

#![doc(html_root_url = "https://docs.rs/palisade/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the constraint engine
pub use palisade_schema as schema;

// Re-export errors, normalizer and context
pub use palisade_core as core;

// Re-export pipeline and validation stage
pub use palisade_middleware as middleware;

// Re-export configuration
pub use palisade_config as config;

// Re-export logging and metrics
pub use palisade_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use palisade::prelude::*;
///
/// let rule = Rule::object().key("id", Rule::string().guid().required());
/// # let _ = rule;
/// ```
pub mod prelude {
    pub use palisade_schema::{EngineOptions, EngineOverrides, RenameOptions, Rule};

    pub use palisade_core::{
        normalize, normalize_with, ActionContext, ActionError, ActionInfo, HandlerPolicy, NormalizedError,
        ValidationFailure, Vocabulary,
    };

    pub use palisade_middleware::stages::{RouteValidation, ValidationMiddleware, ValidationOutcome};
    pub use palisade_middleware::{
        handler_fn, sync_handler, BoxFuture, ErrorHandler, HandlerOutcome, Middleware, Next, Outcome, OutcomeExt,
        Pipeline, Request,
    };

    pub use palisade_config::{ConfigLoader, PalisadeConfig};
}
