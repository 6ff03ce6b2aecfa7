//! # Palisade Middleware
//!
//! Async middleware pipeline with a request validation stage.
//!
//! ```text
//! payload → [ValidationMiddleware] → action handler → Outcome
//!                   │ failure
//!                   ▼
//!          route handler → global handler
//! ```
//!
//! - [`Middleware`] / [`Next`] - The stage contract
//! - [`Pipeline`] - An ordered, immutable list of stages around an action
//! - [`stages::ValidationMiddleware`] - Validates payloads per action
//! - [`ErrorHandler`] / [`HandlerChain`] - Resolution of validation failures
//!
//! ## Handler Policies
//!
//! Under [`HandlerPolicy::Bubble`] (the default) a route handler may resolve
//! the failure, decline it or replace it; whatever is left unresolved is
//! returned as `Err`. Under [`HandlerPolicy::Respond`] every failure becomes
//! a response, by default `{"status": "validationErrors", "errors": [...]}`.
//!
//! ## Example
//!
//! ```
//! use palisade_core::{ActionContext, ActionError};
//! use palisade_middleware::stages::{RouteValidation, ValidationMiddleware};
//! use palisade_middleware::{sync_handler, BoxFuture, Outcome, Pipeline, Request};
//! use palisade_schema::Rule;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let validation = ValidationMiddleware::builder()
//!     .route(
//!         "add",
//!         RouteValidation::fields([("x", Rule::number().required()), ("y", Rule::number().required())])
//!             .handler(sync_handler(|_ctx, error: &ActionError| {
//!                 Ok(Some(json!({"rejected": error.errors().len()})))
//!             })),
//!     )
//!     .build();
//! let pipeline = Pipeline::builder().stage(validation).build();
//!
//! let sum = |_ctx: &mut ActionContext, req: Request| -> BoxFuture<'static, Outcome> {
//!     Box::pin(async move { Ok(json!(req["x"].as_f64().unwrap_or(0.0) + req["y"].as_f64().unwrap_or(0.0))) })
//! };
//!
//! let ok = pipeline.invoke(ActionContext::new("add"), json!({"x": "3", "y": 4}), sum).await;
//! assert_eq!(ok, Ok(json!(7.0)));
//!
//! let rejected = pipeline.invoke(ActionContext::new("add"), json!({"x": "a"}), sum).await;
//! assert_eq!(rejected, Ok(json!({"rejected": 2})));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/palisade-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use handler::{
    handler_fn, standard_response, sync_handler, ErrorHandler, HandlerChain, HandlerFn, RespondHandler,
    RethrowHandler, SharedHandler, SyncHandler,
};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use palisade_core::HandlerPolicy;
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use types::{HandlerOutcome, Outcome, OutcomeExt, Request};
