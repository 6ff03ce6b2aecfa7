//! Request validation middleware.
//!
//! Validates the action payload against the schema registered for the
//! current action. A passing payload is replaced by its coerced form before
//! the action runs. A failing payload is normalized into an
//! [`ActionError::Validation`] and handed to the [`HandlerChain`].
//!
//! # Example
//!
//! ```
//! use palisade_core::{ActionContext, HandlerPolicy};
//! use palisade_middleware::stages::{RouteValidation, ValidationMiddleware};
//! use palisade_middleware::Pipeline;
//! use palisade_schema::Rule;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let validation = ValidationMiddleware::builder()
//!     .policy(HandlerPolicy::Respond)
//!     .route(
//!         "createUser",
//!         RouteValidation::fields([
//!             ("name", Rule::string().required()),
//!             ("age", Rule::number().integer().min(0)),
//!         ]),
//!     )
//!     .build();
//!
//! let pipeline = Pipeline::builder().stage(validation).build();
//! let outcome = pipeline
//!     .invoke(ActionContext::new("createUser"), json!({"age": "x"}), |_ctx, req| {
//!         Box::pin(async move { Ok(req) })
//!     })
//!     .await;
//!
//! assert_eq!(outcome.unwrap()["status"], "validationErrors");
//! # });
//! ```

use crate::handler::{ErrorHandler, HandlerChain, RethrowHandler, SharedHandler};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Outcome, Request};
use indexmap::IndexMap;
use palisade_config::ValidationConfig;
use palisade_core::{normalize_with, ActionContext, ActionError, HandlerPolicy, ValidationFailure, Vocabulary};
use palisade_schema::{EngineOptions, EngineOverrides, Rule};
use palisade_telemetry::metrics::{record_validation, record_validation_error};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// What the validation stage did for the current action.
///
/// Stored as a context extension.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// No schema is registered for the action.
    Skipped,
    /// The payload passed and was replaced by its coerced form.
    Passed,
    /// The payload failed; the handler chain decided the outcome.
    Rejected(ValidationFailure),
}

impl ValidationOutcome {
    /// Returns the outcome label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Passed => "passed",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Returns the failure for rejected payloads.
    #[must_use]
    pub const fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Rejected(failure) => Some(failure),
            Self::Skipped | Self::Passed => None,
        }
    }
}

#[derive(Debug, Clone)]
enum RequestSchema {
    Rule(Rule),
    Fields(IndexMap<String, Rule>),
}

impl RequestSchema {
    fn into_rule(self) -> Rule {
        match self {
            Self::Rule(rule) => rule,
            Self::Fields(fields) => Rule::object().keys(fields).strip_unknown(true),
        }
    }
}

/// Validation settings for one action.
///
/// # Example
///
/// ```
/// use palisade_core::HandlerPolicy;
/// use palisade_middleware::stages::RouteValidation;
/// use palisade_middleware::sync_handler;
/// use palisade_schema::{EngineOverrides, Rule};
///
/// let route = RouteValidation::fields([("id", Rule::string().guid().required())])
///     .options(EngineOverrides::default().abort_early(true))
///     .messages([("string.guid", "notUuid")])
///     .policy(HandlerPolicy::Respond)
///     .handler(sync_handler(|_ctx, _err| Ok(None)));
/// # let _ = route;
/// ```
#[derive(Clone, Default)]
pub struct RouteValidation {
    request: Option<RequestSchema>,
    handler: Option<SharedHandler>,
    overrides: EngineOverrides,
    messages: IndexMap<String, String>,
    policy: Option<HandlerPolicy>,
}

impl RouteValidation {
    /// A route with no request schema; payloads pass through unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the payload as an object with the given fields.
    ///
    /// Undeclared keys are stripped, including inside nested objects.
    #[must_use]
    pub fn fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Rule)>,
        K: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, rule)| (k.into(), rule)).collect();
        Self {
            request: Some(RequestSchema::Fields(fields)),
            ..Self::default()
        }
    }

    /// Validates the payload against a prebuilt rule, used as is.
    #[must_use]
    pub fn rule(rule: Rule) -> Self {
        Self {
            request: Some(RequestSchema::Rule(rule)),
            ..Self::default()
        }
    }

    /// Sets the route-level error handler. It runs before the global one.
    #[must_use]
    pub fn handler<H: ErrorHandler>(self, handler: H) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Sets an already shared route-level error handler.
    #[must_use]
    pub fn shared_handler(mut self, handler: SharedHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Engine option overrides for this route.
    #[must_use]
    pub const fn options(mut self, overrides: EngineOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Error code overrides for this route, keyed by `category.rule`.
    #[must_use]
    pub fn messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Overrides the instance handler policy for this route.
    #[must_use]
    pub const fn policy(mut self, policy: HandlerPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

impl std::fmt::Debug for RouteValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteValidation")
            .field("has_request_schema", &self.request.is_some())
            .field("has_handler", &self.handler.is_some())
            .field("overrides", &self.overrides)
            .field("messages", &self.messages)
            .field("policy", &self.policy)
            .finish()
    }
}

/// A route with instance defaults applied.
struct CompiledRoute {
    rule: Option<Rule>,
    options: EngineOptions,
    vocabulary: Arc<Vocabulary>,
    handler: Option<SharedHandler>,
    policy: HandlerPolicy,
}

/// Request validation middleware.
///
/// Routes are compiled once by [`ValidationBuilder::build`] and never change.
#[derive(Clone)]
pub struct ValidationMiddleware {
    routes: Arc<HashMap<String, CompiledRoute>>,
    global: SharedHandler,
    policy: HandlerPolicy,
    options: EngineOptions,
}

impl ValidationMiddleware {
    /// Creates a builder with default options and the rethrowing global
    /// handler.
    #[must_use]
    pub fn builder() -> ValidationBuilder {
        ValidationBuilder::default()
    }

    /// Creates a builder seeded from the `[validation]` config section.
    #[must_use]
    pub fn from_config(config: &ValidationConfig) -> ValidationBuilder {
        ValidationBuilder::default().config(config)
    }

    /// Returns `true` if a route is registered for `action`.
    #[must_use]
    pub fn has_route(&self, action: &str) -> bool {
        self.routes.contains_key(action)
    }

    /// Returns the instance handler policy.
    #[must_use]
    pub const fn policy(&self) -> HandlerPolicy {
        self.policy
    }

    /// Returns the instance engine options.
    #[must_use]
    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    async fn reject(&self, ctx: &mut ActionContext, route: &CompiledRoute, failure: ValidationFailure) -> Outcome {
        for error in failure.errors() {
            record_validation_error(ctx.action(), &error.error);
        }
        ctx.set_extension(ValidationOutcome::Rejected(failure.clone()));

        let chain = HandlerChain::new(self.global.as_ref(), route.handler.as_deref(), route.policy);
        chain.resolve(ctx, ActionError::Validation(failure)).await
    }
}

impl std::fmt::Debug for ValidationMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut routes: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        routes.sort_unstable();
        f.debug_struct("ValidationMiddleware")
            .field("routes", &routes)
            .field("policy", &self.policy)
            .field("options", &self.options)
            .finish()
    }
}

impl Middleware for ValidationMiddleware {
    fn name(&self) -> &'static str {
        "request_validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let Some((route, rule)) = self
                .routes
                .get(ctx.action())
                .and_then(|route| route.rule.as_ref().map(|rule| (route, rule)))
            else {
                tracing::debug!(action = ctx.action(), "no request schema; skipping validation");
                ctx.set_extension(ValidationOutcome::Skipped);
                return next.run(ctx, request).await;
            };

            let started = Instant::now();
            match rule.validate(&request, &route.options) {
                Ok(coerced) => {
                    record_validation(ctx.action(), "passed", started.elapsed());
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        action = ctx.action(),
                        "request passed validation"
                    );
                    ctx.set_extension(ValidationOutcome::Passed);
                    next.run(ctx, coerced).await
                }
                Err(report) => {
                    let failure = ValidationFailure::new(normalize_with(&request, &report, &route.vocabulary));
                    record_validation(ctx.action(), "rejected", started.elapsed());
                    tracing::info!(
                        request_id = %ctx.request_id(),
                        action = ctx.action(),
                        error_count = failure.len(),
                        policy = %route.policy,
                        "request failed validation"
                    );
                    self.reject(ctx, route, failure).await
                }
            }
        })
    }
}

/// Builder for [`ValidationMiddleware`].
pub struct ValidationBuilder {
    routes: Vec<(String, RouteValidation)>,
    handler: SharedHandler,
    policy: HandlerPolicy,
    options: EngineOptions,
    messages: IndexMap<String, String>,
}

impl Default for ValidationBuilder {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            handler: Arc::new(RethrowHandler),
            policy: HandlerPolicy::default(),
            options: EngineOptions::default(),
            messages: IndexMap::new(),
        }
    }
}

impl ValidationBuilder {
    /// Registers validation for `action`. A later registration for the same
    /// action replaces the earlier one.
    #[must_use]
    pub fn route(mut self, action: impl Into<String>, route: RouteValidation) -> Self {
        self.routes.push((action.into(), route));
        self
    }

    /// Sets the global error handler.
    #[must_use]
    pub fn handler<H: ErrorHandler>(self, handler: H) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Sets an already shared global error handler.
    #[must_use]
    pub fn shared_handler(mut self, handler: SharedHandler) -> Self {
        self.handler = handler;
        self
    }

    /// Sets the instance handler policy.
    #[must_use]
    pub const fn policy(mut self, policy: HandlerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the instance engine options.
    #[must_use]
    pub const fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds instance-wide error code overrides, keyed by `category.rule`.
    #[must_use]
    pub fn messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Applies the `[validation]` config section.
    #[must_use]
    pub fn config(self, config: &ValidationConfig) -> Self {
        self.policy(config.policy)
            .options(config.engine_options())
            .messages(config.messages.clone())
    }

    /// Compiles every route against the instance defaults.
    #[must_use]
    pub fn build(self) -> ValidationMiddleware {
        let base = Arc::new(Vocabulary::default().with_overrides(self.messages.clone()));
        let mut routes = HashMap::with_capacity(self.routes.len());

        for (action, route) in self.routes {
            let vocabulary = if route.messages.is_empty() {
                Arc::clone(&base)
            } else {
                Arc::new((*base).clone().with_overrides(route.messages))
            };

            let compiled = CompiledRoute {
                rule: route.request.map(RequestSchema::into_rule),
                options: self.options.merged(&route.overrides),
                vocabulary,
                handler: route.handler,
                policy: route.policy.unwrap_or(self.policy),
            };
            routes.insert(action, compiled);
        }

        ValidationMiddleware {
            routes: Arc::new(routes),
            global: self.handler,
            policy: self.policy,
            options: self.options,
        }
    }
}
