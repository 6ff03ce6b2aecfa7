//! Error handlers and the handler chain.
//!
//! When validation fails, the middleware builds a [`HandlerChain`] from the
//! instance-wide (global) handler and the optional route handler, and lets
//! it decide the outcome. Dispatch order is the reverse of registration: the
//! route handler sees the error first.
//!
//! How handler results are interpreted depends on the [`HandlerPolicy`]:
//!
//! | Policy | Route handler | Global handler | Chain exhausted |
//! |--------|---------------|----------------|-----------------|
//! | `Bubble` | resolves, declines or replaces the error | same | error is returned |
//! | `Respond` | notified only | resolves | standard `validationErrors` body |

use crate::middleware::BoxFuture;
use crate::types::{HandlerOutcome, Outcome};
use palisade_core::{ActionContext, ActionError, ActionInfo, HandlerPolicy};
use std::future::Future;
use std::sync::Arc;

/// Handles an [`ActionError`] raised while processing an action.
///
/// See [`HandlerOutcome`] for the meaning of the result.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Handles `error` for the action described by `ctx`.
    fn handle<'a>(&'a self, ctx: &'a ActionContext, error: &'a ActionError) -> BoxFuture<'a, HandlerOutcome>;
}

/// A shared error handler.
pub type SharedHandler = Arc<dyn ErrorHandler>;

/// Handler adapter for async closures; see [`handler_fn`].
pub struct HandlerFn<F> {
    func: F,
}

/// Wraps an async closure as an [`ErrorHandler`].
///
/// The closure receives owned copies of the invocation info and the error,
/// so the returned future may hold them across await points.
///
/// # Example
///
/// ```
/// use palisade_core::{ActionError, ActionInfo};
/// use palisade_middleware::handler_fn;
/// use serde_json::json;
///
/// let handler = handler_fn(|info: ActionInfo, error: ActionError| async move {
///     Ok(Some(json!({"action": info.action(), "rejected": error.errors().len()})))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(func: F) -> HandlerFn<F>
where
    F: Fn(ActionInfo, ActionError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    HandlerFn { func }
}

impl<F, Fut> ErrorHandler for HandlerFn<F>
where
    F: Fn(ActionInfo, ActionError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a ActionContext, error: &'a ActionError) -> BoxFuture<'a, HandlerOutcome> {
        Box::pin((self.func)(ctx.info().clone(), error.clone()))
    }
}

/// Handler adapter for plain closures; see [`sync_handler`].
pub struct SyncHandler<F> {
    func: F,
}

/// Wraps a synchronous closure as an [`ErrorHandler`].
///
/// The closure receives the same arguments as a [`handler_fn`] closure, by
/// reference.
///
/// # Example
///
/// ```
/// use palisade_core::{ActionError, ActionInfo};
/// use palisade_middleware::sync_handler;
///
/// let handler = sync_handler(|info: &ActionInfo, error: &ActionError| {
///     Err(ActionError::handler("rejected", format!("{} failed: {error}", info.action())))
/// });
/// # let _ = handler;
/// ```
pub fn sync_handler<F>(func: F) -> SyncHandler<F>
where
    F: Fn(&ActionInfo, &ActionError) -> HandlerOutcome + Send + Sync + 'static,
{
    SyncHandler { func }
}

impl<F> ErrorHandler for SyncHandler<F>
where
    F: Fn(&ActionInfo, &ActionError) -> HandlerOutcome + Send + Sync + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a ActionContext, error: &'a ActionError) -> BoxFuture<'a, HandlerOutcome> {
        Box::pin(std::future::ready((self.func)(ctx.info(), error)))
    }
}

/// Re-raises every error. The default global handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct RethrowHandler;

impl ErrorHandler for RethrowHandler {
    fn handle<'a>(&'a self, _ctx: &'a ActionContext, error: &'a ActionError) -> BoxFuture<'a, HandlerOutcome> {
        Box::pin(std::future::ready(Err(error.clone())))
    }
}

/// Resolves every error with its standard response body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespondHandler;

impl ErrorHandler for RespondHandler {
    fn handle<'a>(&'a self, _ctx: &'a ActionContext, error: &'a ActionError) -> BoxFuture<'a, HandlerOutcome> {
        Box::pin(std::future::ready(Ok(Some(standard_response(error)))))
    }
}

/// The `{status, errors}` body for an error.
pub fn standard_response(error: &ActionError) -> serde_json::Value {
    serde_json::json!({
        "status": error.name(),
        "errors": error.errors(),
    })
}

/// The handlers applicable to one failure, in registration order
/// `[global, route]`.
pub struct HandlerChain<'h> {
    global: &'h dyn ErrorHandler,
    route: Option<&'h dyn ErrorHandler>,
    policy: HandlerPolicy,
}

impl<'h> HandlerChain<'h> {
    /// Creates a chain.
    #[must_use]
    pub fn new(global: &'h dyn ErrorHandler, route: Option<&'h dyn ErrorHandler>, policy: HandlerPolicy) -> Self {
        Self { global, route, policy }
    }

    /// Handlers in dispatch order: route first, then global.
    pub fn dispatch_order(&self) -> impl Iterator<Item = &'h dyn ErrorHandler> {
        self.route.into_iter().chain(std::iter::once(self.global))
    }

    /// Resolves `error` into an outcome.
    pub async fn resolve(&self, ctx: &ActionContext, error: ActionError) -> Outcome {
        match self.policy {
            HandlerPolicy::Bubble => self.bubble(ctx, error).await,
            HandlerPolicy::Respond => Ok(self.respond(ctx, error).await),
        }
    }

    async fn bubble(&self, ctx: &ActionContext, mut current: ActionError) -> Outcome {
        for handler in self.dispatch_order() {
            match handler.handle(ctx, &current).await {
                Ok(Some(response)) => return Ok(response),
                Ok(None) => {}
                Err(replaced) => {
                    tracing::debug!(
                        action = ctx.action(),
                        error = %replaced,
                        "error handler replaced the error"
                    );
                    current = replaced;
                }
            }
        }
        Err(current)
    }

    async fn respond(&self, ctx: &ActionContext, error: ActionError) -> serde_json::Value {
        if let Some(route) = self.route {
            if let Err(raised) = route.handle(ctx, &error).await {
                tracing::warn!(
                    action = ctx.action(),
                    error = %raised,
                    "route error handler failed; continuing"
                );
            }
        }

        match self.global.handle(ctx, &error).await {
            Ok(Some(response)) => response,
            Ok(None) => standard_response(&error),
            Err(raised) => {
                if raised != error {
                    tracing::warn!(
                        action = ctx.action(),
                        error = %raised,
                        "global error handler failed; responding with validation errors"
                    );
                }
                standard_response(&error)
            }
        }
    }
}

impl std::fmt::Debug for HandlerChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("has_route_handler", &self.route.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_core::NormalizedError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failure() -> ActionError {
        ActionError::validation(vec![NormalizedError::new("x", Some(json!("a")), "notNumber")])
    }

    fn ctx() -> ActionContext {
        ActionContext::new("add")
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
        result: HandlerOutcome,
    }

    impl ErrorHandler for Counting {
        fn handle<'a>(&'a self, _ctx: &'a ActionContext, _error: &'a ActionError) -> BoxFuture<'a, HandlerOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(std::future::ready(self.result.clone()))
        }
    }

    fn counting(result: HandlerOutcome) -> (Counting, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Counting {
                calls: calls.clone(),
                result,
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_default_global_rethrows() {
        let chain = HandlerChain::new(&RethrowHandler, None, HandlerPolicy::Bubble);
        assert_eq!(chain.resolve(&ctx(), failure()).await, Err(failure()));
    }

    #[tokio::test]
    async fn test_route_response_short_circuits() {
        let (global, global_calls) = counting(Ok(Some(json!("global"))));
        let route = sync_handler(|_, _| Ok(Some(json!("route"))));

        let chain = HandlerChain::new(&global, Some(&route as &dyn ErrorHandler), HandlerPolicy::Bubble);
        assert_eq!(chain.resolve(&ctx(), failure()).await, Ok(json!("route")));
        assert_eq!(global_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_route_error_reaches_global() {
        let route = sync_handler(|_, _| Err(ActionError::handler("custom", "from route")));
        let global = handler_fn(|_info, error: ActionError| async move { Ok(Some(json!({ "saw": error.name() }))) });

        let chain = HandlerChain::new(&global, Some(&route as &dyn ErrorHandler), HandlerPolicy::Bubble);
        assert_eq!(chain.resolve(&ctx(), failure()).await, Ok(json!({"saw": "custom"})));
    }

    #[tokio::test]
    async fn test_decline_passes_same_error() {
        let route = sync_handler(|_, _| Ok(None));
        let chain = HandlerChain::new(&RethrowHandler, Some(&route as &dyn ErrorHandler), HandlerPolicy::Bubble);
        assert_eq!(chain.resolve(&ctx(), failure()).await, Err(failure()));
    }

    #[tokio::test]
    async fn test_exhausted_chain_returns_last_error() {
        let route = sync_handler(|_, _| Err(ActionError::handler("first", "1")));
        let global = sync_handler(|_, _| Err(ActionError::handler("second", "2")));

        let chain = HandlerChain::new(&global, Some(&route as &dyn ErrorHandler), HandlerPolicy::Bubble);
        assert_eq!(
            chain.resolve(&ctx(), failure()).await,
            Err(ActionError::handler("second", "2"))
        );
    }

    #[tokio::test]
    async fn test_all_decline_returns_original() {
        let global = sync_handler(|_, _| Ok(None));
        let chain = HandlerChain::new(&global, None, HandlerPolicy::Bubble);
        assert_eq!(chain.resolve(&ctx(), failure()).await, Err(failure()));
    }

    #[tokio::test]
    async fn test_respond_policy_default_body() {
        let chain = HandlerChain::new(&RethrowHandler, None, HandlerPolicy::Respond);
        assert_eq!(
            chain.resolve(&ctx(), failure()).await,
            Ok(json!({
                "status": "validationErrors",
                "errors": [{"key": "x", "value": "a", "error": "notNumber"}]
            }))
        );
    }

    #[tokio::test]
    async fn test_respond_policy_notifies_route_and_uses_global() {
        let (route, route_calls) = counting(Ok(Some(json!("ignored"))));
        let global = handler_fn(|_info, _error| async { Ok(Some(json!("global"))) });

        let chain = HandlerChain::new(&global, Some(&route as &dyn ErrorHandler), HandlerPolicy::Respond);
        assert_eq!(chain.resolve(&ctx(), failure()).await, Ok(json!("global")));
        assert_eq!(route_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_respond_policy_swallows_errors() {
        let route = sync_handler(|_, _| Err(ActionError::handler("route", "boom")));
        let global = sync_handler(|_, _| Err(ActionError::handler("global", "boom")));

        let chain = HandlerChain::new(&global, Some(&route as &dyn ErrorHandler), HandlerPolicy::Respond);
        let outcome = chain.resolve(&ctx(), failure()).await.expect("respond never fails");
        assert_eq!(outcome["status"], "validationErrors");
    }

    #[tokio::test]
    async fn test_respond_handler_body() {
        let outcome = RespondHandler.handle(&ctx(), &failure()).await;
        assert_eq!(outcome.unwrap().unwrap()["errors"][0]["key"], "x");
    }

    #[test]
    fn test_dispatch_order_is_route_first() {
        let route = RespondHandler;
        let chain = HandlerChain::new(&RethrowHandler, Some(&route as &dyn ErrorHandler), HandlerPolicy::Bubble);
        assert_eq!(chain.dispatch_order().count(), 2);

        let chain = HandlerChain::new(&RethrowHandler, None, HandlerPolicy::Bubble);
        assert_eq!(chain.dispatch_order().count(), 1);
    }
}
