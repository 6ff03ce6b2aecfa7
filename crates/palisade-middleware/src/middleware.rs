//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every pipeline stage
//! implements. A stage sees the action payload before the action handler
//! and the [`Outcome`] after it.
//!
//! # Example
//!
//! ```
//! use palisade_core::ActionContext;
//! use palisade_middleware::{BoxFuture, Middleware, Next, Outcome, Request};
//!
//! struct AuditMiddleware;
//!
//! impl Middleware for AuditMiddleware {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut ActionContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Outcome> {
//!         Box::pin(async move {
//!             tracing::info!(action = ctx.action(), "invoking");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::types::{Outcome, Request};
use palisade_core::ActionContext;
use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A pipeline stage.
///
/// A stage receives the mutable context, the payload and a [`Next`] callback
/// for the rest of the chain. It either calls `next.run()` exactly once or
/// short-circuits with its own outcome.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the payload through this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome>;
}

/// The terminal action handler.
pub(crate) type ActionFn<'a> =
    Box<dyn FnOnce(&mut ActionContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a>;

/// Callback to invoke the rest of the chain.
///
/// Consumed by [`Next::run`], so it can be called at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(ActionFn<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware` and then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the action handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut ActionContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the action handler.
    pub async fn run(self, ctx: &mut ActionContext, request: Request) -> Outcome {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A stage built from a closure.
///
/// # Example
///
/// ```
/// use palisade_middleware::FnMiddleware;
///
/// let timing = FnMiddleware::new("timing", |ctx, request, next| {
///     Box::pin(async move {
///         let outcome = next.run(ctx, request).await;
///         tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "done");
///         outcome
///     })
/// });
/// # let _ = timing;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut ActionContext, Request, Next<'a>) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    /// Creates a closure-backed stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut ActionContext, Request, Next<'a>) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        (self.func)(ctx, request, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_core::ActionError;
    use serde_json::json;

    struct Tagging {
        name: &'static str,
    }

    #[derive(Debug, Default)]
    struct Visited(Vec<&'static str>);

    impl Middleware for Tagging {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut ActionContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Outcome> {
            Box::pin(async move {
                let mut visited = ctx.remove_extension::<Visited>().unwrap_or_default();
                visited.0.push(self.name);
                ctx.set_extension(visited);
                next.run(ctx, request).await
            })
        }
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = ActionContext::new("echo");
        let next = Next::handler(|_ctx, req| Box::pin(async move { Ok(req) }));

        let outcome = next.run(&mut ctx, json!({"a": 1})).await;
        assert_eq!(outcome, Ok(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let first = Tagging { name: "first" };
        let second = Tagging { name: "second" };
        let mut ctx = ActionContext::new("echo");

        let handler = Next::handler(|_ctx, req| Box::pin(async move { Ok(req) }));
        let next = Next::new(&first, Next::new(&second, handler));

        let outcome = next.run(&mut ctx, json!(1)).await;
        assert_eq!(outcome, Ok(json!(1)));
        assert_eq!(ctx.get_extension::<Visited>().map(|v| v.0.clone()), Some(vec!["first", "second"]));
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuits() {
        let deny = FnMiddleware::new("deny", |_ctx, _req, _next| {
            Box::pin(async { Err(ActionError::handler("forbidden", "denied")) })
        });
        assert_eq!(deny.name(), "deny");

        let mut ctx = ActionContext::new("secret");
        let handler = Next::handler(|_ctx, _req| Box::pin(async { Ok(json!("reached")) }));
        let outcome = Next::new(&deny, handler).run(&mut ctx, json!({})).await;

        assert_eq!(outcome, Err(ActionError::handler("forbidden", "denied")));
    }
}
