//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] wraps a terminal action handler in a fixed list of stages.
//! Stage order is set once by the [`PipelineBuilder`] and cannot change
//! afterwards.

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Outcome, Request};
use palisade_core::ActionContext;
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered list of stages.
///
/// # Example
///
/// ```
/// use palisade_core::ActionContext;
/// use palisade_middleware::Pipeline;
/// use palisade_middleware::stages::{RouteValidation, ValidationMiddleware};
/// use palisade_schema::Rule;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let validation = ValidationMiddleware::builder()
///     .route("add", RouteValidation::fields([("x", Rule::number().required())]))
///     .build();
/// let pipeline = Pipeline::builder().stage(validation).build();
///
/// let outcome = pipeline
///     .invoke(ActionContext::new("add"), json!({"x": "2"}), |_ctx, req| {
///         Box::pin(async move { Ok(req) })
///     })
///     .await;
/// assert_eq!(outcome, Ok(json!({"x": 2})));
/// # });
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage and then `handler`.
    pub async fn invoke<H>(&self, mut ctx: ActionContext, request: Request, handler: H) -> Outcome
    where
        H: FnOnce(&mut ActionContext, Request) -> BoxFuture<'static, Outcome> + Send + 'static,
    {
        self.invoke_with(&mut ctx, request, handler).await
    }

    /// Like [`Pipeline::invoke`], but leaves the context with the caller so
    /// stage extensions can be inspected afterwards.
    pub async fn invoke_with<H>(&self, ctx: &mut ActionContext, request: Request, handler: H) -> Outcome
    where
        H: FnOnce(&mut ActionContext, Request) -> BoxFuture<'static, Outcome> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut ActionContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Stages run in the order they are added.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct OrderTracking {
        name: &'static str,
        counter: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for OrderTracking {
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
                self.counter.fetch_add(1, Ordering::SeqCst);
                self.order.lock().unwrap().push(self.name);
                next.run(ctx, request).await
            })
        }
    }

    #[tokio::test]
    async fn test_pipeline_executes_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let stage = |name| OrderTracking {
            name,
            counter: counter.clone(),
            order: order.clone(),
        };

        let pipeline = Pipeline::builder()
            .stage(stage("first"))
            .stage(stage("second"))
            .stage(stage("third"))
            .build();

        let outcome = pipeline
            .invoke(ActionContext::new("echo"), json!("hi"), |_ctx, req| {
                Box::pin(async move { Ok(req) })
            })
            .await;

        assert_eq!(outcome, Ok(json!("hi")));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(pipeline.stage_names(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline_calls_handler() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.stage_count(), 0);

        let outcome = pipeline
            .invoke(ActionContext::new("noop"), json!(null), |_ctx, _req| {
                Box::pin(async { Ok(json!("handled")) })
            })
            .await;
        assert_eq!(outcome, Ok(json!("handled")));
    }

    #[tokio::test]
    async fn test_stage_can_rewrite_payload() {
        let pipeline = Pipeline::builder()
            .stage(FnMiddleware::new("wrap", |ctx, req, next| {
                Box::pin(async move { next.run(ctx, json!({ "wrapped": req })).await })
            }))
            .build();

        let mut ctx = ActionContext::new("wrap");
        let outcome = pipeline
            .invoke_with(&mut ctx, json!(1), |_ctx, req| Box::pin(async move { Ok(req) }))
            .await;
        assert_eq!(outcome, Ok(json!({"wrapped": 1})));
    }
}
