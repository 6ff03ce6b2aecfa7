//! End-to-end tests for the validation stage inside a pipeline.

use palisade_config::ConfigLoader;
use palisade_core::{ActionContext, ActionError, ActionInfo, HandlerPolicy, NormalizedError, RequestId};
use palisade_middleware::stages::{RouteValidation, ValidationMiddleware, ValidationOutcome};
use palisade_middleware::{
    handler_fn, sync_handler, BoxFuture, ErrorHandler, FnMiddleware, HandlerOutcome, Outcome, OutcomeExt, Pipeline,
    Request,
};
use palisade_schema::{EngineOverrides, Rule};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn add_route() -> RouteValidation {
    RouteValidation::fields([("x", Rule::number().required()), ("y", Rule::number().required())])
}

fn echo(_ctx: &mut ActionContext, request: Request) -> BoxFuture<'static, Outcome> {
    Box::pin(async move { Ok(request) })
}

async fn run(pipeline: &Pipeline, action: &str, request: Value) -> Outcome {
    pipeline.invoke(ActionContext::new(action), request, echo).await
}

fn scenario_two_errors() -> Vec<NormalizedError> {
    vec![
        NormalizedError::new("x", Some(json!("a")), "notNumber"),
        NormalizedError::new("y", Some(json!("b")), "notNumber"),
    ]
}

/// Counts calls and remembers the error names it saw.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn handler(&self, result: HandlerOutcome) -> impl ErrorHandler {
        let recorder = self.clone();
        sync_handler(move |_ctx, error| {
            recorder.calls.fetch_add(1, Ordering::SeqCst);
            recorder.seen.lock().unwrap().push(error.name().to_string());
            result.clone()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn valid_payload_reaches_action_unchanged() {
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("add", add_route()).build())
        .build();

    let outcome = run(&pipeline, "add", json!({"x": 3, "y": 4})).await;
    assert_eq!(outcome, Ok(json!({"x": 3, "y": 4})));
}

#[tokio::test]
async fn numeric_strings_are_coerced_before_action() {
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("add", add_route()).build())
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "3", "y": "4.5"})).await;
    assert_eq!(outcome, Ok(json!({"x": 3, "y": 4.5})));
}

#[tokio::test]
async fn undeclared_keys_are_stripped_at_every_depth() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .route(
                    "register",
                    RouteValidation::fields([("user", Rule::object().key("name", Rule::string()))]),
                )
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "register", json!({"user": {"name": "bo", "extra": 1}, "top": 2})).await;
    assert_eq!(outcome, Ok(json!({"user": {"name": "bo"}})));
}

#[tokio::test]
async fn coerced_payload_is_a_fixed_point() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .route(
                    "profile",
                    RouteValidation::fields([
                        ("name", Rule::string().trim().lowercase().required()),
                        ("born", Rule::date()),
                        ("admin", Rule::boolean()),
                    ]),
                )
                .build(),
        )
        .build();

    let first = run(&pipeline, "profile", json!({"name": "  Ada ", "born": 0, "admin": "yes"}))
        .await
        .unwrap();
    let second = run(&pipeline, "profile", first.clone()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn actions_without_routes_pass_through() {
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("add", add_route()).build())
        .build();

    let mut ctx = ActionContext::new("subtract");
    let outcome = pipeline.invoke_with(&mut ctx, json!({"x": "a"}), echo).await;

    assert_eq!(outcome, Ok(json!({"x": "a"})));
    assert_eq!(ctx.get_extension::<ValidationOutcome>(), Some(&ValidationOutcome::Skipped));
}

// ============================================================================
// Failure path, Bubble policy
// ============================================================================

#[tokio::test]
async fn failures_are_returned_in_engine_order() {
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("add", add_route()).build())
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a", "y": "b"})).await;
    let failure = outcome.validation_failure().expect("validation failure");

    assert_eq!(failure.errors(), scenario_two_errors().as_slice());
    assert_eq!(
        outcome.unwrap_err().envelope().name,
        "validationErrors"
    );
}

#[tokio::test]
async fn missing_field_has_no_value() {
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("add", add_route()).build())
        .build();

    let outcome = run(&pipeline, "add", json!({"x": 1})).await;
    let error = outcome.unwrap_err();

    assert_eq!(error.errors(), &[NormalizedError::new("y", None, "required")]);
    assert_eq!(
        serde_json::to_value(error.envelope()).unwrap(),
        json!({
            "name": "validationErrors",
            "message": "validationErrors",
            "errors": [{"key": "y", "error": "required"}]
        })
    );
}

#[tokio::test]
async fn route_handler_response_short_circuits_global() {
    let global = Recorder::default();
    let route = Recorder::default();

    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .handler(global.handler(Ok(Some(json!("global")))))
                .route("add", add_route().handler(route.handler(Ok(Some(json!("route"))))))
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({})).await;
    assert_eq!(outcome, Ok(json!("route")));
    assert_eq!(route.calls(), 1);
    assert_eq!(global.calls(), 0);
}

#[tokio::test]
async fn route_handler_error_reaches_global() {
    let global = Recorder::default();

    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .handler(global.handler(Ok(None)))
                .route(
                    "add",
                    add_route().handler(sync_handler(|_, _| Err(ActionError::handler("badInput", "rewrapped")))),
                )
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({})).await;
    assert_eq!(global.seen(), vec!["badInput".to_string()]);
    assert_eq!(outcome, Err(ActionError::handler("badInput", "rewrapped")));
}

#[tokio::test]
async fn without_route_handler_only_global_runs() {
    let global = Recorder::default();

    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .handler(global.handler(Ok(Some(json!({"handled": true})))))
                .route("add", add_route())
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a", "y": "b"})).await;
    assert_eq!(outcome, Ok(json!({"handled": true})));
    assert_eq!(global.calls(), 1);
    assert_eq!(global.seen(), vec!["validationErrors".to_string()]);
}

#[tokio::test]
async fn declining_handlers_leave_original_error() {
    let route = Recorder::default();

    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .route("add", add_route().handler(route.handler(Ok(None))))
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a", "y": "b"})).await;
    assert_eq!(route.calls(), 1);
    assert_eq!(outcome, Err(ActionError::validation(scenario_two_errors())));
}

#[tokio::test]
async fn async_handlers_are_awaited() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .handler(handler_fn(|info: ActionInfo, error: ActionError| async move {
                    tokio::task::yield_now().await;
                    Ok(Some(json!({
                        "action": info.action(),
                        "codes": error.errors().iter().map(|e| e.error.clone()).collect::<Vec<_>>(),
                    })))
                }))
                .route("add", add_route())
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a"})).await;
    assert_eq!(outcome, Ok(json!({"action": "add", "codes": ["notNumber", "required"]})));
}

#[tokio::test]
async fn sync_and_async_handlers_see_the_same_invocation() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let from_route = seen.clone();
    let from_global = seen.clone();

    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .handler(handler_fn(move |info: ActionInfo, _error: ActionError| {
                    let seen = from_global.clone();
                    async move {
                        seen.lock().unwrap().push((info.action().to_string(), info.request_id()));
                        Ok(Some(json!("handled")))
                    }
                }))
                .route(
                    "add",
                    add_route().handler(sync_handler(move |info: &ActionInfo, _error: &ActionError| {
                        from_route.lock().unwrap().push((info.action().to_string(), info.request_id()));
                        Ok(None)
                    })),
                )
                .build(),
        )
        .build();

    let id = RequestId::new();
    let outcome = pipeline
        .invoke(ActionContext::with_request_id("add", id), json!({}), echo)
        .await;

    assert_eq!(outcome, Ok(json!("handled")));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("add".to_string(), id), ("add".to_string(), id)]
    );
}

// ============================================================================
// Failure path, Respond policy
// ============================================================================

#[tokio::test]
async fn respond_policy_returns_standard_body() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .policy(HandlerPolicy::Respond)
                .route("add", add_route())
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a", "y": "b"})).await;
    assert_eq!(
        outcome,
        Ok(json!({
            "status": "validationErrors",
            "errors": [
                {"key": "x", "value": "a", "error": "notNumber"},
                {"key": "y", "value": "b", "error": "notNumber"}
            ]
        }))
    );
}

#[tokio::test]
async fn respond_policy_notifies_route_and_ignores_its_result() {
    let route = Recorder::default();

    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .policy(HandlerPolicy::Respond)
                .route(
                    "add",
                    add_route().handler(route.handler(Err(ActionError::handler("ignored", "route failure")))),
                )
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({})).await.unwrap();
    assert_eq!(route.calls(), 1);
    assert_eq!(outcome["status"], "validationErrors");
    assert_eq!(outcome["errors"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn per_route_policy_overrides_instance() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .route("strict", add_route())
                .route("lenient", add_route().policy(HandlerPolicy::Respond))
                .build(),
        )
        .build();

    assert!(run(&pipeline, "strict", json!({})).await.is_err());
    assert!(run(&pipeline, "lenient", json!({})).await.is_ok());
}

// ============================================================================
// Normalization through the stage
// ============================================================================

#[tokio::test]
async fn single_missing_peer_names_the_peer() {
    let rule = Rule::object()
        .keys([("password", Rule::string()), ("confirm", Rule::string())])
        .with("password", ["confirm"]);
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("signup", RouteValidation::rule(rule)).build())
        .build();

    let outcome = run(&pipeline, "signup", json!({"password": "hunter2"})).await;
    let error = outcome.unwrap_err();
    assert_eq!(error.errors()[0].key, "confirm");
    assert_eq!(error.errors()[0].error, "required");
}

#[tokio::test]
async fn several_missing_peers_use_sentinel_key() {
    let rule = Rule::object()
        .keys([("a", Rule::any()), ("b", Rule::any()), ("c", Rule::any())])
        .and(["a", "b", "c"]);
    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::builder().route("peers", RouteValidation::rule(rule)).build())
        .build();

    let outcome = run(&pipeline, "peers", json!({"a": 1})).await;
    let error = outcome.unwrap_err();
    assert_eq!(error.errors(), &[NormalizedError::new("key", None, "required")]);
}

#[tokio::test]
async fn abort_early_route_reports_one_error() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .route("add", add_route().options(EngineOverrides::default().abort_early(true)))
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a", "y": "b"})).await;
    assert_eq!(outcome.unwrap_err().errors().len(), 1);
}

#[tokio::test]
async fn message_overrides_change_codes() {
    let pipeline = Pipeline::builder()
        .stage(
            ValidationMiddleware::builder()
                .messages([("number.base", "mustBeNumeric")])
                .route("add", add_route().messages([("any.required", "missing")]))
                .build(),
        )
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a"})).await;
    let codes: Vec<_> = outcome.unwrap_err().errors().iter().map(|e| e.error.clone()).collect();
    assert_eq!(codes, vec!["mustBeNumeric", "missing"]);
}

// ============================================================================
// Configuration and composition
// ============================================================================

#[tokio::test]
async fn stage_built_from_config_file_section() {
    let config = ConfigLoader::new()
        .with_string(
            r#"
            [validation]
            policy = "respond"

            [validation.messages]
            "number.base" = "NaN"
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap();

    let pipeline = Pipeline::builder()
        .stage(ValidationMiddleware::from_config(&config.validation).route("add", add_route()).build())
        .build();

    let outcome = run(&pipeline, "add", json!({"x": "a", "y": 1})).await;
    assert_eq!(
        outcome,
        Ok(json!({"status": "validationErrors", "errors": [{"key": "x", "value": "a", "error": "NaN"}]}))
    );
}

#[tokio::test]
async fn outer_stage_sees_validation_result() {
    let observed = Arc::new(Mutex::new(None));
    let sink = observed.clone();

    let pipeline = Pipeline::builder()
        .stage(FnMiddleware::new("observer", move |ctx, request, next| {
            let sink = sink.clone();
            Box::pin(async move {
                let outcome = next.run(ctx, request).await;
                *sink.lock().unwrap() = ctx.get_extension::<ValidationOutcome>().map(ValidationOutcome::as_str);
                outcome
            })
        }))
        .stage(ValidationMiddleware::builder().route("add", add_route()).build())
        .build();

    let _ = run(&pipeline, "add", json!({"x": "a"})).await;
    assert_eq!(*observed.lock().unwrap(), Some("rejected"));

    let _ = run(&pipeline, "add", json!({"x": 1, "y": 2})).await;
    assert_eq!(*observed.lock().unwrap(), Some("passed"));
}
