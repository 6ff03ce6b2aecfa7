//! Reference scenarios through the public facade.

use palisade::prelude::*;
use palisade::telemetry::{init_metrics, render_metrics, MetricsConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn add_schema() -> RouteValidation {
    RouteValidation::fields([("x", Rule::number().required()), ("y", Rule::number().required())])
}

/// Runs `add` and returns the outcome plus whatever payload the action saw.
async fn invoke_add(validation: ValidationMiddleware, request: Value) -> (Outcome, Option<Value>) {
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let pipeline = Pipeline::builder().stage(validation).build();

    let outcome = pipeline
        .invoke(ActionContext::new("add"), request, move |_ctx, req| {
            *sink.lock().unwrap() = Some(req.clone());
            Box::pin(async move { Ok(json!({"sum": req["x"].as_f64().unwrap_or(0.0) + req["y"].as_f64().unwrap_or(0.0)})) })
        })
        .await;

    let seen = seen.lock().unwrap().clone();
    (outcome, seen)
}

#[tokio::test]
async fn scenario_valid_request_reaches_action() {
    let validation = ValidationMiddleware::builder().route("add", add_schema()).build();

    let (outcome, seen) = invoke_add(validation, json!({"x": 3, "y": 4})).await;
    assert_eq!(seen, Some(json!({"x": 3, "y": 4})));
    assert_eq!(outcome, Ok(json!({"sum": 7.0})));
}

#[tokio::test]
async fn scenario_invalid_request_bubbles() {
    let validation = ValidationMiddleware::builder().route("add", add_schema()).build();

    let (outcome, seen) = invoke_add(validation, json!({"x": "a", "y": "b"})).await;
    assert_eq!(seen, None);
    assert_eq!(
        outcome,
        Err(ActionError::validation(vec![
            NormalizedError::new("x", Some(json!("a")), "notNumber"),
            NormalizedError::new("y", Some(json!("b")), "notNumber"),
        ]))
    );
}

#[tokio::test]
async fn scenario_invalid_request_responds() {
    let validation = ValidationMiddleware::builder()
        .policy(HandlerPolicy::Respond)
        .route("add", add_schema())
        .build();

    let (outcome, seen) = invoke_add(validation, json!({"x": "a", "y": "b"})).await;
    assert_eq!(seen, None);
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
async fn scenario_configured_from_environment() {
    std::env::set_var("PALISADE_SCENARIO__VALIDATION__POLICY", "respond");
    let config = ConfigLoader::new().with_env_prefix("PALISADE_SCENARIO").load().unwrap();
    let validation = ValidationMiddleware::from_config(&config.validation)
        .route("add", add_schema())
        .build();

    let (outcome, _) = invoke_add(validation, json!({})).await;
    assert_eq!(outcome.unwrap()["errors"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn metrics_are_rendered_after_validation() {
    init_metrics(&MetricsConfig::default()).unwrap();
    let validation = ValidationMiddleware::builder().route("add", add_schema()).build();

    let _ = invoke_add(validation, json!({"x": "a", "y": 2})).await;

    let rendered = render_metrics().unwrap();
    assert!(rendered.contains("palisade_validations_total"));
    assert!(rendered.contains("palisade_validation_errors_total"));
}
