//! Engine failure normalization.
//!
//! Turns a [`FailureReport`] into the stable `{key, value, error}` records
//! that clients see. Normalization is total: every detail yields exactly one
//! record and nothing here can fail.

use crate::vocabulary::Vocabulary;
use palisade_schema::{FailureDetail, FailureReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key used for failures on the root value.
pub const ROOT_KEY: &str = "value";

/// Key used when a missing-peer failure implicates zero or several peers.
pub const PEER_SENTINEL: &str = "key";

const MISSING_PEER: &str = "hasMissingPeer";
const REQUIRED: &str = "required";

/// One violation in client-facing form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedError {
    /// Dotted path of the offending field.
    pub key: String,
    /// The offending value, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Domain error code, e.g. `notNumber`.
    pub error: String,
}

impl NormalizedError {
    /// Creates a record.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value,
            error: error.into(),
        }
    }
}

/// Normalizes `report` with the standard vocabulary.
///
/// # Example
///
/// ```
/// use palisade_core::normalize;
/// use palisade_schema::{EngineOptions, Rule};
/// use serde_json::json;
///
/// let request = json!({"x": "a"});
/// let rule = Rule::object().key("x", Rule::number().required());
/// let report = rule.validate(&request, &EngineOptions::default()).unwrap_err();
///
/// let errors = normalize(&request, &report);
/// assert_eq!(errors[0].key, "x");
/// assert_eq!(errors[0].error, "notNumber");
/// ```
#[must_use]
pub fn normalize(request: &Value, report: &FailureReport) -> Vec<NormalizedError> {
    normalize_with(request, report, Vocabulary::standard())
}

/// Normalizes `report` with a custom vocabulary.
#[must_use]
pub fn normalize_with(
    request: &Value,
    report: &FailureReport,
    vocabulary: &Vocabulary,
) -> Vec<NormalizedError> {
    report
        .iter()
        .map(|detail| normalize_detail(request, detail, vocabulary))
        .collect()
}

fn normalize_detail(request: &Value, detail: &FailureDetail, vocabulary: &Vocabulary) -> NormalizedError {
    let value = detail
        .context
        .value
        .as_ref()
        .filter(|v| !is_falsy(v))
        .or_else(|| lookup(request, &detail.path))
        .cloned();

    let mut key = if detail.path.is_empty() {
        ROOT_KEY.to_string()
    } else {
        detail.dotted_path()
    };
    let mut error = vocabulary.code_for(detail.kind);

    if error == MISSING_PEER {
        error = REQUIRED;
        key = match detail.context.peers.as_slice() {
            [peer] => peer.clone(),
            _ => PEER_SENTINEL.to_string(),
        };
    }

    NormalizedError {
        key,
        value,
        error: error.to_string(),
    }
}

#[allow(clippy::float_cmp)]
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Walks `path` through `request`. The root path resolves to nothing.
fn lookup<'v>(request: &'v Value, path: &[String]) -> Option<&'v Value> {
    let (first, rest) = path.split_first()?;
    let start = step(request, first)?;
    rest.iter().try_fold(start, |current, segment| step(current, segment))
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use palisade_schema::{Category, FailureContext, FailureKind};
    use proptest::prelude::*;

    fn kind() -> impl Strategy<Value = FailureKind> {
        prop::sample::select(vec![
            FailureKind::new(Category::Any, "required"),
            FailureKind::new(Category::Number, "base"),
            FailureKind::new(Category::String, "min"),
            FailureKind::new(Category::Object, "with"),
            FailureKind::new(Category::Object, "and"),
            FailureKind::new(Category::Object, "missing"),
            FailureKind::new(Category::Object, "child"),
            FailureKind::new(Category::Function, "arity"),
        ])
    }

    fn detail() -> impl Strategy<Value = FailureDetail> {
        (
            prop::collection::vec("[a-z]{1,4}", 0..3),
            kind(),
            prop::option::of("[a-z0-9]{0,6}"),
            prop::collection::vec("[a-z]{1,4}", 0..3),
        )
            .prop_map(|(path, kind, value, peers)| FailureDetail {
                path,
                kind,
                message: String::new(),
                context: FailureContext {
                    value: value.map(Value::String),
                    peers,
                    limit: None,
                },
            })
    }

    proptest! {
        /// One record per detail, in order, with a non-empty key and code.
        #[test]
        fn normalize_is_total(details in prop::collection::vec(detail(), 0..12)) {
            let request = serde_json::json!({"a": {"b": 1}, "c": [0, 1]});
            let report = FailureReport { details };
            let errors = normalize(&request, &report);

            prop_assert_eq!(errors.len(), report.len());
            for (error, detail) in errors.iter().zip(report.iter()) {
                prop_assert!(!error.key.is_empty());
                prop_assert!(!error.error.is_empty());
                prop_assert_ne!(error.error.as_str(), MISSING_PEER);
                if detail.context.peers.len() == 1 && error.error == REQUIRED
                    && !detail.kind.is(Category::Any, "required")
                {
                    prop_assert_eq!(&error.key, &detail.context.peers[0]);
                }
            }
        }
    }
}
