//! Structured failure reports.
//!
//! A failed validation pass produces a [`FailureReport`]: an ordered list of
//! [`FailureDetail`]s, one per violated constraint. Each detail names the
//! violated constraint through a stable [`FailureKind`] (category plus
//! sub-rule) so that consumers never have to parse the rendered message.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The constraint category a failure belongs to.
///
/// Categories follow the rule constructors: a failure raised while checking a
/// `Rule::number()` belongs to [`Category::Number`], and so on. Presence and
/// allow-list failures that apply to every rule type belong to
/// [`Category::Any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Rules shared by every type (presence, allow/deny lists, emptiness).
    Any,
    /// Alternative rule sets.
    Alternatives,
    /// Arrays.
    Array,
    /// Base64-encoded binary payloads.
    Binary,
    /// Booleans.
    Boolean,
    /// Dates.
    Date,
    /// Functions. Never produced from JSON input; kept for vocabulary parity.
    Function,
    /// Objects and cross-field (peer) constraints.
    Object,
    /// Numbers.
    Number,
    /// Strings.
    String,
}

impl Category {
    /// Returns the lowercase category name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Alternatives => "alternatives",
            Self::Array => "array",
            Self::Binary => "binary",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Function => "function",
            Self::Object => "object",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a violated constraint.
///
/// `rule` is the sub-rule name within the category, e.g. `base`, `min` or the
/// nested `regex.name` and `rename.override`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FailureKind {
    /// Constraint category.
    pub category: Category,
    /// Sub-rule within the category.
    pub rule: &'static str,
}

impl FailureKind {
    /// Creates a failure kind.
    #[must_use]
    pub const fn new(category: Category, rule: &'static str) -> Self {
        Self { category, rule }
    }

    /// Returns `true` if this kind is the given category and rule.
    #[must_use]
    pub fn is(&self, category: Category, rule: &str) -> bool {
        self.category == category && self.rule == rule
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.category, self.rule)
    }
}

/// Extra data captured alongside a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FailureContext {
    /// The offending value, when one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Peer fields implicated by a cross-field constraint.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub peers: Vec<String>,
    /// The limit that was exceeded, for range and length rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,
}

impl FailureContext {
    /// Context carrying only the offending value.
    #[must_use]
    pub fn value(value: &Value) -> Self {
        Self {
            value: Some(value.clone()),
            ..Self::default()
        }
    }

    /// Context carrying implicated peers.
    #[must_use]
    pub fn peers<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            peers: peers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds the exceeded limit.
    #[must_use]
    pub fn with_limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDetail {
    /// Path segments from the root value to the failing value.
    pub path: Vec<String>,
    /// Which constraint failed.
    pub kind: FailureKind,
    /// Human-readable description. Diagnostic only.
    pub message: String,
    /// Failure context.
    pub context: FailureContext,
}

impl FailureDetail {
    /// Returns the path joined with `.`; empty for the root value.
    #[must_use]
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// The outcome of a failed validation pass.
///
/// Details are in the order the engine encountered them: declared keys in
/// declaration order, then unknown keys, then object-level rules.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("validation failed with {} violation(s)", details.len())]
pub struct FailureReport {
    /// The individual violations.
    pub details: Vec<FailureDetail>,
}

impl FailureReport {
    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// Whether the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Iterates over the violations in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, FailureDetail> {
        self.details.iter()
    }
}

impl<'a> IntoIterator for &'a FailureReport {
    type Item = &'a FailureDetail;
    type IntoIter = std::slice::Iter<'a, FailureDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.details.iter()
    }
}
