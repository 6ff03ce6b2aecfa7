//! The validation walker.
//!
//! [`Rule::validate`] walks a JSON value against a rule tree, coercing values
//! when [`EngineOptions::convert`] is set and recording a [`FailureDetail`]
//! for every violated constraint. Checks on one value continue after a
//! failure unless [`EngineOptions::abort_early`] is set.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Number, Value};

use crate::formats;
use crate::options::EngineOptions;
use crate::report::{Category, FailureContext, FailureDetail, FailureKind, FailureReport};
use crate::rule::{
    ArrayRule, BinaryRule, Case, DateRule, Limit, NumberRule, ObjectRule, PeerRule, Presence,
    Rule, RuleKind, StringCheck, StringRule,
};

type Object = Map<String, Value>;

/// `(min, max, length)`
type Bounds = (Option<usize>, Option<usize>, Option<usize>);

impl Rule {
    /// Validates `value` and returns the coerced value.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureReport`] listing every violation (or only the first
    /// when `abort_early` is set).
    ///
    /// # Example
    ///
    /// ```
    /// use palisade_schema::{EngineOptions, Rule};
    /// use serde_json::json;
    ///
    /// let rule = Rule::object().key("x", Rule::number().required());
    /// let value = rule.validate(&json!({"x": "3"}), &EngineOptions::default()).unwrap();
    /// assert_eq!(value, json!({"x": 3}));
    /// ```
    pub fn validate(&self, value: &Value, options: &EngineOptions) -> Result<Value, FailureReport> {
        let mut walker = Walker::new(options);
        let mut path = Vec::new();
        let coerced = walker.visit(self, Some(value), &mut path, None);

        if walker.details.is_empty() {
            Ok(coerced.unwrap_or(Value::Null))
        } else {
            Err(FailureReport {
                details: walker.details,
            })
        }
    }
}

/// Handling of undeclared object keys. An object that sets either flag
/// passes it down to the objects nested inside it.
#[derive(Debug, Clone, Copy)]
struct UnknownKeys {
    strip: bool,
    allow: bool,
}

struct Walker<'o> {
    opts: &'o EngineOptions,
    unknown: UnknownKeys,
    details: Vec<FailureDetail>,
}

impl<'o> Walker<'o> {
    fn new(opts: &'o EngineOptions) -> Self {
        Self {
            opts,
            unknown: UnknownKeys {
                strip: opts.strip_unknown,
                allow: opts.allow_unknown,
            },
            details: Vec::new(),
        }
    }

    /// A scratch walker sharing this walker's options and key scope.
    fn fork(&self) -> Self {
        Self {
            opts: self.opts,
            unknown: self.unknown,
            details: Vec::new(),
        }
    }

    fn halted(&self) -> bool {
        self.opts.abort_early && !self.details.is_empty()
    }

    fn fail(&mut self, path: &[String], category: Category, rule: &'static str, context: FailureContext) {
        if self.halted() {
            return;
        }
        let kind = FailureKind::new(category, rule);
        let label = path.last().map_or("value", String::as_str);
        self.details.push(FailureDetail {
            path: path.to_vec(),
            kind,
            message: describe(kind, label, &context),
            context,
        });
    }

    /// Runs `rule` against `value` on a scratch walker; `true` if it passes.
    fn matches(&self, rule: &Rule, value: Option<&Value>) -> bool {
        let mut scratch = self.fork();
        scratch.visit(rule, value, &mut Vec::new(), None);
        scratch.details.is_empty()
    }

    fn visit(
        &mut self,
        rule: &Rule,
        value: Option<&Value>,
        path: &mut Vec<String>,
        siblings: Option<&Object>,
    ) -> Option<Value> {
        let Some(value) = value else {
            if rule.presence == Presence::Required {
                self.fail(path, Category::Any, "required", FailureContext::default());
                return None;
            }
            return rule.default.clone();
        };

        if rule.presence == Presence::Forbidden {
            self.fail(path, Category::Any, "unknown", FailureContext::value(value));
            return None;
        }
        if value.is_null() && rule.allow_null {
            return Some(Value::Null);
        }
        if rule.allowed.contains(value) {
            return Some(value.clone());
        }
        if rule.invalid.contains(value) {
            let ctx = FailureContext::value(value).with_limit(rule.invalid.clone());
            self.fail(path, Category::Any, "invalid", ctx);
            return Some(value.clone());
        }
        if rule.only {
            let ctx = FailureContext::value(value).with_limit(rule.allowed.clone());
            self.fail(path, Category::Any, "allowOnly", ctx);
            return Some(value.clone());
        }

        let coerced = match &rule.kind {
            RuleKind::Any => value.clone(),
            RuleKind::String(r) => self.string(r, value, path),
            RuleKind::Number(r) => self.number(r, value, path, siblings),
            RuleKind::Boolean => self.boolean(value, path),
            RuleKind::Date(r) => self.date(r, value, path),
            RuleKind::Binary(r) => self.binary(r, value, path),
            RuleKind::Array(r) => self.array(r, value, path),
            RuleKind::Object(r) => self.object(r, value, path),
            RuleKind::Alternatives(rules) => self.alternatives(rules, value, path),
        };
        Some(coerced)
    }

    fn check_len(&mut self, path: &[String], category: Category, actual: usize, bounds: Bounds, value: &Value) {
        let (min, max, length) = bounds;
        if let Some(min) = min.filter(|&m| actual < m) {
            self.fail(path, category, "min", FailureContext::value(value).with_limit(min));
        }
        if let Some(max) = max.filter(|&m| actual > m) {
            self.fail(path, category, "max", FailureContext::value(value).with_limit(max));
        }
        if let Some(len) = length.filter(|&l| actual != l) {
            self.fail(path, category, "length", FailureContext::value(value).with_limit(len));
        }
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    fn string(&mut self, rule: &StringRule, value: &Value, path: &[String]) -> Value {
        let Value::String(raw) = value else {
            self.fail(path, Category::String, "base", FailureContext::value(value));
            return value.clone();
        };

        let mut s = raw.clone();
        if self.opts.convert {
            if rule.trim {
                s = s.trim().to_string();
            }
            match rule.case {
                Some(Case::Lower) => s = s.to_lowercase(),
                Some(Case::Upper) => s = s.to_uppercase(),
                None => {}
            }
        }

        if s.is_empty() {
            if !rule.allow_empty {
                self.fail(path, Category::Any, "empty", FailureContext::value(value));
            }
            return Value::String(s);
        }

        let chars = s.chars().count();
        self.check_len(path, Category::String, chars, (rule.min, rule.max, rule.length), value);

        if !self.opts.convert {
            if rule.trim && s.trim() != s {
                self.fail(path, Category::String, "trim", FailureContext::value(value));
            }
            match rule.case {
                Some(Case::Lower) if s.to_lowercase() != s => {
                    self.fail(path, Category::String, "lowercase", FailureContext::value(value));
                }
                Some(Case::Upper) if s.to_uppercase() != s => {
                    self.fail(path, Category::String, "uppercase", FailureContext::value(value));
                }
                _ => {}
            }
        }

        for check in &rule.checks {
            if self.halted() {
                break;
            }
            self.string_check(check, &s, value, path);
        }

        Value::String(s)
    }

    fn string_check(&mut self, check: &StringCheck, s: &str, value: &Value, path: &[String]) {
        let ctx = || FailureContext::value(value);
        match check {
            StringCheck::Alphanum if !formats::is_alphanum(s) => {
                self.fail(path, Category::String, "alphanum", ctx());
            }
            StringCheck::Token if !formats::is_token(s) => {
                self.fail(path, Category::String, "token", ctx());
            }
            StringCheck::Pattern { regex, name } if !regex.is_match(s) => match name {
                Some(name) => {
                    let ctx = ctx().with_limit(name.clone());
                    self.fail(path, Category::String, "regex.name", ctx);
                }
                None => {
                    let ctx = ctx().with_limit(regex.as_str());
                    self.fail(path, Category::String, "regex.base", ctx);
                }
            },
            StringCheck::Email if !formats::is_email(s) => {
                self.fail(path, Category::String, "email", ctx());
            }
            StringCheck::Uri { schemes } => match formats::uri_scheme(s) {
                None => self.fail(path, Category::String, "uri", ctx()),
                Some(scheme)
                    if !schemes.is_empty()
                        && !schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)) =>
                {
                    let ctx = ctx().with_limit(schemes.clone());
                    self.fail(path, Category::String, "uriCustomScheme", ctx);
                }
                Some(_) => {}
            },
            StringCheck::Guid if !formats::is_guid(s) => {
                self.fail(path, Category::String, "guid", ctx());
            }
            StringCheck::Hex if !formats::is_hex(s) => {
                self.fail(path, Category::String, "hex", ctx());
            }
            StringCheck::Hostname if !formats::is_hostname(s) => {
                self.fail(path, Category::String, "hostname", ctx());
            }
            StringCheck::Ip { version } => match (formats::ip_version(s), version) {
                (None, _) => self.fail(path, Category::String, "ip", ctx()),
                (Some(found), Some(wanted)) if found != *wanted => {
                    self.fail(path, Category::String, "ipVersion", ctx());
                }
                _ => {}
            },
            StringCheck::IsoDate if !formats::is_iso_date(s) => {
                self.fail(path, Category::String, "isoDate", ctx());
            }
            StringCheck::CreditCard if !formats::is_credit_card(s) => {
                self.fail(path, Category::String, "creditCard", ctx());
            }
            _ => {}
        }
    }

    fn number(
        &mut self,
        rule: &NumberRule,
        value: &Value,
        path: &[String],
        siblings: Option<&Object>,
    ) -> Value {
        let coerced = match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) if self.opts.convert => parse_number(s),
            _ => None,
        };
        let Some((n, coerced)) = coerced.and_then(|v| v.as_f64().map(|n| (n, v))) else {
            self.fail(path, Category::Number, "base", FailureContext::value(value));
            return value.clone();
        };

        if rule.integer && n.fract().abs() > 0.0 {
            self.fail(path, Category::Number, "integer", FailureContext::value(value));
        }

        let bounds: [(&Option<Limit>, &'static str, fn(f64, f64) -> bool); 4] = [
            (&rule.min, "min", |n, l| n < l),
            (&rule.max, "max", |n, l| n > l),
            (&rule.greater, "greater", |n, l| n <= l),
            (&rule.less, "less", |n, l| n >= l),
        ];
        for (limit, name, violates) in bounds {
            let Some(limit) = limit else { continue };
            if let Some(bound) = self.resolve_limit(limit, siblings, path) {
                if violates(n, bound) {
                    let ctx = FailureContext::value(value).with_limit(bound);
                    self.fail(path, Category::Number, name, ctx);
                }
            }
        }

        if let Some(digits) = rule.precision {
            if u32::try_from(decimal_places(n)).unwrap_or(u32::MAX) > digits {
                let ctx = FailureContext::value(value).with_limit(digits);
                self.fail(path, Category::Number, "precision", ctx);
            }
        }
        if let Some(base) = rule.multiple.filter(|b| b.abs() > 0.0) {
            if (n % base).abs() > f64::EPSILON {
                let ctx = FailureContext::value(value).with_limit(base);
                self.fail(path, Category::Number, "multiple", ctx);
            }
        }
        if rule.positive && n <= 0.0 {
            self.fail(path, Category::Number, "positive", FailureContext::value(value));
        }
        if rule.negative && n >= 0.0 {
            self.fail(path, Category::Number, "negative", FailureContext::value(value));
        }

        coerced
    }

    fn resolve_limit(&mut self, limit: &Limit, siblings: Option<&Object>, path: &[String]) -> Option<f64> {
        match limit {
            Limit::Value(v) => Some(*v),
            Limit::Ref(key) => {
                let resolved = siblings.and_then(|s| s.get(key)).and_then(|v| match v {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) if self.opts.convert => parse_number(s).and_then(|v| v.as_f64()),
                    _ => None,
                });
                if resolved.is_none() {
                    let ctx = FailureContext::default().with_limit(key.clone());
                    self.fail(path, Category::Number, "ref", ctx);
                }
                resolved
            }
        }
    }

    fn boolean(&mut self, value: &Value, path: &[String]) -> Value {
        match value {
            Value::Bool(_) => value.clone(),
            Value::String(s) if self.opts.convert => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Value::Bool(true),
                "false" | "no" => Value::Bool(false),
                _ => {
                    self.fail(path, Category::Boolean, "base", FailureContext::value(value));
                    value.clone()
                }
            },
            _ => {
                self.fail(path, Category::Boolean, "base", FailureContext::value(value));
                value.clone()
            }
        }
    }

    fn date(&mut self, rule: &DateRule, value: &Value, path: &[String]) -> Value {
        let parsed = match value {
            Value::String(s) => parse_date(s),
            Value::Number(n) if !rule.iso => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        };
        let Some(date) = parsed.filter(|d| (0..=9999).contains(&d.year())) else {
            let rule_name = if rule.iso { "isoDate" } else { "base" };
            self.fail(path, Category::Date, rule_name, FailureContext::value(value));
            return value.clone();
        };

        if let Some(min) = rule.min.filter(|m| date < *m) {
            let ctx = FailureContext::value(value).with_limit(format_date(&min));
            self.fail(path, Category::Date, "min", ctx);
        }
        if let Some(max) = rule.max.filter(|m| date > *m) {
            let ctx = FailureContext::value(value).with_limit(format_date(&max));
            self.fail(path, Category::Date, "max", ctx);
        }

        if self.opts.convert {
            Value::String(format_date(&date))
        } else {
            value.clone()
        }
    }

    fn binary(&mut self, rule: &BinaryRule, value: &Value, path: &[String]) -> Value {
        let decoded = match value {
            Value::String(s) => STANDARD.decode(s).ok(),
            _ => None,
        };
        let Some(bytes) = decoded else {
            self.fail(path, Category::Binary, "base", FailureContext::value(value));
            return value.clone();
        };

        self.check_len(path, Category::Binary, bytes.len(), (rule.min, rule.max, rule.length), value);
        value.clone()
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    fn array(&mut self, rule: &ArrayRule, value: &Value, path: &mut Vec<String>) -> Value {
        let items = match value {
            Value::Array(items) => Some(items.clone()),
            Value::String(s) if self.opts.convert => match serde_json::from_str(s) {
                Ok(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        };
        let Some(items) = items else {
            self.fail(path, Category::Array, "base", FailureContext::value(value));
            return value.clone();
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if self.halted() {
                break;
            }
            path.push(index.to_string());
            let mut kept = item.clone();

            if let Some(item_rule) = &rule.items {
                if item.is_null() && !item_rule.allow_null && !rule.sparse {
                    self.fail(path, Category::Array, "sparse", FailureContext::value(item));
                } else {
                    let mark = self.details.len();
                    let coerced = self.visit(item_rule, Some(item), path, None);
                    if self.details.len() > mark {
                        self.details.truncate(mark);
                        self.fail(path, Category::Array, "includesOne", FailureContext::value(item));
                    } else if let Some(coerced) = coerced {
                        kept = coerced;
                    }
                }
            }
            if let Some(excluded) = &rule.excludes {
                if self.matches(excluded, Some(item)) {
                    self.fail(path, Category::Array, "excludes", FailureContext::value(item));
                }
            }

            path.pop();
            out.push(kept);
        }

        if rule.unique {
            for index in 1..out.len() {
                if out[..index].contains(&out[index]) {
                    path.push(index.to_string());
                    self.fail(path, Category::Array, "unique", FailureContext::value(&out[index]));
                    path.pop();
                }
            }
        }

        self.check_len(path, Category::Array, out.len(), (rule.min, rule.max, rule.length), value);
        Value::Array(out)
    }

    fn object(&mut self, rule: &ObjectRule, value: &Value, path: &mut Vec<String>) -> Value {
        let source = match value {
            Value::Object(map) => Some(map.clone()),
            Value::String(s) if self.opts.convert => match serde_json::from_str(s) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        };
        let Some(mut map) = source else {
            self.fail(path, Category::Object, "base", FailureContext::value(value));
            return value.clone();
        };

        self.apply_renames(rule, &mut map, path);

        let scope = UnknownKeys {
            strip: rule.strip_unknown.unwrap_or(self.unknown.strip),
            allow: rule.allow_unknown.unwrap_or(self.unknown.allow),
        };
        let outer = std::mem::replace(&mut self.unknown, scope);

        let out = match &rule.keys {
            None => map.clone(),
            Some(keys) => {
                let mut out = Object::new();
                for (name, child) in keys {
                    if self.halted() {
                        break;
                    }
                    path.push(name.clone());
                    if let Some(v) = self.visit(child, map.get(name), path, Some(&map)) {
                        out.insert(name.clone(), v);
                    }
                    path.pop();
                }

                for (name, v) in map.iter().filter(|(name, _)| !keys.contains_key(*name)) {
                    if scope.strip {
                        continue;
                    }
                    if scope.allow {
                        out.insert(name.clone(), v.clone());
                        continue;
                    }
                    if self.halted() {
                        break;
                    }
                    path.push(name.clone());
                    self.fail(path, Category::Object, "allowUnknown", FailureContext::value(v));
                    path.pop();
                }
                out
            }
        };

        self.check_len(path, Category::Object, out.len(), (rule.min, rule.max, rule.length), value);

        for peer in &rule.peers {
            if self.halted() {
                break;
            }
            self.check_peer(peer, &out, path);
        }
        for assertion in &rule.assertions {
            if self.halted() {
                break;
            }
            let target = lookup(&out, &assertion.path);
            if !self.matches(&assertion.rule, target) {
                let mut at = path.clone();
                at.extend(assertion.path.split('.').map(str::to_string));
                let ctx = FailureContext {
                    value: target.cloned(),
                    ..FailureContext::default()
                }
                .with_limit(assertion.path.clone());
                self.fail(&at, Category::Object, "assert", ctx);
            }
        }

        self.unknown = outer;
        Value::Object(out)
    }

    fn apply_renames(&mut self, rule: &ObjectRule, map: &mut Object, path: &mut Vec<String>) {
        let mut targets: Vec<&str> = Vec::new();
        for rename in &rule.renames {
            let Some(moved) = map.remove(&rename.from) else {
                continue;
            };

            let conflict = if targets.contains(&rename.to.as_str()) && !rename.options.multiple {
                Some("rename.multiple")
            } else if map.contains_key(&rename.to) && !rename.options.r#override {
                Some("rename.override")
            } else {
                None
            };

            if let Some(conflict) = conflict {
                path.push(rename.from.clone());
                let ctx = FailureContext::value(&moved).with_limit(rename.to.clone());
                self.fail(path, Category::Object, conflict, ctx);
                path.pop();
                map.insert(rename.from.clone(), moved);
                continue;
            }

            map.insert(rename.to.clone(), moved);
            targets.push(&rename.to);
        }
    }

    fn check_peer(&mut self, peer: &PeerRule, out: &Object, path: &mut Vec<String>) {
        let present = |key: &str| out.contains_key(key);

        match peer {
            PeerRule::With { key, peers } if present(key.as_str()) => {
                for missing in peers.iter().filter(|p| !present(p.as_str())) {
                    path.push(key.clone());
                    self.fail(path, Category::Object, "with", FailureContext::peers([missing]));
                    path.pop();
                }
            }
            PeerRule::Without { key, peers } if present(key.as_str()) => {
                for clashing in peers.iter().filter(|p| present(p.as_str())) {
                    path.push(key.clone());
                    self.fail(path, Category::Object, "without", FailureContext::peers([clashing]));
                    path.pop();
                }
            }
            PeerRule::And(peers) => {
                let missing: Vec<&String> = peers.iter().filter(|p| !present(p.as_str())).collect();
                if !missing.is_empty() && missing.len() < peers.len() {
                    self.fail(path, Category::Object, "and", FailureContext::peers(missing));
                }
            }
            PeerRule::Or(peers) => {
                if !peers.iter().any(|p| present(p.as_str())) {
                    self.fail(path, Category::Object, "or", FailureContext::peers(peers));
                }
            }
            PeerRule::Xor(peers) => {
                let found: Vec<&String> = peers.iter().filter(|p| present(p.as_str())).collect();
                match found.len() {
                    0 => self.fail(path, Category::Object, "missing", FailureContext::peers(peers)),
                    1 => {}
                    _ => self.fail(path, Category::Object, "xor", FailureContext::peers(found)),
                }
            }
            PeerRule::Nand(peers) => {
                if !peers.is_empty() && peers.iter().all(|p| present(p.as_str())) {
                    self.fail(path, Category::Object, "nand", FailureContext::peers(peers));
                }
            }
            _ => {}
        }
    }

    fn alternatives(&mut self, rules: &[Rule], value: &Value, path: &[String]) -> Value {
        for rule in rules {
            let mut scratch = self.fork();
            let coerced = scratch.visit(rule, Some(value), &mut path.to_vec(), None);
            if scratch.details.is_empty() {
                return coerced.unwrap_or_else(|| value.clone());
            }
        }
        self.fail(path, Category::Alternatives, "base", FailureContext::value(value));
        value.clone()
    }
}

/// Looks up a dotted path inside an object.
fn lookup<'v>(object: &'v Object, dotted: &str) -> Option<&'v Value> {
    let mut segments = dotted.split('.');
    let first = object.get(segments.next()?)?;
    segments.try_fold(first, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn decimal_places(n: f64) -> usize {
    let rendered = n.to_string();
    rendered.split_once('.').map_or(0, |(_, frac)| frac.len())
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

const fn type_noun(category: Category) -> &'static str {
    match category {
        Category::Any => "a value",
        Category::Alternatives => "one of the allowed alternatives",
        Category::Array => "an array",
        Category::Binary => "a base64 string",
        Category::Boolean => "a boolean",
        Category::Date => "a valid date",
        Category::Function => "a function",
        Category::Object => "an object",
        Category::Number => "a number",
        Category::String => "a string",
    }
}

fn describe(kind: FailureKind, label: &str, ctx: &FailureContext) -> String {
    let limit = ctx
        .limit
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let peers = ctx.peers.join(", ");

    let text = match (kind.category, kind.rule) {
        (Category::Any, "required") => "is required".to_string(),
        (Category::Any, "unknown") => "is not allowed".to_string(),
        (Category::Any, "empty") => "is not allowed to be empty".to_string(),
        (Category::Any, "invalid") => "contains an invalid value".to_string(),
        (Category::Any, "allowOnly") => format!("must be one of {limit}"),
        (category, "base") => format!("must be {}", type_noun(category)),
        (_, "min") => format!("must be at least {limit}"),
        (_, "max") => format!("must be at most {limit}"),
        (_, "length") => format!("must have length {limit}"),
        (Category::Number, "greater") => format!("must be greater than {limit}"),
        (Category::Number, "less") => format!("must be less than {limit}"),
        (Category::Number, "ref") => format!("references {limit} which is not a number"),
        (Category::Object, "with" | "and") => format!("is missing required peer {peers}"),
        (Category::Object, "without") => format!("conflicts with forbidden peer {peers}"),
        (Category::Object, "or" | "missing") => format!("must contain at least one of {peers}"),
        (Category::Object, "xor" | "nand") => format!("contains a conflict between exclusive peers {peers}"),
        (Category::Object, "allowUnknown") => "is not allowed".to_string(),
        (Category::Array, "includesOne") => "contains an invalid item".to_string(),
        _ => format!("failed {kind}"),
    };

    format!("\"{label}\" {text}")
}
