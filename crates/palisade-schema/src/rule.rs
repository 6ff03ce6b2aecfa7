//! Rule builders.
//!
//! A [`Rule`] describes the accepted shape of one value. Rules are built with
//! chained modifiers; modifiers that do not apply to a rule's type are
//! ignored, so `Rule::boolean().min(3)` is simply a boolean rule.
//!
//! ```
//! use palisade_schema::Rule;
//!
//! let point = Rule::object()
//!     .key("x", Rule::number().required())
//!     .key("y", Rule::number().required());
//!
//! let name = Rule::string().min(2).max(64).trim();
//! # let _ = (point, name);
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

/// Whether a value must, may or must not be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Presence {
    /// The value may be absent.
    #[default]
    Optional,
    /// The value must be present.
    Required,
    /// The value must be absent.
    Forbidden,
}

/// A numeric limit: either a literal or a sibling key resolved at validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    /// A literal bound.
    Value(f64),
    /// The numeric value of a sibling key in the enclosing object.
    Ref(String),
}

/// IP address versions accepted by [`Rule::ip_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
}

/// String case constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// All lowercase.
    Lower,
    /// All uppercase.
    Upper,
}

/// Format checks applied to strings, in declaration order.
#[derive(Debug, Clone)]
pub(crate) enum StringCheck {
    Alphanum,
    Token,
    Pattern { regex: Regex, name: Option<String> },
    Email,
    Uri { schemes: Vec<String> },
    Guid,
    Hex,
    Hostname,
    Ip { version: Option<IpVersion> },
    IsoDate,
    CreditCard,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StringRule {
    pub(crate) min: Option<usize>,
    pub(crate) max: Option<usize>,
    pub(crate) length: Option<usize>,
    pub(crate) checks: Vec<StringCheck>,
    pub(crate) allow_empty: bool,
    pub(crate) case: Option<Case>,
    pub(crate) trim: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NumberRule {
    pub(crate) min: Option<Limit>,
    pub(crate) max: Option<Limit>,
    pub(crate) greater: Option<Limit>,
    pub(crate) less: Option<Limit>,
    pub(crate) integer: bool,
    pub(crate) precision: Option<u32>,
    pub(crate) multiple: Option<f64>,
    pub(crate) positive: bool,
    pub(crate) negative: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DateRule {
    pub(crate) min: Option<DateTime<Utc>>,
    pub(crate) max: Option<DateTime<Utc>>,
    pub(crate) iso: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BinaryRule {
    pub(crate) min: Option<usize>,
    pub(crate) max: Option<usize>,
    pub(crate) length: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ArrayRule {
    pub(crate) items: Option<Box<Rule>>,
    pub(crate) excludes: Option<Box<Rule>>,
    pub(crate) min: Option<usize>,
    pub(crate) max: Option<usize>,
    pub(crate) length: Option<usize>,
    pub(crate) unique: bool,
    pub(crate) sparse: bool,
}

/// Options for [`Rule::rename`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    /// Allow several renames to target the same key.
    pub multiple: bool,
    /// Allow a rename to overwrite an existing key.
    pub r#override: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Rename {
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) options: RenameOptions,
}

#[derive(Debug, Clone)]
pub(crate) struct Assertion {
    pub(crate) path: String,
    pub(crate) rule: Rule,
}

/// Cross-field constraints between sibling keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PeerRule {
    /// If `key` is present, every peer must be present.
    With { key: String, peers: Vec<String> },
    /// If `key` is present, no peer may be present.
    Without { key: String, peers: Vec<String> },
    /// Either all peers are present or none is.
    And(Vec<String>),
    /// At least one peer is present.
    Or(Vec<String>),
    /// Exactly one peer is present.
    Xor(Vec<String>),
    /// Not all peers are present together.
    Nand(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectRule {
    pub(crate) keys: Option<IndexMap<String, Rule>>,
    pub(crate) min: Option<usize>,
    pub(crate) max: Option<usize>,
    pub(crate) length: Option<usize>,
    pub(crate) strip_unknown: Option<bool>,
    pub(crate) allow_unknown: Option<bool>,
    pub(crate) renames: Vec<Rename>,
    pub(crate) assertions: Vec<Assertion>,
    pub(crate) peers: Vec<PeerRule>,
}

#[derive(Debug, Clone)]
pub(crate) enum RuleKind {
    Any,
    String(StringRule),
    Number(NumberRule),
    Boolean,
    Date(DateRule),
    Binary(BinaryRule),
    Array(ArrayRule),
    Object(ObjectRule),
    Alternatives(Vec<Rule>),
}

/// A validation rule for a single value.
///
/// Type-specific modifiers only affect rules of that type and are no-ops
/// elsewhere: `Rule::number().email()` is a plain number rule. Shared
/// modifiers such as [`Rule::min`] document the types they apply to.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) kind: RuleKind,
    pub(crate) presence: Presence,
    pub(crate) default: Option<Value>,
    pub(crate) allow_null: bool,
    pub(crate) allowed: Vec<Value>,
    pub(crate) only: bool,
    pub(crate) invalid: Vec<Value>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_len(limit: f64) -> usize {
    if limit.is_sign_negative() {
        0
    } else {
        limit as usize
    }
}

impl Rule {
    fn of(kind: RuleKind) -> Self {
        Self {
            kind,
            presence: Presence::Optional,
            default: None,
            allow_null: false,
            allowed: Vec::new(),
            only: false,
            invalid: Vec::new(),
        }
    }

    /// Accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(RuleKind::Any)
    }

    /// A string rule.
    #[must_use]
    pub fn string() -> Self {
        Self::of(RuleKind::String(StringRule::default()))
    }

    /// A number rule.
    #[must_use]
    pub fn number() -> Self {
        Self::of(RuleKind::Number(NumberRule::default()))
    }

    /// A boolean rule.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(RuleKind::Boolean)
    }

    /// A date rule (RFC 3339 string or epoch milliseconds).
    #[must_use]
    pub fn date() -> Self {
        Self::of(RuleKind::Date(DateRule::default()))
    }

    /// A binary rule (base64 string).
    #[must_use]
    pub fn binary() -> Self {
        Self::of(RuleKind::Binary(BinaryRule::default()))
    }

    /// An array rule.
    #[must_use]
    pub fn array() -> Self {
        Self::of(RuleKind::Array(ArrayRule::default()))
    }

    /// An object rule. Without declared keys any key is accepted.
    #[must_use]
    pub fn object() -> Self {
        Self::of(RuleKind::Object(ObjectRule::default()))
    }

    /// An object rule with the given declared keys.
    #[must_use]
    pub fn object_with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Rule)>,
        K: Into<String>,
    {
        Self::object().keys(keys)
    }

    /// Accepts the value if any of the given rules does.
    #[must_use]
    pub fn alternatives<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Self::of(RuleKind::Alternatives(rules.into_iter().collect()))
    }

    // ------------------------------------------------------------------
    // Shared modifiers
    // ------------------------------------------------------------------

    /// The value must be present.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    /// The value may be absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// The value must be absent.
    #[must_use]
    pub fn forbidden(mut self) -> Self {
        self.presence = Presence::Forbidden;
        self
    }

    /// Value used when the key is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Accepts `null` in addition to the rule's type.
    #[must_use]
    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Accepts these values without further checks.
    #[must_use]
    pub fn allow<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed.extend(values.into_iter().map(Into::into));
        self
    }

    /// Accepts only these values.
    #[must_use]
    pub fn valid<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut rule = self.allow(values);
        rule.only = true;
        rule
    }

    /// Rejects these values.
    #[must_use]
    pub fn invalid<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.invalid.extend(values.into_iter().map(Into::into));
        self
    }

    /// Returns the rule's presence.
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    // ------------------------------------------------------------------
    // Length / range modifiers
    // ------------------------------------------------------------------

    /// Lower bound: value for numbers, length for strings, arrays, binaries,
    /// and key count for objects.
    #[must_use]
    pub fn min(mut self, limit: impl Into<f64>) -> Self {
        let limit = limit.into();
        match &mut self.kind {
            RuleKind::Number(n) => n.min = Some(Limit::Value(limit)),
            RuleKind::String(s) => s.min = Some(to_len(limit)),
            RuleKind::Binary(b) => b.min = Some(to_len(limit)),
            RuleKind::Array(a) => a.min = Some(to_len(limit)),
            RuleKind::Object(o) => o.min = Some(to_len(limit)),
            _ => {}
        }
        self
    }

    /// Upper bound; see [`Rule::min`].
    #[must_use]
    pub fn max(mut self, limit: impl Into<f64>) -> Self {
        let limit = limit.into();
        match &mut self.kind {
            RuleKind::Number(n) => n.max = Some(Limit::Value(limit)),
            RuleKind::String(s) => s.max = Some(to_len(limit)),
            RuleKind::Binary(b) => b.max = Some(to_len(limit)),
            RuleKind::Array(a) => a.max = Some(to_len(limit)),
            RuleKind::Object(o) => o.max = Some(to_len(limit)),
            _ => {}
        }
        self
    }

    /// Exact length for strings, arrays and binaries; exact key count for
    /// objects.
    #[must_use]
    pub fn length(mut self, len: usize) -> Self {
        match &mut self.kind {
            RuleKind::String(s) => s.length = Some(len),
            RuleKind::Binary(b) => b.length = Some(len),
            RuleKind::Array(a) => a.length = Some(len),
            RuleKind::Object(o) => o.length = Some(len),
            _ => {}
        }
        self
    }

    // ------------------------------------------------------------------
    // Number modifiers
    // ------------------------------------------------------------------

    fn with_number(mut self, f: impl FnOnce(&mut NumberRule)) -> Self {
        if let RuleKind::Number(n) = &mut self.kind {
            f(n);
        }
        self
    }

    /// Value must be at least the numeric value of sibling `key`.
    #[must_use]
    pub fn min_ref(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_number(|n| n.min = Some(Limit::Ref(key)))
    }

    /// Value must be at most the numeric value of sibling `key`.
    #[must_use]
    pub fn max_ref(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_number(|n| n.max = Some(Limit::Ref(key)))
    }

    /// Value must be strictly greater than `limit`.
    #[must_use]
    pub fn greater(self, limit: impl Into<f64>) -> Self {
        let limit = limit.into();
        self.with_number(|n| n.greater = Some(Limit::Value(limit)))
    }

    /// Value must be strictly greater than sibling `key`.
    #[must_use]
    pub fn greater_ref(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_number(|n| n.greater = Some(Limit::Ref(key)))
    }

    /// Value must be strictly less than `limit`.
    #[must_use]
    pub fn less(self, limit: impl Into<f64>) -> Self {
        let limit = limit.into();
        self.with_number(|n| n.less = Some(Limit::Value(limit)))
    }

    /// Value must be strictly less than sibling `key`.
    #[must_use]
    pub fn less_ref(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_number(|n| n.less = Some(Limit::Ref(key)))
    }

    /// Value must be an integer.
    #[must_use]
    pub fn integer(self) -> Self {
        self.with_number(|n| n.integer = true)
    }

    /// At most `digits` decimal places.
    #[must_use]
    pub fn precision(self, digits: u32) -> Self {
        self.with_number(|n| n.precision = Some(digits))
    }

    /// Value must be a multiple of `base`.
    #[must_use]
    pub fn multiple(self, base: impl Into<f64>) -> Self {
        let base = base.into();
        self.with_number(|n| n.multiple = Some(base))
    }

    /// Value must be greater than zero.
    #[must_use]
    pub fn positive(self) -> Self {
        self.with_number(|n| n.positive = true)
    }

    /// Value must be less than zero.
    #[must_use]
    pub fn negative(self) -> Self {
        self.with_number(|n| n.negative = true)
    }

    // ------------------------------------------------------------------
    // String modifiers
    // ------------------------------------------------------------------

    fn with_string(mut self, f: impl FnOnce(&mut StringRule)) -> Self {
        if let RuleKind::String(s) = &mut self.kind {
            f(s);
        }
        self
    }

    fn with_check(self, check: StringCheck) -> Self {
        self.with_string(|s| s.checks.push(check))
    }

    /// Accepts the empty string.
    #[must_use]
    pub fn allow_empty(self) -> Self {
        self.with_string(|s| s.allow_empty = true)
    }

    /// Only ASCII letters and digits.
    #[must_use]
    pub fn alphanum(self) -> Self {
        self.with_check(StringCheck::Alphanum)
    }

    /// Only word characters (`[A-Za-z0-9_]`).
    #[must_use]
    pub fn token(self) -> Self {
        self.with_check(StringCheck::Token)
    }

    /// Must match `regex`.
    #[must_use]
    pub fn pattern(self, regex: Regex) -> Self {
        self.with_check(StringCheck::Pattern { regex, name: None })
    }

    /// Must match `regex`; failures are reported under the pattern's name.
    #[must_use]
    pub fn named_pattern(self, regex: Regex, name: impl Into<String>) -> Self {
        self.with_check(StringCheck::Pattern {
            regex,
            name: Some(name.into()),
        })
    }

    /// Must be an email address.
    #[must_use]
    pub fn email(self) -> Self {
        self.with_check(StringCheck::Email)
    }

    /// Must be a URI with any scheme.
    #[must_use]
    pub fn uri(self) -> Self {
        self.with_check(StringCheck::Uri { schemes: Vec::new() })
    }

    /// Must be a URI using one of `schemes`.
    #[must_use]
    pub fn uri_with_schemes<I, S>(self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_check(StringCheck::Uri {
            schemes: schemes.into_iter().map(Into::into).collect(),
        })
    }

    /// Must be a GUID.
    #[must_use]
    pub fn guid(self) -> Self {
        self.with_check(StringCheck::Guid)
    }

    /// Must be hexadecimal.
    #[must_use]
    pub fn hex(self) -> Self {
        self.with_check(StringCheck::Hex)
    }

    /// Must be a hostname or IP address.
    #[must_use]
    pub fn hostname(self) -> Self {
        self.with_check(StringCheck::Hostname)
    }

    /// Must be an IP address.
    #[must_use]
    pub fn ip(self) -> Self {
        self.with_check(StringCheck::Ip { version: None })
    }

    /// Must be an IP address of the given version.
    #[must_use]
    pub fn ip_version(self, version: IpVersion) -> Self {
        self.with_check(StringCheck::Ip {
            version: Some(version),
        })
    }

    /// Must be an ISO 8601 date or date-time.
    #[must_use]
    pub fn iso_date(self) -> Self {
        self.with_check(StringCheck::IsoDate)
    }

    /// Must be a Luhn-valid card number.
    #[must_use]
    pub fn credit_card(self) -> Self {
        self.with_check(StringCheck::CreditCard)
    }

    /// Must be lowercase; converted when coercion is on.
    #[must_use]
    pub fn lowercase(self) -> Self {
        self.with_string(|s| s.case = Some(Case::Lower))
    }

    /// Must be uppercase; converted when coercion is on.
    #[must_use]
    pub fn uppercase(self) -> Self {
        self.with_string(|s| s.case = Some(Case::Upper))
    }

    /// Must have no surrounding whitespace; trimmed when coercion is on.
    #[must_use]
    pub fn trim(self) -> Self {
        self.with_string(|s| s.trim = true)
    }

    // ------------------------------------------------------------------
    // Date modifiers
    // ------------------------------------------------------------------

    fn with_date(mut self, f: impl FnOnce(&mut DateRule)) -> Self {
        if let RuleKind::Date(d) = &mut self.kind {
            f(d);
        }
        self
    }

    /// Earliest accepted date.
    #[must_use]
    pub fn min_date(self, limit: DateTime<Utc>) -> Self {
        self.with_date(|d| d.min = Some(limit))
    }

    /// Latest accepted date.
    #[must_use]
    pub fn max_date(self, limit: DateTime<Utc>) -> Self {
        self.with_date(|d| d.max = Some(limit))
    }

    /// Only ISO 8601 strings; epoch numbers are rejected.
    #[must_use]
    pub fn iso(self) -> Self {
        self.with_date(|d| d.iso = true)
    }

    // ------------------------------------------------------------------
    // Array modifiers
    // ------------------------------------------------------------------

    fn with_array(mut self, f: impl FnOnce(&mut ArrayRule)) -> Self {
        if let RuleKind::Array(a) = &mut self.kind {
            f(a);
        }
        self
    }

    /// Every item must match `rule`.
    #[must_use]
    pub fn items(self, rule: Rule) -> Self {
        self.with_array(|a| a.items = Some(Box::new(rule)))
    }

    /// No item may match `rule`.
    #[must_use]
    pub fn excludes(self, rule: Rule) -> Self {
        self.with_array(|a| a.excludes = Some(Box::new(rule)))
    }

    /// Items must be distinct.
    #[must_use]
    pub fn unique(self) -> Self {
        self.with_array(|a| a.unique = true)
    }

    /// Accepts `null` items even when the item rule does not.
    #[must_use]
    pub fn sparse(self) -> Self {
        self.with_array(|a| a.sparse = true)
    }

    // ------------------------------------------------------------------
    // Object modifiers
    // ------------------------------------------------------------------

    fn with_object(mut self, f: impl FnOnce(&mut ObjectRule)) -> Self {
        if let RuleKind::Object(o) = &mut self.kind {
            f(o);
        }
        self
    }

    /// Declares one key.
    #[must_use]
    pub fn key(self, name: impl Into<String>, rule: Rule) -> Self {
        let name = name.into();
        self.with_object(|o| {
            o.keys.get_or_insert_with(IndexMap::new).insert(name, rule);
        })
    }

    /// Declares several keys, in iteration order.
    #[must_use]
    pub fn keys<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Rule)>,
        K: Into<String>,
    {
        self.with_object(|o| {
            let map = o.keys.get_or_insert_with(IndexMap::new);
            for (name, rule) in keys {
                map.insert(name.into(), rule);
            }
        })
    }

    /// Drops undeclared keys regardless of engine options.
    ///
    /// Objects nested under this one inherit the setting unless they set
    /// their own.
    #[must_use]
    pub fn strip_unknown(self, strip: bool) -> Self {
        self.with_object(|o| o.strip_unknown = Some(strip))
    }

    /// Keeps undeclared keys regardless of engine options.
    ///
    /// Inherited by nested objects like [`Rule::strip_unknown`].
    #[must_use]
    pub fn allow_unknown(self, allow: bool) -> Self {
        self.with_object(|o| o.allow_unknown = Some(allow))
    }

    /// Moves key `from` to `to` before validation.
    #[must_use]
    pub fn rename(self, from: impl Into<String>, to: impl Into<String>, options: RenameOptions) -> Self {
        let rename = Rename {
            from: from.into(),
            to: to.into(),
            options,
        };
        self.with_object(|o| o.renames.push(rename))
    }

    /// The value at dotted `path` inside this object must match `rule`.
    #[must_use]
    pub fn assert(self, path: impl Into<String>, rule: Rule) -> Self {
        let assertion = Assertion {
            path: path.into(),
            rule,
        };
        self.with_object(|o| o.assertions.push(assertion))
    }

    /// If `key` is present, all `peers` must be present.
    #[must_use]
    pub fn with<I, S>(self, key: impl Into<String>, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peer = PeerRule::With {
            key: key.into(),
            peers: collect(peers),
        };
        self.with_object(|o| o.peers.push(peer))
    }

    /// If `key` is present, none of `peers` may be present.
    #[must_use]
    pub fn without<I, S>(self, key: impl Into<String>, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peer = PeerRule::Without {
            key: key.into(),
            peers: collect(peers),
        };
        self.with_object(|o| o.peers.push(peer))
    }

    /// All of `peers` or none of them.
    #[must_use]
    pub fn and<I, S>(self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peer = PeerRule::And(collect(peers));
        self.with_object(|o| o.peers.push(peer))
    }

    /// At least one of `peers`.
    #[must_use]
    pub fn or<I, S>(self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peer = PeerRule::Or(collect(peers));
        self.with_object(|o| o.peers.push(peer))
    }

    /// Exactly one of `peers`.
    #[must_use]
    pub fn xor<I, S>(self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peer = PeerRule::Xor(collect(peers));
        self.with_object(|o| o.peers.push(peer))
    }

    /// Not all of `peers` together.
    #[must_use]
    pub fn nand<I, S>(self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peer = PeerRule::Nand(collect(peers));
        self.with_object(|o| o.peers.push(peer))
    }

    /// Returns `true` for object rules.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, RuleKind::Object(_))
    }
}

fn collect<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
