//! Failure kind to error code vocabulary.
//!
//! The vocabulary maps a structured failure kind (`category.rule`) to the
//! short domain code that ends up in [`NormalizedError::error`]. The default
//! table is fixed; callers layer overrides on top with
//! [`Vocabulary::with_overrides`].
//!
//! [`NormalizedError::error`]: crate::NormalizedError::error

use indexmap::IndexMap;
use palisade_schema::FailureKind;
use std::sync::OnceLock;

/// Code used when a kind has no usable vocabulary entry.
pub const UNKNOWN_ERROR: &str = "unknownError";

/// The default table. Entries are reproduced as clients have always seen
/// them, including `array.max` mapping to `minLength` and `binary.min` to
/// `minLenth`.
const DEFAULT_CODES: &[(&str, &str)] = &[
    ("any.unknown", "notAllowed"),
    ("any.invalid", "invalid"),
    ("any.empty", "cannotBeEmpty"),
    ("any.required", "required"),
    ("any.allowOnly", "notInWhiteList"),
    ("any.default", "internalError"),
    ("alternatives.base", "invalid"),
    ("array.base", "notArray"),
    ("array.includes", "containsInvalidValue"),
    ("array.includesSingle", "containsInvalidValue"),
    ("array.includesOne", "containsInvalidValue"),
    ("array.includesOneSingle", "containsInvalidValue"),
    ("array.includesRequiredUnknowns", "missingRequiredValue"),
    ("array.includesRequiredKnowns", "missingRequiredValue"),
    ("array.includesRequiredBoth", "missingRequiredValue"),
    ("array.excludes", "includesBlackListedValues"),
    ("array.excludesSingle", "includesBlackListedValues"),
    ("array.min", "minLength"),
    ("array.max", "minLength"),
    ("array.length", "exactLength"),
    ("array.sparse", "containsInvalidValue"),
    ("array.unique", "containsDuplicates"),
    ("boolean.base", "notBoolean"),
    ("binary.base", "notBinary"),
    ("binary.min", "minLenth"),
    ("binary.max", "maxLength"),
    ("binary.length", "exactLength"),
    ("date.base", "notDate"),
    ("date.min", "minValue"),
    ("date.max", "maxValue"),
    ("date.isoDate", "wrongFormat"),
    ("date.ref", "wrongType"),
    ("function.base", "notFunction"),
    ("object.base", "notObject"),
    ("object.child", "{{reason}}"),
    ("object.min", "minLength"),
    ("object.max", "maxLength"),
    ("object.length", "exactLength"),
    ("object.allowUnknown", "containsInvalidValue"),
    ("object.with", "hasMissingPeer"),
    ("object.without", "hasConflictWithForbiddenPeer"),
    ("object.missing", "hasMissingPeer"),
    ("object.xor", "hasConflictWithExclusivePeer"),
    ("object.or", "mustContainAtLeastOnePeer"),
    ("object.and", "hasMissingPeer"),
    ("object.nand", "hasConflictWithExclusivePeer"),
    ("object.assert", "internalError"),
    ("object.rename.multiple", "internalError"),
    ("object.rename.override", "internalError"),
    ("object.type", "wrongType"),
    ("number.base", "notNumber"),
    ("number.min", "minValue"),
    ("number.max", "maxValue"),
    ("number.less", "maxValue"),
    ("number.greater", "minValue"),
    ("number.float", "notFloat"),
    ("number.integer", "notInt"),
    ("number.negative", "notNegative"),
    ("number.positive", "notPositive"),
    ("number.precision", "hasTooManyDecimals"),
    ("number.ref", "internalError"),
    ("number.multiple", "notMultipleOf"),
    ("string.base", "notString"),
    ("string.min", "minLength"),
    ("string.max", "maxLength"),
    ("string.length", "exactLength"),
    ("string.alphanum", "notAlphaNum"),
    ("string.token", "notAToken"),
    ("string.regex.base", "doesNotMatch"),
    ("string.regex.name", "doesNotMatch"),
    ("string.email", "notEmail"),
    ("string.uri", "notURI"),
    ("string.uriCustomScheme", "notScheme"),
    ("string.isoDate", "notIsoDate"),
    ("string.guid", "notGUID"),
    ("string.hex", "notHex"),
    ("string.hostname", "notHostname"),
    ("string.lowercase", "notLowercase"),
    ("string.uppercase", "notUppercase"),
    ("string.trim", "notTrimmed"),
    ("string.creditCard", "notCreditCard"),
    ("string.ref", "internalError"),
    ("string.ip", "notIP"),
    ("string.ipVersion", "notIP"),
];

/// Mapping from `category.rule` to domain error code.
///
/// # Example
///
/// ```
/// use palisade_core::Vocabulary;
/// use palisade_schema::{Category, FailureKind};
///
/// let vocab = Vocabulary::default().with_overrides([("number.base", "mustBeNumeric")]);
/// assert_eq!(vocab.code_for(FailureKind::new(Category::Number, "base")), "mustBeNumeric");
/// assert_eq!(vocab.code_for(FailureKind::new(Category::String, "base")), "notString");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    codes: IndexMap<String, String>,
}

impl Vocabulary {
    /// The shared default vocabulary.
    #[must_use]
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<Vocabulary> = OnceLock::new();
        STANDARD.get_or_init(Self::default)
    }

    /// Returns a copy with `overrides` layered over this vocabulary.
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (kind, code) in overrides {
            self.codes.insert(kind.into(), code.into());
        }
        self
    }

    /// Returns the raw entry for a `category.rule` name.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&str> {
        self.codes.get(kind).map(String::as_str)
    }

    /// Returns `true` if the vocabulary has an entry for `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.codes.contains_key(kind)
    }

    /// Returns the error code for a failure kind.
    ///
    /// Missing entries and entries that are not a single identifier (such as
    /// the `object.child` template) yield [`UNKNOWN_ERROR`].
    #[must_use]
    pub fn code_for(&self, kind: FailureKind) -> &str {
        self.get(&kind.to_string())
            .filter(|code| is_identifier(code))
            .unwrap_or(UNKNOWN_ERROR)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates over `(kind, code)` entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            codes: DEFAULT_CODES
                .iter()
                .map(|(kind, code)| ((*kind).to_string(), (*code).to_string()))
                .collect(),
        }
    }
}

fn is_identifier(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
