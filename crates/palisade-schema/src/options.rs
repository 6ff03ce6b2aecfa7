//! Engine options.
//!
//! [`EngineOptions`] is an immutable value. Per-route tweaks are expressed as
//! [`EngineOverrides`] and applied with [`EngineOptions::merged`], which
//! returns a new value and leaves the defaults untouched.

use serde::{Deserialize, Serialize};

/// Options controlling a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Stop at the first violation instead of collecting all of them.
    pub abort_early: bool,

    /// Coerce values to the type a rule expects (e.g. `"3"` to `3`).
    pub convert: bool,

    /// Drop object keys that no rule declares.
    pub strip_unknown: bool,

    /// Keep undeclared object keys instead of reporting them.
    pub allow_unknown: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            abort_early: false,
            convert: true,
            strip_unknown: false,
            allow_unknown: false,
        }
    }
}

impl EngineOptions {
    /// Returns a copy with the set fields of `overrides` applied.
    #[must_use]
    pub fn merged(&self, overrides: &EngineOverrides) -> Self {
        Self {
            abort_early: overrides.abort_early.unwrap_or(self.abort_early),
            convert: overrides.convert.unwrap_or(self.convert),
            strip_unknown: overrides.strip_unknown.unwrap_or(self.strip_unknown),
            allow_unknown: overrides.allow_unknown.unwrap_or(self.allow_unknown),
        }
    }
}

/// Partial engine options; unset fields inherit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOverrides {
    /// Override for [`EngineOptions::abort_early`].
    pub abort_early: Option<bool>,
    /// Override for [`EngineOptions::convert`].
    pub convert: Option<bool>,
    /// Override for [`EngineOptions::strip_unknown`].
    pub strip_unknown: Option<bool>,
    /// Override for [`EngineOptions::allow_unknown`].
    pub allow_unknown: Option<bool>,
}

impl EngineOverrides {
    /// Sets `abort_early`.
    #[must_use]
    pub fn abort_early(mut self, value: bool) -> Self {
        self.abort_early = Some(value);
        self
    }

    /// Sets `convert`.
    #[must_use]
    pub fn convert(mut self, value: bool) -> Self {
        self.convert = Some(value);
        self
    }

    /// Sets `strip_unknown`.
    #[must_use]
    pub fn strip_unknown(mut self, value: bool) -> Self {
        self.strip_unknown = Some(value);
        self
    }

    /// Sets `allow_unknown`.
    #[must_use]
    pub fn allow_unknown(mut self, value: bool) -> Self {
        self.allow_unknown = Some(value);
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
