//! Handler resolution policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How error handler results are turned into an action outcome.
///
/// # Example
///
/// ```
/// use palisade_core::HandlerPolicy;
///
/// let policy: HandlerPolicy = "respond".parse().unwrap();
/// assert_eq!(policy, HandlerPolicy::Respond);
/// assert_eq!(HandlerPolicy::default(), HandlerPolicy::Bubble);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerPolicy {
    /// Handlers may resolve, decline or replace the error; an unresolved
    /// error is returned to the caller.
    #[default]
    Bubble,
    /// The route handler is only notified; the global handler may supply a
    /// response, otherwise the standard body is returned. Never fails.
    Respond,
}

impl HandlerPolicy {
    /// Returns the lowercase policy name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Respond => "respond",
        }
    }
}

impl fmt::Display for HandlerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown handler policy '{0}' (expected 'bubble' or 'respond')")]
pub struct UnknownPolicy(pub String);

impl FromStr for HandlerPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bubble" => Ok(Self::Bubble),
            "respond" => Ok(Self::Respond),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}
