//! Typed configuration for Palisade.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [validation]
//! policy = "bubble"        # or "respond"
//! abort_early = false
//! convert = true
//! strip_unknown = false
//! allow_unknown = false
//!
//! [validation.messages]
//! "number.base" = "mustBeNumeric"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"          # or "pretty"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Scalar values can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `PALISADE__VALIDATION__POLICY=respond`
//! - `PALISADE__VALIDATION__ABORT_EARLY=true`
//! - `PALISADE__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/palisade-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod sections;

pub use config::PalisadeConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use sections::{LogFormat, LoggingConfig, ValidationConfig};
