//! Executor configuration.
//!
//! `ExecutorConfig` holds the settings a [`RequestExecutor`](crate::net::RequestExecutor)
//! starts out with: the `User-Agent` it sends, the headers every request carries
//! and the text encoding announced on POST requests.
//!
//! `ExecutorConfig` provides defaults via [`Default`] and a fluent
//! [`ExecutorConfig::builder()`] that validates on `build()`.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use rest_reader::config::ExecutorConfig;
//! let cfg = ExecutorConfig::default();
//! assert_eq!(cfg.charset, "utf-8");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use rest_reader::config::ExecutorConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ExecutorConfig::builder()
//!     .user_agent("muzu-search/0.1")
//!     .default_header("Accept", "application/json")
//!     .build()?; // returns Result<ExecutorConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `user_agent`: Optional UA string; `None` sends the HTTP client's default.
//! - `default_headers`: Headers every request of the executor carries. They seed the
//!   executor's cumulative header set.
//! - `charset`: Value of the `charset` header on POST requests. Only UTF-8 is supported.
//!
//! The struct derives `serde` traits so callers can keep it in their own
//! configuration files; this crate never reads configuration from disk.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assembler::is_supported_charset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub user_agent: Option<String>,
    pub default_headers: BTreeMap<String, String>,
    pub charset: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("rest-reader/", env!("CARGO_PKG_VERSION")).to_string()),
            default_headers: BTreeMap::new(),
            charset: "utf-8".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// Checks a config that did not come through the builder (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self)
    }
}

/// Builder for [`ExecutorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfigBuilder {
    inner: ExecutorConfig,
}

impl ExecutorConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ExecutorConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn no_user_agent(self) -> Self { self.map(|c| c.user_agent = None) }
    pub fn charset<S: Into<String>>(self, charset: S) -> Self { self.map(|c| c.charset = charset.into()) }

    pub fn default_header<K: Into<String>, V: Into<String>>(self, name: K, value: V) -> Self {
        self.map(|c| {
            c.default_headers.insert(name.into(), value.into());
        })
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ExecutorConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ExecutorConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedCharset(String),
    EmptyHeaderName,
    EmptyUserAgent,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedCharset(c) =>
                write!(f, "charset '{c}' is not supported (expected utf-8)"),
            ConfigError::EmptyHeaderName =>
                write!(f, "default header names must not be empty"),
            ConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty; use no_user_agent() instead"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &ExecutorConfig) -> Result<(), ConfigError> {
    if !is_supported_charset(&c.charset) {
        return Err(ConfigError::UnsupportedCharset(c.charset.clone()));
    }
    if c.default_headers.keys().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::EmptyHeaderName);
    }
    if matches!(c.user_agent.as_deref(), Some(ua) if ua.trim().is_empty()) {
        return Err(ConfigError::EmptyUserAgent);
    }
    Ok(())
}
