//! Hook configuration.
//!
//! `HookConfig` controls how request objects resolve relative URLs, which
//! user agent the real transport sends and how verbose logging is.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_request_hook::config::HookConfig;
//! let cfg = HookConfig::default();
//! assert_eq!(cfg.base_url.as_str(), "http://localhost/");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_request_hook::config::{HookConfig, LogLevel};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = HookConfig::builder()
//!     .base_url("https://tokusatsu-fc.jp".parse()?)
//!     .user_agent("Gosub/0.1")
//!     .log_level(LogLevel::Debug)
//!     .build()?; // returns Result<HookConfig, HookConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`HookConfigError`] when the base URL is not an
//! absolute `http`/`https` URL or the user agent is empty.

use std::fmt;
use url::Url;

const DEFAULT_USER_AGENT: &str = "Gosub/1.0 (X11; Linux x86_64) Gecko/20250802 GosubBrowser/1.0";
const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Verbosity of the crate's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Origin that relative request URLs are resolved against (the page's `location.origin`).
    pub base_url: Url,
    /// User agent string sent by the real transport
    pub user_agent: String,
    /// Log level used by [`crate::logging::init`]
    pub log_level: LogLevel,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::default(),
        }
    }
}

impl HookConfig {
    pub fn builder() -> HookConfigBuilder {
        HookConfigBuilder::default()
    }
}

/// Builder for [`HookConfig`].
#[derive(Debug, Clone, Default)]
pub struct HookConfigBuilder {
    inner: HookConfig,
}

impl HookConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut HookConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn base_url(self, url: Url) -> Self { self.map(|c| c.base_url = url) }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn log_level(self, level: LogLevel) -> Self { self.map(|c| c.log_level = level) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut HookConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<HookConfig, HookConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone)]
pub enum HookConfigError {
    UnsupportedScheme(String),
    NotABase(String),
    EmptyUserAgent,
}

impl fmt::Display for HookConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookConfigError::UnsupportedScheme(s) =>
                write!(f, "base_url scheme {s:?} is not supported (expected http or https)"),
            HookConfigError::NotABase(u) =>
                write!(f, "base_url {u} cannot be used to resolve relative URLs"),
            HookConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty"),
        }
    }
}
impl std::error::Error for HookConfigError {}

fn validate(c: &HookConfig) -> Result<(), HookConfigError> {
    if !matches!(c.base_url.scheme(), "http" | "https") {
        return Err(HookConfigError::UnsupportedScheme(c.base_url.scheme().to_string()));
    }
    if c.base_url.cannot_be_a_base() {
        return Err(HookConfigError::NotABase(c.base_url.to_string()));
    }
    if c.user_agent.trim().is_empty() {
        return Err(HookConfigError::EmptyUserAgent);
    }
    Ok(())
}
