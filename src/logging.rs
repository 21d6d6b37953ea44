//! Logging bootstrap.
//!
//! The crate logs through the [`log`] facade only. Hosts that do not bring
//! their own logger can call [`init`] to route records to `env_logger`.
//! `RUST_LOG` still overrides the configured level.

use crate::config::LogLevel;

/// Installs `env_logger` at the given level. Returns `false` when a logger was already set.
pub fn init(level: LogLevel) -> bool {
    env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
