//! Host console logger.
//!
//! Installs `env_logger` as the `log` backend for the host simulation.
//! Lines go to stderr; the filter comes from `SMARTICE_LOG` (same syntax as
//! `RUST_LOG`) and defaults to `info`.

use log::SetLoggerError;

pub const LEVEL_ENV: &str = "SMARTICE_LOG";
pub const DEFAULT_FILTER: &str = "info";

/// Install the console logger as the global `log` backend.
pub fn init() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LEVEL_ENV, DEFAULT_FILTER))
        .format_timestamp_millis()
        .try_init()
}
