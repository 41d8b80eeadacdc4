//! Log subscriber setup.
//!
//! The core only emits `tracing` events; binaries call [`init`] once to route them
//! to stderr or to the file named by `CONDUCTOR_WRITE_LOG`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::error::LoggingError;

/// Installs the global subscriber. Returns `Ok(false)` if one was already installed.
pub fn init(config: &EnvConfig) -> Result<bool, LoggingError> {
    let filter = EnvFilter::try_new(config.log_directive())
        .map_err(|err| LoggingError::Filter(err.to_string()))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match &config.write_log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::Open {
                    path: path.into(),
                    source,
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    };
    Ok(installed)
}
