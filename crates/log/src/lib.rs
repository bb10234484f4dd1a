//! # Keycycle Log
//!
//! Logging setup shared by keycycle binaries: one [`Config`], a few presets
//! and initializers that install a `tracing` subscriber.
//!
//! ```no_run
//! let _guard = keycycle_log::auto_init()?;
//! tracing::info!(accounts = 3, "Starting scan");
//! # Ok::<(), keycycle_log::LogError>(())
//! ```
//!
//! Level and format can be overridden with `KEYCYCLE_LOG` (or `RUST_LOG`)
//! and `KEYCYCLE_LOG_FORMAT`.
#![forbid(unsafe_code)]

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, FORMAT_VAR, Fields, Format, LEVEL_VAR, Writer};
pub use error::{LogError, LogResult};

/// Initialize from the environment if it sets a level, otherwise pick a
/// preset from the build profile
///
/// # Errors
///
/// See [`LoggerBuilder::build`].
pub fn auto_init() -> LogResult<LoggerGuard> {
    if Config::env_has_level() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with the default configuration
///
/// # Errors
///
/// See [`LoggerBuilder::build`].
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with a custom configuration
///
/// # Errors
///
/// See [`LoggerBuilder::build`].
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
