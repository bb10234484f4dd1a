//! Configuration presets

use super::{Config, DisplayConfig, Format};

/// Level filter variable, checked before `RUST_LOG`
pub const LEVEL_VAR: &str = "KEYCYCLE_LOG";

/// Output format variable
pub const FORMAT_VAR: &str = "KEYCYCLE_LOG_FORMAT";

impl Config {
    /// Configuration from `KEYCYCLE_LOG`, `RUST_LOG` and `KEYCYCLE_LOG_FORMAT`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Configuration from an arbitrary variable lookup
    ///
    /// An unknown format name keeps the default format.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup(LEVEL_VAR).or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }

        if let Some(format) = lookup(FORMAT_VAR).and_then(|f| f.parse().ok()) {
            config.format = format;
        }

        config
    }

    /// Check if the environment sets a level filter
    pub fn env_has_level() -> bool {
        std::env::var_os(LEVEL_VAR).is_some() || std::env::var_os("RUST_LOG").is_some()
    }

    /// Pretty, colored output at debug level
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Flattened JSON at info level
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                flatten: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Set the level filter
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}
