//! Layered application configuration
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. the TOML file given with `--config` (or `KEYCYCLE_CONFIG`)
//! 3. `KEYCYCLE_*` environment variables, nested keys split on `__`
//!    (`KEYCYCLE_POLICY__ROTATION_PERIOD=30days`)
//! 4. command-line flags, applied by each command

use anyhow::{Context, Result, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use keycycle_lifecycle::PolicyConfig;
use keycycle_scan::ScanConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "KEYCYCLE_";

/// `KEYCYCLE_*` variables that are not configuration keys
const RESERVED_VARS: [&str; 3] = ["config", "log", "log_format"];

/// Everything the binary can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rotation policy
    pub policy: PolicyConfig,
    /// Scan behaviour
    pub scan: ScanConfig,
    /// Logging
    pub log: keycycle_log::Config,
}

impl AppConfig {
    /// Provider chain without command-line flags
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&RESERVED_VARS).split("__"))
    }

    /// Load and validate the configuration
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            ensure!(
                path.is_file(),
                "Configuration file {} does not exist",
                path.display()
            );
        }

        Self::figment(file)
            .extract()
            .context("Failed to load configuration")
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }
}
