//! `keycycle config`: print the effective configuration

use anyhow::Result;

use crate::config::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
