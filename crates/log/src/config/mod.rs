//! Logging configuration

mod presets;

pub use presets::{FORMAT_VAR, LEVEL_VAR};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Logging configuration
///
/// # Example
///
/// ```
/// use keycycle_log::{Config, Format};
///
/// let config: Config = serde_json::from_str(r#"{ "level": "debug", "format": "json" }"#).unwrap();
/// assert_eq!(config.format, Format::Json);
/// assert!(config.display.time);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Level filter (e.g. `"info"`, `"keycycle_scan=debug,info"`)
    pub level: String,

    /// Output format
    pub format: Format,

    /// Output stream
    pub writer: Writer,

    /// Display options
    pub display: DisplayConfig,

    /// Fields attached to every event through a root span
    pub fields: Fields,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            writer: Writer::Stderr,
            display: DisplayConfig::default(),
            fields: Fields::default(),
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Multi-line, human-readable
    Pretty,
    /// Single-line, human-readable
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(LogError::Format(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Pretty => "pretty",
            Format::Compact => "compact",
            Format::Json => "json",
        })
    }
}

/// Output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Writer {
    /// Standard error; keeps stdout free for command output
    Stderr,
    /// Standard output
    Stdout,
}

/// Display options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show timestamps
    pub time: bool,
    /// Show file and line
    pub source: bool,
    /// Show the event target
    pub target: bool,
    /// Show thread ids
    pub thread_ids: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Put event fields at the top level of JSON output
    pub flatten: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time: true,
            source: false,
            target: true,
            thread_ids: false,
            colors: false,
            flatten: false,
        }
    }
}

/// Global fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
    /// Service name
    pub service: Option<String>,
    /// Deployment environment
    pub env: Option<String>,
    /// Service version
    pub version: Option<String>,
}

impl Fields {
    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.service.is_none() && self.env.is_none() && self.version.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pretty", Format::Pretty)]
    #[case("COMPACT", Format::Compact)]
    #[case(" json ", Format::Json)]
    fn test_format_parses(#[case] input: &str, #[case] expected: Format) {
        assert_eq!(input.parse::<Format>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "logfmt".parse::<Format>().unwrap_err();
        assert!(matches!(err, LogError::Format(ref name) if name == "logfmt"));
    }

    #[test]
    fn test_fields_emptiness() {
        assert!(Fields::default().is_empty());
        assert!(
            !Fields {
                service: Some("keycycle".into()),
                ..Fields::default()
            }
            .is_empty()
        );
    }
}
