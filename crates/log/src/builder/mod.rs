//! Logger builder
//!
//! Builds a `Registry + EnvFilter + fmt` subscriber from a [`Config`] and
//! installs it as the global default.

#[macro_use]
mod format;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format, Writer};
use crate::error::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Keeps the root span entered for as long as it lives
#[derive(Debug)]
pub struct LoggerGuard {
    _root_span: Option<tracing::span::EnteredSpan>,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the level filter without installing anything
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Filter`] if the filter does not parse.
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Build the subscriber and install it globally
    ///
    /// # Errors
    ///
    /// Returns error if the filter does not parse or a global subscriber
    /// is already set.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = self.filter()?;
        let writer = match self.config.writer {
            Writer::Stderr => BoxMakeWriter::new(std::io::stderr),
            Writer::Stdout => BoxMakeWriter::new(std::io::stdout),
        };

        let display = &self.config.display;
        let registry = Registry::default().with(filter);
        let installed = match self.config.format {
            Format::Pretty => registry.with(text_layer!(pretty, display, writer)).try_init(),
            Format::Compact => registry.with(text_layer!(compact, display, writer)).try_init(),
            Format::Json => registry.with(json_layer!(display, writer)).try_init(),
        };
        installed.map_err(|e| LogError::Init(e.to_string()))?;

        let fields = &self.config.fields;
        let root_span = (!fields.is_empty()).then(|| {
            tracing::info_span!(
                "keycycle",
                service = fields.service.as_deref().unwrap_or(""),
                env = fields.env.as_deref().unwrap_or(""),
                version = fields.version.as_deref().unwrap_or("")
            )
            .entered()
        });

        Ok(LoggerGuard {
            _root_span: root_span,
        })
    }
}
