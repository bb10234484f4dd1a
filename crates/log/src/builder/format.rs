//! Format layer construction

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};

use crate::config::DisplayConfig;

/// Timestamp source that can be switched off without changing layer types
#[derive(Debug, Clone, Copy)]
pub(crate) enum Timer {
    System,
    Off,
}

impl Timer {
    pub(crate) fn for_display(display: &DisplayConfig) -> Self {
        if display.time { Timer::System } else { Timer::Off }
    }
}

impl FormatTime for Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        match self {
            Timer::System => SystemTime.format_time(w),
            Timer::Off => Ok(()),
        }
    }
}

/// Human-readable layer in the given style (`pretty` or `compact`)
macro_rules! text_layer {
    ($style:ident, $display:expr, $writer:expr) => {{
        let display = $display;
        tracing_subscriber::fmt::layer()
            .$style()
            .with_writer($writer)
            .with_timer($crate::builder::format::Timer::for_display(display))
            .with_ansi(display.colors)
            .with_target(display.target)
            .with_file(display.source)
            .with_line_number(display.source)
            .with_thread_ids(display.thread_ids)
    }};
}

/// JSON layer
macro_rules! json_layer {
    ($display:expr, $writer:expr) => {{
        let display = $display;
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer($writer)
            .with_timer($crate::builder::format::Timer::for_display(display))
            .with_current_span(true)
            .flatten_event(display.flatten)
            .with_ansi(false)
            .with_target(display.target)
            .with_file(display.source)
            .with_line_number(display.source)
            .with_thread_ids(display.thread_ids)
    }};
}
