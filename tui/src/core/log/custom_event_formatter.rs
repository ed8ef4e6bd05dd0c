// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # Custom event formatter for tracing
//!
//! [`CustomEventFormatter`] produces two-part log entries:
//!
//! ```text
//! <timestamp> <level_sigil>: [thread] [span] <message>
//!   <field_name>: <field_value>
//!   <field_name>: <field_value>
//! ```
//!
//! The `message` field is special: it becomes the heading, and every other field is
//! written on its own indented line underneath. Empty field values are skipped.
//!
//! The thread name is included because the runtime always has at least two threads
//! logging (the input thread and the UI thread) and interleaved entries are otherwise
//! hard to attribute.

use chrono::Local;
use custom_event_formatter_constants::{DEBUG_SIGIL, ERROR_SIGIL, FIELD_INDENT,
                                       INFO_SIGIL, LEVEL_SUFFIX, TRACE_SIGIL,
                                       WARN_SIGIL};
use std::fmt::{self, Write as _};
use tracing::{Event, Level, Subscriber,
              field::{Field, Visit}};
use tracing_subscriber::{fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
                         registry::LookupSpan};

#[derive(Debug, Clone, Copy)]
pub struct CustomEventFormatter {
    /// Emit SGR color codes around the level sigil.
    pub ansi: bool,
}

impl CustomEventFormatter {
    #[must_use]
    pub const fn new(ansi: bool) -> Self { Self { ansi } }
}

impl Default for CustomEventFormatter {
    fn default() -> Self { Self::new(false) }
}

#[rustfmt::skip]
pub mod custom_event_formatter_constants {
    pub const LEVEL_SUFFIX: &str = ":";
    pub const FIELD_INDENT: &str = "  ";

    pub const ERROR_SIGIL: &str = "E";
    pub const WARN_SIGIL: &str =  "W";
    pub const INFO_SIGIL: &str =  "I";
    pub const DEBUG_SIGIL: &str = "D";
    pub const TRACE_SIGIL: &str = "T";

    /// SGR foreground codes for each level (16-color palette).
    pub const ERROR_SGR: &str = "\x1b[91m";
    pub const WARN_SGR: &str =  "\x1b[33m";
    pub const INFO_SGR: &str =  "\x1b[36m";
    pub const DEBUG_SGR: &str = "\x1b[93m";
    pub const TRACE_SGR: &str = "\x1b[35m";
    pub const RESET_SGR: &str = "\x1b[0m";
}

/// Collects the event's fields in the order they were recorded.
#[derive(Debug, Default)]
struct FieldCollector {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            // `message = %foo` and `info!("literal")` both arrive here.
            let _unused = write!(self.message, "{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }
}

impl CustomEventFormatter {
    fn sigil(level: Level) -> (&'static str, &'static str) {
        use custom_event_formatter_constants::{DEBUG_SGR, ERROR_SGR, INFO_SGR, TRACE_SGR,
                                               WARN_SGR};
        match level {
            Level::ERROR => (ERROR_SIGIL, ERROR_SGR),
            Level::WARN => (WARN_SIGIL, WARN_SGR),
            Level::INFO => (INFO_SIGIL, INFO_SGR),
            Level::DEBUG => (DEBUG_SIGIL, DEBUG_SGR),
            Level::TRACE => (TRACE_SIGIL, TRACE_SGR),
        }
    }
}

impl<S, N> FormatEvent<S, N> for CustomEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut f: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // Timestamp.
        write!(f, "{} ", Local::now().format("%H:%M:%S%.3f"))?;

        // Level.
        let (sigil, sgr) = Self::sigil(*event.metadata().level());
        if self.ansi {
            write!(
                f,
                "{sgr}{sigil}{LEVEL_SUFFIX}{}",
                custom_event_formatter_constants::RESET_SGR
            )?;
        } else {
            write!(f, "{sigil}{LEVEL_SUFFIX}")?;
        }

        // Thread.
        if let Some(name) = std::thread::current().name() {
            write!(f, " [{name}]")?;
        }

        // Span context.
        if let Some(scope) = ctx.lookup_current() {
            write!(f, " [{}]", scope.name())?;
        }

        // Heading and body.
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        writeln!(f, " {}", collector.message)?;
        for (name, value) in collector.fields.iter().filter(|(_, value)| !value.is_empty()) {
            writeln!(f, "{FIELD_INDENT}{name}: {value}")?;
        }

        Ok(())
    }
}
