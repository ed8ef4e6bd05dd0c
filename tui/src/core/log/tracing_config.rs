// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;
use tracing_core::LevelFilter;

/// Default file name used when logging to a file and no path is given.
pub const DEFAULT_LOG_FILE_NAME: &str = "r3bl_term_runtime.log";

/// Configure the tracing system. Logging is **disabled** when `level_filter` is
/// [`LevelFilter::OFF`] or `writer_config` is [`WriterConfig::None`].
///
/// While the runtime is running the terminal is in raw mode and (usually) on the
/// alternate screen, so logging to [`DisplayPreference::Stdout`] will corrupt the display.
/// Interactive programs should log to a [`WriterConfig::File`].
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

/// - `File(String)`: the file path to use for the log file. Eg: `/tmp/rt.log` or
///   `rt.log`.
/// - `Display(DisplayPreference)`: the preferred display to use for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    #[must_use]
    pub fn new_file(filename: Option<String>, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::File(
                filename.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter,
        }
    }

    #[must_use]
    pub fn new_display(preferred_display: DisplayPreference, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::Display(preferred_display),
            level_filter,
        }
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.level_filter == LevelFilter::OFF || self.writer_config == WriterConfig::None
    }
}

/// Logging is off by default.
impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            writer_config: WriterConfig::None,
            level_filter: LevelFilter::OFF,
        }
    }
}

/// Log to the default file at the given level.
impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self { Self::new_file(None, level_filter) }
}
