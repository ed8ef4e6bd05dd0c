// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Global [`miette`] report handler for binaries built on this crate.
//!
//! The [`miette::ErrorHook`] is only invoked when a report is actually rendered (eg: when
//! `main() -> miette::Result<_>` returns an error), so the terminal width is measured
//! lazily, after the runtime has restored the terminal.

use miette::MietteHandlerOpts;

/// Width used when the terminal size can't be queried (piped output, CI).
pub const FALLBACK_REPORT_WIDTH: u16 = 80;

/// Install a graphical report handler that wraps to the current terminal width and
/// prints `footer` (usually an issues URL) under every report.
pub fn setup_default_miette_global_report_handler(footer: &'static str) {
    miette::set_hook(Box::new(move |_report| {
        let width = crossterm::terminal::size()
            .map_or(FALLBACK_REPORT_WIDTH, |(cols, _rows)| cols);
        tracing::debug!(message = "miette::set_hook", report_width = width);
        Box::new(
            MietteHandlerOpts::new()
                .width(usize::from(width))
                .wrap_lines(true)
                .unicode(true)
                .context_lines(3)
                .with_cause_chain()
                .footer(footer.to_string())
                .build(),
        )
    }))
    .ok();
}
