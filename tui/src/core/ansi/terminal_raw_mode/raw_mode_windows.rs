// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic as _;

/// Delegates to [`crossterm::terminal::enable_raw_mode()`], which clears
/// `ENABLE_LINE_INPUT`, `ENABLE_ECHO_INPUT` and `ENABLE_PROCESSED_INPUT` with
/// `SetConsoleMode()`.
///
/// # Errors
///
/// Returns an error if the console mode cannot be changed.
pub fn enable_raw_mode() -> miette::Result<()> {
    crossterm::terminal::enable_raw_mode().into_diagnostic()
}

/// Delegates to [`crossterm::terminal::disable_raw_mode()`].
///
/// # Errors
///
/// Returns an error if the console mode cannot be restored.
pub fn disable_raw_mode() -> miette::Result<()> {
    crossterm::terminal::disable_raw_mode().into_diagnostic()
}
