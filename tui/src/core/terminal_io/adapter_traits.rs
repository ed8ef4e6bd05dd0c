// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CancellationSignal, CursorVisibility, HandoffSender, Point, Size,
            StyledCellGrid};
use std::fmt::Debug;

/// Reads raw input from the OS on the input thread.
///
/// The whole lifecycle runs on that one thread: built by an [`InputAdapterFactory`],
/// then `initialize`, `run`, `dispose`. Implementations may hold thread-affine handles
/// and don't need to be `Send`.
///
/// [`InputAdapterFactory`]: crate::InputAdapterFactory
pub trait InputAdapter: Debug {
    /// Short name for logs, eg: `"posix"`.
    fn name(&self) -> &'static str;

    /// Acquire OS resources (raw mode, handles, signal registration). Failure here is
    /// fatal for startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform setup fails.
    fn initialize(&mut self, queue: HandoffSender) -> miette::Result<()>;

    /// Block, pushing [`RawInputUnit`]s into the queue, until `cancel` is set. Must
    /// observe cancellation promptly, not only on the next keypress. Returns `Ok(())`
    /// when cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than cancellation.
    ///
    /// [`RawInputUnit`]: crate::RawInputUnit
    fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()>;

    /// Release OS resources. Idempotent. Errors are logged, not returned.
    fn dispose(&mut self);
}

/// Writes to the terminal on the UI thread.
pub trait OutputAdapter: Debug {
    fn name(&self) -> &'static str;

    /// Prepare the terminal (eg: enter the alternate screen) and return its size.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be prepared.
    fn initialize(&mut self) -> miette::Result<Size>;

    /// # Errors
    ///
    /// Returns an error if the size can't be queried.
    fn window_size(&mut self) -> miette::Result<Size>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_cursor_position(&mut self, position: Point) -> miette::Result<()>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_cursor_visibility(&mut self, visibility: CursorVisibility) -> miette::Result<()>;

    /// Paint `grid`, emitting only what changed since the last call.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write_cells(&mut self, grid: &StyledCellGrid) -> miette::Result<()>;

    /// Write pre-encoded bytes (eg: a terminal query) as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write_raw(&mut self, text: &str) -> miette::Result<()>;

    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> miette::Result<()>;

    /// Restore the terminal. Idempotent.
    fn dispose(&mut self);
}
