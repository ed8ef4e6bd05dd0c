// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::Size;
use miette::miette;
use rustix::{fd::{AsFd, AsRawFd, BorrowedFd, RawFd},
             termios::{self, OptionalActions, QueueSelector, Termios}};
use std::{fs::File, io};

/// Represents either stdin or `/dev/tty` for terminal operations.
///
/// This enum allows us to handle both cases where stdin is a tty (normal terminal usage)
/// and where stdin is redirected (e.g., piped input), requiring us to use `/dev/tty`.
#[derive(Debug)]
pub enum TerminalFd {
    /// Using standard input (when it's a terminal)
    Stdin(io::Stdin),
    /// Using `/dev/tty` (when stdin is redirected)
    DevTty(File),
}

impl AsFd for TerminalFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            TerminalFd::Stdin(stdin) => stdin.as_fd(),
            TerminalFd::DevTty(file) => file.as_fd(),
        }
    }
}

impl AsRawFd for TerminalFd {
    fn as_raw_fd(&self) -> RawFd { self.as_fd().as_raw_fd() }
}

impl TerminalFd {
    /// Checks if stdin is a tty and uses it if so; otherwise opens `/dev/tty`.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin is not a tty and `/dev/tty` cannot be opened.
    pub fn open() -> io::Result<Self> {
        let stdin = io::stdin();
        if termios::isatty(&stdin) {
            Ok(TerminalFd::Stdin(stdin))
        } else {
            let file = File::options().read(true).write(true).open("/dev/tty")?;
            Ok(TerminalFd::DevTty(file))
        }
    }

    /// Non blocking callers must have checked readiness first.
    ///
    /// # Errors
    ///
    /// Returns the underlying `read(2)` error.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        rustix::io::read(self, buf).map_err(io::Error::from)
    }
}

/// Query the window size with `tcgetwinsize` (the `TIOCGWINSZ` ioctl).
///
/// # Errors
///
/// Returns an error if the ioctl fails (eg: `fd` is not a terminal).
pub fn get_window_size(fd: impl AsFd) -> miette::Result<Size> {
    let winsize = termios::tcgetwinsize(fd)
        .map_err(|e| miette!("failed to query terminal window size: {e}"))?;
    Ok(Size::new(winsize.ws_row, winsize.ws_col))
}

/// The terminal, in raw mode, plus the attributes to restore.
#[derive(Debug)]
pub struct SavedTermios {
    fd: TerminalFd,
    original: Termios,
    restored: bool,
}

impl SavedTermios {
    /// Save the current attributes and switch to raw mode: canonical mode, echo, and
    /// signal generation off, `VMIN=1`, `VTIME=0` (rustix's `make_raw`, same as
    /// `cfmakeraw`).
    ///
    /// # Errors
    ///
    /// Returns miette diagnostic errors if:
    /// - Terminal file descriptor cannot be obtained
    /// - Terminal attributes cannot be retrieved or set
    pub fn enable_raw_mode() -> miette::Result<Self> {
        let fd = TerminalFd::open()
            .map_err(|e| miette!("failed to get terminal file descriptor: {e}"))?;

        let original = termios::tcgetattr(&fd)
            .map_err(|e| miette!("failed to retrieve terminal attributes: {e}"))?;

        let mut raw = original.clone();
        raw.make_raw();
        termios::tcsetattr(&fd, OptionalActions::Now, &raw)
            .map_err(|e| miette!("failed to set terminal attributes: {e}"))?;

        Ok(Self {
            fd,
            original,
            restored: false,
        })
    }

    #[must_use]
    pub fn fd(&self) -> &TerminalFd { &self.fd }

    /// Put back the saved attributes. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes cannot be set.
    pub fn restore(&mut self) -> miette::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        termios::tcsetattr(&self.fd, OptionalActions::Now, &self.original)
            .map_err(|e| miette!("failed to restore terminal attributes: {e}"))
    }

    /// Discard input that was received but not read (`tcflush(TCIFLUSH)`), so stray
    /// bytes (eg: late mouse reports) don't end up in the shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn flush_unread_input(&self) -> miette::Result<()> {
        termios::tcflush(&self.fd, QueueSelector::IFlush)
            .map_err(|e| miette!("failed to flush terminal input: {e}"))
    }

    /// # Errors
    ///
    /// See [`get_window_size`].
    pub fn window_size(&self) -> miette::Result<Size> { get_window_size(&self.fd) }
}

impl Drop for SavedTermios {
    fn drop(&mut self) { drop(self.restore()); }
}
