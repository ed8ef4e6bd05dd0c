// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal raw mode.
//!
//! **Cooked Mode** (default):
//! - Input is line-buffered (waits for Enter key)
//! - Special characters are interpreted (Ctrl+C, Ctrl+D, etc.)
//! - Echoing is enabled (typed characters appear on screen)
//!
//! **Raw Mode**:
//! - No line buffering, bytes are available immediately
//! - No special character processing, Ctrl+C arrives as byte `0x03`
//! - No echo
//!
//! ## Platform Support
//!
//! - **Unix/Linux/macOS**: [`SavedTermios`] uses rustix's safe termios API
//!   (`tcgetattr` / `cfmakeraw` / `tcsetattr`), plus `tcflush` and `tcgetwinsize` for
//!   the POSIX input adapter.
//! - **Windows**: delegates to crossterm (`SetConsoleMode`).
//!
//! The saved terminal state lives in the value returned by enable, never in a global,
//! so two adapters in one process (eg: tests) can't clobber each other's saved state.
//!
//! ## Usage Example
//!
//! ```no_run
//! use r3bl_term_runtime::RawModeGuard;
//!
//! {
//!     let _guard = RawModeGuard::new().expect("Failed to enable raw mode");
//!     // Terminal is now in raw mode.
//! } // Raw mode restored when the guard is dropped.
//! ```

// Private modules (hide internal structure).
mod raw_mode_core;

#[cfg(unix)]
mod raw_mode_unix;

#[cfg(windows)]
mod raw_mode_windows;

// Re-export the public API (flat, ergonomic surface).
pub use raw_mode_core::*;

#[cfg(unix)]
pub use raw_mode_unix::*;
