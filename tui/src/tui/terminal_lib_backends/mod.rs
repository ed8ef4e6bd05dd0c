// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # Terminal backends
//!
//! Concrete [`InputAdapter`]s and [`OutputAdapter`]s, plus the selection logic that
//! pairs them up.
//!
//! ```text
//! ┌────────────────────┐   BackendKind::resolve()   ┌──────────────────────────────┐
//! │ RuntimeConfig      ├───────────────────────────▶│ backend_selection            │
//! └────────────────────┘                            │  InputAdapterFactory (FnOnce)│
//!                                                   │  BoxedOutputAdapter          │
//!                                                   └──────┬───────────────┬───────┘
//!                             input thread                 │               │  UI thread
//!          ┌───────────────────┬───────────────────┬───────▼──────┐  ┌─────▼─────────────┐
//!          │ posix_input       │ windows_console   │ portable     │  │ AnsiOutputAdapter │
//!          │ termios + mio     │ ReadConsoleInputW │ stdin thread │  │ diffed frames     │
//!          └───────────────────┴───────────────────┴──────────────┘  └───────────────────┘
//! ```
//!
//! ## Module Map
//!
//! - [`backend_selection`](self::backend_selection): `BackendKind` and the factories.
//! - `posix_input`: raw mode reader for Unix terminals (unix only).
//! - [`windows_console`]: console record reader (windows only) and the record to key
//!   mapping (every OS).
//! - `portable_input`: a detached stdin reader thread.
//! - `fake_adapters`: adapters for headless runs and tests.
//! - `ansi_output_adapter`: writes [`StyledCellGrid`] frames as VT sequences.
//! - `terminal_modes`: alternate screen and mouse reporting on / off sequences.
//!
//! [`InputAdapter`]: crate::InputAdapter
//! [`OutputAdapter`]: crate::OutputAdapter
//! [`StyledCellGrid`]: crate::StyledCellGrid

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach.
pub mod backend_selection;
pub mod windows_console;
mod ansi_output_adapter;
mod fake_adapters;
mod portable_input;
mod terminal_modes;

#[cfg(unix)]
mod posix_input;

// Re-export.
pub use ansi_output_adapter::*;
pub use backend_selection::*;
pub use fake_adapters::*;
pub use portable_input::*;
pub use terminal_modes::*;
pub use windows_console::*;

#[cfg(unix)]
pub use posix_input::*;
