// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! ANSI terminal protocol layer. Bidirectional, and free of I/O:
//!
//! - **Input** ([`vt_100_terminal_input_parser`]): chars from the terminal to
//!   [`StructuredEvent`]s (keys, SGR mouse reports, window size, query replies).
//! - **Output** ([`generator`]): cursor moves, SGR styling, DEC private modes and
//!   queries.
//! - **Color** ([`color`]): [`TuiColor`], [`CellStyle`], and [`ColorSupport`] detection.
//! - **Raw mode** ([`terminal_raw_mode`]): termios on Unix, crossterm on Windows.
//!
//! ```text
//!   User Input (keyboard/mouse)            Rendered StyledCellGrid
//!            ↓                                       ↓
//! ┌──────────────────────────┐          ┌──────────────────────────┐
//! │  vt_100_terminal_input_  │          │  generator               │
//! │  parser                  │          │  (ansi_sequence_         │
//! │                          │          │   generator)             │
//! └──────────┬───────────────┘          └──────────┬───────────────┘
//!            ▼                                     ▼
//!     StructuredEvent                     bytes for the terminal
//!            │                                     │
//!            └──────────┬──────────────────────────┘
//!                       │
//!            ┌──────────▼───────────┐
//!            │  constants & color   │
//!            └──────────────────────┘
//! ```
//!
//! ## Raw vs Cooked
//!
//! In cooked mode the kernel line discipline buffers input until Enter, handles
//! backspace, and turns Ctrl+C into `SIGINT`. A TUI needs every keystroke as it happens,
//! including the escape sequences for arrows and function keys, so the input adapters
//! switch to raw mode first. See [`terminal_raw_mode`].
//!
//! [`StructuredEvent`]: crate::StructuredEvent
//! [`TuiColor`]: crate::TuiColor
//! [`CellStyle`]: crate::CellStyle
//! [`ColorSupport`]: crate::ColorSupport

// Attach.
pub mod color;
pub mod constants;
pub mod generator;
pub mod terminal_raw_mode;
pub mod vt_100_terminal_input_parser;

// Re-export.
pub use color::*;
pub use constants::*;
pub use generator::*;
pub use terminal_raw_mode::*;
pub use vt_100_terminal_input_parser::*;
