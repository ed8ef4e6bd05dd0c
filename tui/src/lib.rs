// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios winsize sigwinch

//! # `r3bl_term_runtime`
//!
//! The terminal I/O and concurrency substrate of a cross-platform TUI runtime. It turns
//! raw OS console input (key presses, mouse events, window resize notifications, and
//! replies to escape sequence queries) into structured, platform independent
//! [`StructuredEvent`]s, and turns a rendered [`StyledCellGrid`] into the minimal
//! sequence of control codes needed to update the physical display.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────── input thread ────────────────┐   ┌────────────── UI thread ──────────────┐
//! │ InputAdapter (POSIX | Windows | portable)    │   │ MainLoopIteration (one per tick)      │
//! │   raw mode, poll/wait, cancellation          │   │  1. OutputRequestScheduler            │
//! │   └─→ RawInputUnit ──→ HandoffSender ────────┼──▶│  2. InputProcessor                    │
//! └──────────────────────────────────────────────┘   │       EscapeSequenceParser            │
//!                                                    │       SequenceClassifier              │
//!                                                    │       └─→ StructuredEvent             │
//!                                                    │          └─→ DriverCallbacks          │
//!                                                    │  3. TimerScheduler::run_due()         │
//!                                                    │  4. on_redraw                         │
//!                                                    └───────────────────────────────────────┘
//! ```
//!
//! The [`MainLoopCoordinator`] owns both threads. It starts the input thread (which
//! constructs its adapter on that thread, since platform handles are thread-affine),
//! initializes the [`OutputAdapter`] on the calling thread, and hands out a
//! [`DriverFacade`] once both sides are ready. [`MainLoopCoordinator::stop()`] is
//! idempotent.
//!
//! ## Module layout
//!
//! - [`core`]: leaf building blocks with no knowledge of threads: the VT-100 input
//!   parser and keyboard matchers, ANSI output generation, raw mode, the timer
//!   scheduler, logging, and the I/O boundary types.
//! - [`tui`]: the platform backends and the main loop built on top of [`core`].
//!
//! [`StructuredEvent`]: crate::StructuredEvent
//! [`StyledCellGrid`]: crate::StyledCellGrid
//! [`MainLoopCoordinator`]: crate::MainLoopCoordinator
//! [`MainLoopCoordinator::stop()`]: crate::MainLoopCoordinator::stop
//! [`OutputAdapter`]: crate::OutputAdapter
//! [`DriverFacade`]: crate::DriverFacade

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod core;
pub mod tui;

// Re-export stable public API using glob imports for ergonomic, flat API surface.
#[allow(ambiguous_glob_reexports)]
pub use core::*;
#[allow(ambiguous_glob_reexports)]
pub use tui::*;
