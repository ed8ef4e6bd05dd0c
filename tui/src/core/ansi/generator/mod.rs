// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! ANSI sequence generation.
//!
//! - [`ansi_sequence_generator`]: the sequences the runtime writes to the terminal. Its
//!   free functions are called through the module path, eg:
//!   `ansi_sequence_generator::cursor_position(..)`.
//! - `ansi_sequence_generator_input` (test only): builds the sequences a terminal would
//!   send us, so parser tests don't hardcode raw bytes.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Public modules (free functions are namespaced by their module).
pub mod ansi_sequence_generator;

// Test/doc-only modules.
#[cfg(any(test, doc))]
pub mod ansi_sequence_generator_input;

// Public re-exports (flat API).
pub use ansi_sequence_generator::MouseTrackingMode;
