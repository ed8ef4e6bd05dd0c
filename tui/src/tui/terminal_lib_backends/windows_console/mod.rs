// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Windows console input. The record mapping in [`vk_mapping`] is plain Rust and is built
//! (and tested) on every OS; only the adapter that talks to the console API is
//! Windows only.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Public modules (free functions and constants are namespaced by their module).
pub mod vk_mapping;

#[cfg(windows)]
mod console_input_adapter;

// Re-exports.
pub use vk_mapping::{ConsoleKeyMapper, ConsoleMouseMapper};

#[cfg(windows)]
pub use console_input_adapter::*;
