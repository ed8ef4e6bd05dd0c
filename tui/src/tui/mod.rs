// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The runtime built on top of [`core`](crate::core): platform backends and the main
//! loop that drives them.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Module scoped debug flags. When `true`, the matching module logs its internals at
// `debug` level. They are `const` so disabled logging compiles away.

/// Adapter lifecycle, raw reads, backend selection.
pub const DEBUG_TUI_SHOW_TERMINAL_BACKEND: bool = false;

/// Coordinator state changes, per iteration summaries, request scheduling.
pub const DEBUG_TUI_SHOW_MAIN_LOOP: bool = false;

// Attach sources.
pub mod main_loop;
pub mod terminal_lib_backends;

// Re-export.
pub use main_loop::*;
pub use terminal_lib_backends::*;
