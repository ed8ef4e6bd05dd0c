// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod ansi;
pub mod common;
pub mod log;
pub mod terminal_io;
pub mod timer;

// Re-export.
pub use ansi::*;
pub use common::*;
pub use log::*;
pub use terminal_io::*;
pub use timer::*;
