// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw mode terminal input on Unix: [`termios`] via rustix, readiness via [`mio`],
//! `SIGWINCH` via [`signal_hook_mio`].
//!
//! [`termios`]: rustix::termios

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Private modules (hide internal structure).
mod posix_input_adapter;
mod sources;

// Public re-exports (flat API).
pub use posix_input_adapter::*;
pub use sources::*;
