// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Constants for the VT-100 protocol, split by direction:
//! - [`input_sequences`]: what the terminal sends us (keys, mouse reports, replies).
//! - [`output_sequences`]: what we send the terminal (cursor, SGR, modes, queries).

// Skip rustfmt for rest of file to preserve manual alignment.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Private modules (hide internal structure).
mod input_sequences;
mod output_sequences;

// Public re-exports (flat API) for convenience.
pub use input_sequences::*;
pub use output_sequences::*;
