// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The boundary between the runtime and the terminal.
//!
//! ```text
//! input thread                                    UI thread
//! ┌──────────────────┐  RawInputUnit   ┌─────────────────────────┐
//! │ dyn InputAdapter ├──HandoffSender──► HandoffReceiver          │
//! └────────▲─────────┘                 │   → InputProcessor       │
//!          │ cancel()                  │ dyn OutputAdapter        │
//!   CancellationSignal ◄───────────────┤   ← StyledCellGrid       │
//!                                      └─────────────────────────┘
//! ```

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Private modules (hide internal structure).
mod adapter_error;
mod adapter_traits;
mod cancellation_signal;
mod cell_grid;
mod handoff_queue;
mod output_device;
mod raw_input_unit;
mod terminal_io_type_aliases;

// Re-exports for flat public API.
pub use adapter_error::*;
pub use adapter_traits::*;
pub use cancellation_signal::*;
pub use cell_grid::*;
pub use handoff_queue::*;
pub use output_device::*;
pub use raw_input_unit::*;
pub use terminal_io_type_aliases::*;
