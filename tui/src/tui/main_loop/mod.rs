// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # Main loop
//!
//! Everything that runs on the UI thread, plus the [`MainLoopCoordinator`] that owns the
//! input thread.
//!
//! | Piece                      | Role                                                    |
//! | :------------------------- | :------------------------------------------------------ |
//! | [`RuntimeConfig`]          | Timing and terminal mode settings                       |
//! | [`MainLoopCoordinator`]    | Start, iterate, stop; owns both threads                 |
//! | [`FacadeGate`]             | Builds the [`DriverFacade`] once both adapters are ready |
//! | [`MainLoopIteration`]      | One non-blocking tick                                   |
//! | [`InputProcessor`]         | Raw units to structured events                          |
//! | [`OutputRequestScheduler`] | Terminal queries and their replies                      |
//! | [`ApplicationContext`]     | Timers, redraw and stop requests                        |

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Private modules (hide internal structure).
mod app_context;
mod coordinator;
mod coordinator_error;
mod driver_facade;
mod facade_gate;
mod input_processor;
mod iteration;
mod request_scheduler;
mod runtime_config;

// Public re-exports (flat API).
pub use app_context::*;
pub use coordinator::*;
pub use coordinator_error::*;
pub use driver_facade::*;
pub use facade_gate::*;
pub use input_processor::*;
pub use iteration::*;
pub use request_scheduler::*;
pub use runtime_config::*;
