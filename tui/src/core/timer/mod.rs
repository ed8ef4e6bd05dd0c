// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Timers that run on the UI thread.
//!
//! [`TimerScheduler`] stores callbacks ordered by their absolute due tick. Any thread may
//! add or remove timers; only the UI thread calls [`TimerScheduler::run_due`] (once per
//! iteration), so callbacks always run there. [`TimerScheduler::invoke`] is how
//! background work posts a closure back to the UI thread.
//!
//! [`LogarithmicTimeout`] is a period whose span grows with a stage counter. It is used
//! for backoff, eg: re-sending a terminal query that got no reply.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Private modules (hide internal structure).
mod logarithmic_timeout;
mod timer_scheduler;

// Public re-exports (flat API).
pub use logarithmic_timeout::*;
pub use timer_scheduler::*;
