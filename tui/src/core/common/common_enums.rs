// Copyright (c) 2023-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Returned by timer callbacks to tell the [`TimerScheduler`] whether to re-arm them.
///
/// [`TimerScheduler`]: crate::TimerScheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    /// Re-arm the timer at `now + period`.
    #[default]
    Continue,
    /// Remove the timer.
    Stop,
}

/// Control flow for the body of a dedicated thread's loop (input adapters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadLoopContinuation {
    Continue,
    Return,
}
