// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Continuation, TimeoutPeriod, TimeoutToken, TimerScheduler};
use std::{sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          time::Duration};

/// What the application sees of the runtime, outside of the [`DriverFacade`]: timers,
/// and flags to ask for a redraw or for the loop to stop.
///
/// One per [`MainLoopCoordinator`]. Clones share state and are `Send`, so a clone can be
/// moved into a timer callback or a background thread, eg: to
/// [`invoke`](Self::invoke) work back onto the UI thread.
///
/// [`DriverFacade`]: crate::DriverFacade
/// [`MainLoopCoordinator`]: crate::MainLoopCoordinator
#[derive(Debug, Clone, Default)]
pub struct ApplicationContext {
    timers: TimerScheduler,
    redraw_requested: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
}

impl ApplicationContext {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_timers(timers: TimerScheduler) -> Self {
        Self {
            timers,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timers(&self) -> &TimerScheduler { &self.timers }

    /// Run `callback` on the UI thread after `delay`, then every `delay` while it returns
    /// [`Continuation::Continue`].
    pub fn add_timeout(
        &self,
        delay: Duration,
        callback: impl FnMut() -> Continuation + Send + 'static,
    ) -> TimeoutToken {
        self.timers.add(delay, callback)
    }

    pub fn add_timeout_with_period(
        &self,
        delay: Duration,
        period: impl Into<TimeoutPeriod>,
        callback: impl FnMut() -> Continuation + Send + 'static,
    ) -> TimeoutToken {
        self.timers.add_with_period(delay, period, callback)
    }

    pub fn remove_timeout(&self, token: TimeoutToken) -> bool { self.timers.remove(token) }

    /// Run `action` once on the UI thread, during the next iteration.
    pub fn invoke(&self, action: impl FnOnce() + Send + 'static) -> TimeoutToken {
        self.timers.invoke(action)
    }

    pub fn request_redraw(&self) { self.redraw_requested.store(true, Ordering::Release); }

    /// Returns the pending request and clears it.
    pub fn take_redraw_request(&self) -> bool {
        self.redraw_requested.swap(false, Ordering::AcqRel)
    }

    /// Ask [`MainLoopCoordinator::run_until`] to return after the current iteration.
    ///
    /// [`MainLoopCoordinator::run_until`]: crate::MainLoopCoordinator::run_until
    pub fn request_stop(&self) { self.stop_requested.store(true, Ordering::Release); }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool { self.stop_requested.load(Ordering::Acquire) }
}
