// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Startup rendezvous of the two threads.
//!
//! ```text
//! UI thread                          input thread
//! output.initialize()                factory(), adapter.initialize(queue)
//!        │                                  │
//!  arrive_output(output, size)        arrive_input()  /  fail_input_init(msg)
//!        └──────────────┐   ┌───────────────┘
//!                   ┌───▼───▼───┐
//!                   │ FacadeGate│  second arrival builds the DriverFacade
//!                   └─────┬─────┘
//!                         ▼
//!              wait_for_facade() on the UI thread
//! ```
//!
//! Whichever side arrives second builds the facade, under the gate's mutex, so it is
//! built exactly once. `wait_for_facade` returns early with an error if the input thread
//! exits before that.

use crate::{BoxedOutputAdapter, CoordinatorError, DEBUG_TUI_SHOW_MAIN_LOOP, DriverFacade,
            OutputRequestScheduler, Size};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct FacadeGate {
    state: Mutex<GateState>,
    condvar: Condvar,
}

#[derive(Debug, Default)]
struct GateState {
    /// Moved into the facade when it is built.
    requests: Option<OutputRequestScheduler>,
    output: Option<(BoxedOutputAdapter, Size)>,
    input_ready: bool,
    input_exited: bool,
    input_init_error: Option<String>,
    facade: Option<DriverFacade>,
    facade_built: bool,
}

impl FacadeGate {
    #[must_use]
    pub fn new(requests: OutputRequestScheduler) -> Self {
        Self {
            state: Mutex::new(GateState {
                requests: Some(requests),
                ..GateState::default()
            }),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The output adapter is initialized.
    pub fn arrive_output(&self, output: BoxedOutputAdapter, size: Size) {
        let mut state = self.lock();
        state.output = Some((output, size));
        self.try_build(&mut state, "output");
    }

    /// The input adapter is initialized and about to run.
    pub fn arrive_input(&self) {
        let mut state = self.lock();
        state.input_ready = true;
        self.try_build(&mut state, "input");
    }

    /// The input adapter could not be built or initialized. The thread exits next.
    pub fn fail_input_init(&self, message: String) {
        self.lock().input_init_error = Some(message);
        self.condvar.notify_all();
    }

    /// Called when the input thread ends, for any reason.
    pub fn mark_input_exited(&self) {
        self.lock().input_exited = true;
        self.condvar.notify_all();
    }

    #[must_use]
    pub fn has_input_exited(&self) -> bool { self.lock().input_exited }

    fn try_build(&self, state: &mut GateState, arriving: &'static str) {
        if state.facade_built || !state.input_ready {
            return;
        }
        let Some((output, size)) = state.output.take() else {
            return;
        };
        let Some(requests) = state.requests.take() else {
            state.output = Some((output, size));
            return;
        };
        state.facade = Some(DriverFacade::new(output, size, requests));
        state.facade_built = true;

        DEBUG_TUI_SHOW_MAIN_LOOP.then(|| {
            tracing::debug!(message = "driver facade built", built_by = arriving, size = %size);
        });
        self.condvar.notify_all();
    }

    /// Block until the facade exists and take it.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::InputAdapterInit`] if the input adapter failed to start.
    /// - [`CoordinatorError::InputThreadExited`] if the input thread ended before the
    ///   facade was built for any other reason.
    pub fn wait_for_facade(&self) -> Result<DriverFacade, CoordinatorError> {
        let mut state = self.lock();
        loop {
            if let Some(facade) = state.facade.take() {
                return Ok(facade);
            }
            if let Some(message) = state.input_init_error.take() {
                return Err(CoordinatorError::InputAdapterInit { message });
            }
            if state.input_exited {
                return Err(CoordinatorError::InputThreadExited);
            }
            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// The output adapter, if it arrived but no facade was built from it. Used to dispose
    /// it after a failed startup.
    pub fn take_output(&self) -> Option<BoxedOutputAdapter> {
        self.lock().output.take().map(|(output, _)| output)
    }
}

/// Held by the input thread for its whole life. Dropping it, also while unwinding,
/// marks the thread as exited so [`FacadeGate::wait_for_facade`] never blocks forever.
#[derive(Debug)]
pub struct InputThreadExitGuard {
    pub gate: Arc<FacadeGate>,
}

impl Drop for InputThreadExitGuard {
    fn drop(&mut self) { self.gate.mark_input_exited(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnsiOutputAdapter, ColorSupport, OutputDevice, WindowSizeSource};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const SIZE: Size = Size::new(24, 80);

    fn gate() -> Arc<FacadeGate> {
        Arc::new(FacadeGate::new(OutputRequestScheduler::new(
            Duration::ZERO,
            Duration::from_secs(1),
            0,
        )))
    }

    fn output() -> BoxedOutputAdapter {
        let (device, _mock) = OutputDevice::new_mock();
        Box::new(AnsiOutputAdapter::new(
            device,
            ColorSupport::NoColor,
            WindowSizeSource::Fixed(SIZE),
            None,
        ))
    }

    #[test]
    fn test_input_arrives_second_and_builds() {
        let gate = gate();
        gate.arrive_output(output(), SIZE);

        let gate_clone = gate.clone();
        let handle = std::thread::spawn(move || {
            let _guard = InputThreadExitGuard { gate: gate_clone.clone() };
            gate_clone.arrive_input();
        });

        let facade = gate.wait_for_facade().unwrap();
        assert_eq!(facade.window_size(), SIZE);
        handle.join().unwrap();
        assert!(gate.take_output().is_none());
    }

    #[test]
    fn test_built_only_once() {
        let gate = gate();
        gate.arrive_input();
        gate.arrive_output(output(), SIZE);
        gate.arrive_input();
        assert!(gate.wait_for_facade().is_ok());

        // A second waiter finds nothing left but an exited thread.
        gate.mark_input_exited();
        assert!(matches!(
            gate.wait_for_facade(),
            Err(CoordinatorError::InputThreadExited)
        ));
    }

    #[test]
    fn test_init_failure_fails_fast_and_returns_output() {
        let gate = gate();
        gate.arrive_output(output(), SIZE);

        let gate_clone = gate.clone();
        std::thread::spawn(move || {
            let _guard = InputThreadExitGuard { gate: gate_clone.clone() };
            gate_clone.fail_input_init("no console".into());
        });

        let Err(CoordinatorError::InputAdapterInit { message }) = gate.wait_for_facade() else {
            panic!("expected InputAdapterInit");
        };
        assert_eq!(message, "no console");
        assert!(gate.take_output().is_some());
    }

    #[test]
    fn test_panicking_input_thread_still_releases_waiter() {
        let gate = gate();
        let gate_clone = gate.clone();
        let handle = std::thread::spawn(move || {
            let _guard = InputThreadExitGuard { gate: gate_clone };
            panic!("adapter blew up");
        });
        assert!(matches!(
            gate.wait_for_facade(),
            Err(CoordinatorError::InputThreadExited)
        ));
        assert!(handle.join().is_err());
    }
}
