// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # Main loop coordinator
//!
//! Bridges a blocking OS input reader with a single threaded UI loop.
//!
//! ```text
//!                 ┌──────────────────────────── "r3bl-input" thread ───────────────┐
//!  start() ──────▶│ factory() → adapter.initialize(queue) → arrive_input()         │
//!     │           │ adapter.run(&cancel) ... adapter.dispose()                     │
//!     │           └─────────┬──────────────────────────────────────▲───────────────┘
//!     │                     │ RawInputUnit (handoff queue)         │ cancel()
//!     ▼                     ▼                                      │
//!  output.initialize() ┌────────────────────────────┐              │
//!  arrive_output() ───▶│ FacadeGate ─▶ DriverFacade │         stop(): cancel, dispose
//!  wait_for_facade()   └────────────────────────────┘         output, join input thread
//!     │
//!     ▼
//!  run_iteration() / run_until()  on the UI thread
//! ```
//!
//! ## Lifecycle
//!
//! `Idle → Starting → Running → Stopping → Stopped`. A failed `start` goes straight to
//! `Stopped`, with everything it acquired released. `stop` is idempotent. Dropping the
//! coordinator runs the same teardown, on whichever thread drops it, so terminal modes are
//! restored even if the UI thread is gone.
//!
//! ## Threads
//!
//! The thread that calls [`MainLoopCoordinator::start`] becomes the UI thread. Iterations
//! and `stop` are rejected anywhere else with [`CoordinatorError::NotOnUiThread`].

use crate::{ApplicationContext, BoxedOutputAdapter, CancellationSignal, CoordinatorError,
            DEBUG_TUI_SHOW_MAIN_LOOP, DriverCallbacks, DriverFacade, FacadeGate,
            HandoffReceiver, HandoffSender, InputAdapterFactory, InputProcessor,
            InputThreadExitGuard, IterationSummary, MainLoopIteration,
            OutputRequestScheduler, RuntimeConfig, StdoutMock, StructuredEvent,
            new_handoff_queue, select_backend};
use std::{sync::Arc,
          thread::{JoinHandle, ThreadId},
          time::{Duration, Instant}};

pub const INPUT_THREAD_NAME: &str = "r3bl-input";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CoordinatorState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

/// Why [`MainLoopCoordinator::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunUntilExit {
    PredicateMet,
    StopRequested,
    InputThreadFinished,
}

pub struct MainLoopCoordinator {
    config: RuntimeConfig,
    state: CoordinatorState,
    /// Set by `start`.
    ui_thread: Option<ThreadId>,
    context: ApplicationContext,
    callbacks: DriverCallbacks,
    processor: InputProcessor,
    events: Vec<StructuredEvent>,
    /// Moved to the input thread by `start`.
    queue_tx: Option<HandoffSender>,
    receiver: HandoffReceiver,
    /// Moved to the input thread by `start`.
    input_factory: Option<InputAdapterFactory>,
    /// Moved into the gate by `start`.
    output: Option<BoxedOutputAdapter>,
    facade: Option<DriverFacade>,
    gate: Arc<FacadeGate>,
    cancel: CancellationSignal,
    input_thread: Option<JoinHandle<miette::Result<()>>>,
    headless_output: Option<StdoutMock>,
    is_first_tick: bool,
}

impl std::fmt::Debug for MainLoopCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainLoopCoordinator")
            .field("state", &self.state)
            .field("ui_thread", &self.ui_thread)
            .field("facade", &self.facade)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl MainLoopCoordinator {
    /// Build the adapters for `config.backend` with [`select_backend`].
    #[must_use]
    pub fn new(config: RuntimeConfig, callbacks: DriverCallbacks) -> Self {
        let selected = select_backend(&config);
        let mut it = Self::with_adapters(
            config,
            callbacks,
            selected.input_factory,
            selected.output_adapter,
        );
        it.headless_output = selected.headless_output;
        it
    }

    #[must_use]
    pub fn with_adapters(
        config: RuntimeConfig,
        callbacks: DriverCallbacks,
        input_factory: InputAdapterFactory,
        output: BoxedOutputAdapter,
    ) -> Self {
        let (queue_tx, receiver) = new_handoff_queue();
        Self {
            processor: InputProcessor::new(config.release_deadline),
            gate: Arc::new(FacadeGate::new(OutputRequestScheduler::from_config(&config))),
            config,
            state: CoordinatorState::Idle,
            ui_thread: None,
            context: ApplicationContext::new(),
            callbacks,
            events: Vec::new(),
            queue_tx: Some(queue_tx),
            receiver,
            input_factory: Some(input_factory),
            output: Some(output),
            facade: None,
            cancel: CancellationSignal::new(),
            input_thread: None,
            headless_output: None,
            is_first_tick: true,
        }
    }

    #[must_use]
    pub fn state(&self) -> CoordinatorState { self.state }

    #[must_use]
    pub fn context(&self) -> &ApplicationContext { &self.context }

    /// Present once running.
    pub fn facade_mut(&mut self) -> Option<&mut DriverFacade> { self.facade.as_mut() }

    /// What was written to the terminal, when running on the headless backend.
    #[must_use]
    pub fn headless_output(&self) -> Option<&StdoutMock> { self.headless_output.as_ref() }

    fn set_state(&mut self, state: CoordinatorState) {
        DEBUG_TUI_SHOW_MAIN_LOOP.then(|| {
            tracing::debug!(message = "coordinator state", from = %self.state, to = %state);
        });
        self.state = state;
    }

    fn check_ui_thread(&self) -> Result<(), CoordinatorError> {
        match self.ui_thread {
            Some(id) if id != std::thread::current().id() => {
                Err(CoordinatorError::NotOnUiThread)
            }
            _ => Ok(()),
        }
    }

    /// Spawn the input thread, initialize the output adapter on this thread, and wait
    /// until both are ready.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::AlreadyStarted`] unless the coordinator is `Idle`.
    /// - The output adapter's initialization error.
    /// - [`CoordinatorError::InputAdapterInit`] or [`CoordinatorError::InputThreadExited`]
    ///   if the input side fails before the facade is built.
    ///
    /// On error everything acquired so far is released and the state is `Stopped`.
    pub fn start(&mut self) -> miette::Result<()> {
        if self.state != CoordinatorState::Idle {
            return Err(CoordinatorError::AlreadyStarted.into());
        }
        self.ui_thread = Some(std::thread::current().id());
        self.set_state(CoordinatorState::Starting);

        match self.try_start() {
            Ok(facade) => {
                self.facade = Some(facade);
                self.set_state(CoordinatorState::Running);
                Ok(())
            }
            Err(report) => {
                tracing::error!(message = "coordinator start failed", error = %report);
                self.abort_start();
                Err(report)
            }
        }
    }

    fn try_start(&mut self) -> miette::Result<DriverFacade> {
        let (Some(factory), Some(queue_tx), Some(mut output)) = (
            self.input_factory.take(),
            self.queue_tx.take(),
            self.output.take(),
        ) else {
            return Err(CoordinatorError::AlreadyStarted.into());
        };

        let gate = self.gate.clone();
        let cancel = self.cancel.clone();
        let spawned = std::thread::Builder::new()
            .name(INPUT_THREAD_NAME.into())
            .spawn(move || run_input_thread(factory, queue_tx, &cancel, gate))
            .map_err(CoordinatorError::ThreadSpawn);
        match spawned {
            Ok(handle) => self.input_thread = Some(handle),
            Err(error) => {
                self.output = Some(output);
                return Err(error.into());
            }
        }

        let size = match output.initialize() {
            Ok(size) => size,
            Err(report) => {
                output.dispose();
                return Err(report);
            }
        };
        self.gate.arrive_output(output, size);

        Ok(self.gate.wait_for_facade()?)
    }

    /// Release whatever a failed `start` acquired.
    fn abort_start(&mut self) {
        self.cancel.cancel();
        if let Some(mut output) = self.gate.take_output() {
            output.dispose();
        }
        if let Some(handle) = self.input_thread.take() {
            let _unused = handle.join();
        }
        self.set_state(CoordinatorState::Stopped);
    }

    /// Run exactly one tick. See [`MainLoopIteration`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NotRunning`] or [`CoordinatorError::NotOnUiThread`],
    /// or the first error of the tick itself.
    pub fn run_iteration(&mut self) -> miette::Result<IterationSummary> {
        self.check_ui_thread()?;
        let Some(facade) = self.facade.as_mut() else {
            return Err(CoordinatorError::NotRunning.into());
        };
        if self.state != CoordinatorState::Running {
            return Err(CoordinatorError::NotRunning.into());
        }

        let summary = MainLoopIteration {
            facade,
            receiver: &mut self.receiver,
            processor: &mut self.processor,
            callbacks: &mut self.callbacks,
            context: &self.context,
            events: &mut self.events,
            is_first_tick: self.is_first_tick,
        }
        .run(Instant::now())?;
        self.is_first_tick = false;
        Ok(summary)
    }

    /// Iterate until `is_done` returns true, the application calls
    /// [`ApplicationContext::request_stop`], or the input thread ends. Between ticks the
    /// thread sleeps until the next timer, parser or request deadline, capped at the
    /// tick interval.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`Self::run_iteration`].
    pub fn run_until(
        &mut self,
        mut is_done: impl FnMut(&ApplicationContext) -> bool,
    ) -> miette::Result<RunUntilExit> {
        loop {
            let summary = self.run_iteration()?;

            if self.context.is_stop_requested() {
                return Ok(RunUntilExit::StopRequested);
            }
            if summary.input_thread_finished {
                return Ok(RunUntilExit::InputThreadFinished);
            }
            if is_done(&self.context) {
                return Ok(RunUntilExit::PredicateMet);
            }

            std::thread::sleep(self.sleep_duration(Instant::now()));
        }
    }

    fn sleep_duration(&self, now: Instant) -> Duration {
        let deadlines = [
            self.processor.pending_deadline(),
            self.facade
                .as_ref()
                .and_then(|it| it.requests().next_deadline()),
        ];
        deadlines
            .into_iter()
            .flatten()
            .map(|deadline| deadline.saturating_duration_since(now))
            .chain(self.context.timers().next_due_in(now))
            .fold(self.config.tick_interval, Duration::min)
    }

    /// Cancel the input thread, dispose the output adapter, join the input thread.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::NotOnUiThread`] when called from another thread.
    /// - [`CoordinatorError::InputThreadPanicked`] if joining reports a panic. The
    ///   coordinator is still `Stopped` afterwards.
    pub fn stop(&mut self) -> Result<StopOutcome, CoordinatorError> {
        self.check_ui_thread()?;
        self.shutdown()
    }

    /// Cancel, dispose the output adapter, and join the input thread. Each happens at most
    /// once. Not tied to the UI thread: the output adapter is `Send`.
    fn shutdown(&mut self) -> Result<StopOutcome, CoordinatorError> {
        match self.state {
            CoordinatorState::Stopped | CoordinatorState::Stopping => {
                return Ok(StopOutcome::AlreadyStopped);
            }
            CoordinatorState::Idle => {
                // Nothing was acquired; the output adapter was never initialized.
                self.set_state(CoordinatorState::Stopped);
                return Ok(StopOutcome::Stopped);
            }
            CoordinatorState::Starting | CoordinatorState::Running => {}
        }
        self.set_state(CoordinatorState::Stopping);

        self.cancel.cancel();

        if let Some(facade) = self.facade.as_mut() {
            facade.output_mut().dispose();
        }

        let joined = self.input_thread.take().map(JoinHandle::join);
        self.set_state(CoordinatorState::Stopped);
        match joined {
            Some(Err(_panic)) => Err(CoordinatorError::InputThreadPanicked),
            Some(Ok(Err(report))) => {
                tracing::warn!(message = "input thread ended with an error", error = %report);
                Ok(StopOutcome::Stopped)
            }
            Some(Ok(Ok(()))) | None => Ok(StopOutcome::Stopped),
        }
    }
}

impl Drop for MainLoopCoordinator {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            tracing::error!(message = "coordinator shutdown on drop failed", error = %error);
        }
    }
}

/// Body of the input thread. Builds and initializes the adapter here, since adapters
/// hold thread affine handles, then runs it until cancelled.
fn run_input_thread(
    factory: InputAdapterFactory,
    queue: HandoffSender,
    cancel: &CancellationSignal,
    gate: Arc<FacadeGate>,
) -> miette::Result<()> {
    let _guard = InputThreadExitGuard { gate: gate.clone() };

    let mut adapter = match factory() {
        Ok(adapter) => adapter,
        Err(report) => {
            gate.fail_input_init(report.to_string());
            return Err(report);
        }
    };
    if let Err(report) = adapter.initialize(queue) {
        adapter.dispose();
        gate.fail_input_init(report.to_string());
        return Err(report);
    }

    DEBUG_TUI_SHOW_MAIN_LOOP.then(|| {
        tracing::debug!(message = "input thread: adapter ready", adapter = adapter.name());
    });
    gate.arrive_input();

    let result = adapter.run(cancel);
    adapter.dispose();

    if let Err(report) = &result {
        tracing::error!(
            message = "input thread: adapter failed",
            adapter = adapter.name(),
            error = %report
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnsiOutputAdapter, ButtonState, ColorSupport, CursorVisibility,
                InputAdapter, Key, KeyCode, KeyModifiers, MouseButton, MouseEvent, OutputAdapter,
                OutputDevice, Point, ScriptedInputAdapter, Size, StyledCellGrid,
                WindowSizeSource};
    use pretty_assertions::assert_eq;
    use std::sync::{Mutex,
                    atomic::{AtomicUsize, Ordering}};

    const SIZE: Size = Size::new(24, 80);

    /// Delegates to a headless [`AnsiOutputAdapter`], counting `dispose` calls.
    #[derive(Debug)]
    struct CountingOutput {
        inner: AnsiOutputAdapter,
        disposed: Arc<AtomicUsize>,
    }

    impl OutputAdapter for CountingOutput {
        fn name(&self) -> &'static str { "counting" }
        fn initialize(&mut self) -> miette::Result<Size> { self.inner.initialize() }
        fn window_size(&mut self) -> miette::Result<Size> { self.inner.window_size() }
        fn set_cursor_position(&mut self, position: Point) -> miette::Result<()> {
            self.inner.set_cursor_position(position)
        }
        fn set_cursor_visibility(&mut self, it: CursorVisibility) -> miette::Result<()> {
            self.inner.set_cursor_visibility(it)
        }
        fn write_cells(&mut self, grid: &StyledCellGrid) -> miette::Result<()> {
            self.inner.write_cells(grid)
        }
        fn write_raw(&mut self, text: &str) -> miette::Result<()> { self.inner.write_raw(text) }
        fn flush(&mut self) -> miette::Result<()> { self.inner.flush() }
        fn dispose(&mut self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
            self.inner.dispose();
        }
    }

    fn counting_output() -> (BoxedOutputAdapter, Arc<AtomicUsize>) {
        let (device, _mock) = OutputDevice::new_mock();
        let disposed = Arc::new(AtomicUsize::new(0));
        let output = CountingOutput {
            inner: AnsiOutputAdapter::new(
                device,
                ColorSupport::NoColor,
                WindowSizeSource::Fixed(SIZE),
                None,
            ),
            disposed: disposed.clone(),
        };
        (Box::new(output), disposed)
    }

    /// Delegates to a [`ScriptedInputAdapter`], counting `dispose` calls.
    #[derive(Debug)]
    struct CountingInput {
        inner: ScriptedInputAdapter,
        disposed: Arc<AtomicUsize>,
    }

    impl InputAdapter for CountingInput {
        fn name(&self) -> &'static str { "counting" }
        fn initialize(&mut self, queue: HandoffSender) -> miette::Result<()> {
            self.inner.initialize(queue)
        }
        fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()> {
            self.inner.run(cancel)
        }
        fn dispose(&mut self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
            self.inner.dispose();
        }
    }

    fn counting_input() -> (InputAdapterFactory, Arc<AtomicUsize>) {
        let disposed = Arc::new(AtomicUsize::new(0));
        let adapter = CountingInput {
            inner: ScriptedInputAdapter::default(),
            disposed: disposed.clone(),
        };
        let factory: InputAdapterFactory =
            Box::new(move || -> miette::Result<Box<dyn InputAdapter>> { Ok(Box::new(adapter)) });
        (factory, disposed)
    }

    fn scripted(adapter: ScriptedInputAdapter) -> InputAdapterFactory {
        Box::new(move || -> miette::Result<Box<dyn InputAdapter>> { Ok(Box::new(adapter)) })
    }

    fn config() -> RuntimeConfig {
        RuntimeConfig::default().with_tick_interval(Duration::from_millis(1))
    }

    #[test]
    fn test_double_stop_disposes_and_joins_once() {
        let (output, output_disposed) = counting_output();
        let (input_factory, input_disposed) = counting_input();
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            DriverCallbacks::default(),
            input_factory,
            output,
        );
        coordinator.start().unwrap();
        assert_eq!(coordinator.state(), CoordinatorState::Running);

        assert_eq!(coordinator.stop().unwrap(), StopOutcome::Stopped);
        // The input thread was joined: it already disposed its adapter and exited.
        assert!(coordinator.input_thread.is_none());
        assert!(coordinator.gate.has_input_exited());
        assert_eq!(input_disposed.load(Ordering::SeqCst), 1);

        assert_eq!(coordinator.stop().unwrap(), StopOutcome::AlreadyStopped);
        drop(coordinator);

        assert_eq!(output_disposed.load(Ordering::SeqCst), 1);
        assert_eq!(input_disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_on_another_thread_still_tears_down() {
        let (output, output_disposed) = counting_output();
        let (input_factory, input_disposed) = counting_input();
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            DriverCallbacks::default(),
            input_factory,
            output,
        );
        coordinator.start().unwrap();

        std::thread::spawn(move || drop(coordinator)).join().unwrap();

        assert_eq!(output_disposed.load(Ordering::SeqCst), 1);
        assert_eq!(input_disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sgr_mouse_press_and_release_end_to_end() {
        let events = Arc::new(Mutex::new(vec![]));
        let events_clone = events.clone();
        let callbacks = DriverCallbacks::default().with_on_mouse_event(move |event, _, _| {
            events_clone.lock().unwrap().push(event);
        });

        let (output, _) = counting_output();
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            callbacks,
            scripted(ScriptedInputAdapter::from_text("\x1b[<0;10;5M\x1b[<0;10;5m")),
            output,
        );
        coordinator.start().unwrap();
        coordinator
            .run_until(|_| events.lock().unwrap().len() >= 3)
            .unwrap();
        coordinator.stop().unwrap();

        // 1-based report, 0-based position. The release also completes a click.
        let at = |button_state| MouseEvent {
            position: Point::new(4, 9),
            button_state,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(*events.lock().unwrap(), vec![
            at(ButtonState::Pressed(MouseButton::Left)),
            at(ButtonState::Released(MouseButton::Left)),
            at(ButtonState::Clicked(MouseButton::Left)),
        ]);
    }

    #[test]
    fn test_request_stop_from_callback_ends_run_until() {
        let callbacks = DriverCallbacks::default().with_on_key_down(|key, _, context| {
            if key == Key::plain(KeyCode::Char('q')) {
                context.request_stop();
            }
        });
        let (output, _) = counting_output();
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            callbacks,
            scripted(ScriptedInputAdapter::from_text("abq")),
            output,
        );
        coordinator.start().unwrap();
        assert_eq!(
            coordinator.run_until(|_| false).unwrap(),
            RunUntilExit::StopRequested
        );
    }

    #[test]
    fn test_input_init_failure_fails_start_and_disposes_output() {
        let (output, disposed) = counting_output();
        let mut failing = ScriptedInputAdapter::default();
        failing.fail_initialize = true;
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            DriverCallbacks::default(),
            scripted(failing),
            output,
        );

        let report = coordinator.start().unwrap_err();
        assert!(matches!(
            report.downcast_ref::<CoordinatorError>(),
            Some(CoordinatorError::InputAdapterInit { .. } | CoordinatorError::InputThreadExited)
        ));
        assert_eq!(coordinator.state(), CoordinatorState::Stopped);
        assert_eq!(disposed.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.stop().unwrap(), StopOutcome::AlreadyStopped);
    }

    #[test]
    fn test_stop_from_another_thread_is_rejected() {
        let (output, _) = counting_output();
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            DriverCallbacks::default(),
            scripted(ScriptedInputAdapter::default()),
            output,
        );
        coordinator.start().unwrap();

        let mut coordinator = std::thread::spawn(move || {
            assert!(matches!(
                coordinator.stop(),
                Err(CoordinatorError::NotOnUiThread)
            ));
            coordinator
        })
        .join()
        .unwrap();

        assert_eq!(coordinator.stop().unwrap(), StopOutcome::Stopped);
    }

    #[test]
    fn test_run_iteration_before_start_fails() {
        let (output, _) = counting_output();
        let mut coordinator = MainLoopCoordinator::with_adapters(
            config(),
            DriverCallbacks::default(),
            scripted(ScriptedInputAdapter::default()),
            output,
        );
        assert!(coordinator.run_iteration().is_err());
        assert_eq!(coordinator.stop().unwrap(), StopOutcome::Stopped);
    }
}
