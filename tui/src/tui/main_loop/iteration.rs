// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ApplicationContext, DEBUG_TUI_SHOW_MAIN_LOOP, DriverCallbacks, DriverFacade,
            HandoffReceiver, InputProcessor, RequestTickSummary, StructuredEvent};
use std::time::Instant;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationSummary {
    pub requests: RequestTickSummary,
    pub units_drained: usize,
    pub events_dispatched: usize,
    pub timers_run: usize,
    pub redrawn: bool,
    /// The queue is closed and empty: no more input will ever arrive.
    pub input_thread_finished: bool,
}

/// One tick of the UI loop, borrowing everything it touches from the coordinator.
///
/// Steps, in order, none of which blocks:
/// 1. Resend, abandon, or send terminal requests.
/// 2. Drain the handoff queue through the [`InputProcessor`], and dispatch each event to
///    its callback.
/// 3. Run due timers.
/// 4. Redraw, if this is the first tick, if anything was dispatched, or if it was
///    requested.
#[derive(Debug)]
pub struct MainLoopIteration<'a> {
    pub facade: &'a mut DriverFacade,
    pub receiver: &'a mut HandoffReceiver,
    pub processor: &'a mut InputProcessor,
    pub callbacks: &'a mut DriverCallbacks,
    pub context: &'a ApplicationContext,
    /// Scratch buffer, reused across ticks.
    pub events: &'a mut Vec<StructuredEvent>,
    pub is_first_tick: bool,
}

impl MainLoopIteration<'_> {
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails, or if `on_redraw` does.
    pub fn run(self, now: Instant) -> miette::Result<IterationSummary> {
        let mut summary = IterationSummary {
            requests: self.facade.process_requests(now)?,
            ..IterationSummary::default()
        };

        self.events.clear();
        summary.units_drained = self.processor.drain(
            self.receiver,
            now,
            self.facade.requests_mut(),
            self.events,
        );
        for event in self.events.drain(..) {
            dispatch(event, self.facade, self.callbacks, self.context);
            summary.events_dispatched += 1;
        }

        summary.timers_run = self.context.timers().run_due_at(now);

        let redraw_requested = self.context.take_redraw_request();
        if self.is_first_tick || summary.events_dispatched > 0 || redraw_requested {
            (self.callbacks.on_redraw)(self.facade, self.context)?;
            summary.redrawn = true;
        }

        summary.input_thread_finished = self.receiver.is_finished();

        DEBUG_TUI_SHOW_MAIN_LOOP.then(|| {
            tracing::debug!(message = "main loop iteration", summary = ?summary);
        });
        Ok(summary)
    }
}

fn dispatch(
    event: StructuredEvent,
    facade: &mut DriverFacade,
    callbacks: &mut DriverCallbacks,
    context: &ApplicationContext,
) {
    match event {
        StructuredEvent::Key(key) => {
            (callbacks.on_key_down)(key, facade, context);
            (callbacks.on_key_up)(key, facade, context);
        }
        StructuredEvent::Mouse(mouse_event) => {
            (callbacks.on_mouse_event)(mouse_event, facade, context);
        }
        StructuredEvent::WindowSize(size) => {
            if size != facade.window_size() {
                facade.set_window_size(size);
                (callbacks.on_size_changed)(size, facade, context);
            }
        }
        StructuredEvent::WindowPosition(_) | StructuredEvent::TerminalReply(_) => {
            (callbacks.on_terminal_reply)(&event, facade, context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnsiOutputAdapter, ColorSupport, Continuation, Key, KeyCode,
                OutputDevice, OutputRequestScheduler, RawInputUnit, Size,
                WindowSizeSource, new_handoff_queue};
    use pretty_assertions::assert_eq;
    use std::{sync::{Arc, Mutex},
              time::Duration};

    const SIZE: Size = Size::new(24, 80);

    struct Fixture {
        facade: DriverFacade,
        receiver: HandoffReceiver,
        processor: InputProcessor,
        context: ApplicationContext,
        events: Vec<StructuredEvent>,
    }

    impl Fixture {
        fn new() -> (Self, crate::HandoffSender) {
            let (device, _mock) = OutputDevice::new_mock();
            let output = AnsiOutputAdapter::new(
                device,
                ColorSupport::NoColor,
                WindowSizeSource::Fixed(SIZE),
                None,
            );
            let requests =
                OutputRequestScheduler::new(Duration::ZERO, Duration::from_secs(1), 0);
            let (tx, receiver) = new_handoff_queue();
            let fixture = Self {
                facade: DriverFacade::new(Box::new(output), SIZE, requests),
                receiver,
                processor: InputProcessor::new(Duration::from_millis(50)),
                context: ApplicationContext::new(),
                events: vec![],
            };
            (fixture, tx)
        }

        fn tick(
            &mut self,
            callbacks: &mut DriverCallbacks,
            is_first_tick: bool,
        ) -> IterationSummary {
            MainLoopIteration {
                facade: &mut self.facade,
                receiver: &mut self.receiver,
                processor: &mut self.processor,
                callbacks,
                context: &self.context,
                events: &mut self.events,
                is_first_tick,
            }
            .run(Instant::now())
            .unwrap()
        }
    }

    #[test]
    fn test_key_is_delivered_as_down_then_up_then_redraw() {
        let (mut fixture, tx) = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let (down, up, redraw) = (log.clone(), log.clone(), log.clone());
        let mut callbacks = DriverCallbacks::default()
            .with_on_key_down(move |key, _, _| down.lock().unwrap().push(format!("down {key:?}")))
            .with_on_key_up(move |key, _, _| up.lock().unwrap().push(format!("up {key:?}")))
            .with_on_redraw(move |_, _| {
                redraw.lock().unwrap().push("redraw".into());
                Ok(())
            });

        tx.push(RawInputUnit::Char('a')).unwrap();
        let summary = fixture.tick(&mut callbacks, false);

        let key = Key::plain(KeyCode::Char('a'));
        assert_eq!(*log.lock().unwrap(), vec![
            format!("down {key:?}"),
            format!("up {key:?}"),
            "redraw".to_string(),
        ]);
        assert_eq!(summary.units_drained, 1);
        assert_eq!(summary.events_dispatched, 1);
        assert!(summary.redrawn);
    }

    #[test]
    fn test_idle_tick_does_not_redraw() {
        let (mut fixture, _tx) = Fixture::new();
        let mut callbacks = DriverCallbacks::default();
        assert!(fixture.tick(&mut callbacks, true).redrawn);
        assert!(!fixture.tick(&mut callbacks, false).redrawn);

        fixture.context.request_redraw();
        assert!(fixture.tick(&mut callbacks, false).redrawn);
    }

    #[test]
    fn test_same_size_does_not_fire_size_changed() {
        let (mut fixture, tx) = Fixture::new();
        let sizes = Arc::new(Mutex::new(vec![]));
        let sizes_clone = sizes.clone();
        let mut callbacks = DriverCallbacks::default()
            .with_on_size_changed(move |size, _, _| sizes_clone.lock().unwrap().push(size));

        let bigger = Size::new(30, 100);
        tx.push(RawInputUnit::WindowResized(SIZE)).unwrap();
        tx.push(RawInputUnit::WindowResized(bigger)).unwrap();
        fixture.tick(&mut callbacks, false);

        assert_eq!(*sizes.lock().unwrap(), vec![bigger]);
        assert_eq!(fixture.facade.window_size(), bigger);
    }

    #[test]
    fn test_timers_run_after_input() {
        let (mut fixture, tx) = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::<&str>::new()));

        let timer_log = log.clone();
        fixture.context.add_timeout(Duration::ZERO, move || {
            timer_log.lock().unwrap().push("timer");
            Continuation::Stop
        });
        let key_log = log.clone();
        let mut callbacks = DriverCallbacks::default()
            .with_on_key_down(move |_, _, _| key_log.lock().unwrap().push("key"));

        tx.push(RawInputUnit::Char('x')).unwrap();
        let summary = fixture.tick(&mut callbacks, false);

        assert_eq!(summary.timers_run, 1);
        assert_eq!(*log.lock().unwrap(), vec!["key", "timer"]);
    }

    #[test]
    fn test_closed_queue_reports_finished_input() {
        let (mut fixture, tx) = Fixture::new();
        let mut callbacks = DriverCallbacks::default();
        tx.push(RawInputUnit::Char('x')).unwrap();
        drop(tx);

        let summary = fixture.tick(&mut callbacks, false);
        assert_eq!(summary.events_dispatched, 1);
        assert!(summary.input_thread_finished);
    }
}
