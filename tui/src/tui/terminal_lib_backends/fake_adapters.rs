// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Input adapters for environments without an interactive terminal (CI, piped I/O,
//! tests).

use crate::{AdapterError, CancellationSignal, HandoffSender, InputAdapter, RawInputUnit};
use std::time::Duration;

/// How long the fakes sleep between cancellation checks.
pub const FAKE_ADAPTER_IDLE_WAIT: Duration = Duration::from_millis(10);

/// Reads nothing. `run` just waits for cancellation.
#[derive(Debug, Default)]
pub struct NoOpInputAdapter {
    initialized: bool,
}

impl InputAdapter for NoOpInputAdapter {
    fn name(&self) -> &'static str { "no_op" }

    fn initialize(&mut self, _queue: HandoffSender) -> miette::Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()> {
        if !self.initialized {
            return Err(AdapterError::NotInitialized.into());
        }
        while !cancel.wait_timeout(FAKE_ADAPTER_IDLE_WAIT) {}
        Ok(())
    }

    fn dispose(&mut self) { self.initialized = false; }
}

/// Pushes a fixed list of units, in order, then idles until cancelled.
#[derive(Debug, Default)]
pub struct ScriptedInputAdapter {
    script: Vec<RawInputUnit>,
    queue: Option<HandoffSender>,
    /// Fail `initialize`, to exercise startup failure paths.
    pub fail_initialize: bool,
}

impl ScriptedInputAdapter {
    #[must_use]
    pub fn new(script: Vec<RawInputUnit>) -> Self {
        Self {
            script,
            queue: None,
            fail_initialize: false,
        }
    }

    /// Each char of `text` becomes a [`RawInputUnit::Char`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text.chars().map(RawInputUnit::Char).collect())
    }
}

impl InputAdapter for ScriptedInputAdapter {
    fn name(&self) -> &'static str { "scripted" }

    fn initialize(&mut self, queue: HandoffSender) -> miette::Result<()> {
        if self.fail_initialize {
            return Err(AdapterError::ConsoleHandleUnavailable { which: "scripted" }.into());
        }
        self.queue = Some(queue);
        Ok(())
    }

    fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()> {
        let queue = self.queue.as_ref().ok_or(AdapterError::NotInitialized)?;
        for unit in self.script.drain(..) {
            if cancel.is_cancelled() {
                return Ok(());
            }
            queue.push(unit)?;
        }
        while !cancel.wait_timeout(FAKE_ADAPTER_IDLE_WAIT) {}
        Ok(())
    }

    fn dispose(&mut self) { self.queue = None; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_handoff_queue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scripted_pushes_in_order_then_waits_for_cancel() {
        let (tx, mut rx) = new_handoff_queue();
        let cancel = CancellationSignal::new();
        let mut adapter = ScriptedInputAdapter::from_text("ab");
        adapter.initialize(tx).unwrap();

        let cancel_clone = cancel.clone();
        let handle = std::thread::spawn(move || {
            let result = adapter.run(&cancel_clone);
            adapter.dispose();
            result
        });

        // Wait for both units.
        let mut received = vec![];
        while received.len() < 2 {
            received.extend(rx.drain());
            std::thread::yield_now();
        }
        cancel.cancel();

        assert!(handle.join().unwrap().is_ok());
        assert_eq!(received, vec![RawInputUnit::Char('a'), RawInputUnit::Char('b')]);
    }

    #[test]
    fn test_run_before_initialize_fails() {
        let mut adapter = NoOpInputAdapter::default();
        assert!(adapter.run(&CancellationSignal::new()).is_err());
    }

    #[test]
    fn test_no_op_returns_on_cancel() {
        let (tx, _rx) = new_handoff_queue();
        let mut adapter = NoOpInputAdapter::default();
        adapter.initialize(tx).unwrap();
        let cancel = CancellationSignal::new();
        cancel.cancel();
        assert!(adapter.run(&cancel).is_ok());
    }
}
