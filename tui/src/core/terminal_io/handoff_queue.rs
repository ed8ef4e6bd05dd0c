// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The only channel between the input thread and the UI thread.
//!
//! Unbounded, FIFO, and non-blocking on both ends: the input thread must never stall
//! behind a slow UI, and the UI thread drains with [`HandoffReceiver::drain`] once per
//! iteration without waiting.

use crate::{AdapterError, RawInputUnit, Utf8Decoder};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError,
                        unbounded_channel};

#[must_use]
pub fn new_handoff_queue() -> (HandoffSender, HandoffReceiver) {
    let (tx, rx) = unbounded_channel();
    (HandoffSender { tx }, HandoffReceiver { rx })
}

/// Producer half. Owned by the input adapter.
#[derive(Debug, Clone)]
pub struct HandoffSender {
    tx: UnboundedSender<RawInputUnit>,
}

impl HandoffSender {
    /// # Errors
    ///
    /// Returns [`AdapterError::QueueClosed`] if the UI side is gone, which means the
    /// input thread should return.
    pub fn push(&self, unit: RawInputUnit) -> Result<(), AdapterError> {
        self.tx.send(unit).map_err(|_| AdapterError::QueueClosed)
    }

    /// Decode `bytes` (which may end in the middle of a code point; `utf8` keeps the
    /// partial char for the next call) and push each char in order. `decoded` is scratch
    /// space reused between calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::QueueClosed`] if the UI side is gone.
    pub fn push_utf8(
        &self,
        utf8: &mut Utf8Decoder,
        bytes: &[u8],
        decoded: &mut Vec<char>,
    ) -> Result<(), AdapterError> {
        decoded.clear();
        utf8.decode_into(bytes, decoded);
        decoded
            .drain(..)
            .try_for_each(|ch| self.push(RawInputUnit::Char(ch)))
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// Consumer half. Owned by the UI thread.
#[derive(Debug)]
pub struct HandoffReceiver {
    rx: UnboundedReceiver<RawInputUnit>,
}

impl HandoffReceiver {
    /// Next queued unit, without blocking.
    pub fn try_pop(&mut self) -> Option<RawInputUnit> {
        match self.rx.try_recv() {
            Ok(unit) => Some(unit),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Everything currently queued, in push order. Units pushed while draining are
    /// picked up too.
    pub fn drain(&mut self) -> impl Iterator<Item = RawInputUnit> + '_ {
        std::iter::from_fn(|| self.try_pop())
    }

    /// `true` once every sender is dropped and nothing is left to drain.
    #[must_use]
    pub fn is_finished(&self) -> bool { self.rx.is_closed() && self.rx.is_empty() }
}
