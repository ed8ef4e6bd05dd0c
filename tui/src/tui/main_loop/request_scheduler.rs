// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Queries sent to the terminal, and matching their replies.
//!
//! A reply arrives on the input stream, mixed in with key presses, and carries nothing
//! that ties it to the query that caused it, only its terminator. So the scheduler keeps
//! at most one request in flight per terminator, and a reply with terminator `t`
//! completes the oldest in-flight request expecting `t`.
//!
//! ```text
//! enqueue ──▶ queued ──(no request in flight for the terminator,
//!                       throttle expired)──▶ in flight ──reply──▶ done
//!                                               │
//!                                               └─ no reply by the deadline:
//!                                                  resend with a longer deadline
//!                                                  (LogarithmicTimeout), or abandon
//!                                                  after `max_retries` resends
//! ```
//!
//! The terminators of in-flight requests are fed to the [`SequenceClassifier`] so a
//! reply like `CSI 1 ; 2 R` (cursor position) is not mistaken for Shift+F3.
//!
//! [`SequenceClassifier`]: crate::SequenceClassifier

use crate::{DEBUG_TUI_SHOW_MAIN_LOOP, KeyedRateLimiter, LogarithmicTimeout, OutputAdapter,
            RuntimeConfig,
            core::ansi::constants::{QUERY_CURSOR_POSITION, QUERY_DEVICE_ATTRIBUTES,
                                    QUERY_WINDOW_POSITION, QUERY_WINDOW_SIZE_CHARS,
                                    REPLY_CURSOR_POSITION_FINAL,
                                    REPLY_DEVICE_ATTRIBUTES_FINAL,
                                    REPLY_WINDOW_OPS_FINAL}};
use smallvec::SmallVec;
use std::{collections::VecDeque,
          time::{Duration, Instant}};

/// A query and the final char of the reply it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiRequest {
    pub query: String,
    pub expected_terminator: char,
}

impl AnsiRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, expected_terminator: char) -> Self {
        Self {
            query: query.into(),
            expected_terminator,
        }
    }

    /// `CSI 6n`, answered with `CSI row ; col R`.
    #[must_use]
    pub fn cursor_position() -> Self {
        Self::new(QUERY_CURSOR_POSITION, REPLY_CURSOR_POSITION_FINAL)
    }

    /// `CSI 18t`, answered with `CSI 8 ; rows ; cols t`.
    #[must_use]
    pub fn window_size() -> Self { Self::new(QUERY_WINDOW_SIZE_CHARS, REPLY_WINDOW_OPS_FINAL) }

    /// `CSI 13t`, answered with `CSI 3 ; x ; y t`.
    #[must_use]
    pub fn window_position() -> Self {
        Self::new(QUERY_WINDOW_POSITION, REPLY_WINDOW_OPS_FINAL)
    }

    /// `CSI c`, answered with `CSI ? ... c`.
    #[must_use]
    pub fn device_attributes() -> Self {
        Self::new(QUERY_DEVICE_ATTRIBUTES, REPLY_DEVICE_ATTRIBUTES_FINAL)
    }
}

/// A request that was written and is waiting for its reply.
#[derive(Debug, Clone)]
pub struct PendingTerminalRequest {
    pub request: AnsiRequest,
    pub first_sent_at: Instant,
    pub last_sent_at: Instant,
    /// Number of times the query was written.
    pub attempts: u32,
    backoff: LogarithmicTimeout,
}

impl PendingTerminalRequest {
    /// When this attempt is considered lost. Never sooner than the stale timeout after
    /// the last send.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.last_sent_at + self.backoff.span().max(self.backoff.base())
    }
}

/// What one call to [`OutputRequestScheduler::process`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestTickSummary {
    pub sent: usize,
    pub retried: usize,
    pub abandoned: usize,
}

#[derive(Debug)]
pub struct OutputRequestScheduler {
    queued: VecDeque<AnsiRequest>,
    in_flight: Vec<PendingTerminalRequest>,
    limiter: KeyedRateLimiter<char>,
    stale_timeout: Duration,
    max_retries: u32,
}

impl OutputRequestScheduler {
    #[must_use]
    pub fn new(throttle: Duration, stale_timeout: Duration, max_retries: u32) -> Self {
        Self {
            queued: VecDeque::new(),
            in_flight: Vec::new(),
            limiter: KeyedRateLimiter::new(throttle),
            stale_timeout,
            max_retries,
        }
    }

    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(
            config.request_throttle,
            config.request_stale_timeout,
            config.request_max_retries,
        )
    }

    pub fn enqueue(&mut self, request: AnsiRequest) { self.queued.push_back(request); }

    #[must_use]
    pub fn queued_len(&self) -> usize { self.queued.len() }

    #[must_use]
    pub fn in_flight(&self) -> &[PendingTerminalRequest] { &self.in_flight }

    #[must_use]
    pub fn is_idle(&self) -> bool { self.queued.is_empty() && self.in_flight.is_empty() }

    /// Terminators of the requests waiting for a reply.
    #[must_use]
    pub fn expected_terminators(&self) -> SmallVec<[char; 4]> {
        self.in_flight
            .iter()
            .map(|it| it.request.expected_terminator)
            .collect()
    }

    /// The earliest in-flight deadline, so an idle loop knows when to wake up.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.in_flight.iter().map(PendingTerminalRequest::deadline).min()
    }

    /// Resend or abandon overdue requests, then send whatever queued requests may go now.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `output` fails.
    pub fn process(
        &mut self,
        now: Instant,
        output: &mut dyn OutputAdapter,
    ) -> miette::Result<RequestTickSummary> {
        let mut summary = RequestTickSummary::default();

        // Overdue.
        let max_attempts = self.max_retries.saturating_add(1);
        let mut index = 0;
        while index < self.in_flight.len() {
            let pending = &mut self.in_flight[index];
            if now < pending.deadline() {
                index += 1;
                continue;
            }
            if pending.attempts >= max_attempts {
                let abandoned = self.in_flight.remove(index);
                summary.abandoned += 1;
                tracing::debug!(
                    message = "terminal request abandoned, no reply",
                    request = ?abandoned.request,
                    attempts = abandoned.attempts
                );
                continue;
            }
            output.write_raw(&pending.request.query)?;
            pending.attempts += 1;
            pending.last_sent_at = now;
            pending.backoff.advance();
            let _unused = self
                .limiter
                .get_status_and_update_last_run(pending.request.expected_terminator, now);
            summary.retried += 1;
            index += 1;
        }

        // Queued, in order. Blocked requests keep their place.
        let mut blocked = VecDeque::with_capacity(self.queued.len());
        while let Some(request) = self.queued.pop_front() {
            let terminator = request.expected_terminator;
            let busy = self
                .in_flight
                .iter()
                .any(|it| it.request.expected_terminator == terminator);
            if busy
                || !self
                    .limiter
                    .get_status_and_update_last_run(terminator, now)
                    .may_run()
            {
                blocked.push_back(request);
                continue;
            }
            output.write_raw(&request.query)?;
            summary.sent += 1;
            self.in_flight.push(PendingTerminalRequest {
                request,
                first_sent_at: now,
                last_sent_at: now,
                attempts: 1,
                backoff: LogarithmicTimeout::new(self.stale_timeout),
            });
        }
        self.queued = blocked;

        if summary.sent + summary.retried > 0 {
            output.flush()?;
        }

        DEBUG_TUI_SHOW_MAIN_LOOP.then(|| {
            tracing::debug!(
                message = "request scheduler tick",
                summary = ?summary,
                queued = self.queued.len(),
                in_flight = self.in_flight.len()
            );
        });
        Ok(summary)
    }

    /// A reply with `terminator` arrived. Completes the oldest matching request.
    pub fn on_reply(&mut self, terminator: char) -> Option<PendingTerminalRequest> {
        let index = self
            .in_flight
            .iter()
            .position(|it| it.request.expected_terminator == terminator)?;
        Some(self.in_flight.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnsiOutputAdapter, ColorSupport, OutputDevice, Size, StdoutMock,
                WindowSizeSource};
    use pretty_assertions::assert_eq;

    const THROTTLE: Duration = Duration::from_millis(100);
    const STALE: Duration = Duration::from_secs(1);

    fn fixture() -> (OutputRequestScheduler, AnsiOutputAdapter, StdoutMock) {
        let (device, mock) = OutputDevice::new_mock();
        let output = AnsiOutputAdapter::new(
            device,
            ColorSupport::NoColor,
            WindowSizeSource::Fixed(Size::new(24, 80)),
            None,
        );
        (OutputRequestScheduler::new(THROTTLE, STALE, 1), output, mock)
    }

    #[test]
    fn test_sends_and_completes_on_reply() {
        let (mut scheduler, mut output, mock) = fixture();
        let now = Instant::now();
        scheduler.enqueue(AnsiRequest::cursor_position());

        let summary = scheduler.process(now, &mut output).unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(mock.take_buffer_as_string(), "\x1b[6n");
        assert_eq!(scheduler.expected_terminators().as_slice(), ['R']);

        let done = scheduler.on_reply('R').unwrap();
        assert_eq!(done.request, AnsiRequest::cursor_position());
        assert!(scheduler.is_idle());
        assert!(scheduler.expected_terminators().is_empty());
    }

    #[test]
    fn test_same_terminator_waits_for_reply_and_throttle() {
        let (mut scheduler, mut output, mock) = fixture();
        let now = Instant::now();
        scheduler.enqueue(AnsiRequest::window_size());
        scheduler.enqueue(AnsiRequest::window_position());
        scheduler.enqueue(AnsiRequest::device_attributes());

        // Window ops share 't': only one goes, DA goes too.
        let summary = scheduler.process(now, &mut output).unwrap();
        assert_eq!(summary.sent, 2);
        assert_eq!(mock.take_buffer_as_string(), "\x1b[18t\x1b[c");
        assert_eq!(scheduler.queued_len(), 1);

        // Reply arrives, but the throttle still holds the second 't' query.
        scheduler.on_reply('t');
        let summary = scheduler
            .process(now + Duration::from_millis(10), &mut output)
            .unwrap();
        assert_eq!(summary.sent, 0);

        let summary = scheduler.process(now + THROTTLE, &mut output).unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(mock.take_buffer_as_string(), "\x1b[13t");
    }

    #[test]
    fn test_retry_then_abandon() {
        let (mut scheduler, mut output, mock) = fixture();
        let start = Instant::now();
        scheduler.enqueue(AnsiRequest::device_attributes());
        scheduler.process(start, &mut output).unwrap();
        mock.take_buffer_as_string();

        // First deadline: resend.
        let first_deadline = scheduler.next_deadline().unwrap();
        assert_eq!(first_deadline, start + STALE);
        let summary = scheduler.process(first_deadline, &mut output).unwrap();
        assert_eq!(summary.retried, 1);
        assert_eq!(mock.take_buffer_as_string(), "\x1b[c");

        // The retry waits longer than the first attempt did.
        let second_deadline = scheduler.next_deadline().unwrap();
        assert!(second_deadline - first_deadline > STALE);

        // Out of retries.
        let summary = scheduler.process(second_deadline, &mut output).unwrap();
        assert_eq!(summary.abandoned, 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_reply_without_request_is_ignored() {
        let (mut scheduler, ..) = fixture();
        assert!(scheduler.on_reply('R').is_none());
    }
}
