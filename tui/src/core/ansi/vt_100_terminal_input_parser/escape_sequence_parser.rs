// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Char level state machine that splits the input stream into plain chars and complete
//! escape sequences.
//!
//! ```text
//!             ESC                  '[' or 'O'              terminator
//!  Ground ─────────▶ EscapeSeen ─────────────▶ CollectingParams ────────▶ Ground
//!    ▲                 │  │                      │  digits, ';', marker
//!    │  other char     │  │ release deadline     │  (accumulate)
//!    └─── AltChar ◀────┘  └──▶ LoneEscape        └──▶ release deadline: dropped
//! ```
//!
//! # Bare ESC vs. start of a sequence
//!
//! An ESC byte is either the Escape key or the first byte of a sequence, and there is no
//! way to tell until the next byte arrives (or doesn't). The parser waits: a pending ESC
//! is only turned into [`ParserOutput::LoneEscape`] by [`EscapeSequenceParser::release_stale`]
//! once the release deadline has passed without a continuation. A continuation that
//! arrives before the deadline is treated as part of the sequence, so a quick ESC then
//! `a` is reported as Alt+a (which is what terminals send for Alt+a anyway).
//!
//! # Limits
//!
//! A sequence with more than [`MAX_SEQUENCE_PARAMS`] parameters, or longer than
//! [`MAX_SEQUENCE_LEN`] chars, is abandoned: the rest of it, up to and including its
//! terminator, is swallowed so none of it reaches the app as plain input. An ESC ends the
//! discard early and starts a new sequence. Parameter values saturate at [`u16::MAX`].

use super::{ControlPrefix, SequenceParams};
use crate::core::ansi::constants::{ANSI_CSI_BRACKET, ANSI_ESC, ANSI_PARAM_SEPARATOR,
                                   ANSI_SS3_O, CSI_PRIVATE_MARKERS,
                                   MAX_SEQUENCE_LEN, MAX_SEQUENCE_PARAMS};
use std::{collections::VecDeque,
          time::{Duration, Instant}};

/// Default time to wait after an ESC before deciding it's the Escape key.
pub const DEFAULT_RELEASE_DEADLINE: Duration = Duration::from_millis(50);

/// A complete `CSI` or `SS3` sequence, not yet classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeSequence {
    pub prefix: ControlPrefix,
    /// Private marker or intermediate char, eg: `<` for SGR mouse reports.
    pub code: Option<char>,
    pub params: SequenceParams,
    pub terminator: char,
}

impl EscapeSequence {
    #[must_use]
    pub fn param(&self, index: usize) -> Option<u16> { self.params.get(index).copied() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserOutput {
    Plain(char),
    Sequence(EscapeSequence),
    /// ESC with nothing after it before the release deadline.
    LoneEscape,
    /// ESC followed by a char that doesn't start a sequence.
    AltChar(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Ground,
    EscapeSeen,
    CollectingParams,
}

/// The not yet classified run of input since the last ESC.
#[derive(Debug, Clone, Default)]
pub struct PendingSequenceBuffer {
    pub prefix: Option<ControlPrefix>,
    pub code: Option<char>,
    pub params: SequenceParams,
    /// The parameter currently being accumulated, `None` until its first digit.
    pub current_param: Option<u16>,
    /// Number of chars consumed since the ESC, for [`MAX_SEQUENCE_LEN`].
    pub len: usize,
    /// When the ESC arrived.
    pub started_at: Option<Instant>,
    /// A limit was exceeded. Chars are swallowed until a terminator or ESC.
    pub discarding: bool,
}

impl PendingSequenceBuffer {
    fn clear(&mut self) { *self = Self::default(); }

    fn is_empty_after_prefix(&self) -> bool {
        self.code.is_none() && self.params.is_empty() && self.current_param.is_none()
    }

    fn push_digit(&mut self, digit: u16) {
        let value = self.current_param.unwrap_or(0);
        self.current_param = Some(value.saturating_mul(10).saturating_add(digit));
    }

    /// Returns false when the parameter limit is exceeded.
    fn finish_param(&mut self) -> bool {
        self.params.push(self.current_param.take().unwrap_or(0));
        self.params.len() <= MAX_SEQUENCE_PARAMS
    }
}

/// Terminators that complete a sequence: `A`-`Z`, `a`-`z`, `~`, `@`, `^`, `$`.
#[must_use]
pub fn is_sequence_terminator(ch: char) -> bool {
    ch.is_ascii_alphabetic() || matches!(ch, '~' | '@' | '^' | '$')
}

/// Stateful parser for terminal input chars. Feed it with [`Self::feed`], resolve
/// pending ESCs with [`Self::release_stale`], and drain the results by iterating.
#[derive(Debug)]
pub struct EscapeSequenceParser {
    state: ParserState,
    buffer: PendingSequenceBuffer,
    release_deadline: Duration,
    /// Queue of parsed outputs ready to be consumed.
    outputs: VecDeque<ParserOutput>,
}

impl Default for EscapeSequenceParser {
    fn default() -> Self { Self::new(DEFAULT_RELEASE_DEADLINE) }
}

impl EscapeSequenceParser {
    #[must_use]
    pub fn new(release_deadline: Duration) -> Self {
        Self {
            state: ParserState::Ground,
            buffer: PendingSequenceBuffer::default(),
            release_deadline,
            outputs: VecDeque::with_capacity(32),
        }
    }

    #[must_use]
    pub fn state(&self) -> ParserState { self.state }

    #[must_use]
    pub fn release_deadline(&self) -> Duration { self.release_deadline }

    /// When the pending ESC (if any) will be released.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> {
        match self.state {
            ParserState::Ground => None,
            ParserState::EscapeSeen | ParserState::CollectingParams => self
                .buffer
                .started_at
                .map(|it| it + self.release_deadline),
        }
    }

    pub fn feed(&mut self, ch: char, now: Instant) {
        match self.state {
            ParserState::Ground => self.feed_ground(ch, now),
            ParserState::EscapeSeen => self.feed_escape_seen(ch, now),
            ParserState::CollectingParams => self.feed_collecting(ch, now),
        }
    }

    pub fn feed_str(&mut self, text: &str, now: Instant) {
        for ch in text.chars() {
            self.feed(ch, now);
        }
    }

    /// Resolve a partial sequence whose release deadline has passed:
    /// - A lone ESC becomes [`ParserOutput::LoneEscape`].
    /// - `ESC [` or `ESC O` with nothing after it becomes Alt+`[` / Alt+`O`.
    /// - Anything longer is an abandoned sequence and is dropped.
    pub fn release_stale(&mut self, now: Instant) {
        let Some(deadline) = self.pending_deadline() else {
            return;
        };
        if now < deadline {
            return;
        }
        self.flush();
    }

    /// Resolve any partial sequence right away, regardless of the deadline.
    pub fn flush(&mut self) {
        match self.state {
            ParserState::Ground => {}
            ParserState::EscapeSeen => self.outputs.push_back(ParserOutput::LoneEscape),
            ParserState::CollectingParams => {
                if !self.buffer.discarding && self.buffer.is_empty_after_prefix() {
                    let ch = match self.buffer.prefix {
                        Some(ControlPrefix::Ss3) => ANSI_SS3_O,
                        Some(ControlPrefix::Csi) | None => ANSI_CSI_BRACKET,
                    };
                    self.outputs.push_back(ParserOutput::AltChar(ch));
                } else {
                    tracing::trace!(
                        message = "abandoned partial sequence",
                        pending = ?self.buffer
                    );
                }
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = ParserState::Ground;
        self.buffer.clear();
    }

    fn start_sequence(&mut self, now: Instant) {
        self.buffer.clear();
        self.buffer.started_at = Some(now);
        self.state = ParserState::EscapeSeen;
    }

    fn feed_ground(&mut self, ch: char, now: Instant) {
        if ch == ANSI_ESC {
            self.start_sequence(now);
        } else {
            self.outputs.push_back(ParserOutput::Plain(ch));
        }
    }

    fn feed_escape_seen(&mut self, ch: char, now: Instant) {
        match ch {
            ANSI_CSI_BRACKET | ANSI_SS3_O => {
                self.buffer.prefix = Some(if ch == ANSI_CSI_BRACKET {
                    ControlPrefix::Csi
                } else {
                    ControlPrefix::Ss3
                });
                self.buffer.len = 1;
                self.state = ParserState::CollectingParams;
            }
            // ESC ESC: the first one was the Escape key.
            ANSI_ESC => {
                self.outputs.push_back(ParserOutput::LoneEscape);
                self.start_sequence(now);
            }
            _ => {
                self.outputs.push_back(ParserOutput::AltChar(ch));
                self.reset();
            }
        }
    }

    fn feed_collecting(&mut self, ch: char, now: Instant) {
        if self.buffer.discarding {
            self.feed_discarding(ch, now);
            return;
        }

        self.buffer.len += 1;
        if self.buffer.len > MAX_SEQUENCE_LEN {
            tracing::trace!(message = "sequence too long, abandoned", len = self.buffer.len);
            self.buffer.discarding = true;
            self.feed_discarding(ch, now);
            return;
        }

        match ch {
            '0'..='9' => {
                let digit = ch.to_digit(10).and_then(|it| u16::try_from(it).ok());
                self.buffer.push_digit(digit.unwrap_or(0));
            }
            ANSI_PARAM_SEPARATOR => {
                if !self.buffer.finish_param() {
                    tracing::trace!(message = "too many params, abandoned");
                    self.buffer.discarding = true;
                }
            }
            _ if CSI_PRIVATE_MARKERS.contains(&ch)
                && self.buffer.prefix == Some(ControlPrefix::Csi)
                && self.buffer.is_empty_after_prefix() =>
            {
                self.buffer.code = Some(ch);
            }
            _ if is_sequence_terminator(ch) => self.complete(ch),
            // A new sequence started before this one finished.
            ANSI_ESC => {
                tracing::trace!(message = "sequence interrupted by ESC", pending = ?self.buffer);
                self.start_sequence(now);
            }
            _ => {
                // Not part of any sequence we understand. Drop what we have, and treat
                // the char as ordinary input.
                tracing::trace!(message = "unexpected char in sequence", ch = ?ch);
                self.reset();
                self.feed_ground(ch, now);
            }
        }
    }

    fn feed_discarding(&mut self, ch: char, now: Instant) {
        if ch == ANSI_ESC {
            self.start_sequence(now);
        } else if is_sequence_terminator(ch) {
            self.reset();
        }
    }

    fn complete(&mut self, terminator: char) {
        let buffer = std::mem::take(&mut self.buffer);
        let mut params = buffer.params;
        if buffer.current_param.is_some() || !params.is_empty() {
            params.push(buffer.current_param.unwrap_or(0));
        }
        self.state = ParserState::Ground;
        if params.len() > MAX_SEQUENCE_PARAMS {
            tracing::trace!(message = "too many params, abandoned");
            return;
        }
        self.outputs.push_back(ParserOutput::Sequence(EscapeSequence {
            prefix: buffer.prefix.unwrap_or(ControlPrefix::Csi),
            code: buffer.code,
            params,
            terminator,
        }));
    }
}

impl Iterator for EscapeSequenceParser {
    type Item = ParserOutput;

    fn next(&mut self) -> Option<Self::Item> { self.outputs.pop_front() }
}

/// Shared test helpers and imports for [`EscapeSequenceParser`] tests.
#[cfg(test)]
mod test_fixtures {
    pub use super::*;
    pub use pretty_assertions::assert_eq;
    pub use smallvec::smallvec;

    pub fn csi(code: Option<char>, params: &[u16], terminator: char) -> ParserOutput {
        ParserOutput::Sequence(EscapeSequence {
            prefix: ControlPrefix::Csi,
            code,
            params: params.iter().copied().collect(),
            terminator,
        })
    }

    pub fn parse_all(input: &str) -> Vec<ParserOutput> {
        let mut parser = EscapeSequenceParser::default();
        parser.feed_str(input, Instant::now());
        parser.collect()
    }
}

#[cfg(test)]
mod tests_basic_parsing {
    use super::test_fixtures::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_chars_pass_through() {
        assert_eq!(
            parse_all("ab"),
            vec![ParserOutput::Plain('a'), ParserOutput::Plain('b')]
        );
    }

    #[test]
    fn csi_with_params() {
        assert_eq!(parse_all("\x1b[1;5A"), vec![csi(None, &[1, 5], 'A')]);
        assert_eq!(parse_all("\x1b[A"), vec![csi(None, &[], 'A')]);
    }

    #[test]
    fn empty_params_default_to_zero() {
        assert_eq!(parse_all("\x1b[;5H"), vec![csi(None, &[0, 5], 'H')]);
    }

    #[test]
    fn ss3_sequence() {
        assert_eq!(
            parse_all("\x1bOP"),
            vec![ParserOutput::Sequence(EscapeSequence {
                prefix: ControlPrefix::Ss3,
                code: None,
                params: smallvec![],
                terminator: 'P',
            })]
        );
    }

    #[test]
    fn private_marker_is_recorded_as_code() {
        assert_eq!(parse_all("\x1b[<0;10;5M"), vec![csi(Some('<'), &[0, 10, 5], 'M')]);
        assert_eq!(parse_all("\x1b[?62;22c"), vec![csi(Some('?'), &[62, 22], 'c')]);
    }

    #[test]
    fn params_saturate() {
        assert_eq!(parse_all("\x1b[99999999~"), vec![csi(None, &[u16::MAX], '~')]);
    }

    #[test]
    fn text_around_sequences_keeps_order() {
        assert_eq!(
            parse_all("x\x1b[By"),
            vec![
                ParserOutput::Plain('x'),
                csi(None, &[], 'B'),
                ParserOutput::Plain('y')
            ]
        );
    }
}

#[cfg(test)]
mod tests_esc_disambiguation {
    use super::test_fixtures::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn lone_esc_waits_for_the_deadline() {
        let t0 = Instant::now();
        let mut parser = EscapeSequenceParser::default();
        parser.feed('\x1b', t0);

        parser.release_stale(t0 + Duration::from_millis(10));
        assert_eq!((&mut parser).count(), 0);
        assert_eq!(parser.state(), ParserState::EscapeSeen);

        parser.release_stale(t0 + DEFAULT_RELEASE_DEADLINE);
        assert_eq!(parser.collect::<Vec<_>>(), vec![ParserOutput::LoneEscape]);
    }

    #[test]
    fn sequence_split_across_feeds_within_deadline() {
        let t0 = Instant::now();
        let mut parser = EscapeSequenceParser::default();
        parser.feed('\x1b', t0);
        parser.release_stale(t0 + Duration::from_millis(5));
        parser.feed_str("[A", t0 + Duration::from_millis(6));
        assert_eq!(parser.collect::<Vec<_>>(), vec![csi(None, &[], 'A')]);
    }

    #[test]
    fn esc_then_letter_is_alt_char() {
        assert_eq!(parse_all("\x1bx"), vec![ParserOutput::AltChar('x')]);
    }

    #[test]
    fn double_esc() {
        let t0 = Instant::now();
        let mut parser = EscapeSequenceParser::default();
        parser.feed_str("\x1b\x1b", t0);
        parser.release_stale(t0 + Duration::from_secs(1));
        assert_eq!(
            parser.collect::<Vec<_>>(),
            vec![ParserOutput::LoneEscape, ParserOutput::LoneEscape]
        );
    }

    #[test]
    fn stale_bare_prefix_is_alt_bracket() {
        let t0 = Instant::now();
        let mut parser = EscapeSequenceParser::default();
        parser.feed_str("\x1b[", t0);
        parser.release_stale(t0 + Duration::from_secs(1));
        assert_eq!(parser.collect::<Vec<_>>(), vec![ParserOutput::AltChar('[')]);
    }

    #[test]
    fn stale_partial_sequence_is_dropped() {
        let t0 = Instant::now();
        let mut parser = EscapeSequenceParser::default();
        parser.feed_str("\x1b[1;", t0);
        parser.release_stale(t0 + Duration::from_secs(1));
        assert_eq!((&mut parser).count(), 0);
        assert_eq!(parser.state(), ParserState::Ground);
    }

    #[test]
    fn esc_interrupts_partial_sequence() {
        assert_eq!(parse_all("\x1b[1;\x1b[B"), vec![csi(None, &[], 'B')]);
    }
}
