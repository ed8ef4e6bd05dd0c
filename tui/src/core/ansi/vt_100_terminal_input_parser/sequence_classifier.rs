// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Turns [`ParserOutput`]s into [`StructuredEvent`]s.
//!
//! Completed sequences are tried in this order, first match wins:
//!
//! 1. SGR mouse reports.
//! 2. Keyboard matchers that are not overlapping.
//! 3. Terminal reply recognizers.
//! 4. Overlapping keyboard matchers.
//!
//! Anything left over is dropped (trace log only). Unknown terminals send plenty of
//! sequences we don't care about and that must never take the app down.

use super::{KeyCode, KeyboardMatchers, MouseButtonTracker, ParserOutput, StructuredEvent,
            key_for_alt_char, key_for_plain_char, parse_sgr_mouse_report,
            recognize_terminal_reply, EscapeSequence, Key};
use smallvec::SmallVec;

pub type ClassifiedEvents = SmallVec<[StructuredEvent; 2]>;

#[derive(Debug, Default)]
pub struct SequenceClassifier {
    pub matchers: KeyboardMatchers,
    mouse_tracker: MouseButtonTracker,
}

impl SequenceClassifier {
    #[must_use]
    pub fn new(matchers: KeyboardMatchers) -> Self {
        Self {
            matchers,
            mouse_tracker: MouseButtonTracker::default(),
        }
    }

    /// `expected_terminators` are the reply terminators of in-flight requests.
    pub fn classify(
        &mut self,
        output: ParserOutput,
        expected_terminators: &[char],
    ) -> ClassifiedEvents {
        let mut events = ClassifiedEvents::new();
        match output {
            ParserOutput::Plain(ch) => events.push(StructuredEvent::Key(key_for_plain_char(ch))),
            ParserOutput::AltChar(ch) => events.push(StructuredEvent::Key(key_for_alt_char(ch))),
            ParserOutput::LoneEscape => {
                events.push(StructuredEvent::Key(Key::plain(KeyCode::Escape)));
            }
            ParserOutput::Sequence(seq) => self.classify_sequence(&seq, expected_terminators, &mut events),
        }
        events
    }

    fn classify_sequence(
        &mut self,
        seq: &EscapeSequence,
        expected_terminators: &[char],
        events: &mut ClassifiedEvents,
    ) {
        if let Some(report) = parse_sgr_mouse_report(seq) {
            events.extend(
                self.mouse_tracker
                    .decode(report)
                    .into_iter()
                    .map(StructuredEvent::Mouse),
            );
            return;
        }

        if let Some(key) = self.matchers.try_match(seq, false) {
            events.push(StructuredEvent::Key(key));
            return;
        }

        if let Some(reply) = recognize_terminal_reply(seq, expected_terminators) {
            events.push(reply);
            return;
        }

        if let Some(key) = self.matchers.try_match(seq, true) {
            events.push(StructuredEvent::Key(key));
            return;
        }

        tracing::trace!(message = "unrecognized sequence dropped", sequence = ?seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ButtonState, EscapeSequenceParser, KeyModifiers, MouseButton, MouseEvent,
                Point, core::ansi::generator::ansi_sequence_generator_input::{
                    cursor_position_report, csi_modified, sgr_mouse_string, ss3}};
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    fn run(input: &str, expected_terminators: &[char]) -> Vec<StructuredEvent> {
        let mut parser = EscapeSequenceParser::default();
        let mut classifier = SequenceClassifier::default();
        parser.feed_str(input, Instant::now());
        parser
            .flat_map(|it| classifier.classify(it, expected_terminators))
            .collect()
    }

    #[test]
    fn test_plain_a_has_no_modifiers() {
        assert_eq!(
            run("a", &[]),
            vec![StructuredEvent::Key(Key::plain(KeyCode::Char('a')))]
        );
    }

    #[test]
    fn test_ss3_f1() {
        assert_eq!(
            run(&ss3('P'), &[]),
            vec![StructuredEvent::Key(Key::plain(KeyCode::Function(1)))]
        );
    }

    #[test]
    fn test_ctrl_up() {
        assert_eq!(
            run(&csi_modified('A', KeyModifiers::CTRL), &[]),
            vec![StructuredEvent::Key(Key::new(KeyCode::Up, KeyModifiers::CTRL))]
        );
    }

    #[test]
    fn test_sgr_mouse_click_end_to_end() {
        let input = format!(
            "{}{}",
            sgr_mouse_string(16, 10, 5, false),
            sgr_mouse_string(16, 10, 5, true)
        );
        let mouse = |button_state| {
            StructuredEvent::Mouse(MouseEvent {
                position: Point::new(4, 9),
                button_state,
                modifiers: KeyModifiers::CTRL,
            })
        };
        assert_eq!(
            run(&input, &[]),
            vec![
                mouse(ButtonState::Pressed(MouseButton::Left)),
                mouse(ButtonState::Released(MouseButton::Left)),
                mouse(ButtonState::Clicked(MouseButton::Left)),
            ]
        );
    }

    #[test]
    fn test_cursor_report_vs_shift_f3() {
        let input = cursor_position_report(1, 2);

        // No request in flight: the overlapping matcher gets it.
        assert_eq!(
            run(&input, &[]),
            vec![StructuredEvent::Key(Key::new(
                KeyCode::Function(3),
                KeyModifiers::SHIFT
            ))]
        );

        // Cursor position request in flight: it's a reply.
        assert!(matches!(
            run(&input, &['R']).as_slice(),
            [StructuredEvent::TerminalReply(reply)] if reply.params.as_slice() == [1, 2]
        ));
    }

    #[test]
    fn test_unknown_sequence_is_dropped() {
        assert_eq!(run("\x1b[99Xq", &[]), vec![StructuredEvent::Key(Key::plain(
            KeyCode::Char('q')
        ))]);
    }
}
