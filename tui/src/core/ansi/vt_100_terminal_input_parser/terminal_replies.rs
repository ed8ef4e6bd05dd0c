// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Recognizers for replies to queries the runtime sent.
//!
//! Some replies are unambiguous and always recognized:
//! - `CSI 8 ; rows ; cols t`: text area size.
//! - `CSI 3 ; x ; y t`: window position in pixels.
//! - `CSI ? ... c`: primary device attributes.
//!
//! Others share their shape with keys (`CSI row ; col R` looks exactly like Shift+F3
//! when `row` is 1). Those are only recognized while a pending request expects that
//! terminator.

use super::{ControlPrefix, EscapeSequence, StructuredEvent, TerminalReply};
use crate::{Point, Size,
            core::ansi::constants::{REPLY_DEVICE_ATTRIBUTES_FINAL,
                                    REPLY_WINDOW_OPS_FINAL,
                                    REPLY_WINDOW_POSITION_CODE,
                                    REPLY_WINDOW_SIZE_CHARS_CODE}};

#[must_use]
pub fn recognize_terminal_reply(
    seq: &EscapeSequence,
    expected_terminators: &[char],
) -> Option<StructuredEvent> {
    if seq.prefix != ControlPrefix::Csi {
        return None;
    }

    if seq.code.is_none() && seq.terminator == REPLY_WINDOW_OPS_FINAL {
        match seq.params.as_slice() {
            [REPLY_WINDOW_SIZE_CHARS_CODE, rows, cols] => {
                return Some(StructuredEvent::WindowSize(Size::new(*rows, *cols)));
            }
            [REPLY_WINDOW_POSITION_CODE, x, y] => {
                return Some(StructuredEvent::WindowPosition(Point::new(*y, *x)));
            }
            _ => {}
        }
    }

    let is_device_attributes =
        seq.code == Some('?') && seq.terminator == REPLY_DEVICE_ATTRIBUTES_FINAL;

    if is_device_attributes || expected_terminators.contains(&seq.terminator) {
        return Some(StructuredEvent::TerminalReply(TerminalReply {
            control_prefix: seq.prefix,
            code: seq.code,
            params: seq.params.clone(),
            terminator: seq.terminator,
        }));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn csi(code: Option<char>, params: &[u16], terminator: char) -> EscapeSequence {
        EscapeSequence {
            prefix: ControlPrefix::Csi,
            code,
            params: params.iter().copied().collect(),
            terminator,
        }
    }

    #[test]
    fn test_window_size_reply() {
        assert_eq!(
            recognize_terminal_reply(&csi(None, &[8, 24, 80], 't'), &[]),
            Some(StructuredEvent::WindowSize(Size::new(24, 80)))
        );
    }

    #[test]
    fn test_window_position_reply() {
        assert_eq!(
            recognize_terminal_reply(&csi(None, &[3, 100, 40], 't'), &[]),
            Some(StructuredEvent::WindowPosition(Point::new(40, 100)))
        );
    }

    #[test]
    fn test_cursor_report_needs_expectation() {
        let seq = csi(None, &[1, 2], 'R');
        assert_eq!(recognize_terminal_reply(&seq, &[]), None);
        assert_eq!(
            recognize_terminal_reply(&seq, &['R']),
            Some(StructuredEvent::TerminalReply(TerminalReply {
                control_prefix: ControlPrefix::Csi,
                code: None,
                params: [1, 2].into_iter().collect(),
                terminator: 'R',
            }))
        );
    }

    #[test]
    fn test_device_attributes_always_recognized() {
        let reply = recognize_terminal_reply(&csi(Some('?'), &[62, 22], 'c'), &[]);
        assert!(matches!(reply, Some(StructuredEvent::TerminalReply(_))));
    }
}
