// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Plain (non sequence) chars to keys.
//!
//! In raw mode the terminal sends control bytes for a handful of keys:
//!
//! | Byte          | Key                               |
//! |---------------|-----------------------------------|
//! | `\r`, `\n`    | Enter                             |
//! | `\t`          | Tab                               |
//! | `0x7F`, `0x08`| Backspace                         |
//! | `0x00`        | Ctrl+Space                        |
//! | `0x01..=0x1A` | Ctrl+a ..= Ctrl+z                 |
//! | `0x1C..=0x1F` | Ctrl+4 ..= Ctrl+7                 |
//!
//! `0x09`, `0x0A`, `0x0D` and `0x08` would also be Ctrl+i/j/m/h; the keys win.

use super::{Key, KeyCode, KeyModifiers};
use crate::core::ansi::constants::{ASCII_DEL, CONTROL_BACKSPACE, CONTROL_ENTER,
                                   CONTROL_LF, CONTROL_NUL, CONTROL_TAB,
                                   CTRL_TO_DIGIT_OFFSET, CTRL_TO_LOWERCASE_MASK};

#[must_use]
pub fn key_for_plain_char(ch: char) -> Key {
    match ch {
        CONTROL_ENTER | CONTROL_LF => Key::plain(KeyCode::Enter),
        CONTROL_TAB => Key::plain(KeyCode::Tab),
        ASCII_DEL | CONTROL_BACKSPACE => Key::plain(KeyCode::Backspace),
        CONTROL_NUL => Key::new(KeyCode::Char(' '), KeyModifiers::CTRL),
        '\x01'..='\x1a' => ctrl_char(u32::from(ch) | CTRL_TO_LOWERCASE_MASK),
        '\x1c'..='\x1f' => ctrl_char(u32::from(ch) + CTRL_TO_DIGIT_OFFSET),
        _ => Key::plain(KeyCode::Char(ch)),
    }
}

/// ESC followed by `ch`: the same key as `ch`, with Alt added.
#[must_use]
pub fn key_for_alt_char(ch: char) -> Key {
    let key = key_for_plain_char(ch);
    Key::new(key.code, key.modifiers.with_alt())
}

fn ctrl_char(code_point: u32) -> Key {
    match char::from_u32(code_point) {
        Some(ch) => Key::new(KeyCode::Char(ch), KeyModifiers::CTRL),
        None => Key::plain(KeyCode::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case('a', Key::plain(KeyCode::Char('a')))]
    #[test_case('Z', Key::plain(KeyCode::Char('Z')))]
    #[test_case('é', Key::plain(KeyCode::Char('é')))]
    #[test_case('\r', Key::plain(KeyCode::Enter))]
    #[test_case('\n', Key::plain(KeyCode::Enter))]
    #[test_case('\t', Key::plain(KeyCode::Tab))]
    #[test_case('\x7f', Key::plain(KeyCode::Backspace))]
    #[test_case('\x08', Key::plain(KeyCode::Backspace))]
    #[test_case('\0', Key::new(KeyCode::Char(' '), KeyModifiers::CTRL))]
    #[test_case('\x01', Key::new(KeyCode::Char('a'), KeyModifiers::CTRL))]
    #[test_case('\x03', Key::new(KeyCode::Char('c'), KeyModifiers::CTRL))]
    #[test_case('\x1a', Key::new(KeyCode::Char('z'), KeyModifiers::CTRL))]
    #[test_case('\x1c', Key::new(KeyCode::Char('4'), KeyModifiers::CTRL))]
    #[test_case('\x1f', Key::new(KeyCode::Char('7'), KeyModifiers::CTRL))]
    fn test_plain_char(ch: char, expected: Key) {
        assert_eq!(key_for_plain_char(ch), expected);
    }

    #[test]
    fn test_alt_char() {
        assert_eq!(
            key_for_alt_char('x'),
            Key::new(KeyCode::Char('x'), KeyModifiers::ALT)
        );
        assert_eq!(
            key_for_alt_char('\x01'),
            Key::new(KeyCode::Char('a'), KeyModifiers::CTRL.with_alt())
        );
    }
}
