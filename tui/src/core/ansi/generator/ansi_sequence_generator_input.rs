// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Builders for the sequences a terminal sends to us. **Test only.** Parser tests use
//! these instead of hardcoding raw bytes, so a typo in a test can't silently agree with
//! a typo in the parser.

use crate::{ControlPrefix, EscapeSequence, KeyModifiers,
            core::ansi::constants::{ANSI_CSI_BRACKET, ANSI_ESC,
                                    ANSI_FUNCTION_KEY_TERMINATOR, ANSI_SS3_O,
                                    MODIFIER_ALT, MODIFIER_CTRL, MODIFIER_SHIFT,
                                    SGR_MOUSE_MARKER, SGR_MOUSE_PRESS_FINAL,
                                    SGR_MOUSE_RELEASE_FINAL}};

/// Inverse of [`decode_modifier_param`](crate::decode_modifier_param).
#[must_use]
pub fn encode_modifier_param(modifiers: KeyModifiers) -> u16 {
    let mut bits = 0;
    if modifiers.shift {
        bits |= MODIFIER_SHIFT;
    }
    if modifiers.alt {
        bits |= MODIFIER_ALT;
    }
    if modifiers.ctrl {
        bits |= MODIFIER_CTRL;
    }
    bits + 1
}

/// `ESC [ <final>`.
#[must_use]
pub fn csi(final_char: char) -> String { format!("{ANSI_ESC}{ANSI_CSI_BRACKET}{final_char}") }

/// `ESC O <final>`.
#[must_use]
pub fn ss3(final_char: char) -> String { format!("{ANSI_ESC}{ANSI_SS3_O}{final_char}") }

/// `ESC [ 1 ; m <final>`.
#[must_use]
pub fn csi_modified(final_char: char, modifiers: KeyModifiers) -> String {
    format!(
        "{ANSI_ESC}{ANSI_CSI_BRACKET}1;{}{final_char}",
        encode_modifier_param(modifiers)
    )
}

/// `ESC [ n ~` or `ESC [ n ; m ~`.
#[must_use]
pub fn csi_tilde(code: u16, modifiers: KeyModifiers) -> String {
    if modifiers.is_empty() {
        format!("{ANSI_ESC}{ANSI_CSI_BRACKET}{code}{ANSI_FUNCTION_KEY_TERMINATOR}")
    } else {
        format!(
            "{ANSI_ESC}{ANSI_CSI_BRACKET}{code};{}{ANSI_FUNCTION_KEY_TERMINATOR}",
            encode_modifier_param(modifiers)
        )
    }
}

/// `ESC [ < cb ; col ; row M|m`, coordinates 1-based.
#[must_use]
pub fn sgr_mouse_string(cb: u16, col: u16, row: u16, release: bool) -> String {
    let final_char = if release { SGR_MOUSE_RELEASE_FINAL } else { SGR_MOUSE_PRESS_FINAL };
    format!("{ANSI_ESC}{ANSI_CSI_BRACKET}{SGR_MOUSE_MARKER}{cb};{col};{row}{final_char}")
}

/// The parsed form of [`sgr_mouse_string`].
#[must_use]
pub fn sgr_mouse_sequence(cb: u16, col: u16, row: u16, release: bool) -> EscapeSequence {
    EscapeSequence {
        prefix: ControlPrefix::Csi,
        code: Some(SGR_MOUSE_MARKER),
        params: [cb, col, row].into_iter().collect(),
        terminator: if release { SGR_MOUSE_RELEASE_FINAL } else { SGR_MOUSE_PRESS_FINAL },
    }
}

/// A reply the terminal sends for a cursor position query: `ESC [ row ; col R`.
#[must_use]
pub fn cursor_position_report(row: u16, col: u16) -> String {
    format!("{ANSI_ESC}{ANSI_CSI_BRACKET}{row};{col}R")
}
