// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! ANSI/VT100 input sequence constants.
//!
//! The parser works on `char`s (the POSIX adapter decodes UTF-8 before queueing), so
//! these constants are `char` typed.
//!
//! # Keyboard Sequences
//!
//! - Arrows: `ESC [ A..D`, or `ESC [ 1 ; m A..D` with a modifier.
//! - Function keys: `ESC [ n ~` (F1-F5: 11-15, F6-F10: 17-21, F11-F12: 23-24, F13-F20:
//!   25-26, 28-29, 31-34), or `ESC O P..S` for F1-F4.
//! - Navigation: `ESC [ H` (Home), `ESC [ F` (End), `ESC [ n ~` for Insert (2),
//!   Delete (3), PageUp (5), PageDown (6), and Home/End alternates (1/7, 4/8).
//!
//! # Modifier Parameter (`CSI 1 ; m X`)
//!
//! `m = 1 + bitfield` where the bitfield is Shift(1) | Alt(2) | Ctrl(4):
//! 2=Shift, 3=Alt, 4=Alt+Shift, 5=Ctrl, 6=Ctrl+Shift, 7=Ctrl+Alt, 8=Ctrl+Alt+Shift.
//!
//! # SGR Mouse Reports (`CSI < Cb ; Cx ; Cy M|m`)
//!
//! `M` is press/motion, `m` is release. Coordinates are 1-based.

// ==================== ANSI Sequence Components ====================

/// ESC (0x1B).
pub const ANSI_ESC: char = '\x1b';

/// CSI bracket: `ESC [`.
pub const ANSI_CSI_BRACKET: char = '[';

/// SS3 'O': `ESC O`.
pub const ANSI_SS3_O: char = 'O';

/// Parameter separator: `;`.
pub const ANSI_PARAM_SEPARATOR: char = ';';

/// Function key terminator: `~`.
pub const ANSI_FUNCTION_KEY_TERMINATOR: char = '~';

/// Private markers that may directly follow `CSI` (eg: `<` for SGR mouse, `?` for DEC
/// private replies).
pub const CSI_PRIVATE_MARKERS: [char; 4] = ['<', '=', '>', '?'];

/// SGR mouse report marker: `CSI <`.
pub const SGR_MOUSE_MARKER: char = '<';

/// SGR mouse press / motion terminator.
pub const SGR_MOUSE_PRESS_FINAL: char = 'M';

/// SGR mouse release terminator.
pub const SGR_MOUSE_RELEASE_FINAL: char = 'm';

/// Upper bound on parameters kept for one sequence; longer runs are abandoned.
pub const MAX_SEQUENCE_PARAMS: usize = 16;

/// Upper bound on chars buffered for one sequence; longer runs are abandoned.
pub const MAX_SEQUENCE_LEN: usize = 64;

// ==================== Arrow and Navigation Finals ====================

pub const ARROW_UP_FINAL: char = 'A';
pub const ARROW_DOWN_FINAL: char = 'B';
pub const ARROW_RIGHT_FINAL: char = 'C';
pub const ARROW_LEFT_FINAL: char = 'D';
pub const SPECIAL_HOME_FINAL: char = 'H';
pub const SPECIAL_END_FINAL: char = 'F';
/// `CSI Z`: Shift+Tab.
pub const BACKTAB_FINAL: char = 'Z';

/// Arrow key modifier base value (always 1 for keys with modifiers).
pub const ARROW_KEY_MODIFIER_BASE: u16 = 1;

// ==================== SS3 Finals ====================

pub const SS3_F1_FINAL: char = 'P';
pub const SS3_F2_FINAL: char = 'Q';
pub const SS3_F3_FINAL: char = 'R';
pub const SS3_F4_FINAL: char = 'S';

// ==================== Special Keys (CSI n~) ====================

pub const SPECIAL_HOME_ALT1_CODE: u16 = 1;
pub const SPECIAL_INSERT_CODE: u16 = 2;
pub const SPECIAL_DELETE_CODE: u16 = 3;
pub const SPECIAL_END_ALT1_CODE: u16 = 4;
pub const SPECIAL_PAGE_UP_CODE: u16 = 5;
pub const SPECIAL_PAGE_DOWN_CODE: u16 = 6;
pub const SPECIAL_HOME_ALT2_CODE: u16 = 7;
pub const SPECIAL_END_ALT2_CODE: u16 = 8;

// ==================== Modifier Masks ====================

/// Bit 0 of `m - 1`.
pub const MODIFIER_SHIFT: u16 = 1;
/// Bit 1 of `m - 1`.
pub const MODIFIER_ALT: u16 = 2;
/// Bit 2 of `m - 1`.
pub const MODIFIER_CTRL: u16 = 4;
/// Lowest modifier parameter that carries a modifier (Shift).
pub const MODIFIER_PARAM_MIN: u16 = 2;
/// Highest modifier parameter in the table (Ctrl+Alt+Shift).
pub const MODIFIER_PARAM_MAX: u16 = 8;

// ==================== SGR Mouse Button Bits ====================

/// Low two bits select the button: 0 left, 1 middle, 2 right, 3 none (motion).
pub const MOUSE_BUTTON_BITS: u16 = 0b11;
pub const MOUSE_MODIFIER_SHIFT: u16 = 4;
pub const MOUSE_MODIFIER_ALT: u16 = 8;
pub const MOUSE_MODIFIER_CTRL: u16 = 16;
/// Set when the report is for motion (with or without a held button).
pub const MOUSE_MOTION_FLAG: u16 = 32;
/// Set for wheel events; low bits then select up (0), down (1), left (2), right (3).
pub const MOUSE_WHEEL_FLAG: u16 = 64;

// ==================== Control Characters ====================

pub const CONTROL_NUL: char = '\0';
pub const CONTROL_BACKSPACE: char = '\x08';
pub const CONTROL_TAB: char = '\t';
pub const CONTROL_LF: char = '\n';
pub const CONTROL_ENTER: char = '\r';
pub const ASCII_DEL: char = '\x7f';
/// `byte | 0x60` turns a Ctrl+letter control byte back into its lowercase letter.
pub const CTRL_TO_LOWERCASE_MASK: u32 = 0x60;
/// `byte + 0x18` turns 0x1C..=0x1F into the digits Ctrl+4 to Ctrl+7.
pub const CTRL_TO_DIGIT_OFFSET: u32 = 0x18;
