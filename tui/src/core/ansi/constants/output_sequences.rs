// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Output sequence constants: the building blocks used by
//! [`ansi_sequence_generator`](crate::ansi_sequence_generator).

/// Control Sequence Introducer.
pub const CSI_START: &str = "\x1b[";

/// SGR reset: all attributes and colors back to default.
pub const SGR_RESET: &str = "\x1b[0m";

/// CRLF. Raw mode disables output post-processing (`OPOST`) so `\n` alone doesn't return
/// the carriage.
pub const CRLF: &str = "\r\n";

// ==================== DEC Private Modes ====================

/// `?25`: cursor visible.
pub const DECTCEM_SHOW_CURSOR: u16 = 25;
/// `?1049`: alternate screen buffer with cursor save/restore.
pub const ALT_SCREEN_BUFFER: u16 = 1049;
/// `?1000`: report button press and release.
pub const MOUSE_MODE_NORMAL_TRACKING: u16 = 1000;
/// `?1002`: also report motion while a button is held.
pub const MOUSE_MODE_BUTTON_EVENT_TRACKING: u16 = 1002;
/// `?1003`: report all motion.
pub const MOUSE_MODE_ANY_EVENT_TRACKING: u16 = 1003;
/// `?1006`: SGR extended coordinates (`CSI < ... M|m`).
pub const MOUSE_MODE_SGR_ENCODING: u16 = 1006;

// ==================== SGR Parameters ====================

pub const SGR_BOLD: u16 = 1;
pub const SGR_DIM: u16 = 2;
pub const SGR_ITALIC: u16 = 3;
pub const SGR_UNDERLINE: u16 = 4;
pub const SGR_BLINK_PARAM: u16 = 5;
pub const SGR_REVERSE: u16 = 7;
pub const SGR_HIDDEN: u16 = 8;
pub const SGR_STRIKETHROUGH: u16 = 9;
/// `38;2;r;g;b` introducer.
pub const SGR_FG_EXTENDED: u16 = 38;
/// `48;2;r;g;b` introducer.
pub const SGR_BG_EXTENDED: u16 = 48;
/// Sub-selector for 24-bit color after 38 / 48.
pub const SGR_EXTENDED_RGB: u16 = 2;
/// First normal-intensity foreground (black). Add 60 for the bright variants.
pub const SGR_FG_BASE: u16 = 30;
/// First normal-intensity background (black). Add 60 for the bright variants.
pub const SGR_BG_BASE: u16 = 40;
pub const SGR_BRIGHT_OFFSET: u16 = 60;

// ==================== Queries ====================

/// DSR cursor position report request. Reply: `CSI row ; col R`.
pub const QUERY_CURSOR_POSITION: &str = "\x1b[6n";
/// Text area size in characters. Reply: `CSI 8 ; rows ; cols t`.
pub const QUERY_WINDOW_SIZE_CHARS: &str = "\x1b[18t";
/// Window position in pixels. Reply: `CSI 3 ; x ; y t`.
pub const QUERY_WINDOW_POSITION: &str = "\x1b[13t";
/// Primary device attributes. Reply: `CSI ? Ps ; ... c`.
pub const QUERY_DEVICE_ATTRIBUTES: &str = "\x1b[c";

/// First parameter of a `CSI 8 ; rows ; cols t` window size reply.
pub const REPLY_WINDOW_SIZE_CHARS_CODE: u16 = 8;
/// First parameter of a `CSI 3 ; x ; y t` window position reply.
pub const REPLY_WINDOW_POSITION_CODE: u16 = 3;
/// Terminator of window manipulation replies.
pub const REPLY_WINDOW_OPS_FINAL: char = 't';
/// Terminator of cursor position reports.
pub const REPLY_CURSOR_POSITION_FINAL: char = 'R';
/// Terminator of device attribute replies.
pub const REPLY_DEVICE_ATTRIBUTES_FINAL: char = 'c';
