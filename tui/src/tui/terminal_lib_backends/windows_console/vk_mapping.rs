// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Windows console input records to [`Key`]s and [`MouseEvent`]s.
//!
//! This module only depends on [`ConsoleKeyRecord`] and [`ConsoleMouseRecord`] (plain
//! copies of the Win32 structs), so it compiles and is tested on every OS.
//!
//! # Key records
//!
//! 1. Key up records are ignored (VT terminals never report them either).
//! 2. `VK_PACKET` records (text injected by IMEs, `SendInput`, paste) carry no usable
//!    virtual key or modifier state. Both are reconstructed from the char first.
//! 3. Lone modifier keys and dead keys (an OEM key with no char yet) produce nothing.
//! 4. AltGr arrives as Right Alt + Left Ctrl. When it produced a char, the char is the
//!    key and neither modifier is reported.
//! 5. UTF-16 surrogate pairs arrive as two records and are joined.

use crate::{ButtonState, ConsoleKeyRecord, ConsoleMouseRecord, Key, KeyCode, KeyModifiers,
            MouseButton, MouseEvent, MouseEvents, WheelDirection};

#[rustfmt::skip]
pub mod vk_codes {
    pub const VK_BACK: u16 =     0x08;
    pub const VK_TAB: u16 =      0x09;
    pub const VK_RETURN: u16 =   0x0D;
    pub const VK_SHIFT: u16 =    0x10;
    pub const VK_CONTROL: u16 =  0x11;
    pub const VK_MENU: u16 =     0x12;
    pub const VK_CAPITAL: u16 =  0x14;
    pub const VK_ESCAPE: u16 =   0x1B;
    pub const VK_SPACE: u16 =    0x20;
    pub const VK_PRIOR: u16 =    0x21;
    pub const VK_NEXT: u16 =     0x22;
    pub const VK_END: u16 =      0x23;
    pub const VK_HOME: u16 =     0x24;
    pub const VK_LEFT: u16 =     0x25;
    pub const VK_UP: u16 =       0x26;
    pub const VK_RIGHT: u16 =    0x27;
    pub const VK_DOWN: u16 =     0x28;
    pub const VK_INSERT: u16 =   0x2D;
    pub const VK_DELETE: u16 =   0x2E;
    pub const VK_0: u16 =        0x30;
    pub const VK_9: u16 =        0x39;
    pub const VK_A: u16 =        0x41;
    pub const VK_Z: u16 =        0x5A;
    pub const VK_LWIN: u16 =     0x5B;
    pub const VK_RWIN: u16 =     0x5C;
    pub const VK_F1: u16 =       0x70;
    pub const VK_F24: u16 =      0x87;
    pub const VK_NUMLOCK: u16 =  0x90;
    pub const VK_SCROLL: u16 =   0x91;
    pub const VK_LSHIFT: u16 =   0xA0;
    pub const VK_RMENU: u16 =    0xA5;
    pub const VK_OEM_1: u16 =    0xBA;
    pub const VK_OEM_102: u16 =  0xE2;
    pub const VK_PACKET: u16 =   0xE7;
}

#[rustfmt::skip]
pub mod control_key_state {
    pub const RIGHT_ALT_PRESSED: u32 =  0x0001;
    pub const LEFT_ALT_PRESSED: u32 =   0x0002;
    pub const RIGHT_CTRL_PRESSED: u32 = 0x0004;
    pub const LEFT_CTRL_PRESSED: u32 =  0x0008;
    pub const SHIFT_PRESSED: u32 =      0x0010;

    pub const ALT_PRESSED: u32 =  RIGHT_ALT_PRESSED | LEFT_ALT_PRESSED;
    pub const CTRL_PRESSED: u32 = RIGHT_CTRL_PRESSED | LEFT_CTRL_PRESSED;
    pub const ALTGR_PRESSED: u32 = RIGHT_ALT_PRESSED | LEFT_CTRL_PRESSED;
}

#[rustfmt::skip]
pub mod mouse_record_flags {
    pub const FROM_LEFT_1ST_BUTTON_PRESSED: u32 = 0x0001;
    pub const RIGHTMOST_BUTTON_PRESSED: u32 =     0x0002;
    pub const FROM_LEFT_2ND_BUTTON_PRESSED: u32 = 0x0004;
    pub const BUTTONS_MASK: u32 =                 0xFFFF;

    pub const MOUSE_MOVED: u32 =    0x0001;
    pub const DOUBLE_CLICK: u32 =   0x0002;
    pub const MOUSE_WHEELED: u32 =  0x0004;
    pub const MOUSE_HWHEELED: u32 = 0x0008;
}

use control_key_state::{ALT_PRESSED, ALTGR_PRESSED, CTRL_PRESSED, SHIFT_PRESSED};
use vk_codes::{VK_0, VK_9, VK_A, VK_BACK, VK_CAPITAL, VK_CONTROL, VK_DELETE, VK_DOWN,
               VK_END, VK_ESCAPE, VK_F1, VK_F24, VK_HOME, VK_INSERT, VK_LEFT, VK_LSHIFT,
               VK_LWIN, VK_MENU, VK_NEXT, VK_NUMLOCK, VK_OEM_1, VK_OEM_102, VK_PACKET,
               VK_PRIOR, VK_RETURN, VK_RIGHT, VK_RMENU, VK_RWIN, VK_SCROLL, VK_SHIFT,
               VK_SPACE, VK_TAB, VK_UP, VK_Z};

#[must_use]
pub fn modifiers_from_control_state(state: u32) -> KeyModifiers {
    KeyModifiers {
        shift: state & SHIFT_PRESSED != 0,
        ctrl: state & CTRL_PRESSED != 0,
        alt: state & ALT_PRESSED != 0,
    }
}

/// Rebuild the virtual key and control state of a `VK_PACKET` record from its char.
/// Other records are returned unchanged.
#[must_use]
pub fn reconstruct_packet_record(record: ConsoleKeyRecord) -> ConsoleKeyRecord {
    if record.virtual_key_code != VK_PACKET {
        return record;
    }
    let unit = record.unicode_char;
    let (virtual_key_code, control_key_state) = match char::from_u32(u32::from(unit)) {
        Some(ch @ 'A'..='Z') => (u16::from(ch as u8), SHIFT_PRESSED),
        Some(ch @ 'a'..='z') => (u16::from(ch.to_ascii_uppercase() as u8), 0),
        Some(ch @ '0'..='9') => (u16::from(ch as u8), 0),
        Some('\r' | '\n') => (VK_RETURN, 0),
        Some('\t') => (VK_TAB, 0),
        Some('\x08') => (VK_BACK, 0),
        Some('\x1b') => (VK_ESCAPE, 0),
        Some(' ') => (VK_SPACE, 0),
        // Anything else (including surrogate halves) is plain text.
        _ => (VK_PACKET, 0),
    };
    ConsoleKeyRecord {
        virtual_key_code,
        control_key_state,
        ..record
    }
}

#[must_use]
pub const fn is_lone_modifier(vk: u16) -> bool {
    matches!(
        vk,
        VK_SHIFT | VK_CONTROL | VK_MENU | VK_CAPITAL | VK_NUMLOCK | VK_SCROLL | VK_LWIN | VK_RWIN
    ) || (vk >= VK_LSHIFT && vk <= VK_RMENU)
}

/// An OEM key (punctuation, accents) that produced no char is a dead key: the composed
/// char arrives with the next key press.
#[must_use]
pub const fn is_dead_key(record: &ConsoleKeyRecord) -> bool {
    let vk = record.virtual_key_code;
    vk >= VK_OEM_1 && vk <= VK_OEM_102 && record.unicode_char == 0
}

/// Stateful mapper for key records (it joins surrogate pairs).
#[derive(Debug, Default, Clone)]
pub struct ConsoleKeyMapper {
    pending_high_surrogate: Option<u16>,
}

impl ConsoleKeyMapper {
    /// The key for one record, if it produces one. Repeats are not expanded, see
    /// [`ConsoleKeyRecord::repeat_count`].
    pub fn map(&mut self, record: &ConsoleKeyRecord) -> Option<Key> {
        if !record.key_down {
            return None;
        }
        let record = reconstruct_packet_record(*record);
        let vk = record.virtual_key_code;

        if is_lone_modifier(vk) || is_dead_key(&record) {
            return None;
        }

        let state = record.control_key_state;
        let mut modifiers = modifiers_from_control_state(state);

        if let Some(code) = non_text_key_code(vk) {
            return Some(Key::new(code, modifiers));
        }

        match vk {
            VK_TAB if modifiers.shift => {
                return Some(Key::new(KeyCode::BackTab, modifiers));
            }
            VK_TAB => return Some(Key::new(KeyCode::Tab, modifiers)),
            VK_RETURN => return Some(Key::new(KeyCode::Enter, modifiers)),
            VK_ESCAPE => return Some(Key::new(KeyCode::Escape, modifiers)),
            VK_BACK => return Some(Key::new(KeyCode::Backspace, modifiers)),
            _ => {}
        }

        let is_alt_gr = state & ALTGR_PRESSED == ALTGR_PRESSED && record.unicode_char != 0;

        // Ctrl+letter, Ctrl+digit, Ctrl+Space: the char is a control code (or nothing),
        // so use the key itself.
        if modifiers.ctrl && !is_alt_gr {
            let base = match vk {
                VK_A..=VK_Z => char::from_u32(u32::from(vk)).map(|it| it.to_ascii_lowercase()),
                VK_0..=VK_9 | VK_SPACE => char::from_u32(u32::from(vk)),
                _ => None,
            };
            if let Some(ch) = base {
                modifiers.shift = false;
                return Some(Key::new(KeyCode::Char(ch), modifiers));
            }
        }

        let ch = self.join_utf16(record.unicode_char)?;
        // Shift is already in the char. AltGr is not a modifier.
        modifiers.shift = false;
        if is_alt_gr {
            modifiers.ctrl = false;
            modifiers.alt = false;
        }
        Some(Key::new(KeyCode::Char(ch), modifiers))
    }

    fn join_utf16(&mut self, unit: u16) -> Option<char> {
        if unit == 0 {
            return None;
        }
        match (self.pending_high_surrogate.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.pending_high_surrogate = Some(unit);
                None
            }
            (Some(high), 0xDC00..=0xDFFF) => char::decode_utf16([high, unit])
                .next()
                .and_then(Result::ok),
            (_, unit) => Some(
                char::decode_utf16([unit])
                    .next()
                    .and_then(Result::ok)
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
            ),
        }
    }
}

fn non_text_key_code(vk: u16) -> Option<KeyCode> {
    Some(match vk {
        VK_UP => KeyCode::Up,
        VK_DOWN => KeyCode::Down,
        VK_LEFT => KeyCode::Left,
        VK_RIGHT => KeyCode::Right,
        VK_HOME => KeyCode::Home,
        VK_END => KeyCode::End,
        VK_PRIOR => KeyCode::PageUp,
        VK_NEXT => KeyCode::PageDown,
        VK_INSERT => KeyCode::Insert,
        VK_DELETE => KeyCode::Delete,
        VK_F1..=VK_F24 => KeyCode::Function(u8::try_from(vk - VK_F1 + 1).ok()?),
        _ => return None,
    })
}

/// Stateful mapper for mouse records. Windows reports the full set of held buttons in
/// every record; transitions are found by comparing with the previous record.
#[derive(Debug, Default, Clone)]
pub struct ConsoleMouseMapper {
    previous_buttons: u32,
    dragged: bool,
}

impl ConsoleMouseMapper {
    pub fn map(&mut self, record: &ConsoleMouseRecord) -> MouseEvents {
        use mouse_record_flags::{BUTTONS_MASK, MOUSE_HWHEELED, MOUSE_MOVED, MOUSE_WHEELED};

        let modifiers = modifiers_from_control_state(record.control_key_state);
        let event = |button_state| MouseEvent {
            position: record.position,
            button_state,
            modifiers,
        };
        let mut events = MouseEvents::new();
        let buttons = record.button_state & BUTTONS_MASK;

        if record.event_flags & (MOUSE_WHEELED | MOUSE_HWHEELED) != 0 {
            let positive = wheel_delta(record.button_state) > 0;
            let direction = match (record.event_flags & MOUSE_HWHEELED != 0, positive) {
                (false, true) => WheelDirection::Up,
                (false, false) => WheelDirection::Down,
                (true, true) => WheelDirection::Right,
                (true, false) => WheelDirection::Left,
            };
            events.push(event(ButtonState::Wheeled(direction)));
            return events;
        }

        if record.event_flags & MOUSE_MOVED != 0 && buttons == self.previous_buttons {
            match first_button(buttons) {
                Some(button) => {
                    self.dragged = true;
                    events.push(event(ButtonState::Dragged(button)));
                }
                None => events.push(event(ButtonState::Moved)),
            }
            return events;
        }

        let released = self.previous_buttons & !buttons;
        let pressed = buttons & !self.previous_buttons;
        for button in buttons_in(released) {
            events.push(event(ButtonState::Released(button)));
            if !self.dragged {
                events.push(event(ButtonState::Clicked(button)));
            }
        }
        if buttons == 0 {
            self.dragged = false;
        }
        for button in buttons_in(pressed) {
            self.dragged = false;
            events.push(event(ButtonState::Pressed(button)));
        }
        self.previous_buttons = buttons;
        events
    }
}

/// The signed high word of `dwButtonState`.
fn wheel_delta(button_state: u32) -> i16 {
    i16::from_ne_bytes(((button_state >> 16) as u16).to_ne_bytes())
}

#[rustfmt::skip]
const BUTTON_BITS: [(u32, MouseButton); 3] = [
    (mouse_record_flags::FROM_LEFT_1ST_BUTTON_PRESSED, MouseButton::Left),
    (mouse_record_flags::FROM_LEFT_2ND_BUTTON_PRESSED, MouseButton::Middle),
    (mouse_record_flags::RIGHTMOST_BUTTON_PRESSED,     MouseButton::Right),
];

fn buttons_in(bits: u32) -> impl Iterator<Item = MouseButton> {
    BUTTON_BITS
        .into_iter()
        .filter_map(move |(bit, button)| (bits & bit != 0).then_some(button))
}

fn first_button(bits: u32) -> Option<MouseButton> { buttons_in(bits).next() }
