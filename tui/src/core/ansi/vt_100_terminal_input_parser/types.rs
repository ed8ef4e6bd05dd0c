// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Structured events produced by the input pipeline. These are platform independent:
//! the POSIX, Windows and portable adapters all end up here.

use crate::{Point, Size};
use smallvec::SmallVec;

/// Inline storage for sequence parameters. Almost every sequence seen in practice has at
/// most 4 (`CSI < b ; x ; y M` has 3).
pub type SequenceParams = SmallVec<[u16; 4]>;

/// One fully classified input event. Exactly one variant per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredEvent {
    Key(Key),
    Mouse(MouseEvent),
    /// New terminal size, from a resize notification or a `CSI 8 ; rows ; cols t` reply.
    WindowSize(Size),
    /// Window position in pixels, from a `CSI 3 ; x ; y t` reply.
    WindowPosition(Point),
    /// A reply to a query sent through the
    /// [`OutputRequestScheduler`](crate::OutputRequestScheduler).
    TerminalReply(TerminalReply),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self { Self { code, modifiers } }

    #[must_use]
    pub const fn plain(code: KeyCode) -> Self { Self::new(code, KeyModifiers::NONE) }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self { Self::plain(code) }
}

/// Keyboard modifiers for input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };

    #[must_use]
    pub const fn is_empty(&self) -> bool { !(self.shift || self.ctrl || self.alt) }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
        }
    }
}

/// Keyboard key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Regular printable character.
    Char(char),
    /// Function keys F1-F24.
    Function(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Tab,
    BackTab,
    Enter,
    Escape,
    Backspace,
    /// A key with no character and no mapping (eg: a lone modifier on Windows).
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelDirection {
    Up,
    Down,
    Left,
    Right,
}

/// What happened to the mouse. A press followed by a release without any drag in
/// between is reported as `Released` then `Clicked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed(MouseButton),
    Released(MouseButton),
    Clicked(MouseButton),
    Dragged(MouseButton),
    /// Motion with no button held.
    Moved,
    Wheeled(WheelDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    /// 0-based cell position.
    pub position: Point,
    pub button_state: ButtonState,
    pub modifiers: KeyModifiers,
}

/// The introducer of an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPrefix {
    /// `ESC [`
    Csi,
    /// `ESC O`
    Ss3,
}

/// A completed sequence that was recognized as a reply to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalReply {
    pub control_prefix: ControlPrefix,
    /// Private marker or intermediate char, eg: `?` in `CSI ? 62 ; 22 c`.
    pub code: Option<char>,
    pub params: SequenceParams,
    pub terminator: char,
}
