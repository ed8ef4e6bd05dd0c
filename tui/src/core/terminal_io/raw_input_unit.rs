// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Point, Size};

/// The smallest piece of input an adapter reads from the OS. Produced on the input thread,
/// moved through the handoff queue, consumed exactly once by the [`InputProcessor`].
///
/// [`InputProcessor`]: crate::InputProcessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputUnit {
    /// One decoded character of a VT byte stream (POSIX and portable adapters).
    Char(char),
    /// A Windows console key record.
    ConsoleKey(ConsoleKeyRecord),
    /// A Windows console mouse record.
    ConsoleMouse(ConsoleMouseRecord),
    /// The adapter noticed a new window size.
    WindowResized(Size),
}

/// Platform independent copy of a Windows `KEY_EVENT_RECORD`. Mapping to a [`Key`] is done
/// by [`vk_mapping`] on the UI thread, so it can be tested on any OS.
///
/// [`Key`]: crate::Key
/// [`vk_mapping`]: crate::vk_mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleKeyRecord {
    pub key_down: bool,
    pub repeat_count: u16,
    pub virtual_key_code: u16,
    pub virtual_scan_code: u16,
    /// UTF-16 code unit. `0` for keys that don't produce text.
    pub unicode_char: u16,
    pub control_key_state: u32,
}

/// Platform independent copy of a Windows `MOUSE_EVENT_RECORD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleMouseRecord {
    /// 0-based, relative to the console buffer.
    pub position: Point,
    /// Low word: pressed buttons. High word (signed): wheel delta.
    pub button_state: u32,
    pub control_key_state: u32,
    pub event_flags: u32,
}
