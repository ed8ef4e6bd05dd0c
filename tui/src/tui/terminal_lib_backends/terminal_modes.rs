// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{MouseTrackingMode, RuntimeConfig, core::ansi::generator::ansi_sequence_generator};

/// The DEC private modes the runtime switches on for the duration of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalModes {
    pub alternate_screen: bool,
    pub mouse_tracking: MouseTrackingMode,
}

impl From<&RuntimeConfig> for TerminalModes {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            alternate_screen: config.alternate_screen,
            mouse_tracking: config.mouse_tracking,
        }
    }
}

impl TerminalModes {
    /// Enter the alternate screen, then enable mouse reporting.
    #[must_use]
    pub fn enter_sequence(&self) -> String {
        let mut acc = String::new();
        if self.alternate_screen {
            ansi_sequence_generator::alternate_screen(&mut acc, true);
        }
        ansi_sequence_generator::mouse_tracking(&mut acc, self.mouse_tracking, true);
        acc
    }

    #[must_use]
    pub fn disable_mouse_sequence(&self) -> String {
        let mut acc = String::new();
        ansi_sequence_generator::mouse_tracking(&mut acc, self.mouse_tracking, false);
        acc
    }

    #[must_use]
    pub fn leave_screen_sequence(&self) -> String {
        let mut acc = String::new();
        if self.alternate_screen {
            ansi_sequence_generator::alternate_screen(&mut acc, false);
        }
        acc
    }

    /// Mouse off, then leave the alternate screen.
    #[must_use]
    pub fn exit_sequence(&self) -> String {
        self.disable_mouse_sequence() + &self.leave_screen_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enter_and_exit_are_mirrored() {
        let modes = TerminalModes {
            alternate_screen: true,
            mouse_tracking: MouseTrackingMode::ButtonEvent,
        };
        assert_eq!(modes.enter_sequence(), "\x1b[?1049h\x1b[?1002;1006h");
        assert_eq!(modes.exit_sequence(), "\x1b[?1002;1006l\x1b[?1049l");
    }

    #[test]
    fn test_everything_off_is_empty() {
        let modes = TerminalModes {
            alternate_screen: false,
            mouse_tracking: MouseTrackingMode::Off,
        };
        assert!(modes.enter_sequence().is_empty());
        assert!(modes.exit_sequence().is_empty());
    }
}
