// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! SGR mouse reports: `CSI < Cb ; Cx ; Cy M` (press or motion) and `... m` (release).
//!
//! `Cb` bit layout:
//!
//! ```text
//! bits 0-1  button: 0 left, 1 middle, 2 right, 3 none
//! bit  2    shift    (4)
//! bit  3    alt      (8)
//! bit  4    ctrl     (16)
//! bit  5    motion   (32)
//! bit  6    wheel    (64): low bits are then 0 up, 1 down, 2 left, 3 right
//! ```
//!
//! `Cx` and `Cy` are 1-based; [`MouseEvent::position`] is 0-based.
//!
//! The report itself only says "button down" or "button up". [`MouseButtonTracker`]
//! remembers the held button so that a release with no drag in between also produces a
//! [`ButtonState::Clicked`], and motion with a held button becomes
//! [`ButtonState::Dragged`].

use super::{ButtonState, ControlPrefix, EscapeSequence, KeyModifiers, MouseButton,
            MouseEvent, WheelDirection};
use crate::{Point,
            core::ansi::constants::{MOUSE_BUTTON_BITS, MOUSE_MODIFIER_ALT,
                                    MOUSE_MODIFIER_CTRL, MOUSE_MODIFIER_SHIFT,
                                    MOUSE_MOTION_FLAG, MOUSE_WHEEL_FLAG,
                                    SGR_MOUSE_MARKER, SGR_MOUSE_PRESS_FINAL,
                                    SGR_MOUSE_RELEASE_FINAL}};
use smallvec::SmallVec;

/// Decoded fields of one SGR report, before button tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SgrMouseReport {
    pub cb: u16,
    pub position: Point,
    pub is_release: bool,
}

impl SgrMouseReport {
    #[must_use]
    pub fn modifiers(&self) -> KeyModifiers {
        KeyModifiers {
            shift: self.cb & MOUSE_MODIFIER_SHIFT != 0,
            alt: self.cb & MOUSE_MODIFIER_ALT != 0,
            ctrl: self.cb & MOUSE_MODIFIER_CTRL != 0,
        }
    }

    #[must_use]
    pub fn is_motion(&self) -> bool { self.cb & MOUSE_MOTION_FLAG != 0 }

    #[must_use]
    pub fn wheel(&self) -> Option<WheelDirection> {
        if self.cb & MOUSE_WHEEL_FLAG == 0 {
            return None;
        }
        Some(match self.cb & MOUSE_BUTTON_BITS {
            0 => WheelDirection::Up,
            1 => WheelDirection::Down,
            2 => WheelDirection::Left,
            _ => WheelDirection::Right,
        })
    }

    #[must_use]
    pub fn button(&self) -> Option<MouseButton> {
        match self.cb & MOUSE_BUTTON_BITS {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Structural check for an SGR mouse report.
#[must_use]
pub fn is_sgr_mouse_report(seq: &EscapeSequence) -> bool {
    seq.prefix == ControlPrefix::Csi
        && seq.code == Some(SGR_MOUSE_MARKER)
        && matches!(seq.terminator, SGR_MOUSE_PRESS_FINAL | SGR_MOUSE_RELEASE_FINAL)
        && seq.params.len() == 3
}

/// Returns `None` for anything that isn't a well formed SGR report (including 0
/// coordinates, which are invalid in a 1-based system).
#[must_use]
pub fn parse_sgr_mouse_report(seq: &EscapeSequence) -> Option<SgrMouseReport> {
    if !is_sgr_mouse_report(seq) {
        return None;
    }
    let (cb, col, row) = (seq.param(0)?, seq.param(1)?, seq.param(2)?);
    Some(SgrMouseReport {
        cb,
        position: Point::new(row.checked_sub(1)?, col.checked_sub(1)?),
        is_release: seq.terminator == SGR_MOUSE_RELEASE_FINAL,
    })
}

pub type MouseEvents = SmallVec<[MouseEvent; 2]>;

/// Tracks the held button across reports.
#[derive(Debug, Default, Clone)]
pub struct MouseButtonTracker {
    held: Option<HeldButton>,
}

#[derive(Debug, Clone, Copy)]
struct HeldButton {
    button: MouseButton,
    dragged: bool,
}

impl MouseButtonTracker {
    /// Turn one report into one or more events, in the order they happened.
    pub fn decode(&mut self, report: SgrMouseReport) -> MouseEvents {
        let modifiers = report.modifiers();
        let event = |button_state| MouseEvent {
            position: report.position,
            button_state,
            modifiers,
        };
        let mut events = MouseEvents::new();

        if let Some(direction) = report.wheel() {
            events.push(event(ButtonState::Wheeled(direction)));
            return events;
        }

        match (report.is_release, report.is_motion(), report.button()) {
            // Release. Some terminals report button 3 on release; use the held one.
            (true, _, button) => {
                let held = self.held.take();
                let Some(button) = button.or(held.map(|it| it.button)) else {
                    return events;
                };
                events.push(event(ButtonState::Released(button)));
                if held.is_some_and(|it| it.button == button && !it.dragged) {
                    events.push(event(ButtonState::Clicked(button)));
                }
            }
            (false, true, Some(button)) => {
                self.held = Some(HeldButton {
                    button,
                    dragged: true,
                });
                events.push(event(ButtonState::Dragged(button)));
            }
            (false, true, None) => events.push(event(ButtonState::Moved)),
            (false, false, Some(button)) => {
                self.held = Some(HeldButton {
                    button,
                    dragged: false,
                });
                events.push(event(ButtonState::Pressed(button)));
            }
            (false, false, None) => {}
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ansi::generator::ansi_sequence_generator_input::sgr_mouse_sequence;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn report(cb: u16, col: u16, row: u16, release: bool) -> SgrMouseReport {
        let seq = sgr_mouse_sequence(cb, col, row, release);
        parse_sgr_mouse_report(&seq).unwrap()
    }

    fn states(events: &MouseEvents) -> Vec<ButtonState> {
        events.iter().map(|it| it.button_state).collect()
    }

    #[test]
    fn test_coordinates_are_converted_to_zero_based() {
        let it = report(0, 10, 5, false);
        assert_eq!(it.position, Point::new(4, 9));
    }

    #[test]
    fn test_zero_coordinate_is_rejected() {
        let seq = sgr_mouse_sequence(0, 0, 5, false);
        assert_eq!(parse_sgr_mouse_report(&seq), None);
    }

    #[test]
    fn test_modifier_bits() {
        let it = report(4 | 8 | 16, 1, 1, false);
        assert_eq!(
            it.modifiers(),
            KeyModifiers {
                shift: true,
                ctrl: true,
                alt: true
            }
        );
    }

    #[test]
    fn test_press_release_produces_release_then_click() {
        let mut tracker = MouseButtonTracker::default();
        assert_eq!(
            states(&tracker.decode(report(0, 3, 3, false))),
            vec![ButtonState::Pressed(MouseButton::Left)]
        );
        assert_eq!(
            states(&tracker.decode(report(0, 3, 3, true))),
            vec![
                ButtonState::Released(MouseButton::Left),
                ButtonState::Clicked(MouseButton::Left)
            ]
        );
    }

    #[test]
    fn test_drag_suppresses_click() {
        let mut tracker = MouseButtonTracker::default();
        tracker.decode(report(2, 3, 3, false));
        assert_eq!(
            states(&tracker.decode(report(2 | 32, 4, 3, false))),
            vec![ButtonState::Dragged(MouseButton::Right)]
        );
        assert_eq!(
            states(&tracker.decode(report(2, 4, 3, true))),
            vec![ButtonState::Released(MouseButton::Right)]
        );
    }

    #[test]
    fn test_motion_without_button() {
        let mut tracker = MouseButtonTracker::default();
        let events = tracker.decode(report(3 | 32, 7, 2, false));
        assert_eq!(states(&events), vec![ButtonState::Moved]);
        assert_eq!(events[0].position, Point::new(1, 6));
    }

    #[test]
    fn test_wheel() {
        let mut tracker = MouseButtonTracker::default();
        let expected: MouseEvents = smallvec![MouseEvent {
            position: Point::new(0, 0),
            button_state: ButtonState::Wheeled(WheelDirection::Down),
            modifiers: KeyModifiers::CTRL,
        }];
        assert_eq!(tracker.decode(report(65 | 16, 1, 1, false)), expected);
    }
}
