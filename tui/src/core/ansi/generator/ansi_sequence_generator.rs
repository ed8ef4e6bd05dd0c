// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Output sequences: cursor positioning, SGR styling, DEC private modes and queries.
//!
//! Every function appends to a caller supplied `String` so a whole frame can be built in
//! one buffer and written with a single syscall.
//!
//! | Operation            | Sequence                         |
//! | :------------------- | :------------------------------- |
//! | Cursor position      | `CSI row ; col H` (1-based)      |
//! | 24-bit fg / bg       | `CSI 38;2;r;g;b m` / `48;2;...`  |
//! | 16-color fg / bg     | `CSI 30..37 m`, `90..97 m` / +10 |
//! | Show / hide cursor   | `CSI ?25h` / `CSI ?25l`          |
//! | Alternate screen     | `CSI ?1049h` / `CSI ?1049l`      |
//! | Mouse reporting      | `CSI ?1000;1006h` etc.           |

use crate::{CellAttribs, CellStyle, ColorSupport, Point, TuiColor,
            core::ansi::constants::{ALT_SCREEN_BUFFER, CSI_START,
                                    DECTCEM_SHOW_CURSOR, MOUSE_MODE_ANY_EVENT_TRACKING,
                                    MOUSE_MODE_BUTTON_EVENT_TRACKING,
                                    MOUSE_MODE_NORMAL_TRACKING, MOUSE_MODE_SGR_ENCODING,
                                    SGR_BG_BASE, SGR_BG_EXTENDED, SGR_BLINK_PARAM,
                                    SGR_BOLD, SGR_BRIGHT_OFFSET, SGR_DIM,
                                    SGR_EXTENDED_RGB, SGR_FG_BASE, SGR_FG_EXTENDED,
                                    SGR_HIDDEN, SGR_ITALIC, SGR_RESET, SGR_REVERSE,
                                    SGR_STRIKETHROUGH, SGR_UNDERLINE}};
use std::fmt::Write as _;

/// Which mouse events the terminal should report. Every mode other than
/// [`MouseTrackingMode::Off`] is paired with SGR encoding (`?1006`), the only encoding
/// the input parser decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MouseTrackingMode {
    Off,
    /// Press and release only.
    Normal,
    /// Press, release, and motion while a button is held.
    #[default]
    ButtonEvent,
    /// Everything, including motion with no button held.
    AnyEvent,
}

impl MouseTrackingMode {
    #[must_use]
    pub const fn private_mode(self) -> Option<u16> {
        match self {
            Self::Off => None,
            Self::Normal => Some(MOUSE_MODE_NORMAL_TRACKING),
            Self::ButtonEvent => Some(MOUSE_MODE_BUTTON_EVENT_TRACKING),
            Self::AnyEvent => Some(MOUSE_MODE_ANY_EVENT_TRACKING),
        }
    }
}

/// `CSI row ; col H`. The terminal is 1-based, [`Point`] is 0-based.
pub fn cursor_position(acc: &mut String, pos: Point) {
    let _unused = write!(
        acc,
        "{CSI_START}{};{}H",
        u32::from(pos.row) + 1,
        u32::from(pos.col) + 1
    );
}

pub fn cursor_visibility(acc: &mut String, visible: bool) {
    private_mode(acc, DECTCEM_SHOW_CURSOR, visible);
}

pub fn alternate_screen(acc: &mut String, enter: bool) {
    private_mode(acc, ALT_SCREEN_BUFFER, enter);
}

/// Enable or disable mouse reporting for `mode`, together with SGR encoding.
pub fn mouse_tracking(acc: &mut String, mode: MouseTrackingMode, enable: bool) {
    if let Some(code) = mode.private_mode() {
        let suffix = if enable { 'h' } else { 'l' };
        let _unused = write!(acc, "{CSI_START}?{code};{MOUSE_MODE_SGR_ENCODING}{suffix}");
    }
}

/// `CSI 2J`: erase the whole display.
pub fn clear_screen(acc: &mut String) { let _unused = write!(acc, "{CSI_START}2J"); }

pub fn sgr_reset(acc: &mut String) { acc.push_str(SGR_RESET); }

/// Emit a single SGR sequence setting every part of `style`. Colors are degraded to what
/// `color_support` allows. Nothing is written for a plain style, callers reset first
/// when they need to clear a previous style.
pub fn cell_style(acc: &mut String, style: &CellStyle, color_support: ColorSupport) {
    let mut params: Vec<u16> = attrib_params(style.attribs);
    if let Some(fg) = style.fg.and_then(|it| it.degrade(color_support)) {
        color_params(&mut params, fg, Layer::Fg);
    }
    if let Some(bg) = style.bg.and_then(|it| it.degrade(color_support)) {
        color_params(&mut params, bg, Layer::Bg);
    }
    if params.is_empty() {
        return;
    }
    acc.push_str(CSI_START);
    for (index, param) in params.iter().enumerate() {
        if index > 0 {
            acc.push(';');
        }
        let _unused = write!(acc, "{param}");
    }
    acc.push('m');
}

fn private_mode(acc: &mut String, code: u16, set: bool) {
    let suffix = if set { 'h' } else { 'l' };
    let _unused = write!(acc, "{CSI_START}?{code}{suffix}");
}

#[rustfmt::skip]
fn attrib_params(attribs: CellAttribs) -> Vec<u16> {
    [
        (attribs.bold,          SGR_BOLD),
        (attribs.dim,           SGR_DIM),
        (attribs.italic,        SGR_ITALIC),
        (attribs.underline,     SGR_UNDERLINE),
        (attribs.blink,         SGR_BLINK_PARAM),
        (attribs.reverse,       SGR_REVERSE),
        (attribs.hidden,        SGR_HIDDEN),
        (attribs.strikethrough, SGR_STRIKETHROUGH),
    ]
    .into_iter()
    .filter_map(|(on, param)| on.then_some(param))
    .collect()
}

#[derive(Clone, Copy)]
enum Layer {
    Fg,
    Bg,
}

fn color_params(params: &mut Vec<u16>, color: TuiColor, layer: Layer) {
    let (base, extended, default) = match layer {
        Layer::Fg => (SGR_FG_BASE, SGR_FG_EXTENDED, 39),
        Layer::Bg => (SGR_BG_BASE, SGR_BG_EXTENDED, 49),
    };
    match color {
        TuiColor::Reset => params.push(default),
        TuiColor::Rgb(rgb) => params.extend([
            extended,
            SGR_EXTENDED_RGB,
            u16::from(rgb.red),
            u16::from(rgb.green),
            u16::from(rgb.blue),
        ]),
        TuiColor::Ansi16(color) => {
            let index = u16::from(color.index());
            if index < 8 {
                params.push(base + index);
            } else {
                params.push(base + SGR_BRIGHT_OFFSET + index - 8);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ansi16Color;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn generate(f: impl FnOnce(&mut String)) -> String {
        let mut acc = String::new();
        f(&mut acc);
        acc
    }

    #[test]
    fn test_cursor_position_is_one_based() {
        assert_eq!(generate(|acc| cursor_position(acc, Point::new(0, 0))), "\x1b[1;1H");
        assert_eq!(generate(|acc| cursor_position(acc, Point::new(4, 9))), "\x1b[5;10H");
    }

    #[test]
    fn test_private_modes() {
        assert_eq!(generate(|acc| cursor_visibility(acc, false)), "\x1b[?25l");
        assert_eq!(generate(|acc| cursor_visibility(acc, true)), "\x1b[?25h");
        assert_eq!(generate(|acc| alternate_screen(acc, true)), "\x1b[?1049h");
        assert_eq!(generate(|acc| alternate_screen(acc, false)), "\x1b[?1049l");
    }

    #[test_case(MouseTrackingMode::Normal, true, "\x1b[?1000;1006h")]
    #[test_case(MouseTrackingMode::ButtonEvent, true, "\x1b[?1002;1006h")]
    #[test_case(MouseTrackingMode::AnyEvent, false, "\x1b[?1003;1006l")]
    #[test_case(MouseTrackingMode::Off, true, "")]
    fn test_mouse_tracking(mode: MouseTrackingMode, enable: bool, expected: &str) {
        assert_eq!(generate(|acc| mouse_tracking(acc, mode, enable)), expected);
    }

    #[test]
    fn test_truecolor_style() {
        let style = CellStyle::default()
            .with_fg(crate::RgbValue::from_u8(255, 128, 0))
            .with_bg(Ansi16Color::Blue)
            .with_attribs(CellAttribs {
                bold: true,
                underline: true,
                ..Default::default()
            });
        assert_eq!(
            generate(|acc| cell_style(acc, &style, ColorSupport::Truecolor)),
            "\x1b[1;4;38;2;255;128;0;104m"
        );
    }

    #[test]
    fn test_rgb_degrades_to_ansi16() {
        let style = CellStyle::default().with_fg(crate::RgbValue::from_u8(200, 0, 0));
        assert_eq!(
            generate(|acc| cell_style(acc, &style, ColorSupport::Ansi16)),
            "\x1b[31m"
        );
    }

    #[test]
    fn test_no_color_keeps_attributes_only() {
        let style = CellStyle::default()
            .with_fg(Ansi16Color::Red)
            .with_attribs(CellAttribs {
                reverse: true,
                ..Default::default()
            });
        assert_eq!(
            generate(|acc| cell_style(acc, &style, ColorSupport::NoColor)),
            "\x1b[7m"
        );
        assert_eq!(
            generate(|acc| cell_style(acc, &CellStyle::default(), ColorSupport::Truecolor)),
            ""
        );
    }
}
