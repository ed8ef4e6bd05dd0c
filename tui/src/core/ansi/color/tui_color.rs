// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::ColorSupport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RgbValue {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbValue {
    #[must_use]
    pub const fn from_u8(red: u8, green: u8, blue: u8) -> Self { Self { red, green, blue } }
}

impl From<(u8, u8, u8)> for RgbValue {
    fn from((red, green, blue): (u8, u8, u8)) -> Self { Self { red, green, blue } }
}

/// The 16 color palette, in SGR order (`30..=37`, then `90..=97`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumIter)]
pub enum Ansi16Color {
    Black,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Gray,
    DarkGray,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Ansi16Color {
    /// Index into the palette, `0..16`. `0..8` are normal intensity, `8..16` bright.
    #[must_use]
    pub const fn index(self) -> u8 { self as u8 }

    /// The xterm default RGB value for this palette entry.
    #[must_use]
    #[rustfmt::skip]
    pub const fn as_rgb(self) -> RgbValue {
        match self {
            Self::Black       => RgbValue::from_u8(0, 0, 0),
            Self::DarkRed     => RgbValue::from_u8(205, 0, 0),
            Self::DarkGreen   => RgbValue::from_u8(0, 205, 0),
            Self::DarkYellow  => RgbValue::from_u8(205, 205, 0),
            Self::DarkBlue    => RgbValue::from_u8(0, 0, 238),
            Self::DarkMagenta => RgbValue::from_u8(205, 0, 205),
            Self::DarkCyan    => RgbValue::from_u8(0, 205, 205),
            Self::Gray        => RgbValue::from_u8(229, 229, 229),
            Self::DarkGray    => RgbValue::from_u8(127, 127, 127),
            Self::Red         => RgbValue::from_u8(255, 0, 0),
            Self::Green       => RgbValue::from_u8(0, 255, 0),
            Self::Yellow      => RgbValue::from_u8(255, 255, 0),
            Self::Blue        => RgbValue::from_u8(92, 92, 255),
            Self::Magenta     => RgbValue::from_u8(255, 0, 255),
            Self::Cyan        => RgbValue::from_u8(0, 255, 255),
            Self::White       => RgbValue::from_u8(255, 255, 255),
        }
    }

    /// Nearest palette entry by squared euclidean distance in RGB space.
    #[must_use]
    pub fn nearest(rgb: RgbValue) -> Self {
        use strum::IntoEnumIterator as _;
        let distance = |it: Self| {
            let other = it.as_rgb();
            let dr = i32::from(rgb.red) - i32::from(other.red);
            let dg = i32::from(rgb.green) - i32::from(other.green);
            let db = i32::from(rgb.blue) - i32::from(other.blue);
            dr * dr + dg * dg + db * db
        };
        Self::iter().min_by_key(|it| distance(*it)).unwrap_or(Self::White)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TuiColor {
    /// Terminal default (`SGR 39` / `SGR 49`).
    Reset,
    Rgb(RgbValue),
    Ansi16(Ansi16Color),
}

impl TuiColor {
    /// Rewrite this color into something the terminal can display. Returns `None` when
    /// no color should be emitted at all.
    #[must_use]
    pub fn degrade(self, color_support: ColorSupport) -> Option<Self> {
        match (color_support, self) {
            (ColorSupport::NoColor, _) => None,
            (ColorSupport::Ansi16, Self::Rgb(rgb)) => {
                Some(Self::Ansi16(Ansi16Color::nearest(rgb)))
            }
            (ColorSupport::Truecolor | ColorSupport::Ansi16, it) => Some(it),
        }
    }
}

impl From<RgbValue> for TuiColor {
    fn from(rgb: RgbValue) -> Self { Self::Rgb(rgb) }
}

impl From<Ansi16Color> for TuiColor {
    fn from(color: Ansi16Color) -> Self { Self::Ansi16(color) }
}
