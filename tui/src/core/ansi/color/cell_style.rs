// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::TuiColor;

/// Text attributes. Each flag maps to one SGR parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellAttribs {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl CellAttribs {
    #[must_use]
    pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// Style of a single cell. `None` colors mean "terminal default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub fg: Option<TuiColor>,
    pub bg: Option<TuiColor>,
    pub attribs: CellAttribs,
}

impl CellStyle {
    #[must_use]
    pub fn with_fg(mut self, color: impl Into<TuiColor>) -> Self {
        self.fg = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_bg(mut self, color: impl Into<TuiColor>) -> Self {
        self.bg = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_attribs(mut self, attribs: CellAttribs) -> Self {
        self.attribs = attribs;
        self
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attribs.is_empty()
    }
}
