// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Screen geometry. Everything here is 0-based; the conversion to and from the 1-based
//! coordinates used on the wire happens at the protocol edges (the mouse decoder and the
//! cursor position generator).

use std::fmt;

/// Terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

impl Size {
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self { Self { rows, cols } }

    #[must_use]
    pub const fn is_empty(&self) -> bool { self.rows == 0 || self.cols == 0 }

    #[must_use]
    pub const fn area(&self) -> usize { self.rows as usize * self.cols as usize }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// A cell position, or a window position in pixels for
/// [`StructuredEvent::WindowPosition`](crate::StructuredEvent::WindowPosition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Point {
    pub row: u16,
    pub col: u16,
}

impl Point {
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self { Self { row, col } }
}
