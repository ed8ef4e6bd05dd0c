// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The screen buffer the view layer hands to
//! [`DriverFacade::write`](crate::DriverFacade::write).

use crate::{CellStyle, Point, Size};
use unicode_width::UnicodeWidthChar as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorVisibility {
    #[default]
    Visible,
    Hidden,
}

impl CursorVisibility {
    #[must_use]
    pub const fn is_visible(self) -> bool { matches!(self, Self::Visible) }
}

impl From<bool> for CursorVisibility {
    fn from(visible: bool) -> Self { if visible { Self::Visible } else { Self::Hidden } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellContent {
    Char(char),
    /// Right half of a wide char in the cell to the left. Never painted.
    WideTail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyledCell {
    pub content: CellContent,
    pub style: CellStyle,
}

impl StyledCell {
    #[must_use]
    pub const fn new(ch: char, style: CellStyle) -> Self {
        Self {
            content: CellContent::Char(ch),
            style,
        }
    }

    /// Display width of the content: 0 for a tail, else 1 or 2.
    #[must_use]
    pub fn width(&self) -> usize {
        match self.content {
            CellContent::WideTail => 0,
            CellContent::Char(ch) => ch.width().unwrap_or(1).clamp(1, 2),
        }
    }
}

impl Default for StyledCell {
    fn default() -> Self { Self::new(' ', CellStyle::default()) }
}

/// Row-major grid of [`StyledCell`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledCellGrid {
    size: Size,
    cells: Vec<StyledCell>,
}

impl StyledCellGrid {
    /// A grid of blank cells.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            cells: vec![StyledCell::default(); size.area()],
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size { self.size }

    fn index_of(&self, point: Point) -> Option<usize> {
        (point.row < self.size.rows && point.col < self.size.cols).then(|| {
            usize::from(point.row) * usize::from(self.size.cols) + usize::from(point.col)
        })
    }

    #[must_use]
    pub fn get(&self, point: Point) -> Option<&StyledCell> {
        self.index_of(point).map(|index| &self.cells[index])
    }

    /// Out of bounds writes are ignored. Returns whether the cell was set.
    pub fn set(&mut self, point: Point, cell: StyledCell) -> bool {
        let Some(index) = self.index_of(point) else {
            return false;
        };
        self.cells[index] = cell;
        true
    }

    /// Write `text` left to right starting at `start`, clipped at the right edge. A wide
    /// char takes two cells; one that would straddle the edge is replaced by a space.
    /// Returns the column after the last cell written.
    pub fn put_str(&mut self, start: Point, text: &str, style: CellStyle) -> u16 {
        let mut col = start.col;
        for ch in text.chars() {
            if col >= self.size.cols {
                break;
            }
            let cell = StyledCell::new(ch, style);
            if cell.width() == 2 {
                if col + 1 >= self.size.cols {
                    self.set(Point::new(start.row, col), StyledCell::new(' ', style));
                    col += 1;
                    break;
                }
                self.set(Point::new(start.row, col), cell);
                self.set(Point::new(start.row, col + 1), StyledCell {
                    content: CellContent::WideTail,
                    style,
                });
                col += 2;
            } else {
                self.set(Point::new(start.row, col), cell);
                col += 1;
            }
        }
        col
    }

    /// Cells of one row. Empty if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: u16) -> &[StyledCell] {
        if row >= self.size.rows {
            return &[];
        }
        let cols = usize::from(self.size.cols);
        let start = usize::from(row) * cols;
        &self.cells[start..start + cols]
    }

    pub fn fill(&mut self, cell: StyledCell) { self.cells.fill(cell); }

    /// Resize, keeping the overlapping top left region.
    pub fn resize(&mut self, new_size: Size) {
        if new_size == self.size {
            return;
        }
        let mut resized = Self::new(new_size);
        let rows = self.size.rows.min(new_size.rows);
        let cols = usize::from(self.size.cols.min(new_size.cols));
        for row in 0..rows {
            let src = &self.row(row)[..cols];
            let dst_start = usize::from(row) * usize::from(new_size.cols);
            resized.cells[dst_start..dst_start + cols].copy_from_slice(src);
        }
        *self = resized;
    }
}
