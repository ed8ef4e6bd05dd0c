// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`OutputAdapter`] that writes VT sequences to an [`OutputDevice`].
//!
//! Every frame is built in one `String` and written with a single call. A frame only
//! contains the cells that differ from the previous frame:
//!
//! ```text
//! previous   "hello"      changed cells   ...p.      emitted   CSI 1;4H p
//! next       "helpo"
//! ```
//!
//! A full repaint (clear screen, every cell) happens on the first frame, after a size
//! change, and after [`AnsiOutputAdapter::invalidate`].

use crate::{AdapterError, CellContent, CellStyle, ColorSupport, CursorVisibility,
            DEBUG_TUI_SHOW_TERMINAL_BACKEND, OutputAdapter, OutputDevice, Point, Size,
            StyledCellGrid, TerminalModes,
            core::ansi::generator::ansi_sequence_generator};
use miette::IntoDiagnostic as _;
use std::sync::{Arc, Mutex, PoisonError};

/// A window size kept up to date by someone else, eg: an embedder that learns about
/// resizes out of band.
pub type SharedWindowSize = Arc<Mutex<Size>>;

/// Where [`OutputAdapter::window_size`] gets its answer.
#[derive(Debug, Clone)]
pub enum WindowSizeSource {
    /// `tcgetwinsize` on stdout.
    #[cfg(unix)]
    Termios,
    /// `crossterm::terminal::size`, which uses the console API on Windows.
    Crossterm,
    /// Always this size. Used by the headless backend and tests.
    Fixed(Size),
    /// Whatever is in the cell when queried.
    Shared(SharedWindowSize),
}

impl WindowSizeSource {
    /// # Errors
    ///
    /// Returns an error if the OS query fails.
    pub fn query(&self) -> miette::Result<Size> {
        match self {
            #[cfg(unix)]
            Self::Termios => crate::get_window_size(std::io::stdout()),
            Self::Crossterm => {
                let (cols, rows) = crossterm::terminal::size().into_diagnostic()?;
                Ok(Size::new(rows, cols))
            }
            Self::Fixed(size) => Ok(*size),
            Self::Shared(size) => Ok(*size.lock().unwrap_or_else(PoisonError::into_inner)),
        }
    }
}

#[derive(Debug)]
pub struct AnsiOutputAdapter {
    device: OutputDevice,
    color_support: ColorSupport,
    size_source: WindowSizeSource,
    /// Modes entered on initialize and exited on dispose. `None` when the input adapter
    /// owns them (POSIX).
    managed_modes: Option<TerminalModes>,
    previous_frame: Option<StyledCellGrid>,
    /// Where the terminal cursor is after the last write, if known.
    cursor: Option<Point>,
    cursor_visibility: CursorVisibility,
    acc: String,
    disposed: bool,
}

impl AnsiOutputAdapter {
    #[must_use]
    pub fn new(
        device: OutputDevice,
        color_support: ColorSupport,
        size_source: WindowSizeSource,
        managed_modes: Option<TerminalModes>,
    ) -> Self {
        Self {
            device,
            color_support,
            size_source,
            managed_modes,
            previous_frame: None,
            cursor: None,
            cursor_visibility: CursorVisibility::Visible,
            acc: String::with_capacity(4_096),
            disposed: false,
        }
    }

    /// Forget the previous frame so the next [`OutputAdapter::write_cells`] repaints
    /// everything.
    pub fn invalidate(&mut self) {
        self.previous_frame = None;
        self.cursor = None;
    }

    #[must_use]
    pub fn color_support(&self) -> ColorSupport { self.color_support }

    fn write_acc(&mut self) -> miette::Result<()> {
        if self.acc.is_empty() {
            return Ok(());
        }
        let result = self
            .device
            .write_and_flush(self.acc.as_bytes())
            .map_err(AdapterError::Write);
        self.acc.clear();
        Ok(result?)
    }

    fn move_to(&mut self, point: Point) {
        if self.cursor != Some(point) {
            ansi_sequence_generator::cursor_position(&mut self.acc, point);
            self.cursor = Some(point);
        }
    }

    /// Paint `cells` of one row whose indices are in `cols`.
    fn paint_cells(
        &mut self,
        grid: &StyledCellGrid,
        row: u16,
        cols: impl Iterator<Item = u16>,
        current_style: &mut Option<CellStyle>,
    ) {
        for col in cols {
            let Some(cell) = grid.get(Point::new(row, col)) else {
                continue;
            };
            let CellContent::Char(ch) = cell.content else {
                continue;
            };

            self.move_to(Point::new(row, col));
            if *current_style != Some(cell.style) {
                ansi_sequence_generator::sgr_reset(&mut self.acc);
                ansi_sequence_generator::cell_style(&mut self.acc, &cell.style, self.color_support);
                *current_style = Some(cell.style);
            }
            self.acc.push(ch);

            let width = u16::try_from(cell.width()).unwrap_or(1);
            self.cursor = Some(Point::new(row, col.saturating_add(width)));
        }
    }

    fn build_full_frame(&mut self, grid: &StyledCellGrid) {
        ansi_sequence_generator::sgr_reset(&mut self.acc);
        ansi_sequence_generator::clear_screen(&mut self.acc);
        self.cursor = None;
        let mut current_style = None;
        for row in 0..grid.size().rows {
            self.paint_cells(grid, row, 0..grid.size().cols, &mut current_style);
        }
    }

    fn build_diff_frame(&mut self, previous: &StyledCellGrid, grid: &StyledCellGrid) -> usize {
        let mut current_style = None;
        let mut changed = 0;
        for row in 0..grid.size().rows {
            let old_row = previous.row(row);
            let changed_cols: Vec<u16> = grid
                .row(row)
                .iter()
                .zip(old_row)
                .enumerate()
                .filter(|(_, (new, old))| new != old)
                .filter_map(|(col, _)| u16::try_from(col).ok())
                .collect();
            changed += changed_cols.len();
            self.paint_cells(grid, row, changed_cols.into_iter(), &mut current_style);
        }
        changed
    }
}

impl OutputAdapter for AnsiOutputAdapter {
    fn name(&self) -> &'static str { "ansi" }

    fn initialize(&mut self) -> miette::Result<Size> {
        if let Some(modes) = self.managed_modes {
            self.acc.push_str(&modes.enter_sequence());
        }
        self.write_acc()?;
        let size = self.size_source.query()?;

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(
                message = "ansi output adapter initialized",
                size = %size,
                color_support = ?self.color_support,
                managed_modes = ?self.managed_modes
            );
        });
        Ok(size)
    }

    fn window_size(&mut self) -> miette::Result<Size> { self.size_source.query() }

    fn set_cursor_position(&mut self, position: Point) -> miette::Result<()> {
        // The cached position may be stale if anything else wrote to the terminal.
        ansi_sequence_generator::cursor_position(&mut self.acc, position);
        self.cursor = Some(position);
        self.write_acc()
    }

    fn set_cursor_visibility(&mut self, visibility: CursorVisibility) -> miette::Result<()> {
        if visibility == self.cursor_visibility {
            return Ok(());
        }
        ansi_sequence_generator::cursor_visibility(&mut self.acc, visibility.is_visible());
        self.cursor_visibility = visibility;
        self.write_acc()
    }

    fn write_cells(&mut self, grid: &StyledCellGrid) -> miette::Result<()> {
        let previous = self
            .previous_frame
            .take()
            .filter(|it| it.size() == grid.size());

        match &previous {
            Some(previous) => {
                let changed = self.build_diff_frame(previous, grid);
                DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
                    tracing::debug!(message = "diff frame", changed_cells = changed);
                });
            }
            None => self.build_full_frame(grid),
        }
        if !self.acc.is_empty() {
            ansi_sequence_generator::sgr_reset(&mut self.acc);
        }

        self.previous_frame = Some(grid.clone());
        self.write_acc()
    }

    fn write_raw(&mut self, text: &str) -> miette::Result<()> {
        self.acc.push_str(text);
        self.write_acc()
    }

    fn flush(&mut self) -> miette::Result<()> {
        self.write_acc()?;
        self.device
            .lock()
            .flush()
            .map_err(AdapterError::Write)?;
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        ansi_sequence_generator::sgr_reset(&mut self.acc);
        if !self.cursor_visibility.is_visible() {
            ansi_sequence_generator::cursor_visibility(&mut self.acc, true);
            self.cursor_visibility = CursorVisibility::Visible;
        }
        if let Some(modes) = self.managed_modes {
            self.acc.push_str(&modes.exit_sequence());
        }
        if let Err(error) = self.write_acc() {
            tracing::warn!(message = "ansi output adapter dispose failed", error = %error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MouseTrackingMode, StdoutMock, StyledCell};
    use pretty_assertions::assert_eq;

    fn fixture(size: Size) -> (AnsiOutputAdapter, StdoutMock) {
        let (device, mock) = OutputDevice::new_mock();
        let adapter = AnsiOutputAdapter::new(
            device,
            ColorSupport::Truecolor,
            WindowSizeSource::Fixed(size),
            None,
        );
        (adapter, mock)
    }

    #[test]
    fn test_first_frame_is_a_full_repaint() {
        let size = Size::new(1, 3);
        let (mut adapter, mock) = fixture(size);
        assert_eq!(adapter.initialize().unwrap(), size);

        let mut grid = StyledCellGrid::new(size);
        grid.put_str(Point::new(0, 0), "abc", CellStyle::default());
        adapter.write_cells(&grid).unwrap();

        assert_eq!(
            mock.take_buffer_as_string(),
            "\x1b[0m\x1b[2J\x1b[1;1H\x1b[0mabc\x1b[0m"
        );
    }

    #[test]
    fn test_second_frame_emits_only_changed_cells() {
        let size = Size::new(2, 5);
        let (mut adapter, mock) = fixture(size);
        let mut grid = StyledCellGrid::new(size);
        grid.put_str(Point::new(0, 0), "hello", CellStyle::default());
        adapter.write_cells(&grid).unwrap();
        drop(mock.take_buffer_as_string());

        grid.put_str(Point::new(0, 3), "p", CellStyle::default());
        grid.put_str(Point::new(1, 0), "x", CellStyle::default());
        adapter.write_cells(&grid).unwrap();

        assert_eq!(
            mock.take_buffer_as_string(),
            "\x1b[1;4H\x1b[0mp\x1b[2;1Hx\x1b[0m"
        );
    }

    #[test]
    fn test_unchanged_frame_writes_nothing() {
        let size = Size::new(2, 2);
        let (mut adapter, mock) = fixture(size);
        let grid = StyledCellGrid::new(size);
        adapter.write_cells(&grid).unwrap();
        drop(mock.take_buffer_as_string());

        adapter.write_cells(&grid).unwrap();
        assert_eq!(mock.take_buffer_as_string(), "");
    }

    #[test]
    fn test_adjacent_changes_share_one_cursor_move() {
        let size = Size::new(1, 4);
        let (mut adapter, mock) = fixture(size);
        let mut grid = StyledCellGrid::new(size);
        adapter.write_cells(&grid).unwrap();
        drop(mock.take_buffer_as_string());

        let bold = CellStyle {
            attribs: crate::CellAttribs {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        };
        grid.put_str(Point::new(0, 1), "ok", bold);
        adapter.write_cells(&grid).unwrap();

        assert_eq!(mock.take_buffer_as_string(), "\x1b[1;2H\x1b[0m\x1b[1mok\x1b[0m");
    }

    #[test]
    fn test_wide_tail_is_not_painted() {
        let size = Size::new(1, 3);
        let (mut adapter, mock) = fixture(size);
        let mut grid = StyledCellGrid::new(size);
        grid.put_str(Point::new(0, 0), "😀", CellStyle::default());
        grid.set(Point::new(0, 2), StyledCell::new('z', CellStyle::default()));
        adapter.write_cells(&grid).unwrap();

        // After the wide char the cursor is already at column 3, no move needed.
        assert_eq!(
            mock.take_buffer_as_string(),
            "\x1b[0m\x1b[2J\x1b[1;1H\x1b[0m😀z\x1b[0m"
        );
    }

    #[test]
    fn test_size_change_forces_full_repaint() {
        let (mut adapter, mock) = fixture(Size::new(1, 2));
        adapter.write_cells(&StyledCellGrid::new(Size::new(1, 2))).unwrap();
        drop(mock.take_buffer_as_string());

        adapter.write_cells(&StyledCellGrid::new(Size::new(1, 3))).unwrap();
        assert!(mock.take_buffer_as_string().contains("\x1b[2J"));
    }

    #[test]
    fn test_cursor_visibility_is_deduplicated_and_restored_on_dispose() {
        let (mut adapter, mock) = fixture(Size::new(1, 1));
        adapter.set_cursor_visibility(CursorVisibility::Hidden).unwrap();
        adapter.set_cursor_visibility(CursorVisibility::Hidden).unwrap();
        assert_eq!(mock.take_buffer_as_string(), "\x1b[?25l");

        adapter.dispose();
        adapter.dispose();
        assert_eq!(mock.take_buffer_as_string(), "\x1b[0m\x1b[?25h");
    }

    #[test]
    fn test_managed_modes_are_entered_and_exited() {
        let (device, mock) = OutputDevice::new_mock();
        let modes = TerminalModes {
            alternate_screen: true,
            mouse_tracking: MouseTrackingMode::Normal,
        };
        let mut adapter = AnsiOutputAdapter::new(
            device,
            ColorSupport::NoColor,
            WindowSizeSource::Fixed(Size::new(1, 1)),
            Some(modes),
        );
        adapter.initialize().unwrap();
        assert_eq!(mock.take_buffer_as_string(), "\x1b[?1049h\x1b[?1000;1006h");

        adapter.dispose();
        assert_eq!(mock.take_buffer_as_string(), "\x1b[0m\x1b[?1000;1006l\x1b[?1049l");
    }
}
