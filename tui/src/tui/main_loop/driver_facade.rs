// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! What the view layer gets to touch: [`DriverFacade`] to write to the terminal, and
//! [`DriverCallbacks`] to hear about input.

use crate::{AnsiRequest, ApplicationContext, BoxedOutputAdapter, CursorVisibility, Key,
            MouseEvent, OutputAdapter, OutputRequestScheduler, Point, RequestTickSummary,
            Size, StructuredEvent, StyledCellGrid};
use std::time::Instant;

/// Built once by the [`FacadeGate`] when both adapters are ready, then owned by the
/// coordinator and lent to every callback.
///
/// [`FacadeGate`]: crate::FacadeGate
#[derive(Debug)]
pub struct DriverFacade {
    output: BoxedOutputAdapter,
    window_size: Size,
    requests: OutputRequestScheduler,
}

impl DriverFacade {
    #[must_use]
    pub fn new(
        output: BoxedOutputAdapter,
        window_size: Size,
        requests: OutputRequestScheduler,
    ) -> Self {
        Self {
            output,
            window_size,
            requests,
        }
    }

    /// Paint `grid`. Only cells that differ from the previous frame are written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn write(&mut self, grid: &StyledCellGrid) -> miette::Result<()> {
        self.output.write_cells(grid)?;
        self.output.flush()
    }

    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn set_cursor_visibility(&mut self, visibility: CursorVisibility) -> miette::Result<()> {
        self.output.set_cursor_visibility(visibility)?;
        self.output.flush()
    }

    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn set_cursor_position(&mut self, position: Point) -> miette::Result<()> {
        self.output.set_cursor_position(position)?;
        self.output.flush()
    }

    /// Queue a terminal query. It is written at the start of the next iteration, once
    /// no other query expecting the same reply terminator is in flight.
    pub fn send_request(&mut self, request: AnsiRequest) { self.requests.enqueue(request); }

    #[must_use]
    pub fn window_size(&self) -> Size { self.window_size }

    #[must_use]
    pub fn requests(&self) -> &OutputRequestScheduler { &self.requests }

    pub(crate) fn requests_mut(&mut self) -> &mut OutputRequestScheduler { &mut self.requests }

    pub(crate) fn set_window_size(&mut self, size: Size) { self.window_size = size; }

    pub(crate) fn process_requests(&mut self, now: Instant) -> miette::Result<RequestTickSummary> {
        self.requests.process(now, &mut *self.output)
    }

    pub(crate) fn output_mut(&mut self) -> &mut dyn OutputAdapter { &mut *self.output }

}

pub type KeyCallback = Box<dyn FnMut(Key, &mut DriverFacade, &ApplicationContext) + Send>;
pub type MouseCallback =
    Box<dyn FnMut(MouseEvent, &mut DriverFacade, &ApplicationContext) + Send>;
pub type SizeCallback = Box<dyn FnMut(Size, &mut DriverFacade, &ApplicationContext) + Send>;
pub type RedrawCallback =
    Box<dyn FnMut(&mut DriverFacade, &ApplicationContext) -> miette::Result<()> + Send>;
pub type ReplyCallback =
    Box<dyn FnMut(&StructuredEvent, &mut DriverFacade, &ApplicationContext) + Send>;

/// Registered once, when the coordinator is built. All of them run on the UI thread.
///
/// VT terminals only report key presses, so every [`Key`] is delivered as
/// `on_key_down` immediately followed by `on_key_up`.
pub struct DriverCallbacks {
    pub on_key_down: KeyCallback,
    pub on_key_up: KeyCallback,
    pub on_mouse_event: MouseCallback,
    /// Called only when the size actually changes.
    pub on_size_changed: SizeCallback,
    /// Called on the first iteration, after any iteration that dispatched events, and
    /// after [`ApplicationContext::request_redraw`]. An error ends the iteration.
    pub on_redraw: RedrawCallback,
    /// Replies to queries sent with [`DriverFacade::send_request`], other than the
    /// window size.
    pub on_terminal_reply: ReplyCallback,
}

impl Default for DriverCallbacks {
    fn default() -> Self {
        Self {
            on_key_down: Box::new(|_, _, _| {}),
            on_key_up: Box::new(|_, _, _| {}),
            on_mouse_event: Box::new(|_, _, _| {}),
            on_size_changed: Box::new(|_, _, _| {}),
            on_redraw: Box::new(|_, _| Ok(())),
            on_terminal_reply: Box::new(|_, _, _| {}),
        }
    }
}

impl std::fmt::Debug for DriverCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverCallbacks").finish_non_exhaustive()
    }
}

impl DriverCallbacks {
    #[must_use]
    pub fn with_on_key_down(
        mut self,
        callback: impl FnMut(Key, &mut DriverFacade, &ApplicationContext) + Send + 'static,
    ) -> Self {
        self.on_key_down = Box::new(callback);
        self
    }

    #[must_use]
    pub fn with_on_key_up(
        mut self,
        callback: impl FnMut(Key, &mut DriverFacade, &ApplicationContext) + Send + 'static,
    ) -> Self {
        self.on_key_up = Box::new(callback);
        self
    }

    #[must_use]
    pub fn with_on_mouse_event(
        mut self,
        callback: impl FnMut(MouseEvent, &mut DriverFacade, &ApplicationContext)
        + Send
        + 'static,
    ) -> Self {
        self.on_mouse_event = Box::new(callback);
        self
    }

    #[must_use]
    pub fn with_on_size_changed(
        mut self,
        callback: impl FnMut(Size, &mut DriverFacade, &ApplicationContext) + Send + 'static,
    ) -> Self {
        self.on_size_changed = Box::new(callback);
        self
    }

    #[must_use]
    pub fn with_on_redraw(
        mut self,
        callback: impl FnMut(&mut DriverFacade, &ApplicationContext) -> miette::Result<()>
        + Send
        + 'static,
    ) -> Self {
        self.on_redraw = Box::new(callback);
        self
    }

    #[must_use]
    pub fn with_on_terminal_reply(
        mut self,
        callback: impl FnMut(&StructuredEvent, &mut DriverFacade, &ApplicationContext)
        + Send
        + 'static,
    ) -> Self {
        self.on_terminal_reply = Box::new(callback);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnsiOutputAdapter, CellStyle, ColorSupport, OutputDevice, StdoutMock,
                WindowSizeSource};
    use std::time::Duration;

    fn facade() -> (DriverFacade, StdoutMock) {
        let size = Size::new(2, 10);
        let (device, mock) = OutputDevice::new_mock();
        let output = AnsiOutputAdapter::new(
            device,
            ColorSupport::NoColor,
            WindowSizeSource::Fixed(size),
            None,
        );
        let requests = OutputRequestScheduler::new(Duration::ZERO, Duration::from_secs(1), 0);
        (DriverFacade::new(Box::new(output), size, requests), mock)
    }

    #[test]
    fn test_second_identical_write_emits_nothing() {
        let (mut facade, mock) = facade();
        let mut grid = StyledCellGrid::new(facade.window_size());
        grid.put_str(Point::new(0, 0), "hi", CellStyle::default());

        facade.write(&grid).unwrap();
        assert!(mock.take_buffer_as_string().contains("hi"));

        facade.write(&grid).unwrap();
        assert!(!mock.take_buffer_as_string().contains("hi"));
    }

    #[test]
    fn test_send_request_waits_for_processing() {
        let (mut facade, mock) = facade();
        facade.send_request(AnsiRequest::cursor_position());
        assert_eq!(mock.get_copy_of_buffer_as_string(), "");
        assert_eq!(facade.requests().queued_len(), 1);

        let summary = facade.process_requests(Instant::now()).unwrap();
        assert_eq!(summary.sent, 1);
        assert!(mock.take_buffer_as_string().ends_with("\x1b[6n"));
    }
}
