// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words HWHEELED

//! [`InputAdapter`] for the Windows console.
//!
//! Reads `INPUT_RECORD`s with `ReadConsoleInputW` and forwards them as platform
//! independent [`ConsoleKeyRecord`]s and [`ConsoleMouseRecord`]s. Mapping them to keys
//! happens on the UI thread, in [`vk_mapping`](crate::vk_mapping).
//!
//! The run loop waits on two handles at once: the console input handle and a manual
//! reset event that [`CancellationSignal::cancel`] sets. So cancellation doesn't have
//! to wait for the next key press or for the poll timeout.

use crate::{AdapterError, CancellationSignal, ConsoleKeyRecord, ConsoleMouseRecord,
            DEBUG_TUI_SHOW_TERMINAL_BACKEND, HandoffSender, InputAdapter, Point,
            RawInputUnit, Size};
use std::{ptr, sync::Arc, time::Duration};
use windows_sys::Win32::{Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE,
                                      WAIT_FAILED, WAIT_OBJECT_0, WAIT_TIMEOUT},
                         System::{Console::{CONSOLE_MODE, ENABLE_ECHO_INPUT,
                                            ENABLE_EXTENDED_FLAGS, ENABLE_LINE_INPUT,
                                            ENABLE_MOUSE_INPUT, ENABLE_PROCESSED_INPUT,
                                            ENABLE_QUICK_EDIT_MODE, ENABLE_WINDOW_INPUT,
                                            FlushConsoleInputBuffer, GetConsoleMode,
                                            GetStdHandle, INPUT_RECORD, KEY_EVENT,
                                            MOUSE_EVENT, ReadConsoleInputW,
                                            STD_INPUT_HANDLE, SetConsoleMode,
                                            WINDOW_BUFFER_SIZE_EVENT},
                                  Threading::{CreateEventW, SetEvent,
                                              WaitForMultipleObjects}}};

const INPUT_RECORD_BATCH_SIZE: usize = 32;

/// Console input mode while the adapter runs: no line editing, no echo, no Ctrl+C
/// processing, no quick edit (it swallows mouse input), and mouse + resize records on.
#[must_use]
pub const fn raw_console_input_mode(original: CONSOLE_MODE) -> CONSOLE_MODE {
    (original
        & !(ENABLE_LINE_INPUT
            | ENABLE_ECHO_INPUT
            | ENABLE_PROCESSED_INPUT
            | ENABLE_QUICK_EDIT_MODE))
        | ENABLE_WINDOW_INPUT
        | ENABLE_MOUSE_INPUT
        | ENABLE_EXTENDED_FLAGS
}

/// Owned Win32 event handle, closed on drop.
#[derive(Debug)]
struct CancelEvent(HANDLE);

// SAFETY: an event handle is a kernel object reference; `SetEvent` and `CloseHandle`
// may be called from any thread.
unsafe impl Send for CancelEvent {}
unsafe impl Sync for CancelEvent {}

impl CancelEvent {
    fn new() -> Result<Self, AdapterError> {
        // Manual reset, initially not signaled, unnamed.
        let handle = unsafe { CreateEventW(ptr::null(), 1, 0, ptr::null()) };
        if handle.is_null() {
            return Err(console_api_error("CreateEventW"));
        }
        Ok(Self(handle))
    }

    fn set(&self) { unsafe { SetEvent(self.0) }; }
}

impl Drop for CancelEvent {
    fn drop(&mut self) { unsafe { CloseHandle(self.0) }; }
}

fn console_api_error(call: &'static str) -> AdapterError {
    AdapterError::ConsoleApi {
        call,
        source: std::io::Error::last_os_error(),
    }
}

#[derive(Debug)]
pub struct WindowsConsoleInputAdapter {
    poll_timeout: Duration,
    session: Option<ConsoleSession>,
}

#[derive(Debug)]
struct ConsoleSession {
    input_handle: HANDLE,
    original_mode: CONSOLE_MODE,
    cancel_event: Arc<CancelEvent>,
    queue: HandoffSender,
}

impl WindowsConsoleInputAdapter {
    #[must_use]
    pub fn new(poll_timeout: Duration) -> Self {
        Self {
            poll_timeout,
            session: None,
        }
    }

    fn open_session(queue: HandoffSender) -> Result<ConsoleSession, AdapterError> {
        let input_handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        if input_handle.is_null() || input_handle == INVALID_HANDLE_VALUE {
            return Err(AdapterError::ConsoleHandleUnavailable { which: "stdin" });
        }

        let mut original_mode: CONSOLE_MODE = 0;
        if unsafe { GetConsoleMode(input_handle, &raw mut original_mode) } == 0 {
            return Err(console_api_error("GetConsoleMode"));
        }

        let cancel_event = Arc::new(CancelEvent::new()?);

        if unsafe { SetConsoleMode(input_handle, raw_console_input_mode(original_mode)) } == 0
        {
            return Err(console_api_error("SetConsoleMode"));
        }

        Ok(ConsoleSession {
            input_handle,
            original_mode,
            cancel_event,
            queue,
        })
    }
}

impl ConsoleSession {
    /// Read what's available and push it. `Err(QueueClosed)` means the UI side is gone.
    fn read_records(&self) -> Result<(), AdapterError> {
        let mut records: [INPUT_RECORD; INPUT_RECORD_BATCH_SIZE] =
            unsafe { std::mem::zeroed() };
        let mut read_count: u32 = 0;
        let ok = unsafe {
            ReadConsoleInputW(
                self.input_handle,
                records.as_mut_ptr(),
                INPUT_RECORD_BATCH_SIZE as u32,
                &raw mut read_count,
            )
        };
        if ok == 0 {
            return Err(console_api_error("ReadConsoleInputW"));
        }

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "console input: read records", count = read_count);
        });

        for record in &records[..read_count as usize] {
            if let Some(unit) = convert_input_record(record) {
                self.queue.push(unit)?;
            }
        }
        Ok(())
    }
}

fn convert_input_record(record: &INPUT_RECORD) -> Option<RawInputUnit> {
    match u32::from(record.EventType) {
        KEY_EVENT => {
            // SAFETY: `EventType` says which union field is initialized.
            let key = unsafe { record.Event.KeyEvent };
            Some(RawInputUnit::ConsoleKey(ConsoleKeyRecord {
                key_down: key.bKeyDown != 0,
                repeat_count: key.wRepeatCount,
                virtual_key_code: key.wVirtualKeyCode,
                virtual_scan_code: key.wVirtualScanCode,
                unicode_char: unsafe { key.uChar.UnicodeChar },
                control_key_state: key.dwControlKeyState,
            }))
        }
        MOUSE_EVENT => {
            let mouse = unsafe { record.Event.MouseEvent };
            let coord = mouse.dwMousePosition;
            Some(RawInputUnit::ConsoleMouse(ConsoleMouseRecord {
                position: Point::new(
                    u16::try_from(coord.Y).unwrap_or(0),
                    u16::try_from(coord.X).unwrap_or(0),
                ),
                button_state: mouse.dwButtonState,
                control_key_state: mouse.dwControlKeyState,
                event_flags: mouse.dwEventFlags,
            }))
        }
        // The record carries the buffer size, not the visible window; ask for the
        // window instead.
        WINDOW_BUFFER_SIZE_EVENT => match crossterm::terminal::size() {
            Ok((cols, rows)) => Some(RawInputUnit::WindowResized(Size::new(rows, cols))),
            Err(error) => {
                tracing::warn!(message = "console input: size query failed", error = %error);
                None
            }
        },
        // Focus and menu records.
        _ => None,
    }
}

impl InputAdapter for WindowsConsoleInputAdapter {
    fn name(&self) -> &'static str { "windows-console" }

    fn initialize(&mut self, queue: HandoffSender) -> miette::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        self.session = Some(Self::open_session(queue)?);
        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "windows console input adapter initialized");
        });
        Ok(())
    }

    fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()> {
        let timeout_ms = u32::try_from(self.poll_timeout.as_millis()).unwrap_or(u32::MAX);
        let session = self.session.as_ref().ok_or(AdapterError::NotInitialized)?;

        let event = session.cancel_event.clone();
        cancel.register_waker(move || event.set());

        let handles = [session.input_handle, session.cancel_event.0];
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let wait = unsafe {
                WaitForMultipleObjects(handles.len() as u32, handles.as_ptr(), 0, timeout_ms)
            };
            match wait {
                WAIT_TIMEOUT => {}
                WAIT_FAILED => return Err(console_api_error("WaitForMultipleObjects").into()),
                it if it == WAIT_OBJECT_0 => match session.read_records() {
                    Ok(()) => {}
                    Err(AdapterError::QueueClosed) => return Ok(()),
                    Err(error) => return Err(error.into()),
                },
                // The cancel event; checked at the top of the loop.
                _ => {}
            }
        }
    }

    fn dispose(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        if unsafe { SetConsoleMode(session.input_handle, session.original_mode) } == 0 {
            tracing::error!(
                message = "console input: restore console mode failed",
                error = %console_api_error("SetConsoleMode")
            );
        }
        if unsafe { FlushConsoleInputBuffer(session.input_handle) } == 0 {
            tracing::warn!(
                message = "console input: flush input buffer failed",
                error = %console_api_error("FlushConsoleInputBuffer")
            );
        }

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "windows console input adapter disposed");
        });
    }
}

impl Drop for WindowsConsoleInputAdapter {
    fn drop(&mut self) { self.dispose(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_console_input_mode() {
        let cooked = ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT;
        let raw = raw_console_input_mode(cooked | ENABLE_QUICK_EDIT_MODE);
        assert_eq!(raw & cooked, 0);
        assert_eq!(raw & ENABLE_QUICK_EDIT_MODE, 0);
        assert_ne!(raw & ENABLE_MOUSE_INPUT, 0);
        assert_ne!(raw & ENABLE_WINDOW_INPUT, 0);
    }

    #[test]
    fn test_run_before_initialize_fails() {
        let mut adapter = WindowsConsoleInputAdapter::new(Duration::from_millis(10));
        assert!(adapter.run(&CancellationSignal::new()).is_err());
    }
}
