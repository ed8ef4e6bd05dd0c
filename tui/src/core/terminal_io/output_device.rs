// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{SafeRawTerminal, SendRawTerminal, StdMutex};
use std::{fmt::{Debug, Formatter},
          io::Write,
          sync::{Arc, MutexGuard, PoisonError}};

pub type LockedOutputDevice<'a> = &'a mut dyn Write;

/// Lock the device and get a `&mut dyn Write` to it, eg:
///
/// ```
/// use r3bl_term_runtime::{OutputDevice, lock_output_device_as_mut};
///
/// let (device, mock) = OutputDevice::new_mock();
/// lock_output_device_as_mut!(device).write_all(b"hi").unwrap();
/// assert_eq!(mock.get_copy_of_buffer_as_string(), "hi");
/// ```
#[macro_export]
macro_rules! lock_output_device_as_mut {
    ($device:expr) => {
        &mut *$device.lock()
    };
}

/// Where rendered bytes go. Cheap to clone; clones share the same writer.
#[derive(Clone)]
pub struct OutputDevice {
    pub resource: SafeRawTerminal,
    pub is_mock: bool,
}

impl Debug for OutputDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDevice")
            .field("is_mock", &self.is_mock)
            .finish_non_exhaustive()
    }
}

impl Default for OutputDevice {
    fn default() -> Self { Self::new_stdout() }
}

impl OutputDevice {
    #[must_use]
    pub fn new_stdout() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stdout())),
            is_mock: false,
        }
    }

    #[must_use]
    pub fn new_stderr() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stderr())),
            is_mock: false,
        }
    }

    /// A device that captures everything written to it. The returned [`StdoutMock`]
    /// shares the buffer.
    #[must_use]
    pub fn new_mock() -> (Self, StdoutMock) {
        let mock = StdoutMock::default();
        let device = Self {
            resource: Arc::new(StdMutex::new(mock.clone())),
            is_mock: true,
        };
        (device, mock)
    }

    /// A writer only panics mid-write if the write itself panicked; the bytes are
    /// still usable, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, SendRawTerminal> {
        self.resource.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_and_flush(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut locked = self.lock();
        locked.write_all(bytes)?;
        locked.flush()
    }
}

/// You can safely clone this struct, since it only contains an `Arc<StdMutex<Vec<u8>>>`.
#[derive(Clone, Default)]
pub struct StdoutMock {
    pub buffer: Arc<StdMutex<Vec<u8>>>,
}

impl Debug for StdoutMock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdoutMock")
            .field("len", &self.lock_buffer().len())
            .finish()
    }
}

impl StdoutMock {
    fn lock_buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn get_copy_of_buffer(&self) -> Vec<u8> { self.lock_buffer().clone() }

    #[must_use]
    pub fn get_copy_of_buffer_as_string(&self) -> String {
        String::from_utf8_lossy(&self.lock_buffer()).into_owned()
    }

    /// Returns the captured text and empties the buffer.
    #[must_use]
    pub fn take_buffer_as_string(&self) -> String {
        let bytes = std::mem::take(&mut *self.lock_buffer());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for StdoutMock {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.lock_buffer().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stdout_output_device_is_not_mock() {
        let device = OutputDevice::new_stdout();
        assert!(!device.is_mock);
    }

    #[test]
    fn test_mock_captures_writes_from_clones() {
        let (device, mock) = OutputDevice::new_mock();
        let device_clone = device.clone();
        assert!(device.is_mock);

        device.write_and_flush(b"hello ").unwrap();
        let locked: LockedOutputDevice<'_> = lock_output_device_as_mut!(device_clone);
        locked.write_all(b"world").unwrap();

        assert_eq!(mock.get_copy_of_buffer_as_string(), "hello world");
        assert_eq!(mock.take_buffer_as_string(), "hello world");
        assert!(mock.get_copy_of_buffer().is_empty());
    }
}
