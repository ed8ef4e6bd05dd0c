// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

#[cfg(unix)]
use super::raw_mode_unix::SavedTermios;
#[cfg(windows)]
use super::raw_mode_windows;

/// RAII guard for raw mode. Restores the terminal when dropped, or earlier with
/// [`RawModeGuard::restore`].
///
/// Recommended way to use raw mode as it ensures terminal restoration even on panic.
#[derive(Debug)]
pub struct RawModeGuard {
    #[cfg(unix)]
    saved: SavedTermios,
    #[cfg(not(unix))]
    restored: bool,
}

impl RawModeGuard {
    /// Create a new guard and enable raw mode.
    ///
    /// # Errors
    ///
    /// Returns miette diagnostic errors if raw mode cannot be enabled (eg: there is no
    /// controlling terminal).
    pub fn new() -> miette::Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                saved: SavedTermios::enable_raw_mode()?,
            })
        }

        #[cfg(windows)]
        {
            raw_mode_windows::enable_raw_mode()?;
            Ok(Self { restored: false })
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(miette::miette!("Platform not supported"))
        }
    }

    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be restored.
    pub fn restore(&mut self) -> miette::Result<()> {
        #[cfg(unix)]
        {
            self.saved.restore()
        }

        #[cfg(not(unix))]
        {
            if self.restored {
                return Ok(());
            }
            self.restored = true;
            #[cfg(windows)]
            {
                raw_mode_windows::disable_raw_mode()
            }
            #[cfg(not(windows))]
            {
                Ok(())
            }
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) { drop(self.restore()); }
}
