// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Backend selection: which [`InputAdapter`] and [`OutputAdapter`] the runtime uses.
//!
//! | Backend          | Input adapter                  | Output adapter, window size   | Modes owned by |
//! | :--------------- | :----------------------------- | :---------------------------- | :------------- |
//! | `Posix`          | [`PosixInputAdapter`]          | ANSI to stdout, `tcgetwinsize`| input adapter  |
//! | `WindowsConsole` | [`WindowsConsoleInputAdapter`] | ANSI to stdout, crossterm     | output adapter |
//! | `Portable`       | [`PortableStreamInputAdapter`] | ANSI to stdout, crossterm     | output adapter |
//! | `Headless`       | [`NoOpInputAdapter`]           | ANSI to an in-memory buffer   | nobody         |
//!
//! On POSIX the input adapter owns the terminal modes (alternate screen, mouse
//! reporting) because leaving them is interleaved with restoring termios.
//!
//! [`InputAdapter`]: crate::InputAdapter
//! [`OutputAdapter`]: crate::OutputAdapter
//! [`PosixInputAdapter`]: crate::PosixInputAdapter
//! [`WindowsConsoleInputAdapter`]: crate::WindowsConsoleInputAdapter
//! [`PortableStreamInputAdapter`]: crate::PortableStreamInputAdapter
//! [`NoOpInputAdapter`]: crate::NoOpInputAdapter

use crate::{AnsiOutputAdapter, BoxedOutputAdapter, DEBUG_TUI_SHOW_TERMINAL_BACKEND,
            InputAdapter, InputAdapterFactory, NoOpInputAdapter, OutputDevice,
            PortableStreamInputAdapter, RuntimeConfig, StdoutMock, TerminalModes,
            WindowSizeSource};
use std::io::IsTerminal as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum,
         strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    /// The native backend for this OS, or `Headless` without an interactive terminal.
    #[default]
    Auto,
    Posix,
    WindowsConsole,
    Portable,
    Headless,
}

/// The native backend for this OS.
#[cfg(unix)]
pub const NATIVE_BACKEND: BackendKind = BackendKind::Posix;

/// The native backend for this OS.
#[cfg(windows)]
pub const NATIVE_BACKEND: BackendKind = BackendKind::WindowsConsole;

/// The native backend for this OS.
#[cfg(not(any(unix, windows)))]
pub const NATIVE_BACKEND: BackendKind = BackendKind::Portable;

impl BackendKind {
    /// A concrete backend (never `Auto`) that can run on this OS. A native backend
    /// requested on the wrong OS falls back to `Portable`.
    #[must_use]
    pub fn resolve(self) -> BackendKind {
        let is_interactive = !is_ci::uncached() && std::io::stdin().is_terminal();
        self.resolve_with(is_interactive)
    }

    /// [`Self::resolve`] with the environment check passed in.
    #[must_use]
    pub fn resolve_with(self, is_interactive: bool) -> BackendKind {
        let resolved = match self {
            BackendKind::Auto if !is_interactive => BackendKind::Headless,
            BackendKind::Auto => NATIVE_BACKEND,
            BackendKind::Posix if cfg!(not(unix)) => BackendKind::Portable,
            BackendKind::WindowsConsole if cfg!(not(windows)) => BackendKind::Portable,
            it => it,
        };
        if resolved != self && self != BackendKind::Auto {
            tracing::warn!(
                message = "backend not available on this OS, using fallback",
                requested = %self,
                resolved = %resolved
            );
        }
        resolved
    }
}

/// What [`select_backend`] picked.
pub struct SelectedBackend {
    pub kind: BackendKind,
    pub input_factory: InputAdapterFactory,
    pub output_adapter: BoxedOutputAdapter,
    /// What the headless output adapter wrote.
    pub headless_output: Option<StdoutMock>,
}

impl std::fmt::Debug for SelectedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedBackend")
            .field("kind", &self.kind)
            .field("output_adapter", &self.output_adapter)
            .finish_non_exhaustive()
    }
}

/// Resolve `config.backend` and build both sides for it, writing to stdout.
#[must_use]
pub fn select_backend(config: &RuntimeConfig) -> SelectedBackend {
    let kind = config.backend.resolve();
    let (device, headless_output) = match kind {
        BackendKind::Headless => {
            let (device, mock) = OutputDevice::new_mock();
            (device, Some(mock))
        }
        _ => (OutputDevice::new_stdout(), None),
    };

    DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
        tracing::debug!(message = "backend selected", requested = %config.backend, kind = %kind);
    });

    SelectedBackend {
        kind,
        input_factory: create_input_adapter_factory(kind, config, device.clone()),
        output_adapter: create_output_adapter(kind, config, device),
        headless_output,
    }
}

/// The factory is sent to the input thread and builds the adapter there. `device` is
/// where the POSIX adapter writes its mode sequences.
#[must_use]
#[cfg_attr(not(unix), allow(unused_variables))]
pub fn create_input_adapter_factory(
    kind: BackendKind,
    config: &RuntimeConfig,
    device: OutputDevice,
) -> InputAdapterFactory {
    let poll_timeout = config.input_poll_timeout;
    let resize_poll_interval = config.resize_poll_interval;
    let modes = TerminalModes::from(config);

    Box::new(move || -> miette::Result<Box<dyn InputAdapter>> {
        Ok(match kind.resolve_with(true) {
            #[cfg(unix)]
            BackendKind::Posix => Box::new(crate::PosixInputAdapter::new(
                poll_timeout,
                modes,
                device,
            )),
            #[cfg(windows)]
            BackendKind::WindowsConsole => {
                Box::new(crate::WindowsConsoleInputAdapter::new(poll_timeout))
            }
            BackendKind::Headless => Box::new(NoOpInputAdapter::default()),
            _ => Box::new(PortableStreamInputAdapter::new(resize_poll_interval)),
        })
    })
}

#[must_use]
pub fn create_output_adapter(
    kind: BackendKind,
    config: &RuntimeConfig,
    device: OutputDevice,
) -> BoxedOutputAdapter {
    let color_support = config.resolve_color_support();
    let modes = TerminalModes::from(config);

    let adapter = match kind.resolve_with(true) {
        #[cfg(unix)]
        BackendKind::Posix => {
            AnsiOutputAdapter::new(device, color_support, WindowSizeSource::Termios, None)
        }
        BackendKind::Headless => AnsiOutputAdapter::new(
            device,
            color_support,
            WindowSizeSource::Fixed(config.headless_window_size),
            None,
        ),
        _ => {
            // Windows consoles interpret VT sequences only once asked to.
            #[cfg(windows)]
            if !crossterm::ansi_support::supports_ansi() {
                tracing::warn!(message = "console does not support VT sequences");
            }
            AnsiOutputAdapter::new(
                device,
                color_support,
                WindowSizeSource::Crossterm,
                Some(modes),
            )
        }
    };
    Box::new(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Size, new_handoff_queue};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(true, NATIVE_BACKEND ; "interactive picks native")]
    #[test_case(false, BackendKind::Headless ; "non interactive picks headless")]
    fn test_auto_resolution(is_interactive: bool, expected: BackendKind) {
        assert_eq!(BackendKind::Auto.resolve_with(is_interactive), expected);
    }

    #[test]
    fn test_explicit_backends_resolve_to_themselves_or_portable() {
        assert_eq!(
            BackendKind::Headless.resolve_with(false),
            BackendKind::Headless
        );
        assert_eq!(
            BackendKind::Portable.resolve_with(true),
            BackendKind::Portable
        );
        let foreign = if cfg!(unix) {
            BackendKind::WindowsConsole
        } else {
            BackendKind::Posix
        };
        assert_eq!(foreign.resolve_with(true), BackendKind::Portable);
    }

    #[test]
    fn test_display_is_kebab_case() {
        assert_eq!(BackendKind::WindowsConsole.to_string(), "windows-console");
    }

    #[test]
    fn test_headless_factory_builds_no_op_adapter() {
        let config = RuntimeConfig::default();
        let (device, _mock) = OutputDevice::new_mock();
        let factory = create_input_adapter_factory(BackendKind::Headless, &config, device);
        let mut adapter = factory().unwrap();
        assert_eq!(adapter.name(), "no_op");
        let (tx, _rx) = new_handoff_queue();
        adapter.initialize(tx).unwrap();
        adapter.dispose();
    }

    #[test]
    fn test_headless_output_reports_configured_size() {
        let config =
            RuntimeConfig::default().with_headless_window_size(Size::new(10, 40));
        let (device, _mock) = OutputDevice::new_mock();
        let mut output = create_output_adapter(BackendKind::Headless, &config, device);
        assert_eq!(output.initialize().unwrap(), Size::new(10, 40));
        output.dispose();
    }
}
