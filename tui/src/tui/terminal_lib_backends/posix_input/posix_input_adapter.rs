// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`InputAdapter`] for Unix terminals.
//!
//! # Lifecycle
//!
//! | Step         | What happens                                                        |
//! | :----------- | :------------------------------------------------------------------ |
//! | `initialize` | raw mode, `mio::Poll` + waker, register tty + `SIGWINCH`, modes on  |
//! | `run`        | poll (with a backstop timeout), read, decode UTF-8, push            |
//! | `dispose`    | mouse off, restore termios, flush unread input, leave alt screen    |
//!
//! The dispose order matters: termios is restored before anything else can fail, and
//! input that arrived after the last read (eg: a mouse report in flight) is discarded
//! instead of being typed into the user's shell.
//!
//! # Cancellation
//!
//! [`CancellationSignal::cancel`] wakes the `mio::Waker`, so `poll` returns right away.
//! The poll timeout is only a backstop.

use super::SourceKindReady;
use crate::{AdapterError, CancellationSignal, DEBUG_TUI_SHOW_TERMINAL_BACKEND,
            HandoffSender, InputAdapter, OutputDevice, RawInputUnit, SavedTermios,
            TerminalModes, ThreadLoopContinuation, Utf8Decoder};
use mio::{Events, Interest, Poll, Waker, unix::SourceFd};
use signal_hook::consts::SIGWINCH;
use signal_hook_mio::v1_0::Signals;
use std::{fmt::{Debug, Formatter},
          io::ErrorKind,
          os::fd::AsRawFd as _,
          sync::Arc,
          time::Duration};

pub const TERMINAL_READ_BUFFER_SIZE: usize = 1_024;
const EVENTS_CAPACITY: usize = 8;

#[derive(Debug)]
pub struct PosixInputAdapter {
    poll_timeout: Duration,
    modes: TerminalModes,
    /// Where the mode switching sequences are written.
    mode_device: OutputDevice,
    session: Option<PosixSession>,
}

/// Resources held between `initialize` and `dispose`.
struct PosixSession {
    termios: SavedTermios,
    poll: Poll,
    events: Events,
    signals: Signals,
    waker: Arc<Waker>,
    queue: HandoffSender,
    utf8: Utf8Decoder,
    read_buffer: [u8; TERMINAL_READ_BUFFER_SIZE],
    decoded: Vec<char>,
}

impl Debug for PosixSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosixSession")
            .field("termios", &self.termios)
            .field("utf8", &self.utf8)
            .finish_non_exhaustive()
    }
}

impl PosixInputAdapter {
    #[must_use]
    pub fn new(poll_timeout: Duration, modes: TerminalModes, mode_device: OutputDevice) -> Self {
        Self {
            poll_timeout,
            modes,
            mode_device,
            session: None,
        }
    }

    fn write_modes(&self, sequence: &str) {
        if sequence.is_empty() {
            return;
        }
        if let Err(error) = self.mode_device.write_and_flush(sequence.as_bytes()) {
            tracing::warn!(message = "failed to write terminal mode sequence", error = %error);
        }
    }

    fn open_session(queue: HandoffSender) -> miette::Result<PosixSession> {
        // Dropping `termios` on any later error restores the terminal.
        let termios = SavedTermios::enable_raw_mode()?;

        let poll = Poll::new().map_err(AdapterError::PollCreation)?;
        let waker = Waker::new(poll.registry(), SourceKindReady::CancelWaker.to_token())
            .map_err(AdapterError::WakerCreation)?;

        poll.registry()
            .register(
                &mut SourceFd(&termios.fd().as_raw_fd()),
                SourceKindReady::TerminalInput.to_token(),
                Interest::READABLE,
            )
            .map_err(AdapterError::InputRegistration)?;

        let mut signals = Signals::new([SIGWINCH]).map_err(AdapterError::SignalCreation)?;
        poll.registry()
            .register(
                &mut signals,
                SourceKindReady::Signals.to_token(),
                Interest::READABLE,
            )
            .map_err(AdapterError::SignalRegistration)?;

        Ok(PosixSession {
            termios,
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            signals,
            waker: Arc::new(waker),
            queue,
            utf8: Utf8Decoder::default(),
            read_buffer: [0; TERMINAL_READ_BUFFER_SIZE],
            decoded: Vec::with_capacity(TERMINAL_READ_BUFFER_SIZE),
        })
    }
}

impl PosixSession {
    fn consume_terminal_input(&mut self) -> miette::Result<ThreadLoopContinuation> {
        match self.termios.fd().read(&mut self.read_buffer) {
            Ok(0) => Err(AdapterError::Eof.into()),
            Ok(n) => {
                DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
                    tracing::debug!(message = "posix input: read bytes", bytes_read = n);
                });
                let pushed = self.queue.push_utf8(
                    &mut self.utf8,
                    &self.read_buffer[..n],
                    &mut self.decoded,
                );
                Ok(match pushed {
                    Ok(()) => ThreadLoopContinuation::Continue,
                    Err(_) => {
                        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
                            tracing::debug!(message = "posix input: receiver dropped");
                        });
                        ThreadLoopContinuation::Return
                    }
                })
            }
            Err(ref e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                Ok(ThreadLoopContinuation::Continue)
            }
            Err(e) => Err(AdapterError::Read(e).into()),
        }
    }

    fn consume_pending_signals(&mut self) -> ThreadLoopContinuation {
        let sigwinch_arrived = self.signals.pending().any(|sig| sig == SIGWINCH);
        if !sigwinch_arrived {
            return ThreadLoopContinuation::Continue;
        }

        let size = match self.termios.window_size() {
            Ok(size) => size,
            Err(error) => {
                DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
                    tracing::debug!(
                        message = "posix input: SIGWINCH received but size query failed",
                        error = %error
                    );
                });
                return ThreadLoopContinuation::Continue;
            }
        };

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "posix input: SIGWINCH received", size = %size);
        });
        match self.queue.push(RawInputUnit::WindowResized(size)) {
            Ok(()) => ThreadLoopContinuation::Continue,
            Err(_) => ThreadLoopContinuation::Return,
        }
    }
}

impl InputAdapter for PosixInputAdapter {
    fn name(&self) -> &'static str { "posix" }

    fn initialize(&mut self, queue: HandoffSender) -> miette::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        self.session = Some(Self::open_session(queue)?);
        self.write_modes(&self.modes.enter_sequence());

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "posix input adapter initialized", modes = ?self.modes);
        });
        Ok(())
    }

    fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()> {
        let poll_timeout = self.poll_timeout;
        let session = self.session.as_mut().ok_or(AdapterError::NotInitialized)?;

        let waker = session.waker.clone();
        cancel.register_waker(move || {
            let _unused = waker.wake();
        });

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            if let Err(err) = session.poll.poll(&mut session.events, Some(poll_timeout)) {
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                return Err(AdapterError::Poll(err).into());
            }

            let ready: Vec<SourceKindReady> = session
                .events
                .iter()
                .map(|event| SourceKindReady::from_token(event.token()))
                .collect();

            for source in ready {
                let continuation = match source {
                    SourceKindReady::TerminalInput => session.consume_terminal_input()?,
                    SourceKindReady::Signals => session.consume_pending_signals(),
                    SourceKindReady::CancelWaker => ThreadLoopContinuation::Continue,
                    SourceKindReady::Unknown => {
                        tracing::warn!(message = "posix input: event for unknown token");
                        ThreadLoopContinuation::Continue
                    }
                };
                if continuation == ThreadLoopContinuation::Return {
                    return Ok(());
                }
            }
        }
    }

    fn dispose(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        self.write_modes(&self.modes.disable_mouse_sequence());
        if let Err(error) = session.termios.restore() {
            tracing::error!(message = "posix input: restore termios failed", error = %error);
        }
        if let Err(error) = session.termios.flush_unread_input() {
            tracing::warn!(message = "posix input: flush unread input failed", error = %error);
        }
        self.write_modes(&self.modes.leave_screen_sequence());

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "posix input adapter disposed");
        });
    }
}
