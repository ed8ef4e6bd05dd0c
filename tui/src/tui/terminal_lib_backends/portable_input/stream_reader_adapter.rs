// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`InputAdapter`] that works wherever `std::io::stdin()` does.
//!
//! ```text
//! ┌───────────────────────────┐  StreamChunk   ┌──────────────────────────────────┐
//! │ "stream-reader" thread    ├───────────────▶│ run() on the input thread         │
//! │ (detached, blocking read) │  std mpsc      │   decode UTF-8, push chars       │
//! └───────────────────────────┘                │   poll window size every N ms    │
//!                         cancel() ── Wake ───▶│   return on cancel               │
//!                                              └──────────────────────────────────┘
//! ```
//!
//! A blocking read can't be interrupted portably, so the reader thread is detached and
//! never joined. It exits on EOF, on a read error, or on its next read after the adapter
//! is gone. `run` itself blocks on the channel, and cancellation sends a wake message
//! into the same channel, so it returns right away.
//!
//! There is no resize notification on this path. The window size is polled instead.

use crate::{AdapterError, CancellationSignal, DEBUG_TUI_SHOW_TERMINAL_BACKEND,
            HandoffSender, InputAdapter, RawInputUnit, RawModeGuard, Size, Utf8Decoder,
            WindowSizeSource};
use std::{io::{ErrorKind, IsTerminal as _, Read},
          sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
          time::{Duration, Instant}};

pub const STREAM_READ_BUFFER_SIZE: usize = 1_024;

/// What the reader thread sends to `run`.
#[derive(Debug)]
pub enum StreamChunk {
    Data(Vec<u8>),
    Eof,
    Error(std::io::Error),
    /// Sent by the cancellation waker; carries no data.
    Wake,
}

/// Where the adapter reads from.
pub type BoxedStreamSource = Box<dyn Read + Send>;

/// Spawn the detached reader thread. It owns `source` until it exits.
///
/// # Errors
///
/// Returns an error if the OS can't spawn a thread.
pub fn spawn_stream_reader_thread(
    mut source: BoxedStreamSource,
    tx: Sender<StreamChunk>,
) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("stream-reader".into())
        .spawn(move || {
            let mut buffer = [0u8; STREAM_READ_BUFFER_SIZE];
            loop {
                let chunk = match source.read(&mut buffer) {
                    Ok(0) => StreamChunk::Eof,
                    Ok(n) => StreamChunk::Data(buffer[..n].to_vec()),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => StreamChunk::Error(e),
                };
                let is_last = !matches!(chunk, StreamChunk::Data(_));
                if tx.send(chunk).is_err() || is_last {
                    DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
                        tracing::debug!(message = "stream-reader thread: exiting");
                    });
                    break;
                }
            }
        })
        .map(drop)
}

pub struct PortableStreamInputAdapter {
    resize_poll_interval: Duration,
    size_source: WindowSizeSource,
    /// Taken by `initialize`.
    source: Option<BoxedStreamSource>,
    /// Enable raw mode on `initialize`. Only when reading an interactive stdin.
    wants_raw_mode: bool,
    session: Option<StreamSession>,
}

struct StreamSession {
    queue: HandoffSender,
    chunk_tx: Sender<StreamChunk>,
    chunk_rx: Receiver<StreamChunk>,
    raw_mode: Option<RawModeGuard>,
    utf8: Utf8Decoder,
    decoded: Vec<char>,
    last_size: Option<Size>,
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("raw_mode", &self.raw_mode)
            .field("last_size", &self.last_size)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for PortableStreamInputAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortableStreamInputAdapter")
            .field("resize_poll_interval", &self.resize_poll_interval)
            .field("size_source", &self.size_source)
            .field("wants_raw_mode", &self.wants_raw_mode)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl PortableStreamInputAdapter {
    /// Read from stdin; raw mode is enabled if stdin is a terminal.
    #[must_use]
    pub fn new(resize_poll_interval: Duration) -> Self {
        Self {
            resize_poll_interval,
            size_source: WindowSizeSource::Crossterm,
            source: Some(Box::new(std::io::stdin())),
            wants_raw_mode: std::io::stdin().is_terminal(),
            session: None,
        }
    }

    /// Read from any stream, never touching terminal modes.
    #[must_use]
    pub fn with_source(
        resize_poll_interval: Duration,
        source: BoxedStreamSource,
        size_source: WindowSizeSource,
    ) -> Self {
        Self {
            resize_poll_interval,
            size_source,
            source: Some(source),
            wants_raw_mode: false,
            session: None,
        }
    }
}

impl StreamSession {
    /// Push a `WindowResized` if the size changed since the last check.
    fn check_window_size(&mut self, size_source: &WindowSizeSource) -> Result<(), AdapterError> {
        let size = match size_source.query() {
            Ok(size) => size,
            Err(error) => {
                DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
                    tracing::debug!(message = "stream input: size query failed", error = %error);
                });
                return Ok(());
            }
        };
        // The first query is the baseline, not a change.
        match self.last_size.replace(size) {
            Some(previous) if previous != size => {
                self.queue.push(RawInputUnit::WindowResized(size))
            }
            _ => Ok(()),
        }
    }
}

impl InputAdapter for PortableStreamInputAdapter {
    fn name(&self) -> &'static str { "portable" }

    fn initialize(&mut self, queue: HandoffSender) -> miette::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let source = self.source.take().ok_or(AdapterError::NotInitialized)?;
        let raw_mode = if self.wants_raw_mode {
            Some(RawModeGuard::new()?)
        } else {
            None
        };

        let (chunk_tx, chunk_rx) = mpsc::channel();
        spawn_stream_reader_thread(source, chunk_tx.clone()).map_err(AdapterError::Read)?;

        self.session = Some(StreamSession {
            queue,
            chunk_tx,
            chunk_rx,
            raw_mode,
            utf8: Utf8Decoder::default(),
            decoded: Vec::with_capacity(STREAM_READ_BUFFER_SIZE),
            last_size: None,
        });

        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "portable input adapter initialized", raw = self.wants_raw_mode);
        });
        Ok(())
    }

    fn run(&mut self, cancel: &CancellationSignal) -> miette::Result<()> {
        let interval = self.resize_poll_interval;
        let size_source = self.size_source.clone();
        let session = self.session.as_mut().ok_or(AdapterError::NotInitialized)?;

        let wake_tx = session.chunk_tx.clone();
        cancel.register_waker(move || drop(wake_tx.send(StreamChunk::Wake)));

        let mut next_size_check = Instant::now();
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let now = Instant::now();
            if now >= next_size_check {
                if session.check_window_size(&size_source).is_err() {
                    return Ok(());
                }
                next_size_check = now + interval;
            }

            let wait = next_size_check.saturating_duration_since(Instant::now());
            let chunk = match session.chunk_rx.recv_timeout(wait) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => continue,
                // Unreachable while `session.chunk_tx` is alive.
                Err(RecvTimeoutError::Disconnected) => StreamChunk::Eof,
            };

            match chunk {
                StreamChunk::Data(bytes) => {
                    let pushed =
                        session
                            .queue
                            .push_utf8(&mut session.utf8, &bytes, &mut session.decoded);
                    if pushed.is_err() {
                        return Ok(());
                    }
                }
                StreamChunk::Eof => return Err(AdapterError::Eof.into()),
                StreamChunk::Error(e) => return Err(AdapterError::Read(e).into()),
                StreamChunk::Wake => {}
            }
        }
    }

    fn dispose(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(mut guard) = session.raw_mode.take()
            && let Err(error) = guard.restore()
        {
            tracing::error!(message = "stream input: restore raw mode failed", error = %error);
        }
        DEBUG_TUI_SHOW_TERMINAL_BACKEND.then(|| {
            tracing::debug!(message = "portable input adapter disposed");
        });
    }
}
