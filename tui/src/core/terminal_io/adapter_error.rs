// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Failures of the platform adapters.
///
/// Setup variants are fatal: they surface from [`InputAdapter::initialize`] or
/// [`OutputAdapter::initialize`] and abort startup. Headless environments (CI, piped
/// I/O) should select [`BackendKind::Headless`] instead of the native backend.
///
/// [`InputAdapter::initialize`]: crate::InputAdapter::initialize
/// [`OutputAdapter::initialize`]: crate::OutputAdapter::initialize
/// [`BackendKind::Headless`]: crate::BackendKind::Headless
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AdapterError {
    #[error("Failed to create mio::Poll")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::poll_creation),
        help("This usually means the system ran out of file descriptors")
    )]
    PollCreation(#[source] std::io::Error),

    #[error("Failed to create mio::Waker")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::waker_creation),
        help("This usually means the system ran out of file descriptors")
    )]
    WakerCreation(#[source] std::io::Error),

    #[error("Failed to register the terminal input fd with mio")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::input_registration),
        help("Ensure stdin (or /dev/tty) is a valid file descriptor")
    )]
    InputRegistration(#[source] std::io::Error),

    #[error("Failed to create SIGWINCH handler")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::signal_creation),
        help("Signal handler creation failed - check system signal limits")
    )]
    SignalCreation(#[source] std::io::Error),

    #[error("Failed to register signals with mio")]
    #[diagnostic(code(r3bl_term_runtime::adapter::signal_registration))]
    SignalRegistration(#[source] std::io::Error),

    #[error("Polling for terminal input failed")]
    #[diagnostic(code(r3bl_term_runtime::adapter::poll))]
    Poll(#[source] std::io::Error),

    #[error("Reading terminal input failed")]
    #[diagnostic(code(r3bl_term_runtime::adapter::read))]
    Read(#[source] std::io::Error),

    #[error("Writing to the terminal failed")]
    #[diagnostic(code(r3bl_term_runtime::adapter::write))]
    Write(#[source] std::io::Error),

    #[error("Console handle unavailable ({which})")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::console_handle),
        help("The process has no console attached; use the portable or headless backend")
    )]
    ConsoleHandleUnavailable { which: &'static str },

    #[error("Console API call {call} failed")]
    #[diagnostic(code(r3bl_term_runtime::adapter::console_api))]
    ConsoleApi {
        call: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("The UI side of the handoff queue is gone")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::queue_closed),
        help("The coordinator was dropped without calling stop()")
    )]
    QueueClosed,

    #[error("Adapter used before initialize()")]
    #[diagnostic(code(r3bl_term_runtime::adapter::not_initialized))]
    NotInitialized,

    #[error("Terminal input reached end of file")]
    #[diagnostic(
        code(r3bl_term_runtime::adapter::eof),
        help("stdin was closed or is not an interactive terminal")
    )]
    Eof,
}
