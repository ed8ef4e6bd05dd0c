// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Lifecycle failures of the [`MainLoopCoordinator`].
///
/// [`MainLoopCoordinator`]: crate::MainLoopCoordinator
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CoordinatorError {
    #[error("Input thread exited before the driver facade was ready")]
    #[diagnostic(
        code(r3bl_term_runtime::coordinator::input_thread_exited),
        help("Check the log for the error returned by the input adapter")
    )]
    InputThreadExited,

    #[error("Input adapter failed to initialize: {message}")]
    #[diagnostic(
        code(r3bl_term_runtime::coordinator::input_adapter_init),
        help("Without an interactive terminal, try the headless backend")
    )]
    InputAdapterInit { message: String },

    #[error("Coordinator used from a thread other than the one that started it")]
    #[diagnostic(
        code(r3bl_term_runtime::coordinator::not_on_ui_thread),
        help("Iterations and shutdown must run on the UI thread")
    )]
    NotOnUiThread,

    #[error("Input thread panicked")]
    #[diagnostic(code(r3bl_term_runtime::coordinator::input_thread_panicked))]
    InputThreadPanicked,

    #[error("Coordinator is not running")]
    #[diagnostic(
        code(r3bl_term_runtime::coordinator::not_running),
        help("Call start() first, and don't use the coordinator after stop()")
    )]
    NotRunning,

    #[error("Coordinator was already started")]
    #[diagnostic(code(r3bl_term_runtime::coordinator::already_started))]
    AlreadyStarted,

    #[error("Failed to spawn the input thread")]
    #[diagnostic(code(r3bl_term_runtime::coordinator::thread_spawn))]
    ThreadSpawn(#[source] std::io::Error),
}
