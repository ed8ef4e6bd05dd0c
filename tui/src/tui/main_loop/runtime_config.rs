// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{BackendKind, ColorSupport, DEFAULT_RELEASE_DEADLINE, MouseTrackingMode, Size,
            Stream, examine_env_vars_to_determine_color_support};
use std::time::Duration;

#[rustfmt::skip]
pub mod runtime_config_defaults {
    use super::{Duration, Size};

    pub const TICK_INTERVAL: Duration =          Duration::from_millis(16);
    pub const INPUT_POLL_TIMEOUT: Duration =     Duration::from_millis(50);
    pub const RESIZE_POLL_INTERVAL: Duration =   Duration::from_millis(500);
    pub const REQUEST_THROTTLE: Duration =       Duration::from_millis(100);
    pub const REQUEST_STALE_TIMEOUT: Duration =  Duration::from_secs(1);
    pub const REQUEST_MAX_RETRIES: u32 =         2;
    pub const HEADLESS_WINDOW_SIZE: Size =       Size::new(24, 80);
}

/// Knobs for the runtime. Start from [`Default`] and override with the `with_*`
/// methods, eg:
///
/// ```
/// use r3bl_term_runtime::{BackendKind, RuntimeConfig};
/// use std::time::Duration;
///
/// let config = RuntimeConfig::default()
///     .with_backend(BackendKind::Headless)
///     .with_release_deadline(Duration::from_millis(25));
/// assert_eq!(config.backend, BackendKind::Headless);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub backend: BackendKind,
    /// How long a lone ESC waits for the rest of a sequence.
    pub release_deadline: Duration,
    /// Upper bound on how long [`MainLoopCoordinator::run_until`] sleeps between
    /// iterations.
    ///
    /// [`MainLoopCoordinator::run_until`]: crate::MainLoopCoordinator::run_until
    pub tick_interval: Duration,
    /// Backstop timeout for the input thread's blocking wait.
    pub input_poll_timeout: Duration,
    /// Portable backend only: how often the window size is re-queried.
    pub resize_poll_interval: Duration,
    /// Minimum gap between two requests that expect the same reply terminator.
    pub request_throttle: Duration,
    /// A request with no reply after this long is retried or abandoned.
    pub request_stale_timeout: Duration,
    pub request_max_retries: u32,
    /// `None` means detect from the environment.
    pub color_support: Option<ColorSupport>,
    pub mouse_tracking: MouseTrackingMode,
    pub alternate_screen: bool,
    /// Window size reported by the headless output adapter.
    pub headless_window_size: Size,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        use runtime_config_defaults::{HEADLESS_WINDOW_SIZE, INPUT_POLL_TIMEOUT,
                                      REQUEST_MAX_RETRIES, REQUEST_STALE_TIMEOUT,
                                      REQUEST_THROTTLE, RESIZE_POLL_INTERVAL,
                                      TICK_INTERVAL};
        Self {
            backend: BackendKind::Auto,
            release_deadline: DEFAULT_RELEASE_DEADLINE,
            tick_interval: TICK_INTERVAL,
            input_poll_timeout: INPUT_POLL_TIMEOUT,
            resize_poll_interval: RESIZE_POLL_INTERVAL,
            request_throttle: REQUEST_THROTTLE,
            request_stale_timeout: REQUEST_STALE_TIMEOUT,
            request_max_retries: REQUEST_MAX_RETRIES,
            color_support: None,
            mouse_tracking: MouseTrackingMode::default(),
            alternate_screen: true,
            headless_window_size: HEADLESS_WINDOW_SIZE,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_release_deadline(mut self, deadline: Duration) -> Self {
        self.release_deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub fn with_input_poll_timeout(mut self, timeout: Duration) -> Self {
        self.input_poll_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_resize_poll_interval(mut self, interval: Duration) -> Self {
        self.resize_poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_request_throttle(mut self, throttle: Duration) -> Self {
        self.request_throttle = throttle;
        self
    }

    #[must_use]
    pub fn with_request_stale_timeout(mut self, timeout: Duration) -> Self {
        self.request_stale_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_max_retries(mut self, retries: u32) -> Self {
        self.request_max_retries = retries;
        self
    }

    #[must_use]
    pub fn with_color_support(mut self, color_support: ColorSupport) -> Self {
        self.color_support = Some(color_support);
        self
    }

    #[must_use]
    pub fn with_mouse_tracking(mut self, mode: MouseTrackingMode) -> Self {
        self.mouse_tracking = mode;
        self
    }

    #[must_use]
    pub fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }

    #[must_use]
    pub fn with_headless_window_size(mut self, size: Size) -> Self {
        self.headless_window_size = size;
        self
    }

    /// The configured color support, or what the environment says stdout supports.
    #[must_use]
    pub fn resolve_color_support(&self) -> ColorSupport {
        self.color_support
            .unwrap_or_else(|| examine_env_vars_to_determine_color_support(Stream::Stdout))
    }
}
