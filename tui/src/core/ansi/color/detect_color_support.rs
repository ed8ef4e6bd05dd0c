// Copyright (c) 2023-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::env;

/// The stream to check for color support.
#[derive(Clone, Copy, Debug)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// The result of the color support check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    #[default]
    Truecolor,
    Ansi16,
    NoColor,
}

/// Determine whether color is supported heuristically, from the environment variables:
///
/// - `NO_COLOR` (any value except `0`) or `TERM=dumb` disables color.
/// - A stream that isn't a tty disables color, unless `IGNORE_IS_TERMINAL` is set.
/// - `COLORTERM=truecolor|24bit`, Windows, or a CI environment mean 24-bit color.
/// - Any other recognized `TERM`, or `CLICOLOR` set, means the 16 color palette.
///
/// This performs several env lookups. Call it once at startup (it is stored in
/// [`RuntimeConfig`](crate::RuntimeConfig)), not per frame.
#[must_use]
pub fn examine_env_vars_to_determine_color_support(stream: Stream) -> ColorSupport {
    if helpers::env_no_color()
        || env::var("TERM").is_ok_and(|v| v == "dumb")
        || !(helpers::is_a_tty(stream)
            || env::var("IGNORE_IS_TERMINAL").is_ok_and(|v| v != "0"))
    {
        return ColorSupport::NoColor;
    }

    if env::var("COLORTERM").is_ok_and(|v| v == "truecolor" || v == "24bit")
        || env::var("TERM_PROGRAM").is_ok_and(|v| v == "iTerm.app")
        || env::consts::OS == "windows"
        || is_ci::uncached()
    {
        return ColorSupport::Truecolor;
    }

    if env::var("COLORTERM").is_ok()
        || env::var("TERM").is_ok_and(|term| helpers::check_ansi_color(&term))
        || env::var("CLICOLOR").is_ok_and(|v| v != "0")
    {
        return ColorSupport::Ansi16;
    }

    ColorSupport::NoColor
}

mod helpers {
    use super::{Stream, env};

    #[must_use]
    pub fn is_a_tty(stream: Stream) -> bool {
        use std::io::IsTerminal;
        match stream {
            Stream::Stdout => std::io::stdout().is_terminal(),
            Stream::Stderr => std::io::stderr().is_terminal(),
        }
    }

    #[must_use]
    pub fn check_ansi_color(term: &str) -> bool {
        term.starts_with("screen")
            || term.starts_with("tmux")
            || term.starts_with("xterm")
            || term.starts_with("vt100")
            || term.starts_with("vt220")
            || term.starts_with("rxvt")
            || term.contains("color")
            || term.contains("ansi")
            || term.contains("cygwin")
            || term.contains("linux")
    }

    #[must_use]
    pub fn env_no_color() -> bool {
        match env::var("NO_COLOR").as_deref() {
            Ok("0") | Err(_) => false,
            Ok(_) => true,
        }
    }
}
