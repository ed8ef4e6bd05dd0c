// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Color and style types used by the output side of the runtime.
//!
//! - [`TuiColor`]: a 24-bit [`RgbValue`] or one of the 16 [`Ansi16Color`]s.
//! - [`CellStyle`]: foreground, background and [`CellAttribs`] for one cell.
//! - [`ColorSupport`]: what the terminal can show, detected from the environment by
//!   [`examine_env_vars_to_determine_color_support`].
//!
//! When the terminal only supports 16 colors, [`TuiColor::degrade`] picks the nearest
//! palette entry for an RGB color.

// Attach.
mod cell_style;
mod detect_color_support;
mod tui_color;

// Re-export.
pub use cell_style::*;
pub use detect_color_support::*;
pub use tui_color::*;
