// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod common_enums;
pub mod dimens;
pub mod miette_setup_global_report_handler;
pub mod rate_limiter;

// Re-export.
pub use common_enums::*;
pub use dimens::*;
pub use miette_setup_global_report_handler::*;
pub use rate_limiter::*;
