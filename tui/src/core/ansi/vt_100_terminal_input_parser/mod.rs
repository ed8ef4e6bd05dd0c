// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! VT-100 terminal input parsing. Pure protocol code, no I/O: the platform adapters
//! hand chars to this layer through the [`InputProcessor`](crate::InputProcessor).
//!
//! ```text
//! RawInputUnit::Char ──▶ EscapeSequenceParser ──▶ ParserOutput
//!                        (Ground / EscapeSeen /       │
//!                         CollectingParams)           ▼
//!                                             SequenceClassifier
//!                                              1. SGR mouse (+ button tracker)
//!                                              2. keyboard matchers
//!                                              3. terminal replies
//!                                              4. overlapping keyboard matchers
//!                                                     │
//!                                                     ▼
//!                                              StructuredEvent
//! ```
//!
//! | Module                     | Responsibility                                        |
//! |----------------------------|-------------------------------------------------------|
//! | `escape_sequence_parser`   | Split chars into plain input and complete sequences   |
//! | `keyboard_matchers`        | Arrow, function, navigation and SS3 keys              |
//! | `mouse`                    | SGR mouse reports, click synthesis                    |
//! | `terminal_replies`         | Window size / position, device attributes, expected   |
//! | `plain_char`               | Control bytes to keys                                 |
//! | `utf8`                     | Incremental byte to char decoding                     |
//! | `sequence_classifier`      | Ties the above together in priority order             |
//!
//! # One based mouse input events
//!
//! VT-100 mouse coordinates are 1-based, where (1, 1) is the top-left corner. They are
//! converted to the 0-based [`Point`](crate::Point) when decoded.

// Skip rustfmt for rest of file.
// https://stackoverflow.com/a/75910283/2085356
#![cfg_attr(rustfmt, rustfmt_skip)]

// Attach.
mod escape_sequence_parser;
mod keyboard_matchers;
mod mouse;
mod plain_char;
mod sequence_classifier;
mod terminal_replies;
mod types;
mod utf8;

// Re-export types for flat public API.
pub use escape_sequence_parser::*;
pub use keyboard_matchers::*;
pub use mouse::*;
pub use plain_char::*;
pub use sequence_classifier::*;
pub use terminal_replies::*;
pub use types::*;
pub use utf8::*;
