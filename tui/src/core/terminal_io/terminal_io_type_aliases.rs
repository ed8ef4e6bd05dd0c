// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::Arc;

pub type StdMutex<T> = std::sync::Mutex<T>;

pub type SendRawTerminal = dyn std::io::Write + Send;
pub type SafeRawTerminal = Arc<StdMutex<SendRawTerminal>>;

/// Factory run on the input thread. Input adapters hold thread-affine OS handles, so they
/// are built where they are used and never cross threads.
pub type InputAdapterFactory =
    Box<dyn FnOnce() -> miette::Result<Box<dyn crate::InputAdapter>> + Send>;

/// Output adapters are used on the UI thread, but may be built on the input thread.
pub type BoxedOutputAdapter = Box<dyn crate::OutputAdapter + Send>;
