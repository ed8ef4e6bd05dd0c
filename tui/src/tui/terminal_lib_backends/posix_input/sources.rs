// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use mio::Token;

/// The sources registered with the adapter's `mio::Poll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKindReady {
    TerminalInput,
    Signals,
    /// Woken by [`CancellationSignal::cancel`](crate::CancellationSignal::cancel).
    CancelWaker,
    Unknown,
}

impl SourceKindReady {
    #[must_use]
    pub const fn to_token(self) -> Token {
        match self {
            Self::TerminalInput => Token(0),
            Self::Signals => Token(1),
            Self::CancelWaker => Token(2),
            Self::Unknown => Token(usize::MAX),
        }
    }

    #[must_use]
    pub const fn from_token(token: Token) -> Self {
        match token.0 {
            0 => Self::TerminalInput,
            1 => Self::Signals,
            2 => Self::CancelWaker,
            _ => Self::Unknown,
        }
    }
}
