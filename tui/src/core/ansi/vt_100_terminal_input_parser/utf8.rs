// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Incremental UTF-8 decoding for byte oriented input (POSIX stdin). A `read()` can end
//! in the middle of a multi-byte char, so the decoder keeps the partial char between
//! calls.
//!
//! Invalid input never stalls the stream: a bad lead byte, or a lead byte followed by
//! something other than a continuation byte, produces [`char::REPLACEMENT_CHARACTER`]
//! and decoding resumes at the next byte.

/// Continuation bytes are `10xxxxxx`.
const UTF8_CONTINUATION_MASK: u8 = 0b1100_0000;
const UTF8_CONTINUATION_PATTERN: u8 = 0b1000_0000;
const UTF8_CONTINUATION_DATA_MASK: u8 = 0b0011_1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Step {
    /// Need more bytes.
    Pending,
    Char(char),
}

#[derive(Debug, Default, Clone)]
pub struct Utf8Decoder {
    code_point: u32,
    /// Continuation bytes still expected for the current char.
    remaining: u8,
}

impl Utf8Decoder {
    #[must_use]
    pub fn is_pending(&self) -> bool { self.remaining > 0 }

    /// Feed one byte. A byte that interrupts a partial char yields the replacement char
    /// for the partial char, and is then decoded on its own; that case returns two
    /// steps, so this returns up to two chars.
    pub fn push(&mut self, byte: u8) -> (Utf8Step, Option<char>) {
        if self.remaining > 0 {
            if byte & UTF8_CONTINUATION_MASK == UTF8_CONTINUATION_PATTERN {
                self.code_point =
                    (self.code_point << 6) | u32::from(byte & UTF8_CONTINUATION_DATA_MASK);
                self.remaining -= 1;
                if self.remaining > 0 {
                    return (Utf8Step::Pending, None);
                }
                let ch = char::from_u32(self.code_point)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return (Utf8Step::Char(ch), None);
            }
            // The partial char was cut short.
            self.remaining = 0;
            let (next, _) = self.push(byte);
            let extra = match next {
                Utf8Step::Char(ch) => Some(ch),
                Utf8Step::Pending => None,
            };
            return (Utf8Step::Char(char::REPLACEMENT_CHARACTER), extra);
        }

        match byte {
            0x00..=0x7F => (Utf8Step::Char(char::from(byte)), None),
            0xC2..=0xDF => self.start(u32::from(byte & 0b0001_1111), 1),
            0xE0..=0xEF => self.start(u32::from(byte & 0b0000_1111), 2),
            0xF0..=0xF4 => self.start(u32::from(byte & 0b0000_0111), 3),
            // Stray continuation byte, overlong lead (0xC0, 0xC1), or out of range.
            _ => (Utf8Step::Char(char::REPLACEMENT_CHARACTER), None),
        }
    }

    /// Decode a whole buffer, appending the chars to `acc`.
    pub fn decode_into(&mut self, bytes: &[u8], acc: &mut Vec<char>) {
        for byte in bytes {
            let (step, extra) = self.push(*byte);
            if let Utf8Step::Char(ch) = step {
                acc.push(ch);
            }
            if let Some(ch) = extra {
                acc.push(ch);
            }
        }
    }

    fn start(&mut self, bits: u32, remaining: u8) -> (Utf8Step, Option<char>) {
        self.code_point = bits;
        self.remaining = remaining;
        (Utf8Step::Pending, None)
    }
}
