// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! UI thread side of input: [`RawInputUnit`]s in, [`StructuredEvent`]s out.
//!
//! | Unit                         | Path                                                 |
//! | :--------------------------- | :--------------------------------------------------- |
//! | `Char`                       | [`EscapeSequenceParser`] then [`SequenceClassifier`] |
//! | `ConsoleKey`                 | [`ConsoleKeyMapper`], repeated `repeat_count` times  |
//! | `ConsoleMouse`               | [`ConsoleMouseMapper`]                               |
//! | `WindowResized`              | `StructuredEvent::WindowSize` as is                  |
//!
//! Replies recognized on the `Char` path complete the matching request in the
//! [`OutputRequestScheduler`] right away, so the next sequence in the same batch is
//! classified against the updated set of expected terminators.

use crate::{ClassifiedEvents, ConsoleKeyMapper, ConsoleMouseMapper, EscapeSequenceParser,
            HandoffReceiver, OutputRequestScheduler, RawInputUnit, SequenceClassifier,
            StructuredEvent};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct InputProcessor {
    parser: EscapeSequenceParser,
    classifier: SequenceClassifier,
    key_mapper: ConsoleKeyMapper,
    mouse_mapper: ConsoleMouseMapper,
}

impl InputProcessor {
    #[must_use]
    pub fn new(release_deadline: Duration) -> Self {
        Self {
            parser: EscapeSequenceParser::new(release_deadline),
            classifier: SequenceClassifier::default(),
            key_mapper: ConsoleKeyMapper::default(),
            mouse_mapper: ConsoleMouseMapper::default(),
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &SequenceClassifier { &self.classifier }

    /// When a partial sequence will be released, if there is one.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> { self.parser.pending_deadline() }

    /// Drain everything queued, then release a partial sequence whose deadline has
    /// passed. Returns the number of units consumed.
    pub fn drain(
        &mut self,
        receiver: &mut HandoffReceiver,
        now: Instant,
        requests: &mut OutputRequestScheduler,
        events: &mut Vec<StructuredEvent>,
    ) -> usize {
        let mut count = 0;
        while let Some(unit) = receiver.try_pop() {
            count += 1;
            self.process_unit(unit, now, requests, events);
        }
        self.parser.release_stale(now);
        self.classify_parser_output(requests, events);
        count
    }

    pub fn process_unit(
        &mut self,
        unit: RawInputUnit,
        now: Instant,
        requests: &mut OutputRequestScheduler,
        events: &mut Vec<StructuredEvent>,
    ) {
        match unit {
            RawInputUnit::Char(ch) => {
                self.parser.feed(ch, now);
                self.classify_parser_output(requests, events);
            }
            RawInputUnit::ConsoleKey(record) => {
                if let Some(key) = self.key_mapper.map(&record) {
                    let repeat = usize::from(record.repeat_count.max(1));
                    events.extend(std::iter::repeat_n(StructuredEvent::Key(key), repeat));
                }
            }
            RawInputUnit::ConsoleMouse(record) => {
                events.extend(
                    self.mouse_mapper
                        .map(&record)
                        .into_iter()
                        .map(StructuredEvent::Mouse),
                );
            }
            RawInputUnit::WindowResized(size) => events.push(StructuredEvent::WindowSize(size)),
        }
    }

    fn classify_parser_output(
        &mut self,
        requests: &mut OutputRequestScheduler,
        events: &mut Vec<StructuredEvent>,
    ) {
        while let Some(output) = self.parser.next() {
            let expected = requests.expected_terminators();
            let classified: ClassifiedEvents = self.classifier.classify(output, &expected);
            for event in classified {
                if let Some(terminator) = reply_terminator(&event) {
                    requests.on_reply(terminator);
                }
                events.push(event);
            }
        }
    }
}

/// The terminator of a reply event, used to complete its request.
fn reply_terminator(event: &StructuredEvent) -> Option<char> {
    use crate::core::ansi::constants::REPLY_WINDOW_OPS_FINAL;
    match event {
        StructuredEvent::TerminalReply(reply) => Some(reply.terminator),
        StructuredEvent::WindowSize(_) | StructuredEvent::WindowPosition(_) => {
            Some(REPLY_WINDOW_OPS_FINAL)
        }
        StructuredEvent::Key(_) | StructuredEvent::Mouse(_) => None,
    }
}
