// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{sync::atomic::{AtomicU32, Ordering},
          time::Duration};

/// The first stage, whose span is `base * ln 2`. Stage 0 would give a zero span.
pub const LOGARITHMIC_TIMEOUT_FIRST_STAGE: u32 = 1;

/// A timeout whose span grows with its stage: `base * ln(stage + 1)`. It passes `base`
/// from stage 2 on.
///
/// The stage is atomic so a shared (`Arc`) instance can be advanced by the code that
/// observes a failure while the [`TimerScheduler`] reads the span to re-arm a timer.
///
/// ```
/// use r3bl_term_runtime::LogarithmicTimeout;
/// use std::time::Duration;
///
/// let timeout = LogarithmicTimeout::new(Duration::from_millis(100));
/// let first = timeout.span();
/// timeout.advance();
/// timeout.advance();
/// assert!(timeout.span() > first);
/// timeout.reset();
/// assert_eq!(timeout.span(), first);
/// ```
///
/// [`TimerScheduler`]: crate::TimerScheduler
#[derive(Debug)]
pub struct LogarithmicTimeout {
    base: Duration,
    stage: AtomicU32,
}

impl LogarithmicTimeout {
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self {
            base,
            stage: AtomicU32::new(LOGARITHMIC_TIMEOUT_FIRST_STAGE),
        }
    }

    #[must_use]
    pub const fn base(&self) -> Duration { self.base }

    #[must_use]
    pub fn stage(&self) -> u32 { self.stage.load(Ordering::Acquire) }

    /// Move to the next stage. Saturates.
    pub fn advance(&self) {
        // fetch_update only fails if the closure returns None.
        let _unused = self.stage.fetch_update(Ordering::AcqRel, Ordering::Acquire, |it| {
            Some(it.saturating_add(1))
        });
    }

    /// Back to the first stage.
    pub fn reset(&self) {
        self.stage
            .store(LOGARITHMIC_TIMEOUT_FIRST_STAGE, Ordering::Release);
    }

    /// The span for the current stage.
    #[must_use]
    pub fn span(&self) -> Duration { Self::span_at(self.base, self.stage()) }

    /// `base * ln(stage + 1)`. Monotonic in `stage`.
    #[must_use]
    pub fn span_at(base: Duration, stage: u32) -> Duration {
        let factor = (f64::from(stage) + 1.0).ln();
        base.mul_f64(factor)
    }
}

impl Clone for LogarithmicTimeout {
    fn clone(&self) -> Self {
        Self {
            base: self.base,
            stage: AtomicU32::new(self.stage()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const BASE: Duration = Duration::from_millis(100);

    #[test]
    fn test_spans_are_non_decreasing_across_stages() {
        let timeout = LogarithmicTimeout::new(BASE);
        let mut previous = timeout.span();
        for _ in 0..50 {
            timeout.advance();
            let current = timeout.span();
            assert!(current >= previous, "{current:?} < {previous:?}");
            previous = current;
        }
        assert!(previous > BASE);
    }

    #[test]
    fn test_first_stage_is_ln_2_of_the_base() {
        let span = LogarithmicTimeout::new(BASE).span();
        assert_eq!(span, LogarithmicTimeout::span_at(BASE, LOGARITHMIC_TIMEOUT_FIRST_STAGE));
        assert!(span < BASE);
        assert_eq!(span.as_micros(), 69_314);
    }

    #[test_case(1, 0.6931 ; "stage 1 is ln 2")]
    #[test_case(2, 1.0986 ; "stage 2 is ln 3")]
    #[test_case(9, 2.3025 ; "stage 9 is ln 10")]
    fn test_span_follows_natural_log(stage: u32, expected_factor: f64) {
        let actual = LogarithmicTimeout::span_at(BASE, stage).as_secs_f64();
        let expected = BASE.as_secs_f64() * expected_factor;
        assert!((actual - expected).abs() < 0.001, "{actual} vs {expected}");
    }

    #[test]
    fn test_reset_goes_back_to_first_stage() {
        let timeout = LogarithmicTimeout::new(BASE);
        timeout.advance();
        timeout.advance();
        assert_eq!(timeout.stage(), 3);
        timeout.reset();
        assert_eq!(timeout.stage(), LOGARITHMIC_TIMEOUT_FIRST_STAGE);
    }

    #[test]
    fn test_advance_saturates() {
        let timeout = LogarithmicTimeout::new(BASE);
        timeout.stage.store(u32::MAX, Ordering::Release);
        timeout.advance();
        assert_eq!(timeout.stage(), u32::MAX);
    }
}
