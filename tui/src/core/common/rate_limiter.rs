// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Time based throttling. [`KeyedRateLimiter`] is used by the
//! [`OutputRequestScheduler`] so that two queries expecting the same reply terminator
//! are never in flight back to back (their replies would be indistinguishable).
//!
//! [`OutputRequestScheduler`]: crate::OutputRequestScheduler

use std::{collections::HashMap,
          hash::Hash,
          time::{Duration, Instant}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStatus {
    /// Never run.
    NotStarted,
    /// Last run is older than the threshold; ok to run again.
    Expired,
    /// Last run is within the threshold; hold off.
    Active,
}

impl RateLimitStatus {
    #[must_use]
    pub const fn may_run(self) -> bool { !matches!(self, Self::Active) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiter {
    pub last_run: Option<Instant>,
    pub min_time_threshold: Duration,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(min_time_threshold: Duration) -> Self {
        Self {
            last_run: None,
            min_time_threshold,
        }
    }

    #[must_use]
    pub fn get_status(&self, now: Instant) -> RateLimitStatus {
        match self.last_run {
            None => RateLimitStatus::NotStarted,
            Some(last_run) if now.saturating_duration_since(last_run) >= self.min_time_threshold => {
                RateLimitStatus::Expired
            }
            Some(_) => RateLimitStatus::Active,
        }
    }

    /// Returns the status *before* updating, and records `now` as the last run if the
    /// limiter allowed it.
    pub fn get_status_and_update_last_run(&mut self, now: Instant) -> RateLimitStatus {
        let status = self.get_status(now);
        if status.may_run() {
            self.last_run = Some(now);
        }
        status
    }
}

/// One [`RateLimiter`] per key, all sharing the same threshold.
#[derive(Debug, Clone)]
pub struct KeyedRateLimiter<K> {
    min_time_threshold: Duration,
    limiters: HashMap<K, RateLimiter>,
}

impl<K: Eq + Hash + Copy> KeyedRateLimiter<K> {
    #[must_use]
    pub fn new(min_time_threshold: Duration) -> Self {
        Self {
            min_time_threshold,
            limiters: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get_status(&self, key: K, now: Instant) -> RateLimitStatus {
        self.limiters
            .get(&key)
            .map_or(RateLimitStatus::NotStarted, |it| it.get_status(now))
    }

    pub fn get_status_and_update_last_run(&mut self, key: K, now: Instant) -> RateLimitStatus {
        let threshold = self.min_time_threshold;
        self.limiters
            .entry(key)
            .or_insert_with(|| RateLimiter::new(threshold))
            .get_status_and_update_last_run(now)
    }
}
