// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Continuation, LogarithmicTimeout};
use std::{collections::{BTreeMap, HashSet},
          fmt::{Debug, Formatter},
          sync::{Arc, Mutex, MutexGuard, PoisonError},
          time::{Duration, Instant}};

/// Microseconds since the scheduler's epoch. Keys of the timer map are unique.
pub type DueTick = u64;

/// Boxed timer callback. Runs on the thread that calls [`TimerScheduler::run_due`].
pub type TimerCallback = Box<dyn FnMut() -> Continuation + Send>;

/// Returned by [`TimerScheduler::add`], used to [`TimerScheduler::remove`] a timer.
/// Stays valid across re-arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeoutToken(u64);

impl TimeoutToken {
    #[must_use]
    pub const fn as_u64(self) -> u64 { self.0 }
}

/// How long to wait before re-arming a timer whose callback returned
/// [`Continuation::Continue`].
#[derive(Debug, Clone)]
pub enum TimeoutPeriod {
    Fixed(Duration),
    /// Read at every re-arm, so advancing or resetting the shared instance changes the
    /// next delay.
    Logarithmic(Arc<LogarithmicTimeout>),
}

impl TimeoutPeriod {
    #[must_use]
    pub fn span(&self) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Logarithmic(timeout) => timeout.span(),
        }
    }
}

impl From<Duration> for TimeoutPeriod {
    fn from(duration: Duration) -> Self { Self::Fixed(duration) }
}

impl From<Arc<LogarithmicTimeout>> for TimeoutPeriod {
    fn from(timeout: Arc<LogarithmicTimeout>) -> Self { Self::Logarithmic(timeout) }
}

struct Timeout {
    token: TimeoutToken,
    period: TimeoutPeriod,
    callback: TimerCallback,
}

impl Debug for Timeout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeout")
            .field("token", &self.token)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    timeouts: BTreeMap<DueTick, Timeout>,
    next_token: u64,
    /// Tokens of timers swapped out by a running [`TimerScheduler::run_due_at`].
    in_flight: HashSet<TimeoutToken>,
    /// In-flight tokens removed while swapped out. They are not re-inserted.
    cancelled: HashSet<TimeoutToken>,
}

impl SchedulerState {
    fn new_token(&mut self) -> TimeoutToken {
        self.next_token += 1;
        TimeoutToken(self.next_token)
    }

    /// Nudges `due` forward one tick at a time until it is unused.
    fn insert_nudged(&mut self, mut due: DueTick, timeout: Timeout) -> DueTick {
        while self.timeouts.contains_key(&due) {
            due = due.saturating_add(1);
        }
        self.timeouts.insert(due, timeout);
        due
    }
}

/// Callbacks ordered by absolute due time.
///
/// The handle is cheap to clone. All clones share the same timers, so background threads
/// can hold one to [`add`](Self::add), [`remove`](Self::remove) or
/// [`invoke`](Self::invoke) while the UI thread calls [`run_due`](Self::run_due).
///
/// # Running due timers
///
/// [`run_due_at`](Self::run_due_at) swaps the whole map out under the lock and iterates
/// the copy with the lock released, so callbacks are free to add or remove timers
/// (including their own) without deadlocking:
///
/// 1. Timers that are not due yet go back into the map.
/// 2. Due timers run. [`Continuation::Continue`] re-arms at `now + period`,
///    [`Continuation::Stop`] drops the timer.
/// 3. A timer removed while swapped out is dropped instead of re-inserted.
///
/// Timers added during step 2 are never run by the same call, even with zero delay.
#[derive(Clone)]
pub struct TimerScheduler {
    epoch: Instant,
    state: Arc<Mutex<SchedulerState>>,
}

impl Debug for TimerScheduler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("epoch", &self.epoch)
            .field("len", &self.len())
            .finish()
    }
}

impl Default for TimerScheduler {
    fn default() -> Self { Self::new() }
}

impl TimerScheduler {
    #[must_use]
    pub fn new() -> Self { Self::new_with_epoch(Instant::now()) }

    /// Ticks are measured from `epoch`. Instants before it map to tick 0.
    #[must_use]
    pub fn new_with_epoch(epoch: Instant) -> Self {
        Self {
            epoch,
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    /// A callback that panicked while holding the lock can't leave the map half updated
    /// (callbacks never run under the lock), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn tick_of(&self, instant: Instant) -> DueTick {
        duration_to_ticks(instant.saturating_duration_since(self.epoch))
    }

    /// Run `callback` after `delay`, and again every `delay` for as long as it returns
    /// [`Continuation::Continue`].
    pub fn add(
        &self,
        delay: Duration,
        callback: impl FnMut() -> Continuation + Send + 'static,
    ) -> TimeoutToken {
        self.add_with_period(delay, TimeoutPeriod::Fixed(delay), callback)
    }

    /// Like [`add`](Self::add), with a re-arm period that differs from the first delay.
    pub fn add_with_period(
        &self,
        delay: Duration,
        period: impl Into<TimeoutPeriod>,
        callback: impl FnMut() -> Continuation + Send + 'static,
    ) -> TimeoutToken {
        self.add_at(Instant::now() + delay, period.into(), Box::new(callback))
    }

    /// Schedule at an absolute instant.
    pub fn add_at(
        &self,
        due: Instant,
        period: TimeoutPeriod,
        callback: TimerCallback,
    ) -> TimeoutToken {
        let due_tick = self.tick_of(due);
        let mut state = self.lock();
        let token = state.new_token();
        let actual = state.insert_nudged(
            due_tick,
            Timeout {
                token,
                period,
                callback,
            },
        );
        if actual != due_tick {
            tracing::trace!(
                message = "timer due tick nudged",
                requested = due_tick,
                actual = actual
            );
        }
        token
    }

    /// Run `action` once, on the next [`run_due`](Self::run_due). Safe to call from any
    /// thread. This is how background work hands results to the UI thread.
    pub fn invoke(&self, action: impl FnOnce() + Send + 'static) -> TimeoutToken {
        let mut action = Some(action);
        self.add_at(
            Instant::now(),
            TimeoutPeriod::Fixed(Duration::ZERO),
            Box::new(move || {
                if let Some(action) = action.take() {
                    action();
                }
                Continuation::Stop
            }),
        )
    }

    /// Returns `true` if the timer was still live. Removing a timer from inside its own
    /// callback (or while [`run_due`](Self::run_due) has it swapped out) stops it from
    /// being re-armed. A one-shot that already ran, or a timer whose callback returned
    /// [`Continuation::Stop`], is gone: `false`.
    pub fn remove(&self, token: TimeoutToken) -> bool {
        let mut state = self.lock();

        let due = state
            .timeouts
            .iter()
            .find_map(|(due, it)| (it.token == token).then_some(*due));
        if let Some(due) = due {
            state.timeouts.remove(&due);
            return true;
        }

        if state.in_flight.contains(&token) {
            return state.cancelled.insert(token);
        }

        false
    }

    /// Run every timer due now. Returns the number of callbacks run.
    pub fn run_due(&self) -> usize { self.run_due_at(Instant::now()) }

    /// Run every timer due at `now`. Returns the number of callbacks run.
    pub fn run_due_at(&self, now: Instant) -> usize {
        let now_tick = self.tick_of(now);

        // Swap the whole map out.
        let swapped = {
            let mut state = self.lock();
            let swapped = std::mem::take(&mut state.timeouts);
            let tokens: Vec<_> = swapped.values().map(|it| it.token).collect();
            state.in_flight.extend(tokens);
            swapped
        };

        let mut run_count = 0;
        let mut reinsert: Vec<(DueTick, Timeout)> = Vec::with_capacity(swapped.len());

        for (due, mut timeout) in swapped {
            if due > now_tick {
                reinsert.push((due, timeout));
                continue;
            }

            run_count += 1;
            match (timeout.callback)() {
                Continuation::Continue => {
                    let next = now_tick.saturating_add(duration_to_ticks(timeout.period.span()));
                    reinsert.push((next, timeout));
                }
                Continuation::Stop => {
                    self.lock().in_flight.remove(&timeout.token);
                }
            }
        }

        let mut state = self.lock();
        for (due, timeout) in reinsert {
            if state.cancelled.contains(&timeout.token) {
                continue;
            }
            state.insert_nudged(due, timeout);
        }
        state.in_flight.clear();
        state.cancelled.clear();

        run_count
    }

    /// Time from `now` until the earliest timer is due. `Some(ZERO)` if one is overdue,
    /// `None` if there are no timers.
    #[must_use]
    pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
        let now_tick = self.tick_of(now);
        self.lock()
            .timeouts
            .keys()
            .next()
            .map(|due| Duration::from_micros(due.saturating_sub(now_tick)))
    }

    /// Number of scheduled timers (not counting ones swapped out by a running
    /// [`run_due`](Self::run_due)).
    #[must_use]
    pub fn len(&self) -> usize { self.lock().timeouts.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Due ticks, in order. For diagnostics and tests.
    #[must_use]
    pub fn due_ticks(&self) -> Vec<DueTick> { self.lock().timeouts.keys().copied().collect() }
}

fn duration_to_ticks(duration: Duration) -> DueTick {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MS_10: Duration = Duration::from_millis(10);

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = {
            let count = count.clone();
            move || count.load(Ordering::SeqCst)
        };
        (count, read)
    }

    fn stop_after_incr(count: &Arc<AtomicUsize>) -> impl FnMut() -> Continuation + Send + 'static {
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            Continuation::Stop
        }
    }

    #[test]
    fn test_identical_due_ticks_get_distinct_keys_and_both_run() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let (count, read) = counter();
        let due = epoch + MS_10;

        let token_1 = scheduler.add_at(due, MS_10.into(), Box::new(stop_after_incr(&count)));
        let token_2 = scheduler.add_at(due, MS_10.into(), Box::new(stop_after_incr(&count)));

        assert_ne!(token_1, token_2);
        let due_tick = scheduler.tick_of(due);
        assert_eq!(scheduler.due_ticks(), vec![due_tick, due_tick + 1]);

        // Not due yet.
        assert_eq!(scheduler.run_due_at(epoch), 0);
        assert_eq!(scheduler.len(), 2);

        assert_eq!(scheduler.run_due_at(due + Duration::from_micros(1)), 2);
        assert_eq!(read(), 2);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_continue_re_arms_after_period() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let (count, read) = counter();
        let counter_clone = count.clone();
        scheduler.add_at(
            epoch + MS_10,
            MS_10.into(),
            Box::new(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Continuation::Continue
            }),
        );

        let first_run = epoch + MS_10;
        assert_eq!(scheduler.run_due_at(first_run), 1);
        assert_eq!(scheduler.next_due_in(first_run), Some(MS_10));

        // Just before the period elapses: nothing.
        assert_eq!(scheduler.run_due_at(first_run + Duration::from_millis(9)), 0);
        assert_eq!(scheduler.run_due_at(first_run + MS_10), 1);
        assert_eq!(read(), 2);
        drop(count);
    }

    #[test]
    fn test_logarithmic_period_is_read_at_each_re_arm() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let backoff = Arc::new(LogarithmicTimeout::new(MS_10));
        let backoff_clone = backoff.clone();
        scheduler.add_at(
            epoch,
            TimeoutPeriod::Logarithmic(backoff.clone()),
            Box::new(move || {
                backoff_clone.advance();
                Continuation::Continue
            }),
        );

        let mut now = epoch;
        let mut previous_gap = Duration::ZERO;
        for _ in 0..5 {
            assert_eq!(scheduler.run_due_at(now), 1);
            let gap = scheduler.next_due_in(now).unwrap();
            assert!(gap >= previous_gap);
            previous_gap = gap;
            now += gap;
        }
        assert!(previous_gap > MS_10);
    }

    #[test]
    fn test_remove() {
        let scheduler = TimerScheduler::new();
        let token = scheduler.add(MS_10, || Continuation::Stop);
        assert!(scheduler.remove(token));
        assert!(!scheduler.remove(token));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_remove_after_callback_stopped_returns_false() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let first = scheduler.add_at(epoch, MS_10.into(), Box::new(|| Continuation::Stop));

        // Runs right after `first`, in the same pass.
        let removed = Arc::new(Mutex::new(None));
        let scheduler_clone = scheduler.clone();
        let removed_clone = removed.clone();
        scheduler.add_at(
            epoch + Duration::from_micros(1),
            MS_10.into(),
            Box::new(move || {
                *removed_clone.lock().unwrap() = Some(scheduler_clone.remove(first));
                Continuation::Stop
            }),
        );

        assert_eq!(scheduler.run_due_at(epoch + MS_10), 2);
        assert_eq!(*removed.lock().unwrap(), Some(false));
        assert!(!scheduler.remove(first));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_callback_removing_itself_is_not_re_armed() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let token_slot: Arc<Mutex<Option<TimeoutToken>>> = Arc::default();

        let scheduler_clone = scheduler.clone();
        let token_slot_clone = token_slot.clone();
        let token = scheduler.add_at(
            epoch,
            MS_10.into(),
            Box::new(move || {
                if let Some(token) = *token_slot_clone.lock().unwrap() {
                    assert!(scheduler_clone.remove(token));
                }
                Continuation::Continue
            }),
        );
        *token_slot.lock().unwrap() = Some(token);

        assert_eq!(scheduler.run_due_at(epoch), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_callback_may_add_timers_without_deadlock() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let (count, read) = counter();

        let scheduler_clone = scheduler.clone();
        let count_clone = count.clone();
        scheduler.add_at(
            epoch,
            MS_10.into(),
            Box::new(move || {
                scheduler_clone.add_at(
                    epoch,
                    MS_10.into(),
                    Box::new(stop_after_incr(&count_clone)),
                );
                Continuation::Stop
            }),
        );

        // The timer added by the callback is due, but only runs on the next call.
        assert_eq!(scheduler.run_due_at(epoch), 1);
        assert_eq!(read(), 0);
        assert_eq!(scheduler.run_due_at(epoch), 1);
        assert_eq!(read(), 1);
    }

    #[test]
    fn test_not_yet_due_timers_survive_swap() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        let token = scheduler.add_at(epoch + MS_10, MS_10.into(), Box::new(|| Continuation::Stop));
        scheduler.add_at(epoch, MS_10.into(), Box::new(|| Continuation::Stop));

        assert_eq!(scheduler.run_due_at(epoch), 1);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.remove(token));
    }

    #[test]
    fn test_invoke_runs_once_from_another_thread() {
        let scheduler = TimerScheduler::new();
        let (count, read) = counter();

        let scheduler_clone = scheduler.clone();
        let count_clone = count.clone();
        std::thread::spawn(move || {
            scheduler_clone.invoke(move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            });
        })
        .join()
        .unwrap();

        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(scheduler.run_due(), 0);
        assert_eq!(read(), 1);
    }

    #[test]
    fn test_next_due_in() {
        let epoch = Instant::now();
        let scheduler = TimerScheduler::new_with_epoch(epoch);
        assert_eq!(scheduler.next_due_in(epoch), None);

        scheduler.add_at(epoch + MS_10, MS_10.into(), Box::new(|| Continuation::Stop));
        assert_eq!(scheduler.next_due_in(epoch), Some(MS_10));
        assert_eq!(scheduler.next_due_in(epoch + MS_10 * 2), Some(Duration::ZERO));
    }
}
