// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter},
          sync::{Arc, Condvar, Mutex, PoisonError,
                 atomic::{AtomicBool, Ordering}},
          time::Duration};

/// Called once when the signal is cancelled, eg: to wake a blocked `mio::Poll`.
pub type CancellationWaker = Box<dyn Fn() + Send + Sync>;

/// Set once by [`MainLoopCoordinator::stop`], observed by the input thread.
///
/// A thread blocked in a syscall can't see a flag. So in addition to
/// [`is_cancelled`](Self::is_cancelled), adapters either register a waker that unblocks
/// their wait, or sleep with [`wait_timeout`](Self::wait_timeout) which returns early on
/// cancellation.
///
/// [`MainLoopCoordinator::stop`]: crate::MainLoopCoordinator::stop
#[derive(Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<CancellationInner>,
}

#[derive(Default)]
struct CancellationInner {
    cancelled: AtomicBool,
    sleep_lock: Mutex<()>,
    sleep_condvar: Condvar,
    wakers: Mutex<Vec<CancellationWaker>>,
}

impl Debug for CancellationSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl CancellationSignal {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.inner.cancelled.load(Ordering::Acquire) }

    /// Returns `true` on the first call only. Wakers run on the calling thread.
    pub fn cancel(&self) -> bool {
        {
            let _guard = self
                .inner
                .sleep_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if self.inner.cancelled.swap(true, Ordering::AcqRel) {
                return false;
            }
        }
        self.inner.sleep_condvar.notify_all();

        let wakers = std::mem::take(
            &mut *self
                .inner
                .wakers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for waker in &wakers {
            waker();
        }
        true
    }

    /// Runs `waker` on cancellation, or right away if already cancelled.
    pub fn register_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        let mut wakers = self
            .inner
            .wakers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_cancelled() {
            drop(wakers);
            waker();
        } else {
            wakers.push(Box::new(waker));
        }
    }

    /// Sleep for up to `timeout`. Returns `true` if cancelled (possibly during the
    /// sleep).
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self
            .inner
            .sleep_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (_guard, _timeout_result) = self
            .inner
            .sleep_condvar
            .wait_timeout_while(guard, timeout, |()| !self.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::atomic::AtomicUsize, time::Instant};

    #[test]
    fn test_cancel_is_reported_once() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());
        assert!(signal.cancel());
        assert!(!signal.cancel());
        assert!(signal.clone().is_cancelled());
    }

    #[test]
    fn test_wakers_run_once() {
        let signal = CancellationSignal::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        signal.register_waker(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        signal.cancel();
        signal.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Late registration runs immediately.
        let count_clone = count.clone();
        signal.register_waker(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_wait_timeout_returns_early_on_cancel() {
        let signal = CancellationSignal::new();
        let signal_clone = signal.clone();
        let start = Instant::now();

        let handle = std::thread::spawn(move || signal_clone.wait_timeout(Duration::from_secs(30)));
        std::thread::sleep(Duration::from_millis(20));
        signal.cancel();

        assert!(handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_wait_timeout_elapses_without_cancel() {
        let signal = CancellationSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(5)));
    }
}
