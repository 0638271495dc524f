//! Cooperative cancellation for crawls
//!
//! The caller signals via a cancellation token. The crawler checks the token
//! between steps, and every resolver wait is woken as soon as the token is
//! cancelled. Nodes already added to the tree stay there.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::time::{Duration, Instant};

/// Something blocked that must be woken when cancellation is requested
pub trait Wake: Send + Sync {
    fn wake(&self);
}

/// Parks a sleeping thread until its timer runs out or the token is cancelled
#[derive(Default)]
struct Sleeper {
    woken: Mutex<bool>,
    ready: Condvar,
}

impl Wake for Sleeper {
    fn wake(&self) {
        *self.woken.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.ready.notify_all();
    }
}

struct Inner {
    cancelled: AtomicBool,
    waiters: Mutex<Vec<Weak<dyn Wake>>>,
}

/// A cooperative cancellation token.
///
/// Clones share state. Cancellation is sticky: once cancelled, a token
/// stays cancelled.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                waiters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Signal cancellation and wake every registered waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let waiters: Vec<Arc<dyn Wake>> = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for waiter in waiters {
            waiter.wake();
        }
    }

    /// Register a waiter to be woken on cancellation.
    ///
    /// Only a weak reference is kept; dropped waiters are pruned here.
    pub fn register(&self, waiter: &Arc<dyn Wake>) {
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        waiters.retain(|w| w.strong_count() > 0);
        waiters.push(Arc::downgrade(waiter));
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `false` when cancellation cut the sleep short.
    pub fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.is_cancelled();
        }
        let sleeper = Arc::new(Sleeper::default());
        let waiter: Arc<dyn Wake> = sleeper.clone();
        self.register(&waiter);

        let until = Instant::now() + duration;
        let mut woken = sleeper.woken.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *woken || self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= until {
                return true;
            }
            woken = sleeper
                .ready
                .wait_timeout(woken, until - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn waiter_count(&self) -> usize {
        self.inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
