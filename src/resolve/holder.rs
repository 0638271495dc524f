//! ReferenceHolder: the rendezvous between the crawl worker and a resolver
//!
//! The worker calls a resolver and gets a holder back. A non-blocking
//! resolver hands back a finished holder; a blocking one keeps a clone,
//! answers later from another thread and wakes the worker through the
//! holder's condition variable.

use super::cancel::{CancellationToken, Wake};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default interval between finished-flag checks while waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("resolution cancelled")]
    Cancelled,

    #[error("resolver did not answer within {0:?}")]
    DeadlineExceeded(Duration),
}

/// How long the worker waits for an unfinished holder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Longest single sleep on the condition variable
    pub poll_interval: Duration,
    /// Total wait before giving up; `None` waits until finished or cancelled
    pub deadline: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

impl WaitPolicy {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[derive(Debug)]
struct State<T> {
    values: Vec<T>,
    finished: bool,
}

struct Slot<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send> Wake for Slot<T> {
    fn wake(&self) {
        // Taking the lock orders the wakeup after any waiter's flag check.
        let _guard = self.lock();
        self.ready.notify_all();
    }
}

/// Shared handle to a resolution result
///
/// `finished` distinguishes "resolver chose nothing" (finished, empty) from
/// "resolver has not answered yet" (unfinished).
pub struct ReferenceHolder<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for ReferenceHolder<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> ReferenceHolder<T> {
    fn with_state(values: Vec<T>, finished: bool) -> Self {
        Self {
            slot: Arc::new(Slot {
                state: Mutex::new(State { values, finished }),
                ready: Condvar::new(),
            }),
        }
    }

    /// An unanswered holder, to be completed by the resolver later
    pub fn pending() -> Self {
        Self::with_state(Vec::new(), false)
    }

    /// An already answered holder
    pub fn finished(values: Vec<T>) -> Self {
        Self::with_state(values, true)
    }

    /// Answered with a deliberate empty choice
    pub fn nothing() -> Self {
        Self::finished(Vec::new())
    }

    /// Answered with a single choice
    pub fn one(value: T) -> Self {
        Self::finished(vec![value])
    }

    /// Replace the chosen values without finishing
    pub fn set(&self, values: Vec<T>) {
        self.slot.lock().values = values;
    }

    pub fn push(&self, value: T) {
        self.slot.lock().values.push(value);
    }

    /// Mark the holder answered. Does not wake the worker; see [`unlock`](Self::unlock).
    pub fn finish(&self) {
        self.slot.lock().finished = true;
    }

    /// Wake any thread waiting on this holder
    pub fn unlock(&self) {
        let _guard = self.slot.lock();
        self.slot.ready.notify_all();
    }

    /// Populate, finish and wake in one step
    pub fn complete(&self, values: Vec<T>) {
        let mut state = self.slot.lock();
        state.values = values;
        state.finished = true;
        self.slot.ready.notify_all();
    }

    pub fn is_finished(&self) -> bool {
        self.slot.lock().finished
    }

    /// Move the chosen values out, leaving the holder empty
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut self.slot.lock().values)
    }
}

impl<T: Clone> ReferenceHolder<T> {
    /// Snapshot of the chosen values
    pub fn get(&self) -> Vec<T> {
        self.slot.lock().values.clone()
    }
}

impl<T: Send + 'static> ReferenceHolder<T> {
    /// Block until the holder is finished, then take its values.
    ///
    /// Sleeps on the condition variable at most `poll_interval` at a time.
    /// Returns early when `cancel` fires or the deadline passes.
    pub fn wait(&self, policy: &WaitPolicy, cancel: &CancellationToken) -> Result<Vec<T>, ResolutionError> {
        let waker: Arc<dyn Wake> = self.slot.clone();
        cancel.register(&waker);

        let started = Instant::now();
        let mut state = self.slot.lock();
        loop {
            if state.finished {
                return Ok(std::mem::take(&mut state.values));
            }
            if cancel.is_cancelled() {
                return Err(ResolutionError::Cancelled);
            }
            let mut timeout = policy.poll_interval;
            if let Some(deadline) = policy.deadline {
                let elapsed = started.elapsed();
                if elapsed >= deadline {
                    return Err(ResolutionError::DeadlineExceeded(deadline));
                }
                timeout = timeout.min(deadline - elapsed);
            }
            state = self
                .slot
                .ready
                .wait_timeout(state, timeout)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ReferenceHolder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.slot.lock();
        f.debug_struct("ReferenceHolder")
            .field("values", &state.values)
            .field("finished", &state.finished)
            .finish()
    }
}
