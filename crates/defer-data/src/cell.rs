//! Shared state cell behind a unit and its handles.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::warn;

use crate::state::ExecutionState;

pub(crate) type Callback<T> = Box<dyn FnOnce(ExecutionState<T>) + Send>;

/// The only piece of state a unit shares with its observers.
///
/// All transitions happen under the lock; callbacks run after it is
/// released so they may read the handle again without deadlocking.
pub(crate) struct UnitCell<T> {
    id: String,
    inner: Mutex<CellInner<T>>,
}

struct CellInner<T> {
    state: ExecutionState<T>,
    settled_at: Option<Instant>,
    subscribers: Vec<(u64, Callback<T>)>,
    next_key: u64,
    abort: Option<AbortHandle>,
    /// Set once observation is cut off; later callbacks are dropped.
    detached: bool,
}

impl<T> UnitCell<T> {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            inner: Mutex::new(CellInner {
                state: ExecutionState::Pending,
                settled_at: None,
                subscribers: Vec::new(),
                next_key: 0,
                abort: None,
                detached: false,
            }),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }
}

impl<T: Clone + Send + 'static> UnitCell<T> {
    fn lock(&self) -> MutexGuard<'_, CellInner<T>> {
        // Callbacks never run under the lock, so poisoning cannot leave
        // the state half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> ExecutionState<T> {
        self.lock().state.clone()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.lock().state.is_pending()
    }

    pub(crate) fn settled_at(&self) -> Option<Instant> {
        self.lock().settled_at
    }

    /// Move to a terminal state. Returns false if already terminal.
    pub(crate) fn settle(&self, terminal: ExecutionState<T>) -> bool {
        debug_assert!(terminal.is_terminal());

        let subscribers = {
            let mut inner = self.lock();
            if !inner.state.is_pending() {
                return false;
            }
            inner.state = terminal.clone();
            inner.settled_at = Some(Instant::now());
            inner.abort = None;
            std::mem::take(&mut inner.subscribers)
        };

        for (_, callback) in subscribers {
            self.notify(callback, terminal.clone());
        }
        true
    }

    /// Run one callback, isolating a panic from the other observers.
    fn notify(&self, callback: Callback<T>, state: ExecutionState<T>) {
        if panic::catch_unwind(AssertUnwindSafe(move || callback(state))).is_err() {
            warn!(unit = %self.id, "subscriber panicked");
        }
    }

    /// Register a terminal-state callback.
    ///
    /// Returns the subscription key, or `None` when the cell was already
    /// terminal and the callback has been invoked in place. A detached cell
    /// drops the callback without invoking it.
    pub(crate) fn subscribe(&self, callback: Callback<T>) -> Option<u64> {
        let terminal = {
            let mut inner = self.lock();
            if inner.detached {
                return None;
            }
            if inner.state.is_pending() {
                let key = inner.next_key;
                inner.next_key += 1;
                inner.subscribers.push((key, callback));
                return Some(key);
            }
            inner.state.clone()
        };

        self.notify(callback, terminal);
        None
    }

    pub(crate) fn unsubscribe(&self, key: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(k, _)| *k != key);
        inner.subscribers.len() != before
    }

    /// Drop every registered callback without invoking it and refuse
    /// any registered afterwards.
    pub(crate) fn detach(&self) -> usize {
        let dropped = {
            let mut inner = self.lock();
            inner.detached = true;
            std::mem::take(&mut inner.subscribers)
        };
        dropped.len()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub(crate) fn set_abort(&self, handle: AbortHandle) {
        let mut inner = self.lock();
        if inner.state.is_pending() {
            inner.abort = Some(handle);
        }
    }

    pub(crate) fn take_abort(&self) -> Option<AbortHandle> {
        self.lock().abort.take()
    }
}
