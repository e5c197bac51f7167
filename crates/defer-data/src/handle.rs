//! Non-owning handles and subscriptions.

use std::sync::Weak;

use futures::channel::oneshot;

use crate::cell::UnitCell;
use crate::error::UnitError;
use crate::state::ExecutionState;

/// A non-owning observation point into a unit's eventual outcome.
///
/// Handles never keep a unit alive. Once the owning load result is gone
/// and the computation has finished, the handle reports the unit as
/// cancelled.
pub struct PendingHandle<T> {
    id: String,
    cell: Weak<UnitCell<T>>,
}

impl<T> Clone for PendingHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<T> std::fmt::Debug for PendingHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingHandle")
            .field("id", &self.id)
            .field("alive", &(self.cell.strong_count() > 0))
            .finish()
    }
}

impl<T: Clone + Send + 'static> PendingHandle<T> {
    pub(crate) fn new(id: &str, cell: Weak<UnitCell<T>>) -> Self {
        Self {
            id: id.to_string(),
            cell,
        }
    }

    /// Id of the observed unit.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state snapshot.
    ///
    /// Polling never consumes or changes the state.
    pub fn current_state(&self) -> ExecutionState<T> {
        match self.cell.upgrade() {
            Some(cell) => cell.snapshot(),
            None => ExecutionState::Failed(UnitError::Cancelled(self.id.clone())),
        }
    }

    /// Subscribe to the terminal transition.
    ///
    /// The callback runs exactly once with the terminal state. If the unit
    /// is already terminal it runs before this call returns. It never runs
    /// if the subscription is dropped first or the unit's observers were
    /// detached, before or after this call.
    pub fn subscribe<F>(&self, on_terminal: F) -> Subscription<T>
    where
        F: FnOnce(ExecutionState<T>) + Send + 'static,
    {
        let key = self
            .cell
            .upgrade()
            .and_then(|cell| cell.subscribe(Box::new(on_terminal)));

        Subscription {
            cell: Weak::clone(&self.cell),
            key,
        }
    }

    /// Wait for the terminal state.
    ///
    /// Resolves to `Failed(Cancelled)` if interest in the unit is dropped
    /// before it settles.
    pub async fn settled(&self) -> ExecutionState<T> {
        let (tx, rx) = oneshot::channel();
        let _subscription = self.subscribe(move |state| {
            let _ = tx.send(state);
        });

        match rx.await {
            Ok(state) => state,
            Err(oneshot::Canceled) => ExecutionState::Failed(UnitError::Cancelled(self.id.clone())),
        }
    }

    /// Number of live subscriptions on the unit.
    pub fn observer_count(&self) -> usize {
        self.cell
            .upgrade()
            .map(|cell| cell.subscriber_count())
            .unwrap_or(0)
    }

    /// Whether the unit is still reachable.
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

/// Guard for a registered callback; unsubscribes on drop.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription<T: Clone + Send + 'static> {
    cell: Weak<UnitCell<T>>,
    key: Option<u64>,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    /// Whether the callback is still waiting for the terminal state.
    pub fn is_active(&self) -> bool {
        match (self.key, self.cell.upgrade()) {
            (Some(_), Some(cell)) => cell.is_pending(),
            _ => false,
        }
    }

    /// Unsubscribe explicitly.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let (Some(key), Some(cell)) = (self.key.take(), self.cell.upgrade()) {
            cell.unsubscribe(key);
        }
    }
}

impl<T: Clone + Send + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Clone + Send + 'static> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .finish()
    }
}
