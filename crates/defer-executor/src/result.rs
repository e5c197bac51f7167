//! Load results handed to the rendering layer.

use std::time::Duration;

use defer_core::NavigationId;
use defer_data::{AsyncUnit, ExecutionState, PendingHandle, UnitMode};
use futures::future::join_all;

/// One addressed entry of a load result.
#[derive(Debug, Clone)]
pub enum Slot<T> {
    /// Eager unit value, final once `run` returned.
    Ready(T),
    /// Deferred unit, observed through its handle.
    Pending(PendingHandle<T>),
}

impl<T> Slot<T> {
    /// Check if this slot holds a ready value.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The ready value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending(_) => None,
        }
    }

    /// The pending handle, if any.
    pub fn handle(&self) -> Option<&PendingHandle<T>> {
        match self {
            Self::Ready(_) => None,
            Self::Pending(handle) => Some(handle),
        }
    }
}

/// Output of one navigation: ready values and pending handles.
///
/// The result owns the navigation's units. Dropping it detaches every
/// observer, so late resolutions of a discarded navigation go unseen.
pub struct LoadResult<T: Clone + Send + 'static> {
    navigation_id: NavigationId,
    slots: Vec<(String, Slot<T>)>,
    units: Vec<AsyncUnit<T>>,
    ready_after: Duration,
}

impl<T: Clone + Send + 'static> LoadResult<T> {
    pub(crate) fn new(
        navigation_id: NavigationId,
        slots: Vec<(String, Slot<T>)>,
        units: Vec<AsyncUnit<T>>,
        ready_after: Duration,
    ) -> Self {
        Self {
            navigation_id,
            slots,
            units,
            ready_after,
        }
    }

    /// Navigation this result belongs to.
    pub fn navigation_id(&self) -> NavigationId {
        self.navigation_id
    }

    /// Time from plan creation until eager units resolved.
    pub fn ready_after(&self) -> Duration {
        self.ready_after
    }

    /// Look up a slot by unit id.
    pub fn get(&self, id: &str) -> Option<&Slot<T>> {
        self.slots
            .iter()
            .find(|(slot_id, _)| slot_id == id)
            .map(|(_, slot)| slot)
    }

    /// Ready value of an eager unit.
    pub fn value(&self, id: &str) -> Option<&T> {
        self.get(id).and_then(Slot::value)
    }

    /// Handle of a deferred unit.
    pub fn handle(&self, id: &str) -> Option<PendingHandle<T>> {
        self.get(id).and_then(Slot::handle).cloned()
    }

    /// Slots in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot<T>)> {
        self.slots.iter().map(|(id, slot)| (id.as_str(), slot))
    }

    /// Deferred handles in declaration order.
    pub fn pending_handles(&self) -> Vec<PendingHandle<T>> {
        self.slots
            .iter()
            .filter_map(|(_, slot)| slot.handle().cloned())
            .collect()
    }

    /// Mode each unit was declared with.
    pub fn mode(&self, id: &str) -> Option<UnitMode> {
        self.units.iter().find(|u| u.id() == id).map(|u| u.mode())
    }

    /// Time from plan creation to a unit's terminal state.
    pub fn settle_duration(&self, id: &str) -> Option<Duration> {
        self.units
            .iter()
            .find(|u| u.id() == id)
            .and_then(|u| u.settle_duration())
    }

    /// Wait until every deferred unit has settled.
    pub async fn settle_all(&self) -> Vec<(String, ExecutionState<T>)> {
        let handles = self.pending_handles();
        let states = join_all(handles.iter().map(|h| h.settled())).await;
        handles
            .iter()
            .map(|h| h.id().to_string())
            .zip(states)
            .collect()
    }

    /// Drop every observer of this navigation's units.
    pub fn detach(&self) -> usize {
        self.units.iter().map(|u| u.detach_observers()).sum()
    }
}

impl<T: Clone + Send + 'static> Drop for LoadResult<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<T: Clone + Send + std::fmt::Debug + 'static> std::fmt::Debug for LoadResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadResult")
            .field("navigation_id", &self.navigation_id)
            .field("slots", &self.slots)
            .field("ready_after", &self.ready_after)
            .finish()
    }
}
