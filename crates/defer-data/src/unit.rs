//! Named asynchronous computations.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cell::UnitCell;
use crate::error::UnitError;
use crate::handle::{PendingHandle, Subscription};
use crate::state::ExecutionState;

/// Whether page readiness waits for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// The page is not ready until this unit resolves.
    Eager,
    /// Started with the page, observed later through a handle.
    Deferred,
}

impl UnitMode {
    /// Get the name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Deferred => "deferred",
        }
    }
}

impl std::fmt::Display for UnitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

type ComputeFn<T> = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<T>> + Send>;

/// A named computation producing a `T` exactly once.
///
/// The unit owns its state cell; handles handed out by [`AsyncUnit::handle`]
/// only observe it.
pub struct AsyncUnit<T> {
    mode: UnitMode,
    started_at: Instant,
    cell: Arc<UnitCell<T>>,
    compute: Mutex<Option<ComputeFn<T>>>,
}

impl<T: Clone + Send + 'static> AsyncUnit<T> {
    /// Create a unit from an async closure.
    pub fn new<F, Fut>(id: impl Into<String>, mode: UnitMode, compute: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            mode,
            started_at: Instant::now(),
            cell: Arc::new(UnitCell::new(id.into())),
            compute: Mutex::new(Some(Box::new(move || compute().boxed()))),
        }
    }

    /// Set the start instant (shared by every unit of a plan).
    pub fn at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    /// Get the unit id.
    pub fn id(&self) -> &str {
        self.cell.id()
    }

    /// Get the unit mode.
    pub fn mode(&self) -> UnitMode {
        self.mode
    }

    /// Instant the unit's plan was created.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time from start to the terminal transition, once settled.
    pub fn settle_duration(&self) -> Option<Duration> {
        self.cell
            .settled_at()
            .map(|t| t.saturating_duration_since(self.started_at))
    }

    /// Whether `start` has been called.
    pub fn is_started(&self) -> bool {
        self.compute
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Start the computation on the tokio runtime.
    ///
    /// Returns immediately. Subscribers are never notified from within this
    /// call. A second call is rejected with `UnitError::AlreadyStarted`.
    pub fn start(&self) -> Result<(), UnitError> {
        let compute = self
            .compute
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(compute) = compute else {
            warn!(unit = %self.id(), "unit started more than once");
            return Err(UnitError::AlreadyStarted(self.id().to_string()));
        };

        debug!(unit = %self.id(), mode = %self.mode, "starting unit");

        let cell = Arc::clone(&self.cell);
        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(async move { compute().await })
                .catch_unwind()
                .await;
            let unit = cell.id().to_string();
            let terminal = match outcome {
                Ok(Ok(value)) => ExecutionState::Resolved(value),
                Ok(Err(error)) => ExecutionState::Failed(UnitError::ComputationFailure {
                    unit,
                    message: format!("{:#}", error),
                }),
                Err(payload) => ExecutionState::Failed(UnitError::Panicked {
                    unit,
                    message: panic_message(payload.as_ref()),
                }),
            };

            if let Some(error) = terminal.error() {
                warn!(unit = %cell.id(), error = %error, "unit failed");
            } else {
                debug!(unit = %cell.id(), "unit resolved");
            }
            cell.settle(terminal);
        });
        self.cell.set_abort(task.abort_handle());

        Ok(())
    }

    /// Current state snapshot. Never blocks on the computation.
    pub fn state(&self) -> ExecutionState<T> {
        self.cell.snapshot()
    }

    /// Subscribe to the terminal transition.
    pub fn subscribe<F>(&self, on_terminal: F) -> Subscription<T>
    where
        F: FnOnce(ExecutionState<T>) + Send + 'static,
    {
        self.handle().subscribe(on_terminal)
    }

    /// Wait for the terminal state.
    pub async fn settled(&self) -> ExecutionState<T> {
        self.handle().settled().await
    }

    /// Create a non-owning handle to this unit's state.
    pub fn handle(&self) -> PendingHandle<T> {
        PendingHandle::new(self.id(), Arc::downgrade(&self.cell))
    }

    /// Type-erased control used to supersede a navigation.
    pub fn control(&self) -> Weak<dyn UnitControl> {
        let cell: Arc<dyn UnitControl> = self.cell.clone();
        Arc::downgrade(&cell)
    }

    /// Drop every subscriber without notifying it.
    pub fn detach_observers(&self) -> usize {
        self.cell.detach()
    }
}

impl<T> std::fmt::Debug for AsyncUnit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncUnit")
            .field("id", &self.cell.id())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Operations on a unit that do not depend on its value type.
pub trait UnitControl: Send + Sync {
    /// Unit id.
    fn unit_id(&self) -> &str;

    /// Whether the unit is still pending.
    fn is_pending(&self) -> bool;

    /// Drop all subscribers without notifying them. Returns how many.
    fn detach(&self) -> usize;

    /// Settle a pending unit as `Cancelled` and abort its task.
    ///
    /// Returns false if the unit had already settled.
    fn cancel(&self) -> bool;
}

impl<T: Clone + Send + 'static> UnitControl for UnitCell<T> {
    fn unit_id(&self) -> &str {
        self.id()
    }

    fn is_pending(&self) -> bool {
        UnitCell::is_pending(self)
    }

    fn detach(&self) -> usize {
        UnitCell::detach(self)
    }

    fn cancel(&self) -> bool {
        let abort = self.take_abort();
        let cancelled = self.settle(ExecutionState::Failed(UnitError::Cancelled(
            self.id().to_string(),
        )));
        if cancelled {
            if let Some(abort) = abort {
                abort.abort();
            }
            debug!(unit = %self.id(), "unit cancelled");
        }
        cancelled
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
