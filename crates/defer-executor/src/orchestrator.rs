//! Navigation load orchestration.

use std::sync::{Mutex, MutexGuard, PoisonError, Weak};

use defer_core::{NavigationId, OrchestratorConfig};
use defer_data::{AsyncUnit, ExecutionState, UnitControl, UnitError, UnitMode};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::plan::LoadPlan;
use crate::result::{LoadResult, Slot};

/// Units of the navigation currently being loaded or shown.
struct ActiveNavigation {
    id: NavigationId,
    units: Vec<Weak<dyn UnitControl>>,
}

/// Runs load plans: starts every unit, waits only for eager ones.
///
/// At most one navigation is current. Starting a new one supersedes the
/// previous navigation, which stops being observed.
pub struct LoadOrchestrator {
    config: OrchestratorConfig,
    current: Mutex<Option<ActiveNavigation>>,
}

impl LoadOrchestrator {
    /// Create an orchestrator.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run a plan under a freshly generated navigation id.
    pub async fn run<T>(&self, plan: LoadPlan<T>) -> Result<LoadResult<T>, LoadError>
    where
        T: Clone + Send + 'static,
    {
        self.run_navigation(NavigationId::generate(), plan).await
    }

    /// Run a plan for a given navigation.
    ///
    /// Resolves once every eager unit resolved, failing as soon as one of
    /// them fails. Deferred units keep running in the background and are
    /// returned as pending handles.
    pub async fn run_navigation<T>(
        &self,
        navigation_id: NavigationId,
        plan: LoadPlan<T>,
    ) -> Result<LoadResult<T>, LoadError>
    where
        T: Clone + Send + 'static,
    {
        let created_at = plan.created_at();
        let units = plan.into_units();

        self.supersede(Some(ActiveNavigation {
            id: navigation_id,
            units: units.iter().map(|u| u.control()).collect(),
        }));

        for unit in &units {
            unit.start()?;
        }

        let eager_count = units.iter().filter(|u| u.mode() == UnitMode::Eager).count();
        info!(
            navigation = %navigation_id,
            units = units.len(),
            eager = eager_count,
            "navigation started"
        );

        let outcome = match self.config.eager_deadline() {
            Some(deadline) => tokio::time::timeout(deadline, await_eager(&units))
                .await
                .unwrap_or(Err(LoadError::DeadlineExceeded(deadline))),
            None => await_eager(&units).await,
        };

        if !self.is_current(navigation_id) {
            debug!(navigation = %navigation_id, "navigation superseded while loading");
            return Err(LoadError::Superseded(navigation_id));
        }

        let slots = match outcome.and_then(|()| ready_slots(&units)) {
            Ok(slots) => slots,
            Err(error) => {
                warn!(navigation = %navigation_id, error = %error, "navigation failed");
                self.release(navigation_id);
                return Err(error);
            }
        };

        let ready_after = created_at.elapsed();
        info!(
            navigation = %navigation_id,
            ready_ms = ready_after.as_millis() as u64,
            "navigation ready"
        );

        Ok(LoadResult::new(navigation_id, slots, units, ready_after))
    }

    /// Whether `id` is still the current navigation.
    pub fn is_current(&self, id: NavigationId) -> bool {
        self.lock().as_ref().map(|nav| nav.id) == Some(id)
    }

    /// The current navigation, if any.
    pub fn current_navigation(&self) -> Option<NavigationId> {
        self.lock().as_ref().map(|nav| nav.id)
    }

    /// Drop interest in the current navigation.
    pub fn cancel_current(&self) {
        self.supersede(None);
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveNavigation>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retire a navigation that failed to become ready, if still current.
    fn release(&self, id: NavigationId) {
        let failed = {
            let mut current = self.lock();
            if current.as_ref().map(|nav| nav.id) != Some(id) {
                return;
            }
            current.take()
        };
        if let Some(failed) = failed {
            let (detached, cancelled) = self.retire(&failed);
            debug!(navigation = %id, detached, cancelled, "failed navigation released");
        }
    }

    fn supersede(&self, next: Option<ActiveNavigation>) {
        let previous = std::mem::replace(&mut *self.lock(), next);
        let Some(previous) = previous else {
            return;
        };

        let (detached, cancelled) = self.retire(&previous);
        info!(
            navigation = %previous.id,
            detached,
            cancelled,
            "navigation superseded"
        );
    }

    /// Stop observing a navigation's units, cancelling them when configured.
    ///
    /// Returns how many subscribers were detached and units cancelled.
    fn retire(&self, navigation: &ActiveNavigation) -> (usize, usize) {
        let mut detached = 0;
        let mut cancelled = 0;
        for unit in navigation.units.iter().filter_map(Weak::upgrade) {
            detached += unit.detach();
            if self.config.abort_on_supersede && unit.cancel() {
                cancelled += 1;
            }
        }
        (detached, cancelled)
    }
}

impl Default for LoadOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

/// Collect the slots of a navigation whose eager units all resolved.
fn ready_slots<T>(units: &[AsyncUnit<T>]) -> Result<Vec<(String, Slot<T>)>, LoadError>
where
    T: Clone + Send + 'static,
{
    let mut slots = Vec::with_capacity(units.len());
    for unit in units {
        let slot = match unit.mode() {
            UnitMode::Deferred => Slot::Pending(unit.handle()),
            UnitMode::Eager => match unit.state() {
                ExecutionState::Resolved(value) => Slot::Ready(value),
                ExecutionState::Failed(source) => {
                    return Err(LoadError::Eager {
                        unit: unit.id().to_string(),
                        source,
                    })
                }
                ExecutionState::Pending => {
                    return Err(LoadError::Eager {
                        unit: unit.id().to_string(),
                        source: UnitError::Cancelled(unit.id().to_string()),
                    })
                }
            },
        };
        slots.push((unit.id().to_string(), slot));
    }
    Ok(slots)
}

/// Wait for every eager unit, failing on the first failure observed.
///
/// When several eager units have failed by the time the first failure is
/// seen, the earliest-declared one is reported.
async fn await_eager<T>(units: &[AsyncUnit<T>]) -> Result<(), LoadError>
where
    T: Clone + Send + 'static,
{
    let eager: Vec<&AsyncUnit<T>> = units
        .iter()
        .filter(|u| u.mode() == UnitMode::Eager)
        .collect();

    let mut pending: FuturesUnordered<_> = eager
        .iter()
        .map(|&unit| async move { (unit.id(), unit.settled().await) })
        .collect();

    while let Some((id, state)) = pending.next().await {
        let ExecutionState::Failed(observed) = state else {
            continue;
        };

        let (unit, source) = eager
            .iter()
            .find_map(|u| match u.state() {
                ExecutionState::Failed(error) => Some((u.id(), error)),
                _ => None,
            })
            .unwrap_or((id, observed));

        return Err(LoadError::Eager {
            unit: unit.to_string(),
            source,
        });
    }

    Ok(())
}
