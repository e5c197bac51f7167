//! Load plan declaration.

use std::collections::HashSet;
use std::future::Future;

use defer_data::{AsyncUnit, UnitMode};
use tokio::time::Instant;

use crate::error::PlanError;

/// The units one navigation starts.
///
/// Declaration order is kept for addressing results; it has no effect on
/// when units start or finish.
#[derive(Debug)]
pub struct LoadPlan<T> {
    units: Vec<AsyncUnit<T>>,
    created_at: Instant,
}

impl<T: Clone + Send + 'static> LoadPlan<T> {
    /// Start declaring a plan.
    pub fn builder() -> LoadPlanBuilder<T> {
        LoadPlanBuilder::new()
    }

    /// Units in declaration order.
    pub fn units(&self) -> &[AsyncUnit<T>] {
        &self.units
    }

    /// Look up a unit by id.
    pub fn get(&self, id: &str) -> Option<&AsyncUnit<T>> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Ids of the eager units, in declaration order.
    pub fn eager_ids(&self) -> Vec<&str> {
        self.ids_with(UnitMode::Eager)
    }

    /// Ids of the deferred units, in declaration order.
    pub fn deferred_ids(&self) -> Vec<&str> {
        self.ids_with(UnitMode::Deferred)
    }

    fn ids_with(&self, mode: UnitMode) -> Vec<&str> {
        self.units
            .iter()
            .filter(|u| u.mode() == mode)
            .map(|u| u.id())
            .collect()
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the plan declares no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Instant shared by every unit as its start time.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub(crate) fn into_units(self) -> Vec<AsyncUnit<T>> {
        self.units
    }
}

/// Builder for ergonomic plan declaration.
pub struct LoadPlanBuilder<T> {
    units: Vec<AsyncUnit<T>>,
    ids: HashSet<String>,
    error: Option<PlanError>,
    created_at: Instant,
}

impl<T: Clone + Send + 'static> LoadPlanBuilder<T> {
    /// Create a new plan builder.
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            ids: HashSet::new(),
            error: None,
            created_at: Instant::now(),
        }
    }

    /// Add a unit the page must wait for.
    pub fn eager<F, Fut>(self, id: impl Into<String>, compute: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.unit(id, UnitMode::Eager, compute)
    }

    /// Add a unit observed later through a handle.
    pub fn deferred<F, Fut>(self, id: impl Into<String>, compute: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.unit(id, UnitMode::Deferred, compute)
    }

    /// Add a unit with an explicit mode.
    pub fn unit<F, Fut>(mut self, id: impl Into<String>, mode: UnitMode, compute: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        if self.error.is_some() {
            return self;
        }

        let id = id.into();
        if id.is_empty() {
            self.error = Some(PlanError::EmptyId);
        } else if !self.ids.insert(id.clone()) {
            self.error = Some(PlanError::DuplicateUnit(id));
        } else {
            self.units
                .push(AsyncUnit::new(id, mode, compute).at(self.created_at));
        }
        self
    }

    /// Build the plan, reporting the first declaration error.
    pub fn build(self) -> Result<LoadPlan<T>, PlanError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(LoadPlan {
            units: self.units,
            created_at: self.created_at,
        })
    }
}

impl<T: Clone + Send + 'static> Default for LoadPlanBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preserves_declaration_order() {
        let plan = LoadPlan::builder()
            .deferred("deferredStuff", || async { Ok(1) })
            .eager("person", || async { Ok(2) })
            .deferred("deferredPerson", || async { Ok(3) })
            .build()
            .unwrap();

        let ids: Vec<&str> = plan.units().iter().map(|u| u.id()).collect();
        assert_eq!(ids, vec!["deferredStuff", "person", "deferredPerson"]);
        assert_eq!(plan.eager_ids(), vec!["person"]);
        assert_eq!(plan.deferred_ids(), vec!["deferredStuff", "deferredPerson"]);
        assert!(plan.units().iter().all(|u| u.started_at() == plan.created_at()));
        assert!(plan.units().iter().all(|u| !u.is_started()));
    }

    #[tokio::test]
    async fn test_rejects_duplicate_ids() {
        let result = LoadPlan::builder()
            .eager("person", || async { Ok(1) })
            .deferred("person", || async { Ok(2) })
            .build();
        assert_eq!(
            result.unwrap_err(),
            PlanError::DuplicateUnit("person".to_string())
        );
    }

    #[tokio::test]
    async fn test_rejects_empty_id() {
        let result = LoadPlan::<u8>::builder()
            .eager("", || async { Ok(1) })
            .build();
        assert_eq!(result.unwrap_err(), PlanError::EmptyId);
    }
}
