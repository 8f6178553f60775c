//! Alert storage with the one-unresolved-alert-per-item constraint.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use stockpilot_inventory::{Alert, AlertId, ItemId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlertStoreError {
    #[error("alert not found")]
    NotFound,

    #[error("alert store unavailable: {0}")]
    Unavailable(String),
}

/// Resolution-state filter for alert queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertStateFilter {
    #[default]
    Unresolved,
    Resolved,
    All,
}

/// Result of attempting to open an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The alert was stored; the caller should broadcast it.
    Opened(Alert),
    /// An unresolved alert already exists for the item; the new one was
    /// discarded and the existing one stands. Not an error.
    AlreadyOpen(Alert),
}

/// Storage seam for alerts.
///
/// The store, not its callers, owns the uniqueness rule: at most one alert
/// with `resolved = false` per item. `open` checks and inserts under one
/// write lock, so two racing opens can never both succeed even if the caller's
/// own serialization failed.
pub trait AlertStore: Send + Sync {
    fn open(&self, alert: Alert) -> Result<OpenOutcome, AlertStoreError>;

    fn get(&self, id: AlertId) -> Result<Option<Alert>, AlertStoreError>;

    /// Replace a stored alert after a lifecycle transition.
    fn update(&self, alert: Alert) -> Result<(), AlertStoreError>;

    /// Matching alerts, newest first.
    fn list(&self, state: AlertStateFilter) -> Result<Vec<Alert>, AlertStoreError>;

    /// Cascade used by item deletion: removes every alert (resolved or not)
    /// referencing the item, returning how many were dropped.
    fn remove_for_item(&self, item_id: ItemId) -> Result<usize, AlertStoreError>;
}

impl<A> AlertStore for Arc<A>
where
    A: AlertStore + ?Sized,
{
    fn open(&self, alert: Alert) -> Result<OpenOutcome, AlertStoreError> {
        (**self).open(alert)
    }

    fn get(&self, id: AlertId) -> Result<Option<Alert>, AlertStoreError> {
        (**self).get(id)
    }

    fn update(&self, alert: Alert) -> Result<(), AlertStoreError> {
        (**self).update(alert)
    }

    fn list(&self, state: AlertStateFilter) -> Result<Vec<Alert>, AlertStoreError> {
        (**self).list(state)
    }

    fn remove_for_item(&self, item_id: ItemId) -> Result<usize, AlertStoreError> {
        (**self).remove_for_item(item_id)
    }
}

/// In-memory alert store.
#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    alerts: RwLock<Vec<Alert>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for InMemoryAlertStore {
    fn open(&self, alert: Alert) -> Result<OpenOutcome, AlertStoreError> {
        let mut alerts = self
            .alerts
            .write()
            .map_err(|_| AlertStoreError::Unavailable("lock poisoned".to_string()))?;

        // Uniqueness on (item_id, resolved = false), checked and inserted
        // under the same write lock.
        if let Some(existing) = alerts
            .iter()
            .find(|a| a.item_id() == alert.item_id() && !a.is_resolved())
        {
            return Ok(OpenOutcome::AlreadyOpen(existing.clone()));
        }

        alerts.push(alert.clone());
        Ok(OpenOutcome::Opened(alert))
    }

    fn get(&self, id: AlertId) -> Result<Option<Alert>, AlertStoreError> {
        let alerts = self
            .alerts
            .read()
            .map_err(|_| AlertStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(alerts.iter().find(|a| a.id_typed() == id).cloned())
    }

    fn update(&self, alert: Alert) -> Result<(), AlertStoreError> {
        let mut alerts = self
            .alerts
            .write()
            .map_err(|_| AlertStoreError::Unavailable("lock poisoned".to_string()))?;

        let slot = alerts
            .iter_mut()
            .find(|a| a.id_typed() == alert.id_typed())
            .ok_or(AlertStoreError::NotFound)?;
        *slot = alert;
        Ok(())
    }

    fn list(&self, state: AlertStateFilter) -> Result<Vec<Alert>, AlertStoreError> {
        let alerts = self
            .alerts
            .read()
            .map_err(|_| AlertStoreError::Unavailable("lock poisoned".to_string()))?;

        let mut matched: Vec<Alert> = alerts
            .iter()
            .filter(|a| match state {
                AlertStateFilter::Unresolved => !a.is_resolved(),
                AlertStateFilter::Resolved => a.is_resolved(),
                AlertStateFilter::All => true,
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matched)
    }

    fn remove_for_item(&self, item_id: ItemId) -> Result<usize, AlertStoreError> {
        let mut alerts = self
            .alerts
            .write()
            .map_err(|_| AlertStoreError::Unavailable("lock poisoned".to_string()))?;

        let before = alerts.len();
        alerts.retain(|a| a.item_id() != item_id);
        Ok(before - alerts.len())
    }
}
