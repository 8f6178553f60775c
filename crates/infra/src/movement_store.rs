//! Append-only movement log storage.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockpilot_core::UserId;
use stockpilot_inventory::{ItemId, MovementKind, MovementRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MovementStoreError {
    #[error("movement store unavailable: {0}")]
    Unavailable(String),
}

/// Filter for movement queries. All fields are conjunctive; `None` matches
/// everything. The time range is inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub item_ids: Option<Vec<ItemId>>,
    pub actor: Option<UserId>,
    pub kind: Option<MovementKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl MovementFilter {
    fn matches(&self, record: &MovementRecord) -> bool {
        if let Some(item_ids) = &self.item_ids {
            if !item_ids.contains(&record.item_id) {
                return false;
            }
        }
        if let Some(actor) = self.actor {
            if record.actor != actor {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(from) = self.from {
            if record.recorded_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.recorded_at > to {
                return false;
            }
        }
        true
    }
}

/// Storage seam for the audit trail.
///
/// Records are append-only: nothing here updates or deletes, and records
/// survive deletion of the item they describe. An append must be durable
/// before the pipeline acknowledges the caller.
pub trait MovementStore: Send + Sync {
    fn append(&self, record: MovementRecord) -> Result<(), MovementStoreError>;

    /// Matching records, newest first.
    fn query(&self, filter: &MovementFilter) -> Result<Vec<MovementRecord>, MovementStoreError>;
}

impl<M> MovementStore for Arc<M>
where
    M: MovementStore + ?Sized,
{
    fn append(&self, record: MovementRecord) -> Result<(), MovementStoreError> {
        (**self).append(record)
    }

    fn query(&self, filter: &MovementFilter) -> Result<Vec<MovementRecord>, MovementStoreError> {
        (**self).query(filter)
    }
}

/// In-memory append-only movement log.
#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    records: RwLock<Vec<MovementRecord>>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MovementStore for InMemoryMovementStore {
    fn append(&self, record: MovementRecord) -> Result<(), MovementStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| MovementStoreError::Unavailable("lock poisoned".to_string()))?;
        records.push(record);
        Ok(())
    }

    fn query(&self, filter: &MovementFilter) -> Result<Vec<MovementRecord>, MovementStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| MovementStoreError::Unavailable("lock poisoned".to_string()))?;

        let mut matched: Vec<MovementRecord> = records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(matched)
    }
}
