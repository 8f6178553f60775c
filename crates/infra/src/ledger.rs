//! Item ledger: the single state holder for tracked items.
//!
//! The ledger is a pure state holder. It must not write movement or alert
//! records itself; that keeps the failure domains separate and leaves
//! sequencing to the pipeline.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use stockpilot_core::{DomainError, DomainResult};
use stockpilot_inventory::{Item, ItemId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("item not found")]
    NotFound,

    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    /// The mutator rejected the change; stored state is untouched.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error("item store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for item state.
///
/// `apply_mutation` runs the mutator atomically against the stored record and
/// returns both the pre- and post-mutation snapshots, so downstream components
/// can compute deltas without re-reading.
pub trait ItemLedger: Send + Sync {
    fn insert(&self, item: Item) -> Result<(), LedgerError>;

    fn get(&self, id: ItemId) -> Result<Option<Item>, LedgerError>;

    fn list(&self) -> Result<Vec<Item>, LedgerError>;

    fn apply_mutation<F>(&self, id: ItemId, mutate: F) -> Result<(Item, Item), LedgerError>
    where
        F: FnOnce(&mut Item) -> DomainResult<()>;

    /// Remove an item, returning its last snapshot (needed to audit the
    /// deletion).
    fn remove(&self, id: ItemId) -> Result<Item, LedgerError>;
}

impl<L> ItemLedger for Arc<L>
where
    L: ItemLedger + ?Sized,
{
    fn insert(&self, item: Item) -> Result<(), LedgerError> {
        (**self).insert(item)
    }

    fn get(&self, id: ItemId) -> Result<Option<Item>, LedgerError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Item>, LedgerError> {
        (**self).list()
    }

    fn apply_mutation<F>(&self, id: ItemId, mutate: F) -> Result<(Item, Item), LedgerError>
    where
        F: FnOnce(&mut Item) -> DomainResult<()>,
    {
        (**self).apply_mutation(id, mutate)
    }

    fn remove(&self, id: ItemId) -> Result<Item, LedgerError> {
        (**self).remove(id)
    }
}

/// In-memory item ledger.
///
/// Intended for tests/dev and single-node deployments. Not optimized for
/// large catalogs.
#[derive(Debug, Default)]
pub struct InMemoryItemLedger {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl InMemoryItemLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemLedger for InMemoryItemLedger {
    fn insert(&self, item: Item) -> Result<(), LedgerError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;

        // SKU is the external identity; enforce uniqueness before keying by id.
        if items.values().any(|existing| existing.sku() == item.sku()) {
            return Err(LedgerError::DuplicateSku(item.sku().to_string()));
        }

        items.insert(item.id_typed(), item);
        Ok(())
    }

    fn get(&self, id: ItemId) -> Result<Option<Item>, LedgerError> {
        let items = self
            .items
            .read()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;
        Ok(items.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Item>, LedgerError> {
        let items = self
            .items
            .read()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;
        Ok(items.values().cloned().collect())
    }

    fn apply_mutation<F>(&self, id: ItemId, mutate: F) -> Result<(Item, Item), LedgerError>
    where
        F: FnOnce(&mut Item) -> DomainResult<()>,
    {
        let mut items = self
            .items
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;

        let stored = items.get_mut(&id).ok_or(LedgerError::NotFound)?;

        // Mutate a scratch copy so a rejected change leaves stored state as-is.
        let old = stored.clone();
        let mut candidate = stored.clone();
        mutate(&mut candidate)?;
        *stored = candidate.clone();

        Ok((old, candidate))
    }

    fn remove(&self, id: ItemId) -> Result<Item, LedgerError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;
        items.remove(&id).ok_or(LedgerError::NotFound)
    }
}
