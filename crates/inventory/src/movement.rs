use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpilot_core::{DomainError, RecordId, UserId};

use crate::item::ItemId;

/// Audit record identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(pub RecordId);

impl MovementId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What kind of stock-affecting event a movement describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    Create,
    Restock,
    Sale,
    Adjustment,
    Delete,
    Transfer,
}

impl MovementKind {
    /// Classify a plain stock-level change.
    ///
    /// Stock-neutral edits produce no movement at all, so `None` here means
    /// "write nothing". Whole-item create/delete never go through this path;
    /// the orchestrator passes those kinds explicitly.
    pub fn classify(old_stock: i64, new_stock: i64) -> Option<Self> {
        if new_stock > old_stock {
            Some(MovementKind::Restock)
        } else if new_stock < old_stock {
            Some(MovementKind::Sale)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Create => "Create",
            MovementKind::Restock => "Restock",
            MovementKind::Sale => "Sale",
            MovementKind::Adjustment => "Adjustment",
            MovementKind::Delete => "Delete",
            MovementKind::Transfer => "Transfer",
        }
    }
}

impl core::str::FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(MovementKind::Create),
            "restock" => Ok(MovementKind::Restock),
            "sale" => Ok(MovementKind::Sale),
            "adjustment" => Ok(MovementKind::Adjustment),
            "delete" => Ok(MovementKind::Delete),
            "transfer" => Ok(MovementKind::Transfer),
            other => Err(DomainError::validation(
                "action",
                format!("unknown movement kind '{other}'"),
            )),
        }
    }
}

/// One append-only audit entry describing a stock-affecting event.
///
/// `new_stock = old_stock + quantity` holds for every record; constructors
/// derive `quantity` from the before/after pair so the invariant cannot be
/// broken by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: MovementId,
    pub item_id: ItemId,
    pub actor: UserId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub old_stock: i64,
    pub new_stock: i64,
    pub recorded_at: DateTime<Utc>,
}

impl MovementRecord {
    fn build(
        item_id: ItemId,
        actor: UserId,
        kind: MovementKind,
        old_stock: i64,
        new_stock: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::new(RecordId::new()),
            item_id,
            actor,
            kind,
            quantity: new_stock - old_stock,
            old_stock,
            new_stock,
            recorded_at,
        }
    }

    /// Record for a freshly created item (`old_stock` is zero by definition).
    pub fn creation(
        item_id: ItemId,
        actor: UserId,
        initial_stock: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self::build(
            item_id,
            actor,
            MovementKind::Create,
            0,
            initial_stock,
            recorded_at,
        )
    }

    /// Record for a whole-item deletion (`new_stock` is zero by convention).
    pub fn deletion(
        item_id: ItemId,
        actor: UserId,
        old_stock: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self::build(item_id, actor, MovementKind::Delete, old_stock, 0, recorded_at)
    }

    /// Classify and record a stock-level change; `None` when stock is unchanged.
    pub fn stock_change(
        item_id: ItemId,
        actor: UserId,
        old_stock: i64,
        new_stock: i64,
        recorded_at: DateTime<Utc>,
    ) -> Option<Self> {
        MovementKind::classify(old_stock, new_stock)
            .map(|kind| Self::build(item_id, actor, kind, old_stock, new_stock, recorded_at))
    }
}
