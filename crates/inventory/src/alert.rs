use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpilot_core::{DomainError, DomainResult, Entity, RecordId};

use crate::item::{Item, ItemId};

/// Alert identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub RecordId);

impl AlertId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AlertId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowStock,
    Reorder,
    Other,
}

/// The sole trigger for opening a new alert: the post-mutation stock sits at or
/// below the threshold AND the mutation moved stock downward. An item that
/// merely *is* low does not re-trigger on every edit.
pub fn crossed_threshold(old_stock: i64, new_stock: i64, threshold: i64) -> bool {
    new_stock <= threshold && old_stock > new_stock
}

/// A detected low-stock condition for one item.
///
/// At most one unresolved alert exists per item at any time; the storage layer
/// owns that uniqueness. Resolution is explicit and irreversible; restocking
/// does not resolve an alert on its own. The PO flag is orthogonal to
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    id: AlertId,
    item_id: ItemId,
    kind: AlertKind,
    message: String,
    resolved: bool,
    po_generated: bool,
    created_at: DateTime<Utc>,
}

impl Alert {
    /// Open a low-stock alert for an item, capturing its post-mutation state.
    pub fn low_stock(item: &Item, now: DateTime<Utc>) -> Self {
        Self {
            id: AlertId::new(RecordId::new()),
            item_id: item.id_typed(),
            kind: AlertKind::LowStock,
            message: format!(
                "Low stock for {}. Current stock: {}, Threshold: {}",
                item.name(),
                item.stock(),
                item.threshold()
            ),
            resolved: false,
            po_generated: false,
            created_at: now,
        }
    }

    /// Mark the alert resolved. Idempotent; resolution never reverts.
    pub fn resolve(&mut self) {
        self.resolved = true;
    }

    /// Flag that a purchase order was generated for this alert.
    ///
    /// Generating twice is a conflict; the flag does not resolve the alert.
    pub fn mark_po_generated(&mut self) -> DomainResult<()> {
        if self.po_generated {
            return Err(DomainError::conflict(
                "purchase order already generated for this alert",
            ));
        }
        self.po_generated = true;
        Ok(())
    }

    pub fn id_typed(&self) -> AlertId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn po_generated(&self) -> bool {
        self.po_generated
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Alert {
    type Id = AlertId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
