//! Real-time notice payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpilot_inventory::{Alert, AlertId, AlertKind, Item, ItemId};

/// Topic all dashboard sessions subscribe to.
pub const LOW_STOCK_TOPIC: &str = "low_stock_alert";

/// Denormalized "low-stock alert raised" payload.
///
/// Mirrors the persisted alert plus the minimal item fields a consumer needs,
/// so subscribers never have to issue a follow-up read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertNotice {
    pub alert_id: AlertId,
    pub item_id: ItemId,
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,

    pub item_name: String,
    pub sku: String,
    pub stock: i64,
    pub threshold: i64,
}

impl AlertNotice {
    /// Snapshot an alert together with its item's post-mutation state.
    pub fn from_parts(alert: &Alert, item: &Item) -> Self {
        Self {
            alert_id: alert.id_typed(),
            item_id: alert.item_id(),
            kind: alert.kind(),
            message: alert.message().to_string(),
            created_at: alert.created_at(),
            item_name: item.name().to_string(),
            sku: item.sku().to_string(),
            stock: item.stock(),
            threshold: item.threshold(),
        }
    }
}
