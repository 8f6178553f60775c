//! Request/response DTOs and JSON mapping helpers.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use stockpilot_infra::{AlertWithItem, DailyActivity, InventorySummary};
use stockpilot_inventory::{Item, ItemDraft, ItemPatch, MovementRecord};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    pub barcode: Option<String>,
    pub stock: i64,
    pub threshold: i64,
    pub price_cents: u64,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl CreateItemRequest {
    pub fn into_draft(self) -> ItemDraft {
        ItemDraft {
            sku: self.sku,
            name: self.name,
            barcode: self.barcode,
            stock: self.stock,
            threshold: self.threshold,
            price_cents: self.price_cents,
            category: self.category,
            brand: self.brand,
            expiry_date: self.expiry_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub stock: Option<i64>,
    pub threshold: Option<i64>,
    pub price_cents: Option<u64>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl UpdateItemRequest {
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name,
            barcode: self.barcode,
            stock: self.stock,
            threshold: self.threshold,
            price_cents: self.price_cents,
            category: self.category,
            brand: self.brand,
            expiry_date: self.expiry_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementListParams {
    pub item_name: Option<String>,
    /// Acting user id (uuid).
    pub actor: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    /// "true", "all", or absent (unresolved only).
    pub resolved: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StockActivityParams {
    pub days: Option<u32>,
}

pub fn item_to_json(item: &Item) -> JsonValue {
    json!({
        "id": item.id_typed().to_string(),
        "sku": item.sku(),
        "name": item.name(),
        "barcode": item.barcode(),
        "stock": item.stock(),
        "threshold": item.threshold(),
        "price_cents": item.price_cents(),
        "category": item.category(),
        "brand": item.brand(),
        "expiry_date": item.expiry_date(),
        "created_by": item.created_by().to_string(),
        "created_at": item.created_at(),
        "updated_at": item.updated_at(),
    })
}

pub fn movement_to_json(record: &MovementRecord) -> JsonValue {
    json!({
        "id": record.id.to_string(),
        "item_id": record.item_id.to_string(),
        "actor": record.actor.to_string(),
        "action": record.kind.as_str(),
        "quantity": record.quantity,
        "old_stock": record.old_stock,
        "new_stock": record.new_stock,
        "recorded_at": record.recorded_at,
    })
}

pub fn alert_to_json(entry: &AlertWithItem) -> JsonValue {
    json!({
        "id": entry.alert.id_typed().to_string(),
        "item_id": entry.alert.item_id().to_string(),
        "type": entry.alert.kind(),
        "message": entry.alert.message(),
        "resolved": entry.alert.is_resolved(),
        "po_generated": entry.alert.po_generated(),
        "created_at": entry.alert.created_at(),
        "item": entry.item.as_ref().map(|item| json!({
            "name": item.name(),
            "sku": item.sku(),
            "stock": item.stock(),
            "threshold": item.threshold(),
        })),
    })
}

pub fn summary_to_json(summary: &InventorySummary) -> JsonValue {
    json!({
        "total_items": summary.total_items,
        "low_stock_count": summary.low_stock_count,
        "inventory_value_cents": summary.inventory_value_cents,
    })
}

pub fn activity_to_json(days: &[DailyActivity]) -> JsonValue {
    json!(days
        .iter()
        .map(|d| json!({
            "date": d.date,
            "net_change": d.net_change,
            "movements": d.movements,
        }))
        .collect::<Vec<_>>())
}
