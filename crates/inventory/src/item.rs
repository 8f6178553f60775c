use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockpilot_core::{DomainError, DomainResult, Entity, FieldViolation, RecordId, UserId};

/// Tracked item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub RecordId);

impl ItemId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A tracked stock-keeping unit.
///
/// Stock and threshold are never negative; the SKU is immutable once created.
/// Mutation goes through the pipeline, never directly against stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    sku: String,
    name: String,
    barcode: Option<String>,
    stock: i64,
    threshold: i64,
    price_cents: u64,
    category: Option<String>,
    brand: Option<String>,
    expiry_date: Option<NaiveDate>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field set for creating an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
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

/// Partial update of an item. The SKU is intentionally absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub stock: Option<i64>,
    pub threshold: Option<i64>,
    pub price_cents: Option<u64>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl Item {
    /// Validate a draft and build the item.
    pub fn create(
        id: ItemId,
        draft: ItemDraft,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut violations = Vec::new();

        let sku = draft.sku.trim().to_string();
        if sku.is_empty() {
            violations.push(FieldViolation::new("sku", "must not be empty"));
        }
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            violations.push(FieldViolation::new("name", "must not be empty"));
        }
        if draft.stock < 0 {
            violations.push(FieldViolation::new("stock", "must not be negative"));
        }
        if draft.threshold < 0 {
            violations.push(FieldViolation::new("threshold", "must not be negative"));
        }

        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        Ok(Self {
            id,
            sku,
            name,
            barcode: draft.barcode,
            stock: draft.stock,
            threshold: draft.threshold,
            price_cents: draft.price_cents,
            category: draft.category,
            brand: draft.brand,
            expiry_date: draft.expiry_date,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a validated patch in place.
    pub fn apply_patch(&mut self, patch: &ItemPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut violations = Vec::new();

        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                violations.push(FieldViolation::new("name", "must not be empty"));
            }
        }
        if let Some(stock) = patch.stock {
            if stock < 0 {
                violations.push(FieldViolation::new("stock", "must not be negative"));
            }
        }
        if let Some(threshold) = patch.threshold {
            if threshold < 0 {
                violations.push(FieldViolation::new("threshold", "must not be negative"));
            }
        }

        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(barcode) = &patch.barcode {
            self.barcode = Some(barcode.clone());
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(threshold) = patch.threshold {
            self.threshold = threshold;
        }
        if let Some(price_cents) = patch.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(category) = &patch.category {
            self.category = Some(category.clone());
        }
        if let Some(brand) = &patch.brand {
            self.brand = Some(brand.clone());
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = Some(expiry_date);
        }

        self.updated_at = now;
        Ok(())
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn price_cents(&self) -> u64 {
        self.price_cents
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Current value of the stored stock (stock × unit price).
    pub fn stock_value_cents(&self) -> u64 {
        // Stock is validated non-negative, so the cast is lossless.
        self.price_cents.saturating_mul(self.stock as u64)
    }

    /// Case-insensitive match against name or SKU.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.sku.to_lowercase().contains(&needle)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            sku: "WM-001".to_string(),
            name: "Widget Mk I".to_string(),
            barcode: None,
            stock: 10,
            threshold: 5,
            price_cents: 1299,
            category: None,
            brand: None,
            expiry_date: None,
        }
    }

    fn new_item(draft: ItemDraft) -> DomainResult<Item> {
        Item::create(ItemId::new(RecordId::new()), draft, UserId::new(), Utc::now())
    }

    #[test]
    fn create_accepts_a_valid_draft() {
        let item = new_item(draft()).unwrap();
        assert_eq!(item.sku(), "WM-001");
        assert_eq!(item.stock(), 10);
        assert_eq!(item.threshold(), 5);
    }

    #[test]
    fn create_trims_sku_and_name() {
        let mut d = draft();
        d.sku = "  WM-001 ".to_string();
        d.name = " Widget Mk I  ".to_string();
        let item = new_item(d).unwrap();
        assert_eq!(item.sku(), "WM-001");
        assert_eq!(item.name(), "Widget Mk I");
    }

    #[test]
    fn create_collects_all_field_violations() {
        let mut d = draft();
        d.sku = "  ".to_string();
        d.stock = -3;
        d.threshold = -1;

        let err = new_item(d).unwrap_err();
        match err {
            DomainError::Validation(violations) => {
                let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["sku", "stock", "threshold"]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn patch_rejects_negative_stock_without_mutating() {
        let mut item = new_item(draft()).unwrap();
        let patch = ItemPatch {
            stock: Some(-1),
            name: Some("Renamed".to_string()),
            ..ItemPatch::default()
        };

        let err = item.apply_patch(&patch, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        // Nothing applied, not even the valid fields.
        assert_eq!(item.name(), "Widget Mk I");
        assert_eq!(item.stock(), 10);
    }

    #[test]
    fn patch_updates_only_provided_fields() {
        let mut item = new_item(draft()).unwrap();
        let patch = ItemPatch {
            stock: Some(3),
            ..ItemPatch::default()
        };

        item.apply_patch(&patch, Utc::now()).unwrap();
        assert_eq!(item.stock(), 3);
        assert_eq!(item.name(), "Widget Mk I");
        assert_eq!(item.threshold(), 5);
    }

    #[test]
    fn search_matches_name_and_sku_case_insensitively() {
        let item = new_item(draft()).unwrap();
        assert!(item.matches_search("widget"));
        assert!(item.matches_search("wm-0"));
        assert!(!item.matches_search("gizmo"));
    }

    #[test]
    fn stock_value_is_stock_times_price() {
        let item = new_item(draft()).unwrap();
        assert_eq!(item.stock_value_cents(), 12_990);
    }
}
