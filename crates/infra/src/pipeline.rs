//! Mutation pipeline (application-level orchestration).
//!
//! Every stock-affecting operation runs through here and nowhere else:
//!
//! ```text
//! capability check
//!   ↓
//! ledger mutation          (per-item critical section begins)
//!   ↓
//! movement append          (must succeed before the caller is acknowledged)
//!   ↓
//! alert check / open       (per-item critical section ends)
//!   ↓
//! notice publish           (fire-and-forget, outside the critical section)
//! ```
//!
//! The ledger mutation and the unresolved-alert check for one item are
//! serialized behind a per-item lock, so two concurrent threshold crossings
//! can never both open an alert. The alert store's own uniqueness rule backs
//! this up; a violation there is treated as "alert already exists, skip".
//!
//! A failure after the ledger commit (movement append, alert write) is
//! surfaced as an error without undoing the ledger change. Compensation could
//! itself fail and the audit trail must never claim a change that did not
//! happen, so partial writes are left as-is and reported.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use stockpilot_auth::{authorize, capability, Actor, AuthzError, Capability};
use stockpilot_core::{DomainError, FieldViolation, RecordId, UserId};
use stockpilot_events::{AlertNotice, EventBus, LOW_STOCK_TOPIC};
use stockpilot_inventory::{
    crossed_threshold, Alert, AlertId, Item, ItemDraft, ItemId, ItemPatch, MovementKind,
    MovementRecord,
};

use crate::alert_store::{AlertStore, AlertStoreError, AlertStateFilter, OpenOutcome};
use crate::ledger::{ItemLedger, LedgerError};
use crate::movement_store::{MovementFilter, MovementStore, MovementStoreError};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The actor lacks the capability for this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// One or more request fields failed validation.
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    /// SKU collision on create.
    #[error("duplicate sku: {0}")]
    DuplicateIdentity(String),

    /// Unknown item or alert id.
    #[error("not found")]
    NotFound,

    /// Deterministic state conflict (e.g. PO already generated).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage unavailable during a ledger/audit/alert write. Fatal to the
    /// current request; completed writes are left as-is.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<DomainError> for PipelineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(violations) => PipelineError::Validation(violations),
            DomainError::DuplicateIdentity(msg) => PipelineError::DuplicateIdentity(msg),
            DomainError::InvariantViolation(msg) => PipelineError::Conflict(msg),
            DomainError::InvalidId(msg) => {
                PipelineError::Validation(vec![FieldViolation::new("id", msg)])
            }
            DomainError::NotFound => PipelineError::NotFound,
            DomainError::Conflict(msg) => PipelineError::Conflict(msg),
            DomainError::Forbidden(cap) => PipelineError::Forbidden(cap),
        }
    }
}

impl From<AuthzError> for PipelineError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden(cap) => PipelineError::Forbidden(cap),
        }
    }
}

impl From<LedgerError> for PipelineError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotFound => PipelineError::NotFound,
            LedgerError::DuplicateSku(sku) => PipelineError::DuplicateIdentity(sku),
            LedgerError::Rejected(domain) => domain.into(),
            LedgerError::Unavailable(msg) => PipelineError::Persistence(msg),
        }
    }
}

impl From<MovementStoreError> for PipelineError {
    fn from(value: MovementStoreError) -> Self {
        match value {
            MovementStoreError::Unavailable(msg) => PipelineError::Persistence(msg),
        }
    }
}

impl From<AlertStoreError> for PipelineError {
    fn from(value: AlertStoreError) -> Self {
        match value {
            AlertStoreError::NotFound => PipelineError::NotFound,
            AlertStoreError::Unavailable(msg) => PipelineError::Persistence(msg),
        }
    }
}

/// Per-item mutual exclusion registry.
///
/// Cross-item operations are independent, so each item gets its own gate. A
/// gate is held across ledger-mutate → record → alert-check/create.
#[derive(Debug, Default)]
struct ItemLocks {
    gates: Mutex<HashMap<ItemId, Arc<Mutex<()>>>>,
}

impl ItemLocks {
    fn gate(&self, id: ItemId) -> Result<Arc<Mutex<()>>, PipelineError> {
        let mut gates = self
            .gates
            .lock()
            .map_err(|_| PipelineError::Persistence("item lock registry poisoned".to_string()))?;
        Ok(gates.entry(id).or_default().clone())
    }
}

/// Query parameters for the movement log surface.
#[derive(Debug, Clone, Default)]
pub struct MovementLogQuery {
    /// Case-insensitive item name (or SKU) fragment.
    pub item_name: Option<String>,
    pub actor: Option<UserId>,
    pub kind: Option<MovementKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// An alert together with its item's current state (when the item still
/// exists), as consumers display it.
#[derive(Debug, Clone)]
pub struct AlertWithItem {
    pub alert: Alert,
    pub item: Option<Item>,
}

/// Aggregate numbers for the inventory summary report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySummary {
    pub total_items: usize,
    pub low_stock_count: usize,
    pub inventory_value_cents: u64,
}

/// One day of net stock movement, derived from the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub net_change: i64,
    pub movements: usize,
}

/// Root orchestrator for every stock-affecting operation.
///
/// Request handlers invoke this and nothing below it. Generic over the
/// storage seams and the notice bus so tests and deployments can swap
/// implementations without touching the sequencing logic.
#[derive(Debug)]
pub struct MutationPipeline<L, M, A, B> {
    ledger: L,
    movements: M,
    alerts: A,
    bus: B,
    locks: ItemLocks,
}

impl<L, M, A, B> MutationPipeline<L, M, A, B>
where
    L: ItemLedger,
    M: MovementStore,
    A: AlertStore,
    B: EventBus<AlertNotice>,
{
    pub fn new(ledger: L, movements: M, alerts: A, bus: B) -> Self {
        Self {
            ledger,
            movements,
            alerts,
            bus,
            locks: ItemLocks::default(),
        }
    }

    fn require(&self, actor: &Actor, cap: &Capability) -> Result<(), PipelineError> {
        authorize(actor, cap).map_err(PipelineError::from)
    }

    /// Create an item and audit its initial stock as a `Create` movement.
    ///
    /// Creation never opens an alert: stock starts at the draft value with no
    /// prior state, so there is no downward crossing to detect.
    pub fn create_item(&self, actor: &Actor, draft: ItemDraft) -> Result<Item, PipelineError> {
        self.require(actor, &capability::ITEMS_CREATE)?;

        let now = Utc::now();
        let item = Item::create(ItemId::new(RecordId::new()), draft, actor.user_id, now)?;

        self.ledger.insert(item.clone())?;
        self.movements.append(MovementRecord::creation(
            item.id_typed(),
            actor.user_id,
            item.stock(),
            now,
        ))?;

        tracing::info!(item_id = %item.id_typed(), sku = item.sku(), stock = item.stock(), "item created");
        Ok(item)
    }

    /// Patch an item; classify and audit any stock change; open an alert on a
    /// genuine downward threshold crossing.
    pub fn update_item(
        &self,
        actor: &Actor,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> Result<Item, PipelineError> {
        self.require(actor, &capability::STOCK_MUTATE)?;

        let now = Utc::now();
        let mut raised: Option<AlertNotice> = None;

        let updated = {
            let gate = self.locks.gate(item_id)?;
            let _serialized = gate
                .lock()
                .map_err(|_| PipelineError::Persistence("item gate poisoned".to_string()))?;

            let (old, new) = self
                .ledger
                .apply_mutation(item_id, |item| item.apply_patch(&patch, now))?;

            // Stock-neutral edits produce no movement entry.
            if let Some(record) =
                MovementRecord::stock_change(item_id, actor.user_id, old.stock(), new.stock(), now)
            {
                self.movements.append(record)?;
            }

            if crossed_threshold(old.stock(), new.stock(), new.threshold()) {
                match self.alerts.open(Alert::low_stock(&new, now))? {
                    OpenOutcome::Opened(alert) => {
                        raised = Some(AlertNotice::from_parts(&alert, &new));
                    }
                    OpenOutcome::AlreadyOpen(_) => {
                        tracing::debug!(item_id = %item_id, "unresolved alert already open, skipping");
                    }
                }
            }

            new
        };

        // Outside the per-item critical section: best-effort, never fails the
        // mutation.
        if let Some(notice) = raised {
            self.publish(notice);
        }

        Ok(updated)
    }

    /// Delete an item, cascade its alerts, and audit the removal.
    pub fn delete_item(&self, actor: &Actor, item_id: ItemId) -> Result<(), PipelineError> {
        self.require(actor, &capability::STOCK_MUTATE)?;

        let now = Utc::now();
        let gate = self.locks.gate(item_id)?;
        let _serialized = gate
            .lock()
            .map_err(|_| PipelineError::Persistence("item gate poisoned".to_string()))?;

        let item = self.ledger.remove(item_id)?;
        let dropped = self.alerts.remove_for_item(item_id)?;
        self.movements.append(MovementRecord::deletion(
            item_id,
            actor.user_id,
            item.stock(),
            now,
        ))?;

        tracing::info!(item_id = %item_id, sku = item.sku(), alerts_dropped = dropped, "item deleted");
        Ok(())
    }

    /// Mark an alert resolved. Explicit and irreversible; restocking never
    /// resolves an alert on its own.
    pub fn resolve_alert(&self, actor: &Actor, alert_id: AlertId) -> Result<Alert, PipelineError> {
        self.require(actor, &capability::ALERTS_RESOLVE)?;

        let mut alert = self.alerts.get(alert_id)?.ok_or(PipelineError::NotFound)?;
        alert.resolve();
        self.alerts.update(alert.clone())?;
        Ok(alert)
    }

    /// Flag an alert as having a purchase order generated. Conflicts on a
    /// second call; does not resolve the alert.
    pub fn generate_purchase_order(
        &self,
        actor: &Actor,
        alert_id: AlertId,
    ) -> Result<Alert, PipelineError> {
        self.require(actor, &capability::ALERTS_GENERATE_PO)?;

        let mut alert = self.alerts.get(alert_id)?.ok_or(PipelineError::NotFound)?;
        alert.mark_po_generated()?;
        self.alerts.update(alert.clone())?;

        // Procurement integration is out of scope; the structured log line is
        // the hand-off.
        let item = self.ledger.get(alert.item_id())?;
        tracing::info!(
            alert_id = %alert_id,
            item = item.as_ref().map(|i| i.name()).unwrap_or("<missing>"),
            sku = item.as_ref().map(|i| i.sku()).unwrap_or("<missing>"),
            stock = item.as_ref().map(|i| i.stock()).unwrap_or_default(),
            threshold = item.as_ref().map(|i| i.threshold()).unwrap_or_default(),
            "purchase order initiated"
        );
        Ok(alert)
    }

    fn publish(&self, notice: AlertNotice) {
        if let Err(e) = self.bus.publish(notice) {
            tracing::warn!(topic = LOW_STOCK_TOPIC, "alert notice publish failed: {e:?}");
        }
    }

    // ── Read surface ────────────────────────────────────────────────────────

    pub fn get_item(&self, item_id: ItemId) -> Result<Item, PipelineError> {
        self.ledger.get(item_id)?.ok_or(PipelineError::NotFound)
    }

    /// Items sorted by name, optionally narrowed by a search fragment and
    /// category/brand references.
    pub fn list_items(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        brand: Option<&str>,
    ) -> Result<Vec<Item>, PipelineError> {
        let mut items: Vec<Item> = self
            .ledger
            .list()?
            .into_iter()
            .filter(|item| search.is_none_or(|needle| item.matches_search(needle)))
            .filter(|item| category.is_none_or(|c| item.category() == Some(c)))
            .filter(|item| brand.is_none_or(|b| item.brand() == Some(b)))
            .collect();
        items.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(items)
    }

    /// Movement log, newest first. An item-name filter that matches nothing
    /// yields an empty result without touching the log.
    pub fn list_movements(
        &self,
        query: &MovementLogQuery,
    ) -> Result<Vec<MovementRecord>, PipelineError> {
        let item_ids = match &query.item_name {
            Some(needle) => {
                let ids: Vec<ItemId> = self
                    .ledger
                    .list()?
                    .into_iter()
                    .filter(|item| item.matches_search(needle))
                    .map(|item| item.id_typed())
                    .collect();
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            None => None,
        };

        let filter = MovementFilter {
            item_ids,
            actor: query.actor,
            kind: query.kind,
            from: query.from,
            to: query.to,
        };
        Ok(self.movements.query(&filter)?)
    }

    /// Alerts with their item's current state, newest first.
    pub fn list_alerts(
        &self,
        state: AlertStateFilter,
    ) -> Result<Vec<AlertWithItem>, PipelineError> {
        let alerts = self.alerts.list(state)?;
        let mut out = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let item = self.ledger.get(alert.item_id())?;
            out.push(AlertWithItem { alert, item });
        }
        Ok(out)
    }

    pub fn alert_with_item(&self, alert: Alert) -> Result<AlertWithItem, PipelineError> {
        let item = self.ledger.get(alert.item_id())?;
        Ok(AlertWithItem { alert, item })
    }

    pub fn summary(&self) -> Result<InventorySummary, PipelineError> {
        let items = self.ledger.list()?;
        Ok(InventorySummary {
            total_items: items.len(),
            low_stock_count: items
                .iter()
                .filter(|i| i.stock() <= i.threshold())
                .count(),
            inventory_value_cents: items.iter().map(|i| i.stock_value_cents()).sum(),
        })
    }

    /// Per-day net stock movement over the trailing `days` window, derived
    /// from the audit trail. Days with no movements are included as zeros.
    pub fn stock_activity(&self, days: u32) -> Result<Vec<DailyActivity>, PipelineError> {
        let now = Utc::now();
        let window_start = (now - Duration::days(i64::from(days.saturating_sub(1))))
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc());

        let filter = MovementFilter {
            from: window_start,
            ..MovementFilter::default()
        };
        let records = self.movements.query(&filter)?;

        let mut out = Vec::with_capacity(days as usize);
        for offset in (0..days).rev() {
            let date = (now - Duration::days(i64::from(offset))).date_naive();
            let (net_change, movements) = records
                .iter()
                .filter(|r| r.recorded_at.date_naive() == date)
                .fold((0i64, 0usize), |(net, count), r| {
                    (net + r.quantity, count + 1)
                });
            out.push(DailyActivity {
                date,
                net_change,
                movements,
            });
        }
        Ok(out)
    }
}
