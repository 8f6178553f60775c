use std::collections::HashSet;

use thiserror::Error;

use stockpilot_core::UserId;

use crate::{capability, Capability, Role};

/// The authenticated identity a request acts as.
///
/// Construction is intentionally decoupled from storage and transport: the API
/// layer derives an actor from verified token claims; tests build one directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    /// Effective capabilities granted by the actor's roles.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps: Vec<Capability> = Vec::new();
        for role in &self.roles {
            for cap in capabilities_for_role(role) {
                if !caps.contains(&cap) {
                    caps.push(cap);
                }
            }
        }
        caps
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing capability '{0}'")]
    Forbidden(String),
}

/// Authorize an actor for a single capability.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(actor: &Actor, required: &Capability) -> Result<(), AuthzError> {
    let caps = actor.capabilities();
    let granted: HashSet<&str> = caps.iter().map(|c| c.as_str()).collect();

    if granted.contains("*") || granted.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Role → capability policy.
///
/// Convention: "admin" grants everything; "staff" may mutate stock (updates and
/// deletions) but may not create items, resolve alerts, or generate POs.
pub fn capabilities_for_role(role: &Role) -> Vec<Capability> {
    match role.as_str() {
        "admin" => vec![Capability::new("*")],
        "staff" => vec![capability::STOCK_MUTATE],
        _ => Vec::new(),
    }
}
