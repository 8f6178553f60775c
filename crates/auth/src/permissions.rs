use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Capability identifier.
///
/// Capabilities are modeled as opaque strings (e.g. "items.mutate_stock").
/// A special wildcard capability `"*"` can be used by policy layers to indicate
/// "allow all" without hardcoding domain capabilities into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The capability set the mutation pipeline checks, one per operation class.
pub mod capability {
    use super::Capability;

    /// Create a new tracked item.
    pub const ITEMS_CREATE: Capability = Capability::from_static("items.create");

    /// Change an item's stored state, including stock levels and deletion.
    pub const STOCK_MUTATE: Capability = Capability::from_static("items.mutate_stock");

    /// Resolve an open low-stock alert.
    pub const ALERTS_RESOLVE: Capability = Capability::from_static("alerts.resolve");

    /// Flag an alert as having a purchase order generated.
    pub const ALERTS_GENERATE_PO: Capability = Capability::from_static("alerts.generate_po");
}
