//! `stockpilot-events` — real-time notice distribution.
//!
//! Pub/sub mechanics plus the wire payload broadcast when an alert opens.

pub mod bus;
pub mod in_memory_bus;
pub mod notice;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use notice::{AlertNotice, LOW_STOCK_TOPIC};
