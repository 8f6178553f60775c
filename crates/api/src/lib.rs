//! `stockpilot-api` — HTTP surface for the inventory pipeline.

pub mod app;
pub mod context;
pub mod middleware;
