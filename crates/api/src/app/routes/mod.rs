use axum::{routing::get, Router};

pub mod alerts;
pub mod items;
pub mod movements;
pub mod reports;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/items", items::router())
        .nest("/movements", movements::router())
        .nest("/alerts", alerts::router())
        .nest("/reports", reports::router())
}
