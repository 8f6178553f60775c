use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/summary", get(summary))
        .route("/stock-activity", get(stock_activity))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.pipeline().summary() {
        Ok(s) => (StatusCode::OK, Json(dto::summary_to_json(&s))).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn stock_activity(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::StockActivityParams>,
) -> axum::response::Response {
    let days = params.days.unwrap_or(7).clamp(1, 90);

    match services.pipeline().stock_activity(days) {
        Ok(activity) => (StatusCode::OK, Json(dto::activity_to_json(&activity))).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
