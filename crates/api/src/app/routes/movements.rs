use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockpilot_core::UserId;
use stockpilot_infra::MovementLogQuery;
use stockpilot_inventory::MovementKind;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_movements))
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::MovementListParams>,
) -> axum::response::Response {
    let actor = match params.actor.as_deref() {
        Some(raw) => match raw.parse::<UserId>() {
            Ok(v) => Some(v),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid actor id")
            }
        },
        None => None,
    };

    let kind = match params.action.as_deref() {
        Some(raw) => match raw.parse::<MovementKind>() {
            Ok(v) => Some(v),
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_action", e.to_string())
            }
        },
        None => None,
    };

    // Inclusive range: the end date extends to the very end of that day.
    let from = params
        .start_date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());
    let to = params
        .end_date
        .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
        .map(|naive| naive.and_utc());

    let query = MovementLogQuery {
        item_name: params.item_name,
        actor,
        kind,
        from,
        to,
    };

    match services.pipeline().list_movements(&query) {
        Ok(records) => {
            let body: Vec<_> = records.iter().map(dto::movement_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
