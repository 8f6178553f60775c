use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use stockpilot_core::RecordId;
use stockpilot_infra::AlertStateFilter;
use stockpilot_inventory::AlertId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/:id/resolve", put(resolve_alert))
        .route("/:id/generate-po", put(generate_po))
}

fn parse_alert_id(raw: &str) -> Result<AlertId, axum::response::Response> {
    raw.parse::<RecordId>().map(AlertId::new).map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid alert id")
    })
}

pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::AlertListParams>,
) -> axum::response::Response {
    // Unresolved alerts by default; `resolved=true` or `resolved=all` widen it.
    let state = match params.resolved.as_deref() {
        Some("true") => AlertStateFilter::Resolved,
        Some("all") => AlertStateFilter::All,
        _ => AlertStateFilter::Unresolved,
    };

    match services.pipeline().list_alerts(state) {
        Ok(entries) => {
            let body: Vec<_> = entries.iter().map(dto::alert_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn resolve_alert(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let alert_id = match parse_alert_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let alert = match services.pipeline().resolve_alert(&actor.actor(), alert_id) {
        Ok(a) => a,
        Err(e) => return errors::pipeline_error_to_response(e),
    };

    match services.pipeline().alert_with_item(alert) {
        Ok(entry) => (StatusCode::OK, Json(dto::alert_to_json(&entry))).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn generate_po(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let alert_id = match parse_alert_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let alert = match services
        .pipeline()
        .generate_purchase_order(&actor.actor(), alert_id)
    {
        Ok(a) => a,
        Err(e) => return errors::pipeline_error_to_response(e),
    };

    match services.pipeline().alert_with_item(alert) {
        Ok(entry) => (StatusCode::OK, Json(dto::alert_to_json(&entry))).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
