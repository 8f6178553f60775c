use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockpilot_infra::PipelineError;

pub fn pipeline_error_to_response(err: PipelineError) -> axum::response::Response {
    match err {
        PipelineError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        PipelineError::Validation(violations) => {
            let fields: serde_json::Map<String, serde_json::Value> = violations
                .into_iter()
                .map(|v| (v.field, serde_json::Value::String(v.message)))
                .collect();
            (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_failed",
                    "message": "validation failed",
                    "fields": fields,
                })),
            )
                .into_response()
        }
        PipelineError::DuplicateIdentity(sku) => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate_sku",
            format!("an item with sku '{sku}' already exists"),
        ),
        PipelineError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        PipelineError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        PipelineError::Persistence(msg) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence_failure",
            msg,
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
