use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{DbError, NewSubmission};
use crate::score;
use crate::state::AppState;

const DEFAULT_SKIP: i64 = 0;
const DEFAULT_LIMIT: i64 = 10;

fn stage_error(location: &str, error: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.to_string(), "location": location })),
    )
        .into_response()
}

/// POST /score: predict, reduce to a recyclable count, persist, respond 201.
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Option<Json<Value>>,
) -> Response {
    if method != Method::POST {
        return (StatusCode::NOT_FOUND, "Use a POST instead!").into_response();
    }

    let Some(Json(body)) = body else {
        return (StatusCode::BAD_REQUEST, "Body is undefined").into_response();
    };

    let (Some(address), Some(image)) = (
        body.get("address").and_then(Value::as_str),
        body.get("image").and_then(Value::as_str),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            "Format: { address: string, image: string }",
        )
            .into_response();
    };

    let results = match state.predictor.predict(image).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Prediction failed for {}: {}", address, e);
            return stage_error("callAutoML", e);
        }
    };

    let submission = NewSubmission {
        address: address.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        score: score::count_recyclables(&results),
        result: results,
    };

    match state.store.insert_submission(&submission).await {
        Ok(()) => {
            tracing::info!("Scored {} at {}", submission.score, submission.address);
            (
                StatusCode::CREATED,
                Json(json!({ "score": submission.score, "result": submission.result })),
            )
                .into_response()
        }
        Err(e @ DbError::Connect(_)) => {
            tracing::error!("Connection failed: {}", e);
            stage_error("getMongoDB", e)
        }
        Err(e) => {
            tracing::error!("Insert failed for {}: {}", submission.address, e);
            stage_error("insertOne", e)
        }
    }
}

/// GET /addresses: paginated per-address rollups of score and count.
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if method != Method::GET {
        return (StatusCode::NOT_FOUND, "Use a GET instead!").into_response();
    }

    let (skip, limit) = pagination(&params);

    match state.store.aggregate_addresses(skip, limit).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            tracing::error!("Aggregation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Permissive pagination: parseable values pass through unclamped, anything
/// else falls back to the defaults.
fn pagination(params: &HashMap<String, String>) -> (i64, i64) {
    let skip = params
        .get("skip")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SKIP);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);
    (skip, limit)
}
