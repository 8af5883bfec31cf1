mod api;

pub use api::{list_addresses, submit_score};

use axum::{routing::any, Router};
use std::sync::Arc;

use crate::state::AppState;

/// A method mismatch must answer 404 with a hint body rather than axum's
/// default 405, so each route accepts any method and checks it itself.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/score", any(submit_score))
        .route("/addresses", any(list_addresses))
        .with_state(state)
}
