use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    pub user_id: String,
    pub activity_type: String,
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Handler for recording a user action
///
/// Responds 202 as soon as the event is queued; storage happens in the background.
pub async fn record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecordActivityRequest>,
) -> AppResult<StatusCode> {
    let user_id = request.user_id.trim();
    let kind = request.activity_type.trim();
    if user_id.is_empty() || kind.is_empty() {
        return Err(AppError::InvalidInput(
            "user_id and activity_type are required".to_string(),
        ));
    }

    let product_id = request
        .product_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    state.activity.record(user_id, kind, product_id);

    Ok(StatusCode::ACCEPTED)
}
