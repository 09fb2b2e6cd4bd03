use axum::{extract::State, response::IntoResponse, Json};

use crate::errors::ServiceError;
use crate::AppState;

pub async fn list_all_batches(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let batches = state.admin_service.list_all_batches().await?;
    Ok(Json(batches))
}

pub async fn list_all_records(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state.admin_service.list_all_records().await?;
    Ok(Json(records))
}
