use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::models::{time::flexible_utc, NewBatch};
use crate::AppState;

fn default_shelf_life_days() -> i32 {
    7
}

/// Body for `POST /api/batches`. Id and version are storage-assigned and
/// cannot be supplied by the caller.
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub batch_code: String,
    #[serde(deserialize_with = "flexible_utc::deserialize")]
    pub received_at: DateTime<Utc>,
    #[serde(default = "default_shelf_life_days")]
    pub shelf_life_days: i32,
    pub volume_liters: f64,
    pub fat_percent: Option<f64>,
}

impl From<CreateBatchRequest> for NewBatch {
    fn from(req: CreateBatchRequest) -> Self {
        NewBatch {
            batch_code: req.batch_code,
            received_at: req.received_at,
            shelf_life_days: req.shelf_life_days,
            volume_liters: req.volume_liters,
            fat_percent: req.fat_percent,
        }
    }
}

/// Body for `POST /api/batches/:id/consume`.
#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub qty: f64,
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearExpiryParams {
    pub n_days: i64,
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let batch = state.batch_service.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn list_all(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let batches = state.batch_service.list_all().await?;
    Ok(Json(batches))
}

pub async fn list_near_expiry(
    State(state): State<AppState>,
    Query(params): Query<NearExpiryParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let batches = state.batch_service.list_near_expiry(params.n_days).await?;
    Ok(Json(batches))
}

pub async fn read_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let batch = state.batch_service.read_by_id(id).await?;
    Ok(Json(batch))
}

pub async fn consume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ConsumeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let batch = state
        .batch_service
        .consume(id, request.qty, request.order_id)
        .await?;
    Ok(Json(batch))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.batch_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
