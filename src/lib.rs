//! dairy-store-api
//!
//! Inventory service for perishable dairy batches. Consumption against a
//! batch is optimistic-concurrency-controlled: a version token on every row
//! detects lost updates, and the batch service retries conflicted writes a
//! bounded number of times before surfacing a transient error.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::errors::ServiceError;
use crate::services::{AdminService, BatchService};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub batch_service: BatchService,
    pub admin_service: AdminService,
    pub config: config::AppConfig,
    /// Present only when the database backend is active; used by /health.
    pub db: Option<Arc<DatabaseConnection>>,
}

/// Full route table: public batch API, admin listings, status and health.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .route("/api/batches", post(handlers::batches::create))
        .route("/api/batches", get(handlers::batches::list_all))
        .route(
            "/api/batches/near-expiry",
            get(handlers::batches::list_near_expiry),
        )
        .route("/api/batches/:id", get(handlers::batches::read_by_id))
        .route("/api/batches/:id/consume", post(handlers::batches::consume))
        .route("/api/batches/:id", delete(handlers::batches::delete))
        .route("/admin/batches", get(handlers::admin::list_all_batches))
        .route("/admin/records", get(handlers::admin::list_all_records))
}

async fn api_status(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    Ok(Json(json!({
        "status": "ok",
        "service": "dairy-store-api",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    let storage_status = match &state.db {
        Some(db) => match db.ping().await {
            Ok(_) => "healthy",
            Err(_) => "unhealthy",
        },
        // the in-memory backend has no connection to lose
        None => "healthy",
    };

    Ok(Json(json!({
        "status": storage_status,
        "checks": {
            "storage": storage_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
