use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Hotel & Flight Booking API",
        "version": VERSION,
        "endpoints": {
            "authentication": "/auth",
            "hotels": "/hotels",
            "flights": "/flights",
            "bookings": "/bookings"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.db.ping().await?;

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "database": "connected",
        "version": VERSION
    })))
}

async fn status(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let counts = state.db.table_counts().await?;
    let stats: serde_json::Map<String, Value> = counts
        .into_iter()
        .map(|(table, count)| (table, json!(count)))
        .collect();

    Ok(Json(json!({
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
        "database_stats": stats
    })))
}
