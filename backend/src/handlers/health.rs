//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    /// Records dated after this day are treated as scheduled
    pub server_date: NaiveDate,
}

/// Reports 503 while the database is unreachable
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    let (status, code, database) = if database_up {
        ("healthy", StatusCode::OK, "connected")
    } else {
        tracing::warn!("Health check could not reach the database");
        ("degraded", StatusCode::SERVICE_UNAVAILABLE, "disconnected")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            server_date: state.clock.today(),
        }),
    )
}
