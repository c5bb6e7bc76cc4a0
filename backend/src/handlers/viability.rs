//! Viability test HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{RecordKey, TestDetails};
use uuid::Uuid;

use super::accession::service;
use crate::middleware::CurrentUser;
use crate::services::accession::{TestResultInput, ViabilityTestInput};
use crate::AppState;

/// Sow a new test; its seeds are withdrawn from the accession
pub async fn create_viability_test(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ViabilityTestInput>,
) -> impl IntoResponse {
    match service(&state)
        .create_viability_test(&current_user.0, id, input)
        .await
    {
        Ok(accession) => (StatusCode::CREATED, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_viability_test(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key)): Path<(Uuid, u64)>,
    Json(input): Json<TestDetails>,
) -> impl IntoResponse {
    match service(&state)
        .update_viability_test(&current_user.0, id, RecordKey(key), input)
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_viability_test(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key)): Path<(Uuid, u64)>,
) -> impl IntoResponse {
    match service(&state)
        .delete_viability_test(&current_user.0, id, RecordKey(key))
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn record_test_result(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key)): Path<(Uuid, u64)>,
    Json(input): Json<TestResultInput>,
) -> impl IntoResponse {
    match service(&state)
        .record_test_result(&current_user.0, id, RecordKey(key), input)
        .await
    {
        Ok(accession) => (StatusCode::CREATED, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_test_result(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key, result_key)): Path<(Uuid, u64, u64)>,
    Json(input): Json<TestResultInput>,
) -> impl IntoResponse {
    match service(&state)
        .update_test_result(
            &current_user.0,
            id,
            RecordKey(key),
            RecordKey(result_key),
            input,
        )
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_test_result(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key, result_key)): Path<(Uuid, u64, u64)>,
) -> impl IntoResponse {
    match service(&state)
        .remove_test_result(&current_user.0, id, RecordKey(key), RecordKey(result_key))
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}
