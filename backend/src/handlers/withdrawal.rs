//! Withdrawal and nursery HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::RecordKey;
use uuid::Uuid;

use super::accession::service;
use crate::middleware::CurrentUser;
use crate::services::accession::{NurseryTransferInput, WithdrawRemainingInput, WithdrawalInput};
use crate::AppState;

pub async fn create_withdrawal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<WithdrawalInput>,
) -> impl IntoResponse {
    match service(&state)
        .create_withdrawal(&current_user.0, id, input)
        .await
    {
        Ok(accession) => (StatusCode::CREATED, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Withdraw everything still available
pub async fn withdraw_remaining(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<WithdrawRemainingInput>,
) -> impl IntoResponse {
    match service(&state)
        .withdraw_remaining(&current_user.0, id, &state.config.seedbank, input)
        .await
    {
        Ok(accession) => (StatusCode::CREATED, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn edit_withdrawal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key)): Path<(Uuid, u64)>,
    Json(input): Json<WithdrawalInput>,
) -> impl IntoResponse {
    match service(&state)
        .edit_withdrawal(&current_user.0, id, RecordKey(key), input)
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Undo a nursery transfer
pub async fn undo_withdrawal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, key)): Path<(Uuid, u64)>,
) -> impl IntoResponse {
    match service(&state)
        .undo_withdrawal(&current_user.0, id, RecordKey(key))
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn transfer_to_nursery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<NurseryTransferInput>,
) -> impl IntoResponse {
    match service(&state)
        .transfer_to_nursery(&current_user.0, id, input)
        .await
    {
        Ok(accession) => (StatusCode::CREATED, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bring every nursery transfer back into stock
pub async fn undo_send_to_nursery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state)
        .undo_send_to_nursery(&current_user.0, id)
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}
