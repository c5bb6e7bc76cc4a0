//! Accession HTTP handlers: records, collection, check-in, processing,
//! drying and storage

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::DryingDates;
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::accession::{
    AccessionService, CollectionInput, CreateAccessionInput, InitialQuantityInput,
    ListAccessionsQuery, ProcessingMethodInput, StorageInput, SubsetInput,
};
use crate::AppState;

pub(crate) fn service(state: &AppState) -> AccessionService {
    AccessionService::new(state.db.clone(), state.clock.clone())
}

/// List accessions of the caller's organization
pub async fn list_accessions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListAccessionsQuery>,
) -> impl IntoResponse {
    match service(&state).list(&current_user.0, query).await {
        Ok(accessions) => {
            (StatusCode::OK, Json(serde_json::json!({ "accessions": accessions }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get one accession with its derived view
pub async fn get_accession(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).get(&current_user.0, id).await {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new accession, optionally with collection details
pub async fn create_accession(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateAccessionInput>,
) -> impl IntoResponse {
    match service(&state)
        .create(&current_user.0, &state.config.seedbank, input)
        .await
    {
        Ok(accession) => (StatusCode::CREATED, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_accession(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).delete(&current_user.0, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Confirm the seeds physically arrived
pub async fn check_in(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).check_in(&current_user.0, id).await {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Save collection details; future dates come back as warnings
pub async fn update_collection(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CollectionInput>,
) -> impl IntoResponse {
    match service(&state)
        .update_collection(&current_user.0, id, input)
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn set_processing_method(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ProcessingMethodInput>,
) -> impl IntoResponse {
    match service(&state)
        .set_processing_method(&current_user.0, id, input)
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn record_initial_quantity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<InitialQuantityInput>,
) -> impl IntoResponse {
    match service(&state)
        .record_initial_quantity(&current_user.0, id, input)
        .await
    {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record the weighed subset used to estimate the seed count
pub async fn record_subset(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SubsetInput>,
) -> impl IntoResponse {
    match service(&state).record_subset(&current_user.0, id, input).await {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_drying(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<DryingDates>,
) -> impl IntoResponse {
    match service(&state).update_drying(&current_user.0, id, input).await {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_storage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StorageInput>,
) -> impl IntoResponse {
    match service(&state).update_storage(&current_user.0, id, input).await {
        Ok(accession) => (StatusCode::OK, Json(accession)).into_response(),
        Err(e) => e.into_response(),
    }
}
