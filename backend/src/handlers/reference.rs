//! Reference data HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::middleware::CurrentUser;
use crate::services::reference::{
    CreateCollectorInput, CreateSpeciesInput, CreateStorageLocationInput, ReferenceDataService,
};
use crate::AppState;

pub async fn list_species(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());

    match service.list_species(current_user.0.organization_id).await {
        Ok(species) => (StatusCode::OK, Json(serde_json::json!({ "species": species }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_species(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSpeciesInput>,
) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());

    match service
        .create_species(current_user.0.organization_id, input)
        .await
    {
        Ok(species) => (StatusCode::CREATED, Json(species)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_storage_locations(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());

    match service
        .list_storage_locations(current_user.0.organization_id)
        .await
    {
        Ok(locations) => {
            (StatusCode::OK, Json(serde_json::json!({ "storage_locations": locations })))
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn create_storage_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStorageLocationInput>,
) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());

    match service
        .create_storage_location(current_user.0.organization_id, input)
        .await
    {
        Ok(location) => (StatusCode::CREATED, Json(location)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_collectors(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());

    match service.list_collectors(current_user.0.organization_id).await {
        Ok(collectors) => {
            (StatusCode::OK, Json(serde_json::json!({ "collectors": collectors }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn create_collector(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCollectorInput>,
) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());

    match service
        .create_collector(current_user.0.organization_id, input)
        .await
    {
        Ok(collector) => (StatusCode::CREATED, Json(collector)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Unit pick list with labels
pub async fn list_units(State(state): State<AppState>) -> impl IntoResponse {
    let service = ReferenceDataService::new(state.db.clone());
    Json(serde_json::json!({ "units": service.list_units() }))
}
