//! Route definitions for the Seed Bank Accession Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - accessions
        .nest("/accessions", accession_routes(state.clone()))
        // Protected routes - reference data
        .nest("/reference", reference_routes(state))
}

/// Accession routes (protected)
fn accession_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_accessions).post(handlers::create_accession),
        )
        .route(
            "/:id",
            get(handlers::get_accession).delete(handlers::delete_accession),
        )
        .route("/:id/check-in", post(handlers::check_in))
        .route("/:id/collection", put(handlers::update_collection))
        .route(
            "/:id/processing/method",
            put(handlers::set_processing_method),
        )
        .route(
            "/:id/processing/quantity",
            put(handlers::record_initial_quantity),
        )
        .route("/:id/processing/subset", put(handlers::record_subset))
        .route("/:id/drying", put(handlers::update_drying))
        .route("/:id/storage", put(handlers::update_storage))
        // Withdrawals
        .route("/:id/withdrawals", post(handlers::create_withdrawal))
        .route(
            "/:id/withdrawals/remaining",
            post(handlers::withdraw_remaining),
        )
        .route("/:id/withdrawals/:key", put(handlers::edit_withdrawal))
        .route("/:id/withdrawals/:key/undo", post(handlers::undo_withdrawal))
        // Nursery
        .route(
            "/:id/nursery",
            post(handlers::transfer_to_nursery).delete(handlers::undo_send_to_nursery),
        )
        // Viability tests
        .route("/:id/tests", post(handlers::create_viability_test))
        .route(
            "/:id/tests/:key",
            put(handlers::update_viability_test).delete(handlers::delete_viability_test),
        )
        .route("/:id/tests/:key/results", post(handlers::record_test_result))
        .route(
            "/:id/tests/:key/results/:result_key",
            put(handlers::update_test_result).delete(handlers::remove_test_result),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Reference data routes (protected)
fn reference_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/species",
            get(handlers::list_species).post(handlers::create_species),
        )
        .route(
            "/storage-locations",
            get(handlers::list_storage_locations).post(handlers::create_storage_location),
        )
        .route(
            "/collectors",
            get(handlers::list_collectors).post(handlers::create_collector),
        )
        .route("/units", get(handlers::list_units))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
