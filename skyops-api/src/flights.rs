use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use skyops_core::{FlightQuery, FlightUpdate, NewFlight};
use skyops_shared::Flight;

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::require_edit_secret;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/v1/flights", get(list_flights))
        .route("/v1/flights/{id}", get(get_flight));

    let writes = Router::new()
        .route("/v1/flights", post(create_flight))
        .route("/v1/flights/{id}", patch(update_flight).delete(delete_flight))
        .route_layer(middleware::from_fn_with_state(state, require_edit_secret));

    reads.merge(writes)
}

/// GET /v1/flights
pub async fn list_flights(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FlightQuery>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let flights = state.scheduler.list_flights(query).await?;
    Ok(Json(flights))
}

/// GET /v1/flights/{id}
pub async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.scheduler.get_flight(&id).await?;
    Ok(Json(flight))
}

/// POST /v1/flights
pub async fn create_flight(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewFlight>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    let flight = state.scheduler.add_flight(req).await?;
    Ok((StatusCode::CREATED, Json(flight)))
}

/// PATCH /v1/flights/{id}
pub async fn update_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<FlightUpdate>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.scheduler.update_flight(&id, req).await?;
    Ok(Json(flight))
}

/// DELETE /v1/flights/{id}
pub async fn delete_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.scheduler.delete_flight(&id).await?;
    Ok(Json(flight))
}
