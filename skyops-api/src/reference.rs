use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use skyops_core::{PageQuery, ReferenceRecord, ReferenceService};
use skyops_shared::{Aircraft, Airline, Airport, Human};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::require_edit_secret;
use crate::state::AppState;

/// A reference kind served under `/v1/{PATH}`.
pub trait ReferenceRoute: ReferenceRecord {
    const PATH: &'static str;

    fn service(state: &AppState) -> &Arc<ReferenceService<Self>>;
}

impl ReferenceRoute for Airport {
    const PATH: &'static str = "airports";

    fn service(state: &AppState) -> &Arc<ReferenceService<Self>> {
        &state.airports
    }
}

impl ReferenceRoute for Airline {
    const PATH: &'static str = "airlines";

    fn service(state: &AppState) -> &Arc<ReferenceService<Self>> {
        &state.airlines
    }
}

impl ReferenceRoute for Aircraft {
    const PATH: &'static str = "aircraft";

    fn service(state: &AppState) -> &Arc<ReferenceService<Self>> {
        &state.aircraft
    }
}

impl ReferenceRoute for Human {
    const PATH: &'static str = "humans";

    fn service(state: &AppState) -> &Arc<ReferenceService<Self>> {
        &state.humans
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(resource::<Airport>(state.clone()))
        .merge(resource::<Airline>(state.clone()))
        .merge(resource::<Aircraft>(state.clone()))
        .merge(resource::<Human>(state))
}

fn resource<R: ReferenceRoute>(state: AppState) -> Router<AppState> {
    let collection = format!("/v1/{}", R::PATH);
    let item = format!("{}/{{id}}", collection);

    let reads = Router::new()
        .route(&collection, get(list::<R>))
        .route(&item, get(fetch::<R>));

    let writes = Router::new()
        .route(&collection, post(create::<R>))
        .route(&item, delete(remove::<R>))
        .route_layer(middleware::from_fn_with_state(state, require_edit_secret));

    reads.merge(writes)
}

/// GET /v1/{kind}
async fn list<R: ReferenceRoute>(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Vec<R>>, AppError> {
    let records = R::service(&state).list(query).await?;
    Ok(Json(records))
}

/// GET /v1/{kind}/{id}
async fn fetch<R: ReferenceRoute>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError> {
    let record = R::service(&state).get(&id).await?;
    Ok(Json(record))
}

/// POST /v1/{kind}
async fn create<R: ReferenceRoute>(
    State(state): State<AppState>,
    AppJson(draft): AppJson<R::Draft>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let record = R::service(&state).add(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /v1/{kind}/{id}
async fn remove<R: ReferenceRoute>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError> {
    let record = R::service(&state).delete(&id).await?;
    Ok(Json(record))
}
