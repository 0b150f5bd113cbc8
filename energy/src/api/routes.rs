//! Route handlers

use crate::api::error::{guarded, ApiError, INTERNAL_ERROR_MESSAGE, SEARCH_FAILED_MESSAGE};
use crate::error::EnergyError;
use crate::query::{RawConsumptionParams, RawProductionParams, RawSearchBody, RawSearchParams};
use crate::response::{ConsumptionEntry, FacetListing, ProductionEntry, SearchResultPage};
use crate::service::EnergyService;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EnergyService>,
}

/// Create the API router
///
/// # Endpoints
///
/// - `GET /api/production-data` - Production per energy type
/// - `GET /api/consumption-data` - Consumption per country
/// - `GET /api/countries-data` - Distinct countries and years
/// - `POST /api/search` - Paginated full-text search
pub fn energy_router(service: Arc<EnergyService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/production-data", get(production_handler))
        .route("/api/consumption-data", get(consumption_handler))
        .route("/api/countries-data", get(countries_handler))
        .route("/api/search", post(search_handler))
        .with_state(state)
}

/// GET /api/production-data?country=..&year=..
async fn production_handler(
    State(state): State<AppState>,
    query: Result<Query<RawProductionParams>, QueryRejection>,
) -> Result<Json<Vec<ProductionEntry>>, ApiError> {
    guarded("production-data", INTERNAL_ERROR_MESSAGE, async move {
        let params = query_params(query)?.validate()?;
        state.service.production(&params).await
    })
    .await
}

/// GET /api/consumption-data?year=..
async fn consumption_handler(
    State(state): State<AppState>,
    query: Result<Query<RawConsumptionParams>, QueryRejection>,
) -> Result<Json<Vec<ConsumptionEntry>>, ApiError> {
    guarded("consumption-data", INTERNAL_ERROR_MESSAGE, async move {
        let params = query_params(query)?.validate()?;
        state.service.consumption(&params).await
    })
    .await
}

/// GET /api/countries-data
async fn countries_handler(
    State(state): State<AppState>,
) -> Result<Json<FacetListing>, ApiError> {
    guarded("countries-data", INTERNAL_ERROR_MESSAGE, async move {
        state.service.facets().await
    })
    .await
}

/// POST /api/search?page=..&limit=..&sortField=..&sortOrder=..
///
/// A missing or malformed body is treated as an empty query so it fails
/// through the same boundary as every other invalid input.
async fn search_handler(
    State(state): State<AppState>,
    query: Result<Query<RawSearchParams>, QueryRejection>,
    body: Option<Json<RawSearchBody>>,
) -> Result<Json<SearchResultPage>, ApiError> {
    guarded("search", SEARCH_FAILED_MESSAGE, async move {
        let body = body.map(|Json(b)| b).unwrap_or_default();
        let query = query_params(query)?.validate(body)?;
        state.service.search(&query).await
    })
    .await
}

/// Unparseable query strings (duplicate keys, bad encoding) become
/// `InvalidQueryParameters` so they fail inside the operation's boundary.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> crate::Result<T> {
    query
        .map(|Query(raw)| raw)
        .map_err(|rejection| EnergyError::InvalidQueryParameters(rejection.body_text()))
}
