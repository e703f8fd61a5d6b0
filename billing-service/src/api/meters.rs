use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use billing_core::{
    domain::{timestamp, Meter, MeterId, MeterPatch, NewMeter, Reading},
    entities, BillingError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;

use super::{params::ReadingParams, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meters", post(create_meter))
        .route(
            "/meters/:id",
            get(get_meter).put(update_meter).delete(delete_meter),
        )
        .route(
            "/meters/:id/readings",
            post(record_reading).get(list_readings),
        )
}

/// A reading without `time` is stamped with the time it was received.
#[derive(Debug, Deserialize)]
struct IncomingReading {
    units: Option<f64>,
    time: Option<String>,
}

impl IncomingReading {
    fn into_reading(self, received_at: OffsetDateTime) -> Result<Reading, BillingError> {
        let units = self
            .units
            .ok_or_else(|| BillingError::invalid("units is required"))?;
        let time = match self.time.as_deref() {
            Some(raw) => timestamp::parse_instant(raw)?,
            None => received_at,
        };
        Ok(Reading::new(units, time))
    }
}

async fn create_meter(
    State(state): State<AppState>,
    payload: Result<Json<NewMeter>, JsonRejection>,
) -> Result<(StatusCode, Json<Meter>), ApiError> {
    let Json(new) = payload?;
    let mut store = state.store.lock().await;
    let meter = entities::install_meter(&mut *store, new)?;
    tracing::info!(meter_id = meter.id, user_id = meter.user_id, "meter installed");
    Ok((StatusCode::CREATED, Json(meter)))
}

async fn get_meter(
    State(state): State<AppState>,
    id: Result<Path<MeterId>, PathRejection>,
) -> Result<Json<Meter>, ApiError> {
    let Path(id) = id?;
    let store = state.store.lock().await;
    Ok(Json(entities::meter(&*store, id)?))
}

async fn update_meter(
    State(state): State<AppState>,
    id: Result<Path<MeterId>, PathRejection>,
    payload: Result<Json<MeterPatch>, JsonRejection>,
) -> Result<Json<Meter>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let mut store = state.store.lock().await;
    Ok(Json(entities::update_meter(&mut *store, id, &patch)?))
}

async fn delete_meter(
    State(state): State<AppState>,
    id: Result<Path<MeterId>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let mut store = state.store.lock().await;
    entities::remove_meter(&mut *store, id)?;
    tracing::info!(meter_id = id, "meter removed");
    Ok(Json(json!({ "message": "Meter successfully deleted" })))
}

async fn record_reading(
    State(state): State<AppState>,
    id: Result<Path<MeterId>, PathRejection>,
    payload: Result<Json<IncomingReading>, JsonRejection>,
) -> Result<(StatusCode, Json<Reading>), ApiError> {
    let Path(meter_id) = id?;
    let Json(incoming) = payload?;
    let reading = incoming.into_reading(OffsetDateTime::now_utc())?;

    let mut store = state.store.lock().await;
    let reading = entities::record_reading(&mut *store, meter_id, reading)?;
    metrics::counter!("readings_recorded_total").increment(1);
    tracing::debug!(meter_id, units = reading.units, "reading recorded");
    Ok((StatusCode::CREATED, Json(reading)))
}

async fn list_readings(
    State(state): State<AppState>,
    id: Result<Path<MeterId>, PathRejection>,
    params: Result<Query<ReadingParams>, QueryRejection>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let Path(meter_id) = id?;
    let Query(params) = params?;
    let filter = params.filter(OffsetDateTime::now_utc())?;

    let store = state.store.lock().await;
    Ok(Json(entities::meter_readings(&*store, meter_id, &filter)?))
}
