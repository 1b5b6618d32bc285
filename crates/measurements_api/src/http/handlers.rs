use crate::domain::{IngestService, QueryService};
use crate::http::error::{ApiError, ApiOperation};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use common::domain::MeasurementResponse;
use common::validation::validate_ingest_body;
use std::sync::Arc;
use tracing::{info, instrument};

pub const AVAILABILITY_MESSAGE: &str = "Particle Monitor server is available.";

const DEVICE_ID_PARAM: &str = "deviceId";
const DATE_UTC_PARAM: &str = "dateUTC";

/// Services shared by all measurement routes
#[derive(Clone)]
pub struct AppState {
    pub ingest_service: Arc<IngestService>,
    pub query_service: Arc<QueryService>,
}

impl AppState {
    pub fn new(ingest_service: Arc<IngestService>, query_service: Arc<QueryService>) -> Self {
        Self {
            ingest_service,
            query_service,
        }
    }
}

#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn post_measurement(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let request = validate_ingest_body(&body).map_err(|e| {
        info!(reason = %e, "rejected measurement body");
        ApiError::bad_request(e.to_string())
    })?;

    let response = state
        .ingest_service
        .ingest(request)
        .await
        .map_err(|e| ApiError::from_domain(e, ApiOperation::StoreMeasurement))?;

    Ok(Json(response))
}

#[instrument(skip(state, params))]
pub async fn get_measurements(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    let device_id = param(&params, DEVICE_ID_PARAM);
    let date_utc = param(&params, DATE_UTC_PARAM);

    let responses = state
        .query_service
        .query(device_id, date_utc)
        .await
        .map_err(|e| ApiError::from_domain(e, ApiOperation::RetrieveMeasurements))?;

    Ok(Json(responses))
}

pub async fn test_availability() -> &'static str {
    AVAILABILITY_MESSAGE
}

/// Case-insensitive parameter lookup; absent reads as empty
fn param<'a>(params: &'a [(String, String)], name: &str) -> &'a str {
    // Last match wins when the query repeats a name in different cases
    params
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
        .last()
        .unwrap_or("")
}
