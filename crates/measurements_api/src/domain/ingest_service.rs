use chrono::SubsecRound;
use common::domain::{
    Clock, DomainError, DomainResult, IngestMeasurementRequest, MeasurementRecord,
    MeasurementRepository, MeasurementResponse, RowIdGenerator,
};
use common::keys::encode_ingest_key;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Domain service for storing measurements
///
/// Stamps each reading with the current UTC second and a fresh row identity,
/// then performs exactly one store write.
pub struct IngestService {
    repository: Arc<dyn MeasurementRepository>,
    clock: Arc<dyn Clock>,
    row_ids: Arc<dyn RowIdGenerator>,
    store_timeout: Duration,
}

impl IngestService {
    pub fn new(
        repository: Arc<dyn MeasurementRepository>,
        clock: Arc<dyn Clock>,
        row_ids: Arc<dyn RowIdGenerator>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            row_ids,
            store_timeout,
        }
    }

    #[instrument(skip(self, request), fields(device_id = request.device_id))]
    pub async fn ingest(&self, request: IngestMeasurementRequest) -> DomainResult<MeasurementResponse> {
        common::garde::validate_struct(&request)?;

        let captured_at = self.clock.now_utc().trunc_subsecs(0);
        let key = encode_ingest_key(request.device_id, captured_at, self.row_ids.as_ref());

        let record = MeasurementRecord {
            partition_key: key.partition_key,
            row_key: key.row_key,
            device_id: request.device_id,
            captured_at,
            pm10: request.pm10,
            pm25: request.pm25,
            pm100: request.pm100,
        };
        let response = MeasurementResponse::from(&record);
        let partition_key = record.partition_key.clone();
        let row_key = record.row_key.clone();

        debug!(partition_key = %partition_key, row_key = %row_key, "storing measurement");

        // A single attempt: a blind retry could write the reading twice
        match tokio::time::timeout(self.store_timeout, self.repository.insert_measurement(record))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(
                    error = %e,
                    partition_key = %partition_key,
                    row_key = %row_key,
                    "measurement could not be stored"
                );
                return Err(e);
            }
            Err(_) => {
                error!(
                    partition_key = %partition_key,
                    row_key = %row_key,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "storing measurement timed out"
                );
                return Err(DomainError::StoreTimeout {
                    operation: "insert",
                    partition_key,
                });
            }
        }

        debug!(partition_key = %partition_key, "measurement stored");
        Ok(response)
    }
}
