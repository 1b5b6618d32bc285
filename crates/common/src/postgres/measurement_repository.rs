use crate::domain::{
    DomainError, DomainResult, ListPartitionRepoInput, MeasurementRecord, MeasurementRepository,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// PostgreSQL error code for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Measurement row for PostgreSQL storage
#[derive(Debug, Clone)]
pub struct MeasurementRow {
    pub partition_key: String,
    pub row_key: String,
    pub device_id: i32,
    pub captured_at: DateTime<Utc>,
    pub pm10: i32,
    pub pm25: i32,
    pub pm100: i32,
}

impl From<MeasurementRow> for MeasurementRecord {
    fn from(row: MeasurementRow) -> Self {
        MeasurementRecord {
            partition_key: row.partition_key,
            row_key: row.row_key,
            device_id: row.device_id,
            captured_at: row.captured_at,
            pm10: row.pm10,
            pm25: row.pm25,
            pm100: row.pm100,
        }
    }
}

/// PostgreSQL implementation of MeasurementRepository trait
#[derive(Clone)]
pub struct PostgresMeasurementRepository {
    client: PostgresClient,
}

impl PostgresMeasurementRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MeasurementRepository for PostgresMeasurementRepository {
    #[instrument(skip(self, record), fields(partition_key = %record.partition_key, row_key = %record.row_key))]
    async fn insert_measurement(&self, record: MeasurementRecord) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let result = conn
            .execute(
                "INSERT INTO measurements (partition_key, row_key, device_id, captured_at, pm10, pm25, pm100)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &record.partition_key,
                    &record.row_key,
                    &record.device_id,
                    &record.captured_at,
                    &record.pm10,
                    &record.pm25,
                    &record.pm100,
                ],
            )
            .await;

        if let Err(e) = result {
            if let Some(db_err) = e.as_db_error() {
                if db_err.code().code() == UNIQUE_VIOLATION {
                    return Err(DomainError::MeasurementAlreadyExists(format!(
                        "{}/{}",
                        record.partition_key, record.row_key
                    )));
                }
            }
            return Err(DomainError::RepositoryError(e.into()));
        }

        debug!("stored measurement");
        Ok(())
    }

    #[instrument(skip(self, input), fields(partition_key = %input.partition_key))]
    async fn list_partition(
        &self,
        input: ListPartitionRepoInput,
    ) -> DomainResult<Vec<MeasurementRecord>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT partition_key, row_key, device_id, captured_at, pm10, pm25, pm100
                 FROM measurements
                 WHERE partition_key = $1
                 ORDER BY captured_at, row_key",
                &[&input.partition_key],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let records: Vec<MeasurementRecord> = rows
            .iter()
            .map(|row| {
                MeasurementRow {
                    partition_key: row.get(0),
                    row_key: row.get(1),
                    device_id: row.get(2),
                    captured_at: row.get(3),
                    pm10: row.get(4),
                    pm25: row.get(5),
                    pm100: row.get(6),
                }
                .into()
            })
            .collect();

        debug!(count = records.len(), "listed partition");
        Ok(records)
    }
}
