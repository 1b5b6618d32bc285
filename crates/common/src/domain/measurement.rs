use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Domain entity for one particulate-matter reading as it is stored
///
/// `partition_key` and `row_key` are assigned once at ingest and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementRecord {
    pub partition_key: String,
    pub row_key: String,
    pub device_id: i32,
    pub captured_at: DateTime<Utc>,
    pub pm10: i32,
    pub pm25: i32,
    pub pm100: i32,
}

/// Measurement as returned to callers; never carries the storage keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResponse {
    pub device_id: i32,
    pub date_time: DateTime<Utc>,
    pub pm10: i32,
    pub pm25: i32,
    pub pm100: i32,
}

impl From<&MeasurementRecord> for MeasurementResponse {
    fn from(record: &MeasurementRecord) -> Self {
        MeasurementResponse {
            device_id: record.device_id,
            date_time: record.captured_at,
            pm10: record.pm10,
            pm25: record.pm25,
            pm100: record.pm100,
        }
    }
}

impl From<MeasurementRecord> for MeasurementResponse {
    fn from(record: MeasurementRecord) -> Self {
        MeasurementResponse::from(&record)
    }
}

/// Service request for storing a measurement
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct IngestMeasurementRequest {
    #[garde(range(min = 0))]
    pub device_id: i32,
    #[garde(skip)]
    pub pm10: i32,
    #[garde(skip)]
    pub pm25: i32,
    #[garde(skip)]
    pub pm100: i32,
}

/// Validated lookup for one device-day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementQuery {
    pub device_id: i32,
    pub date: NaiveDate,
}

/// Input for listing every measurement of one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPartitionRepoInput {
    pub partition_key: String,
}

/// Repository trait for measurement storage operations
/// Infrastructure layer (postgres, in_memory) implements this trait
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Store a single measurement under its partition and row key
    ///
    /// A single attempt; implementations must not retry.
    async fn insert_measurement(&self, record: MeasurementRecord) -> DomainResult<()>;

    /// Fetch every measurement whose partition key equals `input.partition_key`
    async fn list_partition(
        &self,
        input: ListPartitionRepoInput,
    ) -> DomainResult<Vec<MeasurementRecord>>;
}
