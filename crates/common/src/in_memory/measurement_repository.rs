use crate::domain::{
    DomainError, DomainResult, ListPartitionRepoInput, MeasurementRecord, MeasurementRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory implementation of MeasurementRepository using HashMap
///
/// Partitions keep insertion order. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryMeasurementRepository {
    partitions: Arc<RwLock<HashMap<String, Vec<MeasurementRecord>>>>,
}

impl InMemoryMeasurementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored measurements across all partitions
    pub async fn len(&self) -> usize {
        let partitions = self.partitions.read().await;
        partitions.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MeasurementRepository for InMemoryMeasurementRepository {
    async fn insert_measurement(&self, record: MeasurementRecord) -> DomainResult<()> {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(record.partition_key.clone()).or_default();

        if partition.iter().any(|r| r.row_key == record.row_key) {
            return Err(DomainError::MeasurementAlreadyExists(format!(
                "{}/{}",
                record.partition_key, record.row_key
            )));
        }

        debug!(partition_key = %record.partition_key, row_key = %record.row_key, "stored measurement in memory");
        partition.push(record);
        Ok(())
    }

    async fn list_partition(
        &self,
        input: ListPartitionRepoInput,
    ) -> DomainResult<Vec<MeasurementRecord>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(&input.partition_key)
            .cloned()
            .unwrap_or_default())
    }
}
