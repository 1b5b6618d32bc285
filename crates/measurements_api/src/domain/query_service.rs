use common::domain::{
    DomainError, DomainResult, ListPartitionRepoInput, MeasurementRepository, MeasurementResponse,
};
use common::keys::encode_query_key;
use common::validation::validate_query;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Domain service for reading back one device-day of measurements
pub struct QueryService {
    repository: Arc<dyn MeasurementRepository>,
    store_timeout: Duration,
}

impl QueryService {
    pub fn new(repository: Arc<dyn MeasurementRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Returns every measurement stored for the device on the given UTC date,
    /// in store order. Raw parameters are validated before the store is touched.
    #[instrument(skip(self))]
    pub async fn query(&self, device_id: &str, date_utc: &str) -> DomainResult<Vec<MeasurementResponse>> {
        let query = validate_query(device_id, date_utc).map_err(|e| {
            info!(reason = %e, "rejected measurement query");
            e
        })?;

        let partition_key = encode_query_key(query.device_id, query.date);
        debug!(partition_key = %partition_key, "listing partition");

        let input = ListPartitionRepoInput {
            partition_key: partition_key.clone(),
        };

        let records = match tokio::time::timeout(
            self.store_timeout,
            self.repository.list_partition(input),
        )
        .await
        {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                error!(error = %e, partition_key = %partition_key, "measurements could not be retrieved");
                return Err(e);
            }
            Err(_) => {
                error!(
                    partition_key = %partition_key,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "retrieving measurements timed out"
                );
                return Err(DomainError::StoreTimeout {
                    operation: "list",
                    partition_key,
                });
            }
        };

        debug!(partition_key = %partition_key, count = records.len(), "retrieved measurements");
        Ok(records.into_iter().map(MeasurementResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::domain::{MeasurementRecord, MockMeasurementRepository};
    use common::validation::{Field, ValidationError};

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    fn record(row_key: &str, hour: u32, pm10: i32) -> MeasurementRecord {
        MeasurementRecord {
            partition_key: "1_2001-01-01".to_string(),
            row_key: row_key.to_string(),
            device_id: 1,
            captured_at: Utc.with_ymd_and_hms(2001, 1, 1, hour, 1, 1).unwrap(),
            pm10,
            pm25: pm10 + 1,
            pm100: pm10 + 2,
        }
    }

    #[tokio::test]
    async fn test_query_returns_partition_in_store_order() {
        let mut mock_repo = MockMeasurementRepository::new();
        mock_repo
            .expect_list_partition()
            .withf(|input: &ListPartitionRepoInput| input.partition_key == "1_2001-01-01")
            .times(1)
            .return_once(|_| Ok(vec![record("b", 2, 6), record("a", 1, 2)]));

        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let responses = service.query("1", "2001-01-01").await.unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(
            responses[0].date_time,
            Utc.with_ymd_and_hms(2001, 1, 1, 2, 1, 1).unwrap()
        );
        assert_eq!((responses[0].pm10, responses[0].pm25, responses[0].pm100), (6, 7, 8));
        assert_eq!(responses[1].pm10, 2);
    }

    #[tokio::test]
    async fn test_query_normalizes_device_id() {
        let mut mock_repo = MockMeasurementRepository::new();
        mock_repo
            .expect_list_partition()
            .withf(|input: &ListPartitionRepoInput| input.partition_key == "1_2001-01-01")
            .times(1)
            .return_once(|_| Ok(vec![]));

        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let responses = service.query(" 01 ", "2001-01-01").await.unwrap();
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_query_empty_partition() {
        let mut mock_repo = MockMeasurementRepository::new();
        mock_repo
            .expect_list_partition()
            .times(1)
            .return_once(|_| Ok(vec![]));

        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let responses = service.query("1", "2024-05-05").await.unwrap();
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_query_rejects_missing_device_id_without_store_call() {
        let mock_repo = MockMeasurementRepository::new();
        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let result = service.query("", "").await;

        match result {
            Err(DomainError::Validation(e)) => {
                assert_eq!(e, ValidationError::Missing(Field::DeviceIdParam));
                assert_eq!(e.to_string(), "DeviceId query parameter is required.");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_rejects_malformed_date_without_store_call() {
        let mock_repo = MockMeasurementRepository::new();
        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let result = service.query("1", "abc").await;

        match result {
            Err(DomainError::Validation(e)) => {
                assert_eq!(
                    e.to_string(),
                    "DateUTC query parameter must be a date in the format YYYY-MM-DD."
                );
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_store_failure() {
        let mut mock_repo = MockMeasurementRepository::new();
        mock_repo
            .expect_list_partition()
            .times(1)
            .return_once(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("connection reset"))));

        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let result = service.query("1", "2001-01-01").await;
        assert!(matches!(result, Err(DomainError::RepositoryError(_))));
    }

    struct StalledRepository;

    #[async_trait::async_trait]
    impl MeasurementRepository for StalledRepository {
        async fn insert_measurement(&self, _record: MeasurementRecord) -> DomainResult<()> {
            Ok(())
        }

        async fn list_partition(
            &self,
            _input: ListPartitionRepoInput,
        ) -> DomainResult<Vec<MeasurementRecord>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_store_timeout() {
        let service = QueryService::new(Arc::new(StalledRepository), Duration::from_millis(100));

        let result = service.query("1", "2001-01-01").await;

        match result {
            Err(DomainError::StoreTimeout {
                operation,
                partition_key,
            }) => {
                assert_eq!(operation, "list");
                assert_eq!(partition_key, "1_2001-01-01");
            }
            other => panic!("Expected StoreTimeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_rejects_non_integer_device_id_without_store_call() {
        let mock_repo = MockMeasurementRepository::new();
        let service = QueryService::new(Arc::new(mock_repo), TEST_TIMEOUT);

        let result = service.query("abc", "2001-01-01").await;

        match result {
            Err(DomainError::Validation(e)) => {
                assert_eq!(e, ValidationError::NotAnInteger(Field::DeviceIdParam));
                assert_eq!(e.to_string(), "DeviceId query parameter must be an integer.");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
