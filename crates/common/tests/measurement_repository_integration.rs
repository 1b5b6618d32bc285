#![cfg(feature = "integration-tests")]

use chrono::{TimeZone, Utc};
use common::domain::{
    DomainError, ListPartitionRepoInput, MeasurementRecord, MeasurementRepository,
};
use common::postgres::{PostgresClient, PostgresMeasurementRepository};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

async fn setup_test_db() -> (ContainerAsync<Postgres>, PostgresMeasurementRepository) {
    let postgres = Postgres::default().start().await.unwrap();
    let host = postgres.get_host().await.unwrap();
    let port = postgres.get_host_port_ipv4(5432).await.unwrap();

    let client = PostgresClient::new(
        &host.to_string(),
        port,
        "postgres",
        "postgres",
        "postgres",
        5,
    )
    .expect("Failed to create client");

    client.ping().await.expect("Database not reachable");
    client.run_migrations().await.expect("Migrations failed");

    (postgres, PostgresMeasurementRepository::new(client))
}

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
async fn test_insert_and_list_partition() {
    let (_container, repo) = setup_test_db().await;

    let later = record("0b7a5d0e-9a59-4c33-8a22-1f6bdc0fd001", 2, 6);
    let earlier = record("f3c1a3dd-3f43-4a5f-a0e4-91d0f1d0c002", 1, 2);
    repo.insert_measurement(later.clone()).await.unwrap();
    repo.insert_measurement(earlier.clone()).await.unwrap();

    let records = repo
        .list_partition(ListPartitionRepoInput {
            partition_key: "1_2001-01-01".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(records, vec![earlier, later]);
}

#[tokio::test]
async fn test_list_empty_partition() {
    let (_container, repo) = setup_test_db().await;

    let records = repo
        .list_partition(ListPartitionRepoInput {
            partition_key: "404_2001-01-01".to_string(),
        })
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_duplicate_row_key_is_rejected() {
    let (_container, repo) = setup_test_db().await;

    let first = record("9d7e0bb8-54af-4b0c-9f3a-1c1f6a8a2003", 1, 2);
    repo.insert_measurement(first.clone()).await.unwrap();

    let result = repo.insert_measurement(first).await;

    assert!(matches!(
        result,
        Err(DomainError::MeasurementAlreadyExists(_))
    ));
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (container, _repo) = setup_test_db().await;
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let client = PostgresClient::new(&host.to_string(), port, "postgres", "postgres", "postgres", 2)
        .unwrap();

    client.run_migrations().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_migrations_apply_once() {
    let postgres = Postgres::default().start().await.unwrap();
    let host = postgres.get_host().await.unwrap().to_string();
    let port = postgres.get_host_port_ipv4(5432).await.unwrap();

    let first = PostgresClient::new(&host, port, "postgres", "postgres", "postgres", 2).unwrap();
    let second = PostgresClient::new(&host, port, "postgres", "postgres", "postgres", 2).unwrap();

    let (a, b) = tokio::join!(first.run_migrations(), second.run_migrations());
    a.unwrap();
    b.unwrap();

    let conn = first.get_connection().await.unwrap();
    let row = conn
        .query_one("SELECT COUNT(*) FROM schema_migrations", &[])
        .await
        .unwrap();
    let applied: i64 = row.get(0);
    assert_eq!(applied, 1);
}
