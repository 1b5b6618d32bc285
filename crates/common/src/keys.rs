//! Partition and row key encoding for the measurements table.
//!
//! A partition holds every reading of one device on one UTC calendar day:
//! `"{device_id}_{YYYY-MM-DD}"`. The row key is the string form of a random
//! 128-bit identity and carries no ordering.
//!
//! Write path and read path both go through [`partition_key`], so a record
//! written by [`encode_ingest_key`] is always reachable through
//! [`encode_query_key`] for the same device and date.

use crate::domain::RowIdGenerator;
use chrono::{DateTime, NaiveDate, Utc};

/// Separator between device id and date in a partition key
pub const KEY_SEPARATOR: char = '_';

/// chrono format of the date part of a partition key
pub const PARTITION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Keys assigned to a measurement at ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestKey {
    pub partition_key: String,
    pub row_key: String,
}

/// Keys for a reading of `device_id` captured at `captured_at`
///
/// The partition key is deterministic; the row key is drawn from `row_ids` on
/// every call. Callers validate `device_id >= 0` beforehand.
pub fn encode_ingest_key(
    device_id: i32,
    captured_at: DateTime<Utc>,
    row_ids: &dyn RowIdGenerator,
) -> IngestKey {
    debug_assert!(device_id >= 0, "device id must be validated before encoding");

    IngestKey {
        partition_key: partition_key(device_id, captured_at.date_naive()),
        row_key: row_ids.next_row_id().hyphenated().to_string(),
    }
}

/// Partition key to look up every reading of `device_id` on `date`
pub fn encode_query_key(device_id: i32, date: NaiveDate) -> String {
    partition_key(device_id, date)
}

fn partition_key(device_id: i32, date: NaiveDate) -> String {
    format!(
        "{}{}{}",
        device_id,
        KEY_SEPARATOR,
        date.format(PARTITION_DATE_FORMAT)
    )
}
