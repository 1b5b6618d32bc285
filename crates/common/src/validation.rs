//! Validation of untrusted measurement input.
//!
//! Checks run in a fixed order and stop at the first failure so the reported
//! reason is deterministic: device id before date on the query path, body
//! syntax before any field on the ingest path, then `deviceId`, `pm10`,
//! `pm25`, `pm100`.

use crate::domain::{IngestMeasurementRequest, MeasurementQuery};
use crate::keys::PARTITION_DATE_FORMAT;
use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Input field a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DeviceIdParam,
    DateUtcParam,
    DeviceId,
    Pm10,
    Pm25,
    Pm100,
}

impl Field {
    /// Name used in error messages
    fn label(&self) -> &'static str {
        match self {
            Field::DeviceIdParam => "DeviceId query parameter",
            Field::DateUtcParam => "DateUTC query parameter",
            Field::DeviceId => "DeviceId",
            Field::Pm10 => "Pm10",
            Field::Pm25 => "Pm25",
            Field::Pm100 => "Pm100",
        }
    }

    /// Wire name of the field
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::DeviceIdParam | Field::DeviceId => "deviceId",
            Field::DateUtcParam => "dateUTC",
            Field::Pm10 => "pm10",
            Field::Pm25 => "pm25",
            Field::Pm100 => "pm100",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid request body.")]
    InvalidBody,

    #[error("{0} is required.")]
    Missing(Field),

    #[error("{0} must be an integer.")]
    NotAnInteger(Field),

    #[error("{0} must be a non-negative integer.")]
    Negative(Field),

    #[error("{0} must be a date in the format YYYY-MM-DD.")]
    InvalidDate(Field),
}

/// Validate the `deviceId` query parameter; empty means absent
pub fn validate_device_id_param(raw: &str) -> Result<i32, ValidationError> {
    device_id_from_text(raw, Field::DeviceIdParam)
}

/// Validate the `dateUTC` query parameter; empty means absent
pub fn validate_date_param(raw: &str) -> Result<NaiveDate, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Missing(Field::DateUtcParam));
    }

    parse_calendar_date(raw).ok_or(ValidationError::InvalidDate(Field::DateUtcParam))
}

/// Validate both query parameters, device id first
pub fn validate_query(device_id: &str, date_utc: &str) -> Result<MeasurementQuery, ValidationError> {
    let device_id = validate_device_id_param(device_id)?;
    let date = validate_date_param(date_utc)?;

    Ok(MeasurementQuery { device_id, date })
}

/// Validate a raw ingest body
///
/// The body must be a JSON object. Field names are matched case
/// insensitively; integer fields may also be sent as strings holding an
/// integer.
pub fn validate_ingest_body(body: &[u8]) -> Result<IngestMeasurementRequest, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::InvalidBody)?;
    let object = value.as_object().ok_or(ValidationError::InvalidBody)?;

    let device_id = integer_field(object, Field::DeviceId)?;
    if device_id < 0 {
        return Err(ValidationError::Negative(Field::DeviceId));
    }

    Ok(IngestMeasurementRequest {
        device_id,
        pm10: integer_field(object, Field::Pm10)?,
        pm25: integer_field(object, Field::Pm25)?,
        pm100: integer_field(object, Field::Pm100)?,
    })
}

fn device_id_from_text(raw: &str, field: Field) -> Result<i32, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }

    let device_id = parse_integer(raw).ok_or(ValidationError::NotAnInteger(field))?;
    if device_id < 0 {
        return Err(ValidationError::Negative(field));
    }

    Ok(device_id)
}

fn integer_field(object: &Map<String, Value>, field: Field) -> Result<i32, ValidationError> {
    // Last match wins when the body repeats a name in different cases
    let value = object
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(field.wire_name()))
        .map(|(_, value)| value)
        .last();

    match value {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or(ValidationError::NotAnInteger(field)),
        Some(Value::String(text)) if text.trim().is_empty() => {
            Err(ValidationError::Missing(field))
        }
        Some(Value::String(text)) => {
            parse_integer(text).ok_or(ValidationError::NotAnInteger(field))
        }
        Some(_) => Err(ValidationError::NotAnInteger(field)),
    }
}

fn parse_integer(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Parse an exact `YYYY-MM-DD` calendar date with a four-digit year
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let well_formed = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }

    NaiveDate::parse_from_str(raw, PARTITION_DATE_FORMAT)
        .ok()
        .filter(|date| date.year() >= 1)
}
