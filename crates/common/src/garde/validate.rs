//! Garde validation helpers for typed service requests.

use crate::domain::DomainError;
use garde::{Report, Validate};

/// Run garde validation and map a failure to `DomainError::InvalidRequest`
pub fn validate_struct<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::InvalidRequest(format_report(&report)))
}

/// Flatten a garde report into `path: message` pairs
pub fn format_report(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            if path.to_string().is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
