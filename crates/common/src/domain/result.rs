use crate::validation::ValidationError;
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Measurement already exists: {0}")]
    MeasurementAlreadyExists(String),

    #[error("Store {operation} timed out for partition key {partition_key}")]
    StoreTimeout {
        operation: &'static str,
        partition_key: String,
    },

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

impl DomainError {
    /// True when the caller sent bad input, as opposed to a backend failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(_) | DomainError::InvalidRequest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = DomainError::from(ValidationError::Missing(Field::DeviceIdParam));
        assert_eq!(err.to_string(), "DeviceId query parameter is required.");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_storage_failures_are_not_client_errors() {
        let timeout = DomainError::StoreTimeout {
            operation: "insert",
            partition_key: "1_2001-01-01".to_string(),
        };
        let repo = DomainError::RepositoryError(anyhow::anyhow!("connection refused"));

        assert!(!timeout.is_client_error());
        assert!(!repo.is_client_error());
    }
}
