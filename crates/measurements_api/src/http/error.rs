use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use common::domain::DomainError;

/// Operation an error surfaced from, used to pick the generic failure text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    StoreMeasurement,
    RetrieveMeasurements,
}

impl ApiOperation {
    fn failure_message(&self) -> &'static str {
        match self {
            ApiOperation::StoreMeasurement => {
                "An error occurred while trying to store the measurement."
            }
            ApiOperation::RetrieveMeasurements => {
                "An error occurred while trying to retrieve the measurements."
            }
        }
    }
}

/// Plain-text error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map a domain error to its HTTP shape
    ///
    /// Client errors keep their message. Backend failures get the generic text
    /// for the operation so store details never reach the caller.
    pub fn from_domain(error: DomainError, operation: ApiOperation) -> Self {
        if !error.is_client_error() {
            return Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: operation.failure_message().to_string(),
            };
        }

        match error {
            DomainError::InvalidRequest(msg) => Self::bad_request(msg),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::validation::{Field, ValidationError};

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err = ApiError::from_domain(
            ValidationError::Missing(Field::DateUtcParam).into(),
            ApiOperation::RetrieveMeasurements,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "DateUTC query parameter is required.");
    }

    #[test]
    fn test_store_failures_use_generic_text() {
        let err = ApiError::from_domain(
            DomainError::RepositoryError(anyhow::anyhow!("password authentication failed")),
            ApiOperation::StoreMeasurement,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message,
            "An error occurred while trying to store the measurement."
        );

        let err = ApiError::from_domain(
            DomainError::StoreTimeout {
                operation: "list",
                partition_key: "1_2001-01-01".to_string(),
            },
            ApiOperation::RetrieveMeasurements,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message,
            "An error occurred while trying to retrieve the measurements."
        );
    }

    #[test]
    fn test_invalid_request_keeps_its_detail() {
        let err = ApiError::from_domain(
            DomainError::InvalidRequest("device_id: lower than 0".to_string()),
            ApiOperation::StoreMeasurement,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "device_id: lower than 0");
    }

    #[test]
    fn test_duplicate_row_key_is_a_server_error() {
        let err = ApiError::from_domain(
            DomainError::MeasurementAlreadyExists("1_2001-01-01/abc".to_string()),
            ApiOperation::StoreMeasurement,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
