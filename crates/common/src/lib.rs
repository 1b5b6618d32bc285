pub mod domain;
pub mod garde;
pub mod http;
pub mod in_memory;
pub mod keys;
pub mod postgres;
pub mod telemetry;
pub mod validation;

pub use domain::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockClock;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockMeasurementRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockRowIdGenerator;
