mod measurement_repository;

pub use measurement_repository::*;
