mod client;
mod config;
mod measurement_repository;

pub use client::*;
pub use config::*;
pub use measurement_repository::*;
