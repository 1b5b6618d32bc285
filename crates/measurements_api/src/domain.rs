mod ingest_service;
mod query_service;

pub use ingest_service::*;
pub use query_service::*;
