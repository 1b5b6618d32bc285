pub mod domain;
pub mod http;
pub mod measurements_api;

pub use domain::*;
pub use http::*;
pub use measurements_api::*;
