//! Data transfer objects that only exist at the HTTP layer.

pub mod response;

pub use response::HealthResponse;
