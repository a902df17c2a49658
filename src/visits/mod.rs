//! Daily visit registry and the reports built on it.

pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use models::VisitRecord;
pub use routes::router;
