//! Tour companies and their vessels.
//!
//! Vessel length is the mooring-fee input for every visit the vessel makes.

pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;

pub use models::{Company, Vessel};
pub use routes::router;
