//! Entry-fee pricing engine.
//!
//! Resolves the price table in force on a visit date and turns visitor
//! counts, permanence and vessel length into a charge plus the ticket and
//! visitor counts used for reporting.

pub mod calculators;
pub mod directory;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{compute_tickets_and_visitors, round_money, FeeCalculator, FeeQuote};
pub use directory::{PriceTableDirectory, PriceTableLookup};
pub use models::{MooringTier, PriceTable, VisitorCategory, VisitorCounts};
pub use routes::router;
