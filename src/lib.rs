//! Entry-fee engine and visit registry for the Abrolhos marine park.
//!
//! Price tables are versioned by year range. Every charge stored on a visit
//! comes from [`pricing::FeeCalculator`] evaluated against the table in
//! effect on the visit date.

pub mod cache;
pub mod companies;
pub mod config;
pub mod error;
pub mod extract;
pub mod pricing;
pub mod routes;
pub mod visits;

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::AppCache;
use crate::config::Config;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, cache: AppCache, config: Config) -> Self {
        Self {
            db,
            cache,
            config: Arc::new(config),
        }
    }
}
