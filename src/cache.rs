//! In-memory caching using moka
//!
//! Holds the current price-table snapshot so quoting a visit does not hit
//! the database. Price tables change a few times a year, so a long TTL is
//! fine as long as every write invalidates the snapshot.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::pricing::directory::PriceTableDirectory;
use crate::pricing::queries;

const DIRECTORY_KEY: &str = "price_tables:active";

/// Application cache holding the active price-table snapshot
///
/// `generation` is bumped on every invalidation. A snapshot is only stored
/// if no invalidation happened since its rows were read, so a load that
/// races a price-table write cannot put superseded tables back.
#[derive(Clone)]
pub struct AppCache {
    /// Active price tables (singleton key -> snapshot)
    pub price_tables: Cache<String, Arc<PriceTableDirectory>>,
    generation: Arc<AtomicU64>,
}

impl AppCache {
    /// Create a new cache instance with the given snapshot TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            price_tables: Cache::builder()
                .max_capacity(1)
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current invalidation generation; capture it before reading rows
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cached snapshot, if one is present
    pub async fn cached_directory(&self) -> Option<Arc<PriceTableDirectory>> {
        self.price_tables.get(DIRECTORY_KEY).await
    }

    /// Store a snapshot loaded at `generation`.
    ///
    /// Returns false, leaving the cache empty, when an invalidation happened
    /// after the snapshot was read.
    pub async fn store_directory(
        &self,
        directory: Arc<PriceTableDirectory>,
        generation: u64,
    ) -> bool {
        if self.generation() != generation {
            debug!("Discarding price table snapshot from before the last write");
            return false;
        }
        self.price_tables
            .insert(DIRECTORY_KEY.to_string(), directory)
            .await;

        // An invalidation may have landed between the check and the insert
        if self.generation() != generation {
            self.price_tables.invalidate(DIRECTORY_KEY).await;
            debug!("Discarding price table snapshot from before the last write");
            return false;
        }
        true
    }

    /// Price-table snapshot, loading it from the database on a miss
    pub async fn price_directory(&self, db: &PgPool) -> Result<Arc<PriceTableDirectory>, AppError> {
        if let Some(cached) = self.cached_directory().await {
            debug!("Cache HIT for price tables");
            return Ok(cached);
        }

        debug!("Cache MISS for price tables");
        let generation = self.generation();
        let directory = Arc::new(load_directory(db).await?);
        self.store_directory(directory.clone(), generation).await;
        Ok(directory)
    }

    /// Drop the snapshot after any price-table write
    pub async fn invalidate_price_tables(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.price_tables.invalidate(DIRECTORY_KEY).await;
        info!("Price table cache invalidated");
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            price_table_snapshots: self.price_tables.entry_count(),
        }
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub price_table_snapshots: u64,
}

/// Load a fresh directory snapshot from the database
pub async fn load_directory(db: &PgPool) -> Result<PriceTableDirectory, AppError> {
    let tables = queries::list_active_price_tables(db).await?;
    Ok(PriceTableDirectory::new(tables))
}

/// Start background cache warmer
///
/// Loads the snapshot on startup and reloads it every `period`.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, period: Duration) {
    let mut interval = interval(period);
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

async fn warm_cache(cache: &AppCache, db: &PgPool) {
    let generation = cache.generation();
    match load_directory(db).await {
        Ok(directory) => {
            let count = directory.len();
            if cache.store_directory(Arc::new(directory), generation).await {
                info!("Price table cache warmed with {} active tables", count);
            }
        }
        Err(e) => warn!("Failed to warm price table cache: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::directory::PriceTableLookup;
    use crate::pricing::models::fixtures::price_table;

    #[tokio::test]
    async fn test_store_and_invalidate_directory() {
        let cache = AppCache::new(Duration::from_secs(60));
        assert!(cache.cached_directory().await.is_none());

        let directory = Arc::new(PriceTableDirectory::new(vec![price_table(2025, None)]));
        assert!(cache.store_directory(directory, cache.generation()).await);

        let cached = cache.cached_directory().await.unwrap();
        assert_eq!(cached.all_active().len(), 1);

        cache.invalidate_price_tables().await;
        assert!(cache.cached_directory().await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_unaffected_by_later_store() {
        let cache = AppCache::new(Duration::from_secs(60));
        let generation = cache.generation();
        cache
            .store_directory(
                Arc::new(PriceTableDirectory::new(vec![price_table(2024, None)])),
                generation,
            )
            .await;
        let held = cache.cached_directory().await.unwrap();

        cache
            .store_directory(
                Arc::new(PriceTableDirectory::new(vec![
                    price_table(2024, Some(2024)),
                    price_table(2025, None),
                ])),
                generation,
            )
            .await;

        // A caller holding the old snapshot keeps a consistent view
        assert_eq!(held.len(), 1);
        assert_eq!(cache.cached_directory().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_read_before_write_is_not_stored() {
        let cache = AppCache::new(Duration::from_secs(60));

        // Loader reads the rows, then a price-table write commits and invalidates
        let generation = cache.generation();
        let before_write = Arc::new(PriceTableDirectory::new(vec![price_table(2024, None)]));
        cache.invalidate_price_tables().await;

        assert!(!cache.store_directory(before_write, generation).await);
        assert!(cache.cached_directory().await.is_none());

        // A load started after the write is kept
        let after_write = Arc::new(PriceTableDirectory::new(vec![
            price_table(2024, Some(2024)),
            price_table(2025, None),
        ]));
        assert!(cache.store_directory(after_write, cache.generation()).await);
        assert_eq!(cache.cached_directory().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_generation() {
        let cache = AppCache::new(Duration::from_secs(60));
        let warmer = cache.clone();
        let generation = warmer.generation();

        cache.invalidate_price_tables().await;
        assert_ne!(warmer.generation(), generation);
        assert!(
            !warmer
                .store_directory(
                    Arc::new(PriceTableDirectory::new(vec![price_table(2024, None)])),
                    generation,
                )
                .await
        );
    }
}
