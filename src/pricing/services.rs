//! Pricing service functions with database access.
//!
//! Price-table administration plus quoting through the cached snapshot.
//! Every write invalidates the cache so the next quote sees it.

use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{FeeCalculator, FeeQuote};
use super::directory::PriceTableLookup;
use super::models::PriceTable;
use super::queries;
use super::requests::{CreatePriceTableRequest, PriceTableUpdate, QuoteRequest};

/// Active price tables, most recent first
pub async fn list_active(pool: &PgPool, cache: &AppCache) -> Result<Vec<PriceTable>, AppError> {
    let directory = cache.price_directory(pool).await?;
    Ok(directory.all_active().to_vec())
}

/// The most recent active price table.
///
/// Fails with `NotFound` when there are no active tables at all.
pub async fn active_price_table(pool: &PgPool, cache: &AppCache) -> Result<PriceTable, AppError> {
    let directory = cache.price_directory(pool).await?;
    directory.most_recent().cloned().ok_or(AppError::NotFound)
}

/// Create a new price table.
///
/// At most one active table may be open-ended; a second one is refused.
pub async fn create_price_table(
    pool: &PgPool,
    cache: &AppCache,
    request: CreatePriceTableRequest,
) -> Result<PriceTable, AppError> {
    request.validate()?;

    if request.end_year.is_none() {
        ensure_no_other_open_table(pool, None).await?;
    }

    let table = queries::insert_price_table(pool, &request.into_price_table()).await?;
    cache.invalidate_price_tables().await;

    tracing::info!(
        price_table = %table.id,
        start_year = table.start_year,
        end_year = ?table.end_year,
        "Created price table"
    );
    Ok(table)
}

/// Apply a partial update to an active price table
pub async fn update_price_table(
    pool: &PgPool,
    cache: &AppCache,
    id: Uuid,
    update: PriceTableUpdate,
) -> Result<PriceTable, AppError> {
    update.validate()?;

    let mut table = queries::get_price_table(pool, id)
        .await?
        .filter(|t| t.active)
        .ok_or(AppError::NotFound)?;

    let reopening = update.reopens() && !table.is_open_ended();
    update.apply(&mut table)?;
    if reopening {
        ensure_no_other_open_table(pool, Some(id)).await?;
    }

    let table = queries::save_price_table(pool, &table).await?;
    cache.invalidate_price_tables().await;

    tracing::info!(price_table = %table.id, "Updated price table");
    Ok(table)
}

/// Soft-delete a price table
pub async fn deactivate_price_table(
    pool: &PgPool,
    cache: &AppCache,
    id: Uuid,
) -> Result<(), AppError> {
    if !queries::deactivate_price_table(pool, id).await? {
        return Err(AppError::NotFound);
    }
    cache.invalidate_price_tables().await;

    tracing::info!(price_table = %id, "Deactivated price table");
    Ok(())
}

/// Quote a visit without saving anything
pub async fn quote(
    pool: &PgPool,
    cache: &AppCache,
    request: QuoteRequest,
) -> Result<FeeQuote, AppError> {
    request.validate()?;

    let directory = cache.price_directory(pool).await?;
    let calculator = FeeCalculator::new(directory.as_ref());
    Ok(calculator.quote(
        request.date,
        &request.visitors,
        request.permanence,
        request.vessel_length_m,
    ))
}

async fn ensure_no_other_open_table(pool: &PgPool, exclude_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(open) = queries::find_open_price_table(pool, exclude_id).await? {
        return Err(AppError::Conflict(format!(
            "price table {} (from {}) is already open-ended; close it before adding another",
            open.id, open.start_year
        )));
    }
    Ok(())
}
