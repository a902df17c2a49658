//! Database queries for price tables.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::PriceTable;

const PRICE_TABLE_COLUMNS: &str = r#"
    id, start_year, end_year,
    foreign_price, mercosul_price, domestic_price, surrounding_price, exempt_price,
    mooring_under_8m, mooring_8_to_15m, mooring_over_15m,
    notes, active, created_at
"#;

/// Get all active price tables, most recent first
pub async fn list_active_price_tables(pool: &PgPool) -> Result<Vec<PriceTable>, AppError> {
    let tables = sqlx::query_as::<_, PriceTable>(&format!(
        r#"
        SELECT {PRICE_TABLE_COLUMNS}
        FROM price_tables
        WHERE active = true
        ORDER BY start_year DESC, created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(tables)
}

/// Get a price table by id, active or not
pub async fn get_price_table(pool: &PgPool, id: Uuid) -> Result<Option<PriceTable>, AppError> {
    let table = sqlx::query_as::<_, PriceTable>(&format!(
        r#"
        SELECT {PRICE_TABLE_COLUMNS}
        FROM price_tables
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(table)
}

/// Find the active open-ended table, ignoring `exclude_id`
pub async fn find_open_price_table(
    pool: &PgPool,
    exclude_id: Option<Uuid>,
) -> Result<Option<PriceTable>, AppError> {
    let table = sqlx::query_as::<_, PriceTable>(&format!(
        r#"
        SELECT {PRICE_TABLE_COLUMNS}
        FROM price_tables
        WHERE active = true
          AND end_year IS NULL
          AND ($1::uuid IS NULL OR id <> $1)
        LIMIT 1
        "#
    ))
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;

    Ok(table)
}

/// Insert a new price table
pub async fn insert_price_table(pool: &PgPool, table: &PriceTable) -> Result<PriceTable, AppError> {
    let inserted = sqlx::query_as::<_, PriceTable>(&format!(
        r#"
        INSERT INTO price_tables (
            id, start_year, end_year,
            foreign_price, mercosul_price, domestic_price, surrounding_price, exempt_price,
            mooring_under_8m, mooring_8_to_15m, mooring_over_15m,
            notes, active, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {PRICE_TABLE_COLUMNS}
        "#
    ))
    .bind(table.id)
    .bind(table.start_year)
    .bind(table.end_year)
    .bind(table.foreign_price)
    .bind(table.mercosul_price)
    .bind(table.domestic_price)
    .bind(table.surrounding_price)
    .bind(table.exempt_price)
    .bind(table.mooring_under_8m)
    .bind(table.mooring_8_to_15m)
    .bind(table.mooring_over_15m)
    .bind(&table.notes)
    .bind(table.active)
    .bind(table.created_at)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, open_table_conflict))?;

    Ok(inserted)
}

/// Overwrite the mutable columns of an existing price table
pub async fn save_price_table(pool: &PgPool, table: &PriceTable) -> Result<PriceTable, AppError> {
    sqlx::query_as::<_, PriceTable>(&format!(
        r#"
        UPDATE price_tables
        SET start_year = $2,
            end_year = $3,
            foreign_price = $4,
            mercosul_price = $5,
            domestic_price = $6,
            surrounding_price = $7,
            exempt_price = $8,
            mooring_under_8m = $9,
            mooring_8_to_15m = $10,
            mooring_over_15m = $11,
            notes = $12,
            active = $13
        WHERE id = $1
        RETURNING {PRICE_TABLE_COLUMNS}
        "#
    ))
    .bind(table.id)
    .bind(table.start_year)
    .bind(table.end_year)
    .bind(table.foreign_price)
    .bind(table.mercosul_price)
    .bind(table.domestic_price)
    .bind(table.surrounding_price)
    .bind(table.exempt_price)
    .bind(table.mooring_under_8m)
    .bind(table.mooring_8_to_15m)
    .bind(table.mooring_over_15m)
    .bind(&table.notes)
    .bind(table.active)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, open_table_conflict))?
    .ok_or(AppError::NotFound)
}

/// Soft-delete a price table. Returns false if no active row matched.
pub async fn deactivate_price_table(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE price_tables
        SET active = false
        WHERE id = $1 AND active = true
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// Only the single-open-table index can reject a price-table write as a duplicate
fn open_table_conflict() -> String {
    "another active price table is already open-ended".to_string()
}
