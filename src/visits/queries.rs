//! Database queries for visits.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{StatementRow, VisitRecord};

const VISIT_COLUMNS: &str = r#"
    id, visit_date, company_id, vessel_id, registration_code, responsible,
    permanence, foreign_count, mercosul_count, domestic_count,
    surrounding_count, exempt_count, total_charge, notes, created_at, updated_at
"#;

/// Get a visit by id
pub async fn get_visit(pool: &PgPool, id: Uuid) -> Result<Option<VisitRecord>, AppError> {
    let visit = sqlx::query_as::<_, VisitRecord>(&format!(
        r#"
        SELECT {VISIT_COLUMNS}
        FROM visits
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(visit)
}

/// Insert a visit record
pub async fn insert_visit(pool: &PgPool, visit: &VisitRecord) -> Result<VisitRecord, AppError> {
    let inserted = sqlx::query_as::<_, VisitRecord>(&format!(
        r#"
        INSERT INTO visits (
            id, visit_date, company_id, vessel_id, registration_code, responsible,
            permanence, foreign_count, mercosul_count, domestic_count,
            surrounding_count, exempt_count, total_charge, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {VISIT_COLUMNS}
        "#
    ))
    .bind(visit.id)
    .bind(visit.visit_date)
    .bind(visit.company_id)
    .bind(visit.vessel_id)
    .bind(&visit.registration_code)
    .bind(&visit.responsible)
    .bind(visit.permanence)
    .bind(visit.foreign_count)
    .bind(visit.mercosul_count)
    .bind(visit.domestic_count)
    .bind(visit.surrounding_count)
    .bind(visit.exempt_count)
    .bind(visit.total_charge)
    .bind(&visit.notes)
    .bind(visit.created_at)
    .bind(visit.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

/// Overwrite the mutable columns of a visit record
pub async fn save_visit(pool: &PgPool, visit: &VisitRecord) -> Result<VisitRecord, AppError> {
    sqlx::query_as::<_, VisitRecord>(&format!(
        r#"
        UPDATE visits
        SET registration_code = $2,
            responsible = $3,
            permanence = $4,
            foreign_count = $5,
            mercosul_count = $6,
            domestic_count = $7,
            surrounding_count = $8,
            exempt_count = $9,
            total_charge = $10,
            notes = $11,
            updated_at = $12
        WHERE id = $1
        RETURNING {VISIT_COLUMNS}
        "#
    ))
    .bind(visit.id)
    .bind(&visit.registration_code)
    .bind(&visit.responsible)
    .bind(visit.permanence)
    .bind(visit.foreign_count)
    .bind(visit.mercosul_count)
    .bind(visit.domestic_count)
    .bind(visit.surrounding_count)
    .bind(visit.exempt_count)
    .bind(visit.total_charge)
    .bind(&visit.notes)
    .bind(visit.updated_at)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Delete a visit. Returns false if it did not exist.
pub async fn delete_visit(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM visits WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Visits in an inclusive date range, newest first
pub async fn list_visits(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
    company_id: Option<Uuid>,
) -> Result<Vec<VisitRecord>, AppError> {
    let visits = sqlx::query_as::<_, VisitRecord>(&format!(
        r#"
        SELECT {VISIT_COLUMNS}
        FROM visits
        WHERE visit_date >= $1
          AND visit_date <= $2
          AND ($3::uuid IS NULL OR company_id = $3)
        ORDER BY visit_date DESC, created_at DESC
        "#
    ))
    .bind(from)
    .bind(to)
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(visits)
}

/// Statement lines for one company, oldest first
pub async fn statement_rows(
    pool: &PgPool,
    company_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<StatementRow>, AppError> {
    let rows = sqlx::query_as::<_, StatementRow>(
        r#"
        SELECT
            v.id, v.visit_date, s.name AS vessel_name, v.permanence,
            v.foreign_count, v.mercosul_count, v.domestic_count,
            v.surrounding_count, v.exempt_count, v.total_charge
        FROM visits v
        JOIN vessels s ON s.id = v.vessel_id
        WHERE v.company_id = $1
          AND v.visit_date >= $2
          AND v.visit_date <= $3
        ORDER BY v.visit_date, v.created_at
        "#,
    )
    .bind(company_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
