//! Database queries for companies and vessels.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Company, Vessel};

const COMPANY_COLUMNS: &str = r#"
    id, name, tax_id, contact_name, contact_phone, contact_email, active, created_at
"#;

const VESSEL_COLUMNS: &str = r#"
    id, company_id, name, kind, capacity, length_m, registration, active, created_at
"#;

/// Get a company by id
pub async fn get_company(pool: &PgPool, id: Uuid) -> Result<Option<Company>, AppError> {
    let company = sqlx::query_as::<_, Company>(&format!(
        r#"
        SELECT {COMPANY_COLUMNS}
        FROM companies
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(company)
}

/// Companies ordered by name
pub async fn list_companies(pool: &PgPool, include_inactive: bool) -> Result<Vec<Company>, AppError> {
    let companies = sqlx::query_as::<_, Company>(&format!(
        r#"
        SELECT {COMPANY_COLUMNS}
        FROM companies
        WHERE active = true OR $1
        ORDER BY name
        "#
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;

    Ok(companies)
}

/// Insert a company
pub async fn insert_company(pool: &PgPool, company: &Company) -> Result<Company, AppError> {
    sqlx::query_as::<_, Company>(&format!(
        r#"
        INSERT INTO companies (
            id, name, tax_id, contact_name, contact_phone, contact_email, active, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {COMPANY_COLUMNS}
        "#
    ))
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.tax_id)
    .bind(&company.contact_name)
    .bind(&company.contact_phone)
    .bind(&company.contact_email)
    .bind(company.active)
    .bind(company.created_at)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, || duplicate_company(company)))
}

/// Overwrite the mutable columns of a company
pub async fn save_company(pool: &PgPool, company: &Company) -> Result<Company, AppError> {
    sqlx::query_as::<_, Company>(&format!(
        r#"
        UPDATE companies
        SET name = $2,
            tax_id = $3,
            contact_name = $4,
            contact_phone = $5,
            contact_email = $6
        WHERE id = $1
        RETURNING {COMPANY_COLUMNS}
        "#
    ))
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.tax_id)
    .bind(&company.contact_name)
    .bind(&company.contact_phone)
    .bind(&company.contact_email)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, || duplicate_company(company)))?
    .ok_or(AppError::NotFound)
}

/// Soft-delete a company. Returns false if no active row matched.
pub async fn deactivate_company(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE companies SET active = false WHERE id = $1 AND active = true")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Get a vessel by id
pub async fn get_vessel(pool: &PgPool, id: Uuid) -> Result<Option<Vessel>, AppError> {
    let vessel = sqlx::query_as::<_, Vessel>(&format!(
        r#"
        SELECT {VESSEL_COLUMNS}
        FROM vessels
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(vessel)
}

/// Vessels ordered by name, optionally for one company
pub async fn list_vessels(
    pool: &PgPool,
    company_id: Option<Uuid>,
    include_inactive: bool,
) -> Result<Vec<Vessel>, AppError> {
    let vessels = sqlx::query_as::<_, Vessel>(&format!(
        r#"
        SELECT {VESSEL_COLUMNS}
        FROM vessels
        WHERE ($1::uuid IS NULL OR company_id = $1)
          AND (active = true OR $2)
        ORDER BY name
        "#
    ))
    .bind(company_id)
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;

    Ok(vessels)
}

/// Insert a vessel
pub async fn insert_vessel(pool: &PgPool, vessel: &Vessel) -> Result<Vessel, AppError> {
    let inserted = sqlx::query_as::<_, Vessel>(&format!(
        r#"
        INSERT INTO vessels (
            id, company_id, name, kind, capacity, length_m, registration, active, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {VESSEL_COLUMNS}
        "#
    ))
    .bind(vessel.id)
    .bind(vessel.company_id)
    .bind(&vessel.name)
    .bind(&vessel.kind)
    .bind(vessel.capacity)
    .bind(vessel.length_m)
    .bind(&vessel.registration)
    .bind(vessel.active)
    .bind(vessel.created_at)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

/// Overwrite the mutable columns of a vessel
pub async fn save_vessel(pool: &PgPool, vessel: &Vessel) -> Result<Vessel, AppError> {
    sqlx::query_as::<_, Vessel>(&format!(
        r#"
        UPDATE vessels
        SET name = $2,
            kind = $3,
            capacity = $4,
            length_m = $5,
            registration = $6
        WHERE id = $1
        RETURNING {VESSEL_COLUMNS}
        "#
    ))
    .bind(vessel.id)
    .bind(&vessel.name)
    .bind(&vessel.kind)
    .bind(vessel.capacity)
    .bind(vessel.length_m)
    .bind(&vessel.registration)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Soft-delete a vessel. Returns false if no active row matched.
pub async fn deactivate_vessel(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE vessels SET active = false WHERE id = $1 AND active = true")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn duplicate_company(company: &Company) -> String {
    format!("a company named '{}' or with the same tax id already exists", company.name)
}
