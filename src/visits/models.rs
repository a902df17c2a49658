//! Visit registry models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::VisitorCounts;

/// Daily visit record from visits
#[derive(Debug, Clone, FromRow)]
pub struct VisitRecord {
    pub id: Uuid,
    pub visit_date: NaiveDate,
    pub company_id: Uuid,
    pub vessel_id: Uuid,
    pub registration_code: Option<String>,
    pub responsible: Option<String>,
    pub permanence: i32,
    pub foreign_count: i32,
    pub mercosul_count: i32,
    pub domestic_count: i32,
    pub surrounding_count: i32,
    pub exempt_count: i32,
    pub total_charge: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VisitRecord {
    /// Stored counts as pricing input
    pub fn counts(&self) -> Result<VisitorCounts, AppError> {
        Ok(VisitorCounts {
            foreign: non_negative("foreign_count", self.foreign_count)?,
            mercosul: non_negative("mercosul_count", self.mercosul_count)?,
            domestic: non_negative("domestic_count", self.domestic_count)?,
            surrounding: non_negative("surrounding_count", self.surrounding_count)?,
            exempt: non_negative("exempt_count", self.exempt_count)?,
        })
    }

    pub fn permanence(&self) -> Result<u32, AppError> {
        non_negative("permanence", self.permanence)
    }

    pub fn set_counts(&mut self, counts: &VisitorCounts) -> Result<(), AppError> {
        self.foreign_count = to_column("foreign_count", counts.foreign)?;
        self.mercosul_count = to_column("mercosul_count", counts.mercosul)?;
        self.domestic_count = to_column("domestic_count", counts.domestic)?;
        self.surrounding_count = to_column("surrounding_count", counts.surrounding)?;
        self.exempt_count = to_column("exempt_count", counts.exempt)?;
        Ok(())
    }

    pub fn set_permanence(&mut self, permanence: u32) -> Result<(), AppError> {
        self.permanence = to_column("permanence", permanence)?;
        Ok(())
    }
}

/// One visit line of a company statement, joined with its vessel name
#[derive(Debug, Clone, FromRow)]
pub struct StatementRow {
    pub id: Uuid,
    pub visit_date: NaiveDate,
    pub vessel_name: String,
    pub permanence: i32,
    pub foreign_count: i32,
    pub mercosul_count: i32,
    pub domestic_count: i32,
    pub surrounding_count: i32,
    pub exempt_count: i32,
    pub total_charge: Decimal,
}

impl StatementRow {
    pub fn counts(&self) -> Result<VisitorCounts, AppError> {
        Ok(VisitorCounts {
            foreign: non_negative("foreign_count", self.foreign_count)?,
            mercosul: non_negative("mercosul_count", self.mercosul_count)?,
            domestic: non_negative("domestic_count", self.domestic_count)?,
            surrounding: non_negative("surrounding_count", self.surrounding_count)?,
            exempt: non_negative("exempt_count", self.exempt_count)?,
        })
    }

    pub fn permanence(&self) -> Result<u32, AppError> {
        non_negative("permanence", self.permanence)
    }
}

fn non_negative(column: &str, value: i32) -> Result<u32, AppError> {
    u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("stored {} is negative: {}", column, value)))
}

fn to_column(column: &str, value: u32) -> Result<i32, AppError> {
    i32::try_from(value).map_err(|_| AppError::validation(format!("{} is too large", column)))
}
