//! Request DTOs for pricing API endpoints.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::AppError;

use super::models::{PriceTable, VisitorCounts};

/// Request to create a price table
#[derive(Debug, Deserialize)]
pub struct CreatePriceTableRequest {
    pub start_year: i32,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(with = "rust_decimal::serde::str")]
    pub foreign_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub mercosul_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub domestic_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub surrounding_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mooring_under_8m: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mooring_8_to_15m: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mooring_over_15m: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreatePriceTableRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_year_range(self.start_year, self.end_year)?;
        validate_amounts(&[
            ("foreign_price", Some(self.foreign_price)),
            ("mercosul_price", Some(self.mercosul_price)),
            ("domestic_price", Some(self.domestic_price)),
            ("surrounding_price", Some(self.surrounding_price)),
            ("mooring_under_8m", self.mooring_under_8m),
            ("mooring_8_to_15m", self.mooring_8_to_15m),
            ("mooring_over_15m", self.mooring_over_15m),
        ])
    }

    /// Build the new, active table row
    pub fn into_price_table(self) -> PriceTable {
        PriceTable {
            id: Uuid::new_v4(),
            start_year: self.start_year,
            end_year: self.end_year,
            foreign_price: self.foreign_price,
            mercosul_price: self.mercosul_price,
            domestic_price: self.domestic_price,
            surrounding_price: self.surrounding_price,
            exempt_price: Decimal::ZERO,
            mooring_under_8m: self.mooring_under_8m,
            mooring_8_to_15m: self.mooring_8_to_15m,
            mooring_over_15m: self.mooring_over_15m,
            notes: self.notes,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a price table.
///
/// Absent fields are left untouched. `end_year: null` reopens the range.
#[derive(Debug, Default, Deserialize)]
pub struct PriceTableUpdate {
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_year: Option<Option<i32>>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub foreign_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mercosul_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub domestic_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub surrounding_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mooring_under_8m: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mooring_8_to_15m: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub mooring_over_15m: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PriceTableUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_amounts(&[
            ("foreign_price", self.foreign_price),
            ("mercosul_price", self.mercosul_price),
            ("domestic_price", self.domestic_price),
            ("surrounding_price", self.surrounding_price),
            ("mooring_under_8m", self.mooring_under_8m),
            ("mooring_8_to_15m", self.mooring_8_to_15m),
            ("mooring_over_15m", self.mooring_over_15m),
        ])
    }

    /// Whether applying this update leaves the table open-ended
    pub fn reopens(&self) -> bool {
        matches!(self.end_year, Some(None))
    }

    /// Apply the update, then re-check the year range of the result
    pub fn apply(self, table: &mut PriceTable) -> Result<(), AppError> {
        if let Some(start_year) = self.start_year {
            table.start_year = start_year;
        }
        if let Some(end_year) = self.end_year {
            table.end_year = end_year;
        }
        if let Some(price) = self.foreign_price {
            table.foreign_price = price;
        }
        if let Some(price) = self.mercosul_price {
            table.mercosul_price = price;
        }
        if let Some(price) = self.domestic_price {
            table.domestic_price = price;
        }
        if let Some(price) = self.surrounding_price {
            table.surrounding_price = price;
        }
        if let Some(fee) = self.mooring_under_8m {
            table.mooring_under_8m = Some(fee);
        }
        if let Some(fee) = self.mooring_8_to_15m {
            table.mooring_8_to_15m = Some(fee);
        }
        if let Some(fee) = self.mooring_over_15m {
            table.mooring_over_15m = Some(fee);
        }
        if let Some(notes) = self.notes {
            table.notes = Some(notes);
        }
        validate_year_range(table.start_year, table.end_year)
    }
}

/// Request to quote a visit without saving it
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub visitors: VisitorCounts,
    #[serde(default = "default_permanence")]
    pub permanence: u32,
    #[serde(default)]
    pub vessel_length_m: Option<f64>,
}

impl QuoteRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_permanence(self.permanence)?;
        validate_length("vessel_length_m", self.vessel_length_m)
    }
}

pub(crate) fn default_permanence() -> u32 {
    1
}

pub(crate) fn validate_permanence(permanence: u32) -> Result<(), AppError> {
    if permanence == 0 {
        return Err(AppError::validation("permanence must be at least 1"));
    }
    Ok(())
}

pub(crate) fn validate_length(field: &str, length_m: Option<f64>) -> Result<(), AppError> {
    match length_m {
        Some(l) if !l.is_finite() || l <= 0.0 => Err(AppError::validation(format!(
            "{} must be a positive number",
            field
        ))),
        _ => Ok(()),
    }
}

fn validate_year_range(start_year: i32, end_year: Option<i32>) -> Result<(), AppError> {
    if let Some(end) = end_year {
        if end < start_year {
            return Err(AppError::validation(format!(
                "end_year {} is before start_year {}",
                end, start_year
            )));
        }
    }
    Ok(())
}

fn validate_amounts(amounts: &[(&str, Option<Decimal>)]) -> Result<(), AppError> {
    for (field, amount) in amounts {
        if let Some(amount) = amount {
            if *amount < Decimal::ZERO {
                return Err(AppError::validation(format!("{} must not be negative", field)));
            }
        }
    }
    Ok(())
}

/// Distinguish a missing field from an explicit `null`
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
