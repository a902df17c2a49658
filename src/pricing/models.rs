//! Price table and visitor-count models.
//!
//! `PriceTable` maps directly onto the `price_tables` relation via sqlx's
//! FromRow derive. Visitor counts are plain value types owned by callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Historized price table from price_tables.
///
/// Valid over the inclusive year range `start_year..=end_year`; a missing
/// `end_year` means the table stays in force for every later year.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PriceTable {
    pub id: Uuid,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub foreign_price: Decimal,
    pub mercosul_price: Decimal,
    pub domestic_price: Decimal,
    pub surrounding_price: Decimal,
    /// Stored for schema compatibility; never billed.
    pub exempt_price: Decimal,
    pub mooring_under_8m: Option<Decimal>,
    pub mooring_8_to_15m: Option<Decimal>,
    pub mooring_over_15m: Option<Decimal>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl PriceTable {
    /// Check if the table is in force for the given calendar year
    pub fn covers_year(&self, year: i32) -> bool {
        if !self.active {
            return false;
        }
        if self.start_year > year {
            return false;
        }
        match self.end_year {
            Some(end) => end >= year,
            None => true,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end_year.is_none()
    }

    /// Unit price charged per visitor of `category` per day.
    ///
    /// Exempt visitors always price at zero regardless of the stored column.
    pub fn unit_price(&self, category: VisitorCategory) -> Decimal {
        match category {
            VisitorCategory::Foreign => self.foreign_price,
            VisitorCategory::Mercosul => self.mercosul_price,
            VisitorCategory::Domestic => self.domestic_price,
            VisitorCategory::Surrounding => self.surrounding_price,
            VisitorCategory::Exempt => Decimal::ZERO,
        }
    }

    /// Daily mooring fee for a tier; unset tiers charge nothing.
    pub fn mooring_fee(&self, tier: MooringTier) -> Decimal {
        let fee = match tier {
            MooringTier::Under8m => self.mooring_under_8m,
            MooringTier::From8To15m => self.mooring_8_to_15m,
            MooringTier::Over15m => self.mooring_over_15m,
        };
        fee.unwrap_or(Decimal::ZERO)
    }
}

/// Visitor category used for pricing and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorCategory {
    Foreign,
    Mercosul,
    Domestic,
    Surrounding,
    Exempt,
}

impl VisitorCategory {
    /// Categories that pay an entry fee and receive a ticket
    pub const PAYING: [VisitorCategory; 4] = [
        VisitorCategory::Foreign,
        VisitorCategory::Mercosul,
        VisitorCategory::Domestic,
        VisitorCategory::Surrounding,
    ];
}

/// Mooring fee band, selected by vessel length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MooringTier {
    /// Strictly shorter than 8 m
    Under8m,
    /// 8 m up to and including 15 m
    From8To15m,
    /// Longer than 15 m
    Over15m,
}

impl MooringTier {
    pub fn for_length(length_m: f64) -> Self {
        if length_m < 8.0 {
            MooringTier::Under8m
        } else if length_m <= 15.0 {
            MooringTier::From8To15m
        } else {
            MooringTier::Over15m
        }
    }
}

/// Head counts for one visit, by category.
///
/// Missing fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorCounts {
    pub foreign: u32,
    pub mercosul: u32,
    pub domestic: u32,
    pub surrounding: u32,
    pub exempt: u32,
}

impl VisitorCounts {
    pub fn get(&self, category: VisitorCategory) -> u32 {
        match category {
            VisitorCategory::Foreign => self.foreign,
            VisitorCategory::Mercosul => self.mercosul,
            VisitorCategory::Domestic => self.domestic,
            VisitorCategory::Surrounding => self.surrounding,
            VisitorCategory::Exempt => self.exempt,
        }
    }

    /// Visitors that pay an entry fee (everyone except exempt)
    pub fn paying(&self) -> u64 {
        VisitorCategory::PAYING
            .iter()
            .map(|c| u64::from(self.get(*c)))
            .sum()
    }

    pub fn total(&self) -> u64 {
        self.paying() + u64::from(self.exempt)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal_macros::dec;

    /// Table priced like the reference fixture: 100 / 75 / 50 / 10 / 0.
    pub fn price_table(start_year: i32, end_year: Option<i32>) -> PriceTable {
        PriceTable {
            id: Uuid::new_v4(),
            start_year,
            end_year,
            foreign_price: dec!(100.00),
            mercosul_price: dec!(75.00),
            domestic_price: dec!(50.00),
            surrounding_price: dec!(10.00),
            exempt_price: dec!(0.00),
            mooring_under_8m: Some(dec!(28.00)),
            mooring_8_to_15m: Some(dec!(41.00)),
            mooring_over_15m: Some(dec!(73.00)),
            notes: None,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::price_table;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_covers_year_closed_range() {
        let table = price_table(2020, Some(2021));
        assert!(!table.covers_year(2019));
        assert!(table.covers_year(2020));
        assert!(table.covers_year(2021));
        assert!(!table.covers_year(2022));
    }

    #[test]
    fn test_covers_year_open_ended() {
        let table = price_table(2025, None);
        assert!(!table.covers_year(2024));
        assert!(table.covers_year(2025));
        assert!(table.covers_year(2100));
    }

    #[test]
    fn test_inactive_table_covers_nothing() {
        let mut table = price_table(2020, None);
        table.active = false;
        assert!(!table.covers_year(2020));
    }

    #[test]
    fn test_exempt_price_ignored() {
        let mut table = price_table(2020, None);
        table.exempt_price = dec!(12.50);
        assert_eq!(table.unit_price(VisitorCategory::Exempt), Decimal::ZERO);
        assert_eq!(table.unit_price(VisitorCategory::Foreign), dec!(100.00));
    }

    #[test]
    fn test_mooring_tier_boundaries() {
        assert_eq!(MooringTier::for_length(0.5), MooringTier::Under8m);
        assert_eq!(MooringTier::for_length(7.99), MooringTier::Under8m);
        assert_eq!(MooringTier::for_length(8.0), MooringTier::From8To15m);
        assert_eq!(MooringTier::for_length(15.0), MooringTier::From8To15m);
        assert_eq!(MooringTier::for_length(15.01), MooringTier::Over15m);
    }

    #[test]
    fn test_unset_mooring_tier_is_free() {
        let mut table = price_table(2020, None);
        table.mooring_over_15m = None;
        assert_eq!(table.mooring_fee(MooringTier::Over15m), Decimal::ZERO);
    }

    #[test]
    fn test_visitor_counts_deserialize_defaults() {
        let counts: VisitorCounts = serde_json::from_str(r#"{"foreign": 2}"#).unwrap();
        assert_eq!(counts.foreign, 2);
        assert_eq!(counts.exempt, 0);
        assert_eq!(counts.paying(), 2);
    }

    #[test]
    fn test_visitor_counts_reject_negative() {
        let result: Result<VisitorCounts, _> = serde_json::from_str(r#"{"domestic": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_paying_excludes_exempt() {
        let counts = VisitorCounts {
            foreign: 2,
            mercosul: 1,
            domestic: 3,
            surrounding: 0,
            exempt: 1,
        };
        assert_eq!(counts.paying(), 6);
        assert_eq!(counts.total(), 7);
    }
}
