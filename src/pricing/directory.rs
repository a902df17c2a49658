//! Read-only snapshot of the active price tables.
//!
//! A `PriceTableDirectory` is built once from whatever the storage layer
//! returns and never mutated afterwards, so every lookup made through one
//! snapshot sees a single consistent version of the tables.

use chrono::{Datelike, NaiveDate};

use super::models::PriceTable;

/// Narrow lookup capability the fee calculator depends on.
pub trait PriceTableLookup {
    /// Table in force on `date`, if any active table covers its year.
    fn effective_table(&self, date: NaiveDate) -> Option<&PriceTable>;

    /// Active tables, most recent `start_year` first.
    fn all_active(&self) -> &[PriceTable];
}

/// Ordered collection of active price tables.
///
/// Ordering is `start_year` descending, then `created_at` descending. Since
/// `effective_table` returns the first match in this order, overlapping
/// tables resolve to the one that starts latest, and among tables starting
/// in the same year, to the one created last.
#[derive(Debug, Clone, Default)]
pub struct PriceTableDirectory {
    tables: Vec<PriceTable>,
}

impl PriceTableDirectory {
    /// Build a directory, dropping inactive rows.
    pub fn new(tables: impl IntoIterator<Item = PriceTable>) -> Self {
        let mut tables: Vec<PriceTable> = tables.into_iter().filter(|t| t.active).collect();
        tables.sort_by(|a, b| {
            b.start_year
                .cmp(&a.start_year)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Self { tables }
    }

    /// Most recent active table (the one `/prices/active` reports)
    pub fn most_recent(&self) -> Option<&PriceTable> {
        self.tables.first()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl PriceTableLookup for PriceTableDirectory {
    fn effective_table(&self, date: NaiveDate) -> Option<&PriceTable> {
        let year = date.year();
        self.tables.iter().find(|t| t.covers_year(year))
    }

    fn all_active(&self) -> &[PriceTable] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::fixtures::price_table;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolves_closed_and_open_ended_tables() {
        let t2020 = price_table(2020, Some(2020));
        let open = price_table(2021, None);
        let (id2020, id_open) = (t2020.id, open.id);
        let directory = PriceTableDirectory::new(vec![t2020, open]);

        assert_eq!(directory.effective_table(date(2020, 6, 15)).unwrap().id, id2020);
        assert_eq!(directory.effective_table(date(2021, 1, 1)).unwrap().id, id_open);
        assert_eq!(directory.effective_table(date(2022, 1, 1)).unwrap().id, id_open);
    }

    #[test]
    fn test_no_table_before_first_start_year() {
        let directory = PriceTableDirectory::new(vec![price_table(2020, None)]);
        assert!(directory.effective_table(date(2019, 12, 31)).is_none());
    }

    #[test]
    fn test_empty_directory() {
        let directory = PriceTableDirectory::default();
        assert!(directory.is_empty());
        assert!(directory.effective_table(date(2024, 3, 1)).is_none());
        assert!(directory.most_recent().is_none());
    }

    #[test]
    fn test_gap_between_tables_resolves_nothing() {
        let directory = PriceTableDirectory::new(vec![
            price_table(2018, Some(2019)),
            price_table(2021, None),
        ]);
        assert!(directory.effective_table(date(2020, 7, 1)).is_none());
    }

    #[test]
    fn test_inactive_tables_are_dropped() {
        let mut retired = price_table(2024, None);
        retired.active = false;
        let current = price_table(2020, None);
        let current_id = current.id;

        let directory = PriceTableDirectory::new(vec![retired, current]);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.effective_table(date(2024, 5, 1)).unwrap().id, current_id);
    }

    #[test]
    fn test_all_active_sorted_most_recent_first() {
        let directory = PriceTableDirectory::new(vec![
            price_table(2021, Some(2021)),
            price_table(2025, None),
            price_table(2020, Some(2020)),
        ]);
        let years: Vec<i32> = directory.all_active().iter().map(|t| t.start_year).collect();
        assert_eq!(years, vec![2025, 2021, 2020]);
        assert_eq!(directory.most_recent().unwrap().start_year, 2025);
    }

    #[test]
    fn test_overlap_prefers_latest_start_year() {
        // 2020..open overlaps 2023..2023; 2023 must resolve to the newer range
        let mut broad = price_table(2020, None);
        broad.foreign_price = dec!(90.00);
        let mut narrow = price_table(2023, Some(2023));
        narrow.foreign_price = dec!(110.00);
        let narrow_id = narrow.id;
        let broad_id = broad.id;

        let directory = PriceTableDirectory::new(vec![broad, narrow]);
        assert_eq!(directory.effective_table(date(2023, 8, 1)).unwrap().id, narrow_id);
        assert_eq!(directory.effective_table(date(2024, 8, 1)).unwrap().id, broad_id);
    }

    #[test]
    fn test_overlap_same_start_year_prefers_newest_row() {
        let mut older = price_table(2022, Some(2022));
        older.created_at = Utc::now() - Duration::days(30);
        let newer = price_table(2022, Some(2022));
        let newer_id = newer.id;

        let directory = PriceTableDirectory::new(vec![newer, older]);
        assert_eq!(directory.effective_table(date(2022, 2, 2)).unwrap().id, newer_id);
    }
}
