//! Request DTOs for visit and report endpoints.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::requests::{default_permanence, validate_permanence};
use crate::pricing::VisitorCounts;

use super::models::VisitRecord;

/// Request to register a visit
#[derive(Debug, Deserialize)]
pub struct CreateVisitRequest {
    pub visit_date: NaiveDate,
    pub company_id: Uuid,
    pub vessel_id: Uuid,
    #[serde(default = "default_permanence")]
    pub permanence: u32,
    #[serde(default)]
    pub visitors: VisitorCounts,
    #[serde(default)]
    pub registration_code: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateVisitRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_permanence(self.permanence)
    }

    /// Build the record to insert, with the computed charge
    pub fn into_record(self, total_charge: Decimal) -> Result<VisitRecord, AppError> {
        let now = Utc::now();
        let mut record = VisitRecord {
            id: Uuid::new_v4(),
            visit_date: self.visit_date,
            company_id: self.company_id,
            vessel_id: self.vessel_id,
            registration_code: self.registration_code,
            responsible: self.responsible,
            permanence: 0,
            foreign_count: 0,
            mercosul_count: 0,
            domestic_count: 0,
            surrounding_count: 0,
            exempt_count: 0,
            total_charge,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        };
        record.set_permanence(self.permanence)?;
        record.set_counts(&self.visitors)?;
        Ok(record)
    }
}

/// Partial update of a visit record.
///
/// Changing any count or the permanence forces the charge to be
/// recomputed; the other fields never touch it.
#[derive(Debug, Default, Deserialize)]
pub struct VisitUpdate {
    #[serde(default)]
    pub permanence: Option<u32>,
    #[serde(default)]
    pub foreign: Option<u32>,
    #[serde(default)]
    pub mercosul: Option<u32>,
    #[serde(default)]
    pub domestic: Option<u32>,
    #[serde(default)]
    pub surrounding: Option<u32>,
    #[serde(default)]
    pub exempt: Option<u32>,
    #[serde(default)]
    pub registration_code: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VisitUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        match self.permanence {
            Some(p) => validate_permanence(p),
            None => Ok(()),
        }
    }

    /// Whether this update changes an input of the fee formula
    pub fn changes_fee(&self) -> bool {
        self.permanence.is_some()
            || self.foreign.is_some()
            || self.mercosul.is_some()
            || self.domestic.is_some()
            || self.surrounding.is_some()
            || self.exempt.is_some()
    }

    /// Current counts with this update's counts laid over them
    pub fn merged_counts(&self, current: &VisitorCounts) -> VisitorCounts {
        VisitorCounts {
            foreign: self.foreign.unwrap_or(current.foreign),
            mercosul: self.mercosul.unwrap_or(current.mercosul),
            domestic: self.domestic.unwrap_or(current.domestic),
            surrounding: self.surrounding.unwrap_or(current.surrounding),
            exempt: self.exempt.unwrap_or(current.exempt),
        }
    }

    pub fn merged_permanence(&self, current: u32) -> u32 {
        self.permanence.unwrap_or(current)
    }

    /// Copy the non-fee fields onto the record
    pub fn apply_details(self, record: &mut VisitRecord) {
        if let Some(code) = self.registration_code {
            record.registration_code = Some(code);
        }
        if let Some(responsible) = self.responsible {
            record.responsible = Some(responsible);
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();
    }
}

/// Query parameters for listing visits
#[derive(Debug, Deserialize)]
pub struct ListVisitsQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

impl ListVisitsQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_period(self.from, self.to)
    }
}

/// Query parameters for the monthly summary
#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: i32,
    pub month: u32,
}

impl MonthlyQuery {
    /// First and last day of the requested month
    pub fn period(&self) -> Result<(NaiveDate, NaiveDate), AppError> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            AppError::validation(format!("invalid month {}-{}", self.year, self.month))
        })?;
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        let last = next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| AppError::validation(format!("year {} out of range", self.year)))?;
        Ok((first, last))
    }
}

/// Query parameters for a company payment statement
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    pub company_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl StatementQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_period(self.from, self.to)
    }
}

fn validate_period(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::validation(format!(
            "period start {} is after period end {}",
            from, to
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visits::models::fixtures::visit;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateVisitRequest = serde_json::from_str(
            r#"{
                "visit_date": "2025-01-10",
                "company_id": "6f1c1f3e-3b59-4c3a-9b55-1e1f0c2b8a10",
                "vessel_id": "0d7e5c1a-8f5e-4a43-9d0b-4e7f6a1c2b3d",
                "visitors": {"foreign": 2, "exempt": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(req.permanence, 1);
        assert!(req.validate().is_ok());

        let record = req.into_record(dec!(200.00)).unwrap();
        assert_eq!(record.foreign_count, 2);
        assert_eq!(record.exempt_count, 1);
        assert_eq!(record.permanence, 1);
        assert_eq!(record.total_charge, dec!(200.00));
    }

    #[test]
    fn test_create_request_rejects_zero_permanence() {
        let req: CreateVisitRequest = serde_json::from_str(
            r#"{
                "visit_date": "2025-01-10",
                "company_id": "6f1c1f3e-3b59-4c3a-9b55-1e1f0c2b8a10",
                "vessel_id": "0d7e5c1a-8f5e-4a43-9d0b-4e7f6a1c2b3d",
                "permanence": 0
            }"#,
        )
        .unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_detects_fee_inputs() {
        assert!(!VisitUpdate::default().changes_fee());

        let notes_only = VisitUpdate {
            notes: Some("late arrival".to_string()),
            ..Default::default()
        };
        assert!(!notes_only.changes_fee());

        let exempt_only = VisitUpdate {
            exempt: Some(4),
            ..Default::default()
        };
        assert!(exempt_only.changes_fee());

        let permanence_only = VisitUpdate {
            permanence: Some(2),
            ..Default::default()
        };
        assert!(permanence_only.changes_fee());
    }

    #[test]
    fn test_update_merges_counts() {
        let current = VisitorCounts {
            foreign: 2,
            mercosul: 1,
            domestic: 3,
            surrounding: 0,
            exempt: 1,
        };
        let update = VisitUpdate {
            domestic: Some(5),
            ..Default::default()
        };
        let merged = update.merged_counts(&current);
        assert_eq!(merged.domestic, 5);
        assert_eq!(merged.foreign, 2);
        assert_eq!(update.merged_permanence(3), 3);
    }

    #[test]
    fn test_apply_details_leaves_charge_alone() {
        let mut record = visit(date(2025, 1, 10), VisitorCounts::default(), 1);
        record.total_charge = dec!(99.00);
        VisitUpdate {
            responsible: Some("Ana".to_string()),
            ..Default::default()
        }
        .apply_details(&mut record);
        assert_eq!(record.responsible.as_deref(), Some("Ana"));
        assert_eq!(record.total_charge, dec!(99.00));
    }

    #[test]
    fn test_monthly_period() {
        let feb = MonthlyQuery { year: 2024, month: 2 }.period().unwrap();
        assert_eq!(feb, (date(2024, 2, 1), date(2024, 2, 29)));

        let dec_ = MonthlyQuery { year: 2025, month: 12 }.period().unwrap();
        assert_eq!(dec_, (date(2025, 12, 1), date(2025, 12, 31)));

        assert!(MonthlyQuery { year: 2025, month: 13 }.period().is_err());
        assert!(MonthlyQuery { year: 2025, month: 0 }.period().is_err());
    }

    #[test]
    fn test_inverted_period_rejected() {
        let query = ListVisitsQuery {
            from: date(2025, 3, 1),
            to: date(2025, 2, 1),
            company_id: None,
        };
        assert!(matches!(query.validate(), Err(AppError::Validation(_))));
    }
}
