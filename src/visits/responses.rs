//! Response DTOs for visit and report endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::responses::MoneyResponse;
use crate::pricing::{compute_tickets_and_visitors, VisitorCounts};

use super::models::VisitRecord;

/// Visit record as exposed by `/visits`
#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub id: Uuid,
    pub visit_date: NaiveDate,
    pub company_id: Uuid,
    pub vessel_id: Uuid,
    pub registration_code: Option<String>,
    pub responsible: Option<String>,
    pub permanence: u32,
    pub visitors: VisitorCounts,
    pub tickets: u64,
    pub visitor_count: u64,
    pub total_charge: MoneyResponse,
    pub notes: Option<String>,
}

impl TryFrom<VisitRecord> for VisitResponse {
    type Error = AppError;

    fn try_from(record: VisitRecord) -> Result<Self, Self::Error> {
        let visitors = record.counts()?;
        let permanence = record.permanence()?;
        let (tickets, visitor_count) = compute_tickets_and_visitors(&visitors, permanence);
        Ok(Self {
            id: record.id,
            visit_date: record.visit_date,
            company_id: record.company_id,
            vessel_id: record.vessel_id,
            registration_code: record.registration_code,
            responsible: record.responsible,
            permanence,
            visitors,
            tickets,
            visitor_count,
            total_charge: MoneyResponse::brl(record.total_charge),
            notes: record.notes,
        })
    }
}

/// Running per-category totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub foreign: u64,
    pub mercosul: u64,
    pub domestic: u64,
    pub surrounding: u64,
    pub exempt: u64,
}

impl CategoryTotals {
    pub fn add(&mut self, counts: &VisitorCounts) {
        self.foreign += u64::from(counts.foreign);
        self.mercosul += u64::from(counts.mercosul);
        self.domestic += u64::from(counts.domestic);
        self.surrounding += u64::from(counts.surrounding);
        self.exempt += u64::from(counts.exempt);
    }

    /// Raw headcount across every category
    pub fn headcount(&self) -> u64 {
        self.foreign + self.mercosul + self.domestic + self.surrounding + self.exempt
    }
}

/// Monthly visitation and revenue summary
#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub records: usize,
    pub by_category: CategoryTotals,
    pub headcount: u64,
    pub tickets: u64,
    pub visitor_count: u64,
    pub revenue: MoneyResponse,
}

/// One visit on a company statement
#[derive(Debug, Serialize)]
pub struct StatementLine {
    pub visit_id: Uuid,
    pub visit_date: NaiveDate,
    pub vessel_name: String,
    pub permanence: u32,
    pub visitors: VisitorCounts,
    pub tickets: u64,
    pub visitor_count: u64,
    pub charge: MoneyResponse,
}

/// Statement totals
#[derive(Debug, Serialize)]
pub struct StatementTotals {
    pub records: usize,
    pub by_category: CategoryTotals,
    pub headcount: u64,
    pub tickets: u64,
    pub visitor_count: u64,
    pub amount_due: MoneyResponse,
}

/// Payment statement for one company over a period
#[derive(Debug, Serialize)]
pub struct CompanyStatement {
    pub company_id: Uuid,
    pub company_name: String,
    pub tax_id: Option<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub lines: Vec<StatementLine>,
    pub totals: StatementTotals,
}

impl StatementTotals {
    pub fn from_lines(lines: &[StatementLine]) -> Self {
        let mut by_category = CategoryTotals::default();
        let mut tickets = 0;
        let mut visitor_count = 0;
        let mut amount_due = Decimal::ZERO;
        for line in lines {
            by_category.add(&line.visitors);
            tickets += line.tickets;
            visitor_count += line.visitor_count;
            amount_due += line.charge.amount;
        }
        Self {
            records: lines.len(),
            headcount: by_category.headcount(),
            by_category,
            tickets,
            visitor_count,
            amount_due: MoneyResponse::brl(amount_due),
        }
    }
}
