//! Visit registry services.
//!
//! The stored `total_charge` is always produced here by the fee calculator,
//! never taken from the caller.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::companies::queries as company_queries;
use crate::companies::services::{ensure_active_owner, ensure_vessel_usable};
use crate::companies::Company;
use crate::config::UnpricedVisitPolicy;
use crate::error::AppError;
use crate::pricing::responses::MoneyResponse;
use crate::pricing::{
    compute_tickets_and_visitors, FeeCalculator, FeeQuote, PriceTableLookup, VisitorCounts,
};

use super::models::{StatementRow, VisitRecord};
use super::queries;
use super::requests::{CreateVisitRequest, MonthlyQuery, VisitUpdate};
use super::responses::{
    CategoryTotals, CompanyStatement, MonthlySummary, StatementLine, StatementTotals,
};

/// Quote a visit and enforce the unpriced-visit policy.
pub fn price_for_save<L: PriceTableLookup + ?Sized>(
    directory: &L,
    policy: UnpricedVisitPolicy,
    date: NaiveDate,
    counts: &VisitorCounts,
    permanence: u32,
    vessel_length_m: Option<f64>,
) -> Result<FeeQuote, AppError> {
    let quote = FeeCalculator::new(directory).quote(date, counts, permanence, vessel_length_m);
    if quote.is_priced() {
        return Ok(quote);
    }
    match policy {
        UnpricedVisitPolicy::Reject => Err(AppError::PricingUnavailable { date }),
        UnpricedVisitPolicy::Allow => {
            tracing::warn!(%date, "Saving visit without an effective price table at 0.00");
            Ok(quote)
        }
    }
}

/// Register a new visit with its computed charge
pub async fn create_visit(
    pool: &PgPool,
    cache: &AppCache,
    policy: UnpricedVisitPolicy,
    request: CreateVisitRequest,
) -> Result<VisitRecord, AppError> {
    request.validate()?;

    let company = company_queries::get_company(pool, request.company_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_active_owner(&company)?;
    let vessel = company_queries::get_vessel(pool, request.vessel_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_vessel_usable(&vessel, company.id)?;

    let directory = cache.price_directory(pool).await?;
    let quote = price_for_save(
        directory.as_ref(),
        policy,
        request.visit_date,
        &request.visitors,
        request.permanence,
        vessel.length_m,
    )?;

    let record = request.into_record(quote.total)?;
    let record = queries::insert_visit(pool, &record).await?;

    tracing::info!(
        visit = %record.id,
        date = %record.visit_date,
        total = %record.total_charge,
        "Registered visit"
    );
    Ok(record)
}

/// Apply a partial update, recomputing the charge when fee inputs change
pub async fn update_visit(
    pool: &PgPool,
    cache: &AppCache,
    policy: UnpricedVisitPolicy,
    id: Uuid,
    update: VisitUpdate,
) -> Result<VisitRecord, AppError> {
    update.validate()?;

    let mut record = queries::get_visit(pool, id).await?.ok_or(AppError::NotFound)?;

    if update.changes_fee() {
        let counts = update.merged_counts(&record.counts()?);
        let permanence = update.merged_permanence(record.permanence()?);
        let vessel_length_m = company_queries::get_vessel(pool, record.vessel_id)
            .await?
            .and_then(|v| v.length_m);

        let directory = cache.price_directory(pool).await?;
        let quote = price_for_save(
            directory.as_ref(),
            policy,
            record.visit_date,
            &counts,
            permanence,
            vessel_length_m,
        )?;

        record.set_counts(&counts)?;
        record.set_permanence(permanence)?;
        record.total_charge = quote.total;
    }
    update.apply_details(&mut record);

    let record = queries::save_visit(pool, &record).await?;
    tracing::info!(visit = %record.id, total = %record.total_charge, "Updated visit");
    Ok(record)
}

pub async fn delete_visit(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    if !queries::delete_visit(pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(visit = %id, "Deleted visit");
    Ok(())
}

pub async fn list_visits(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
    company_id: Option<Uuid>,
) -> Result<Vec<VisitRecord>, AppError> {
    queries::list_visits(pool, from, to, company_id).await
}

/// Monthly summary over every company
pub async fn monthly_summary(pool: &PgPool, query: &MonthlyQuery) -> Result<MonthlySummary, AppError> {
    let (from, to) = query.period()?;
    let records = queries::list_visits(pool, from, to, None).await?;
    summarize_month(query.year, query.month, &records)
}

/// Payment statement for one company
pub async fn company_statement(
    pool: &PgPool,
    company_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<CompanyStatement, AppError> {
    let company = company_queries::get_company(pool, company_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let rows = queries::statement_rows(pool, company_id, from, to).await?;
    build_statement(company, from, to, rows)
}

/// Aggregate visit records into a monthly summary
pub fn summarize_month(
    year: i32,
    month: u32,
    records: &[VisitRecord],
) -> Result<MonthlySummary, AppError> {
    let mut by_category = CategoryTotals::default();
    let mut tickets = 0;
    let mut visitor_count = 0;
    let mut revenue = Decimal::ZERO;

    for record in records {
        let counts = record.counts()?;
        let (t, v) = compute_tickets_and_visitors(&counts, record.permanence()?);
        by_category.add(&counts);
        tickets += t;
        visitor_count += v;
        revenue += record.total_charge;
    }

    Ok(MonthlySummary {
        year,
        month,
        records: records.len(),
        headcount: by_category.headcount(),
        by_category,
        tickets,
        visitor_count,
        revenue: MoneyResponse::brl(revenue),
    })
}

/// Build a company statement from its visit rows
pub fn build_statement(
    company: Company,
    from: NaiveDate,
    to: NaiveDate,
    rows: Vec<StatementRow>,
) -> Result<CompanyStatement, AppError> {
    let lines = rows
        .into_iter()
        .map(|row| -> Result<StatementLine, AppError> {
            let visitors = row.counts()?;
            let permanence = row.permanence()?;
            let (tickets, visitor_count) = compute_tickets_and_visitors(&visitors, permanence);
            Ok(StatementLine {
                visit_id: row.id,
                visit_date: row.visit_date,
                vessel_name: row.vessel_name,
                permanence,
                visitors,
                tickets,
                visitor_count,
                charge: MoneyResponse::brl(row.total_charge),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let totals = StatementTotals::from_lines(&lines);
    Ok(CompanyStatement {
        company_id: company.id,
        company_name: company.name,
        tax_id: company.tax_id,
        from,
        to,
        lines,
        totals,
    })
}
