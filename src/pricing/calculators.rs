//! Core fee calculation functions.
//!
//! Pure functions for entry-fee math - no database access. The calculator
//! reads price tables through `PriceTableLookup` and never mutates them.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::directory::PriceTableLookup;
use super::models::{MooringTier, PriceTable, VisitorCategory, VisitorCounts};

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use abrolhos_fees::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Daily mooring fee for a vessel; no length means no fee.
pub fn mooring_fee(table: &PriceTable, vessel_length_m: Option<f64>) -> Decimal {
    match vessel_length_m {
        Some(length) => table.mooring_fee(MooringTier::for_length(length)),
        None => Decimal::ZERO,
    }
}

/// Derived reporting counts for one visit.
///
/// Returns `(tickets, visitors)`: tickets are issued per paying visitor per
/// day of permanence; the visitor headcount also includes exempt visitors.
pub fn compute_tickets_and_visitors(counts: &VisitorCounts, permanence: u32) -> (u64, u64) {
    let permanence = u64::from(permanence);
    let tickets = counts.paying() * permanence;
    let visitors = counts.total() * permanence;
    (tickets, visitors)
}

/// Fee breakdown for one visit against one price table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeBreakdown {
    pub paying_subtotal: Decimal,
    pub mooring_fee: Decimal,
    pub daily_amount: Decimal,
    pub total: Decimal,
}

/// Price a visit against a known table.
///
/// `daily_amount = Σ paying count × unit price + mooring fee`, then the
/// whole daily amount scales with permanence. Only the final total is
/// rounded.
pub fn price_visit(
    table: &PriceTable,
    counts: &VisitorCounts,
    permanence: u32,
    vessel_length_m: Option<f64>,
) -> FeeBreakdown {
    let paying_subtotal: Decimal = VisitorCategory::PAYING
        .iter()
        .map(|c| Decimal::from(counts.get(*c)) * table.unit_price(*c))
        .sum();

    let mooring_fee = mooring_fee(table, vessel_length_m);
    let daily_amount = paying_subtotal + mooring_fee;
    let total = round_money(daily_amount * Decimal::from(permanence), 2);

    FeeBreakdown {
        paying_subtotal,
        mooring_fee,
        daily_amount,
        total,
    }
}

/// Result of quoting a visit.
///
/// `price_table_id` is `None` when no table covered the visit date; the
/// monetary fields are then all zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeQuote {
    pub date: NaiveDate,
    pub total: Decimal,
    pub daily_amount: Decimal,
    pub paying_subtotal: Decimal,
    pub mooring_fee: Decimal,
    pub tickets: u64,
    pub visitors: u64,
    pub permanence: u32,
    pub price_table_id: Option<Uuid>,
}

impl FeeQuote {
    pub fn is_priced(&self) -> bool {
        self.price_table_id.is_some()
    }
}

/// Computes charges for visits against an injected price-table lookup.
pub struct FeeCalculator<'a, L: ?Sized> {
    directory: &'a L,
}

impl<'a, L: PriceTableLookup + ?Sized> FeeCalculator<'a, L> {
    pub fn new(directory: &'a L) -> Self {
        Self { directory }
    }

    /// Total charge for a visit, rounded to cents.
    ///
    /// Returns `0.00` when no price table covers `date`. Use [`Self::quote`]
    /// to tell that case apart from a genuinely free visit.
    pub fn compute_charge(
        &self,
        date: NaiveDate,
        counts: &VisitorCounts,
        permanence: u32,
        vessel_length_m: Option<f64>,
    ) -> Decimal {
        self.quote(date, counts, permanence, vessel_length_m).total
    }

    /// Full quote: charge breakdown, derived counts and the table used.
    pub fn quote(
        &self,
        date: NaiveDate,
        counts: &VisitorCounts,
        permanence: u32,
        vessel_length_m: Option<f64>,
    ) -> FeeQuote {
        let (tickets, visitors) = compute_tickets_and_visitors(counts, permanence);

        let Some(table) = self.directory.effective_table(date) else {
            tracing::warn!(%date, "No active price table covers visit date; charging 0.00");
            return FeeQuote {
                date,
                total: Decimal::new(0, 2),
                daily_amount: Decimal::ZERO,
                paying_subtotal: Decimal::ZERO,
                mooring_fee: Decimal::ZERO,
                tickets,
                visitors,
                permanence,
                price_table_id: None,
            };
        };

        let breakdown = price_visit(table, counts, permanence, vessel_length_m);
        tracing::debug!(
            %date,
            price_table = %table.id,
            total = %breakdown.total,
            "Priced visit"
        );

        FeeQuote {
            date,
            total: breakdown.total,
            daily_amount: breakdown.daily_amount,
            paying_subtotal: breakdown.paying_subtotal,
            mooring_fee: breakdown.mooring_fee,
            tickets,
            visitors,
            permanence,
            price_table_id: Some(table.id),
        }
    }
}
