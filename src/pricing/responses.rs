//! Response DTOs for pricing API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::FeeQuote;
use super::models::PriceTable;

/// Currency every park fee is charged in
pub const CURRENCY: &str = "BRL";

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn brl(amount: Decimal) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
        }
    }
}

/// Price table as exposed by `/prices` endpoints
#[derive(Debug, Serialize)]
pub struct PriceTableResponse {
    pub id: Uuid,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub foreign_price: MoneyResponse,
    pub mercosul_price: MoneyResponse,
    pub domestic_price: MoneyResponse,
    pub surrounding_price: MoneyResponse,
    pub exempt_price: MoneyResponse,
    pub mooring_under_8m: MoneyResponse,
    pub mooring_8_to_15m: MoneyResponse,
    pub mooring_over_15m: MoneyResponse,
    pub notes: Option<String>,
}

impl From<PriceTable> for PriceTableResponse {
    fn from(table: PriceTable) -> Self {
        let fee = |f: Option<Decimal>| MoneyResponse::brl(f.unwrap_or(Decimal::ZERO));
        Self {
            id: table.id,
            start_year: table.start_year,
            end_year: table.end_year,
            foreign_price: MoneyResponse::brl(table.foreign_price),
            mercosul_price: MoneyResponse::brl(table.mercosul_price),
            domestic_price: MoneyResponse::brl(table.domestic_price),
            surrounding_price: MoneyResponse::brl(table.surrounding_price),
            exempt_price: MoneyResponse::brl(table.exempt_price),
            mooring_under_8m: fee(table.mooring_under_8m),
            mooring_8_to_15m: fee(table.mooring_8_to_15m),
            mooring_over_15m: fee(table.mooring_over_15m),
            notes: table.notes,
        }
    }
}

/// Response for a fee quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub date: NaiveDate,
    pub total: MoneyResponse,
    pub daily_amount: MoneyResponse,
    pub paying_subtotal: MoneyResponse,
    pub mooring_fee: MoneyResponse,
    pub tickets: u64,
    pub visitors: u64,
    pub permanence: u32,
    /// False when no price table covered the date and the total is a bare 0.00
    pub priced: bool,
    pub price_table_id: Option<Uuid>,
}

impl From<FeeQuote> for QuoteResponse {
    fn from(quote: FeeQuote) -> Self {
        Self {
            date: quote.date,
            priced: quote.is_priced(),
            total: MoneyResponse::brl(quote.total),
            daily_amount: MoneyResponse::brl(quote.daily_amount),
            paying_subtotal: MoneyResponse::brl(quote.paying_subtotal),
            mooring_fee: MoneyResponse::brl(quote.mooring_fee),
            tickets: quote.tickets,
            visitors: quote.visitors,
            permanence: quote.permanence,
            price_table_id: quote.price_table_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::fixtures::price_table;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_serializes_as_string() {
        let json = serde_json::to_value(MoneyResponse::brl(dec!(425.00))).unwrap();
        assert_eq!(json["amount"], "425.00");
        assert_eq!(json["currency"], "BRL");
    }

    #[test]
    fn test_price_table_response_fills_unset_tiers() {
        let mut table = price_table(2025, None);
        table.mooring_over_15m = None;
        let response = PriceTableResponse::from(table);
        assert_eq!(response.mooring_over_15m.amount, Decimal::ZERO);
        assert_eq!(response.mooring_under_8m.amount, dec!(28.00));
        assert_eq!(response.end_year, None);
    }

    #[test]
    fn test_unpriced_quote_response() {
        let quote = FeeQuote {
            date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            total: Decimal::ZERO,
            daily_amount: Decimal::ZERO,
            paying_subtotal: Decimal::ZERO,
            mooring_fee: Decimal::ZERO,
            tickets: 3,
            visitors: 4,
            permanence: 1,
            price_table_id: None,
        };
        let json = serde_json::to_value(QuoteResponse::from(quote)).unwrap();
        assert_eq!(json["priced"], false);
        assert_eq!(json["tickets"], 3);
        assert!(json["price_table_id"].is_null());
    }
}
