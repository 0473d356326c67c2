//! Response DTOs for the pricing screens.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::engine::{CurvePoint, GridRow, PriceBreakdown, PriceGrid};
use super::error::PricingError;
use super::models::{calendar_date, MealPlan};

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Price after one service adjustment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineResponse {
    pub service_type: String,
    pub price: MoneyResponse,
}

/// Response for a nightly price quote
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteResponse {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub room_type: String,
    pub meal_plan: MealPlan,
    pub base_price: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub coefficient: Decimal,
    pub room_price: MoneyResponse,
    pub meal_price: MoneyResponse,
    pub services: Vec<ServiceLineResponse>,
    pub final_price: MoneyResponse,
}

impl PriceQuoteResponse {
    pub fn from_breakdown(breakdown: &PriceBreakdown, currency: &str) -> Self {
        Self {
            date: breakdown.date,
            room_type: breakdown.room_type.clone(),
            meal_plan: breakdown.meal_plan,
            base_price: MoneyResponse::new(breakdown.base_price, currency),
            coefficient: breakdown.coefficient,
            room_price: MoneyResponse::new(breakdown.room_price, currency),
            meal_price: MoneyResponse::new(breakdown.meal_price, currency),
            services: breakdown
                .services
                .iter()
                .map(|line| ServiceLineResponse {
                    service_type: line.service_type.clone(),
                    price: MoneyResponse::new(line.price, currency),
                })
                .collect(),
            final_price: MoneyResponse::new(breakdown.final_price, currency),
        }
    }
}

/// One room type row of the rate preview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRowResponse {
    pub room_type: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub coefficient: Decimal,
    pub base: MoneyResponse,
    pub breakfast: MoneyResponse,
    pub half_board: MoneyResponse,
}

impl GridRowResponse {
    fn from_row(row: &GridRow, currency: &str) -> Self {
        Self {
            room_type: row.room_type.clone(),
            coefficient: row.coefficient,
            base: MoneyResponse::new(row.base, currency),
            breakfast: MoneyResponse::new(row.breakfast, currency),
            half_board: MoneyResponse::new(row.half_board, currency),
        }
    }
}

/// Response for the rate preview of one date
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceGridResponse {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub base_price: MoneyResponse,
    pub rows: Vec<GridRowResponse>,
}

impl PriceGridResponse {
    pub fn from_grid(grid: &PriceGrid, currency: &str) -> Self {
        Self {
            date: grid.date,
            base_price: MoneyResponse::new(grid.base_price, currency),
            rows: grid
                .rows
                .iter()
                .map(|row| GridRowResponse::from_row(row, currency))
                .collect(),
        }
    }
}

/// One plotted day; `value` is absent on closed days
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePointResponse {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub value: Option<Decimal>,
    pub open: bool,
}

impl From<&CurvePoint> for CurvePointResponse {
    fn from(point: &CurvePoint) -> Self {
        Self {
            date: point.date,
            value: point.value,
            open: point.value.is_some(),
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PricingErrorResponse {
    pub fn new(error_type: &str, message: String) -> Self {
        Self {
            error_type: error_type.to_string(),
            message,
            details: None,
        }
    }
}

impl From<&PricingError> for PricingErrorResponse {
    fn from(err: &PricingError) -> Self {
        let details = match err {
            PricingError::Closed { date }
            | PricingError::DuplicateDate { date }
            | PricingError::OutsideOperationalPeriod { date }
            | PricingError::ImmutableOperationalDate { date }
            | PricingError::ImmutableOperationalKeyframe { date } => {
                Some(serde_json::json!({ "date": date.to_string() }))
            }
            PricingError::OverlappingPeriod { existing, .. } => {
                Some(serde_json::json!({ "existingPeriodId": existing.to_string() }))
            }
            _ => None,
        };

        Self {
            error_type: err.error_type().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::engine::ServiceLine;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_response_shape() {
        let breakdown = PriceBreakdown {
            date: NaiveDate::from_ymd_opt(2024, 7, 17).unwrap(),
            room_type: "suite".to_string(),
            meal_plan: MealPlan::HalfBoard,
            base_price: dec!(60110),
            coefficient: dec!(1.5),
            room_price: dec!(90165),
            meal_price: dec!(91665),
            services: vec![ServiceLine {
                service_type: "late_checkout".to_string(),
                price: dec!(96665),
            }],
            final_price: dec!(96665),
        };

        let json = serde_json::to_value(PriceQuoteResponse::from_breakdown(&breakdown, "CLP")).unwrap();

        assert_eq!(json["date"], "2024-07-17");
        assert_eq!(json["mealPlan"], "halfBoard");
        assert_eq!(json["coefficient"], "1.5");
        assert_eq!(json["finalPrice"]["amount"], "96665");
        assert_eq!(json["finalPrice"]["currency"], "CLP");
        assert_eq!(json["services"][0]["serviceType"], "late_checkout");
    }

    #[test]
    fn test_closed_point_has_null_value() {
        let point = CurvePoint {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            value: None,
        };
        let json = serde_json::to_value(CurvePointResponse::from(&point)).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["open"], false);
    }

    #[test]
    fn test_error_response_details() {
        let err = PricingError::Closed {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        let response = PricingErrorResponse::from(&err);
        assert_eq!(response.error_type, "closed");
        assert_eq!(response.details.unwrap()["date"], "2024-05-01");
    }
}
