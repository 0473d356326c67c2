//! Final price composition.
//!
//! base curve -> room-type coefficient -> meal plan -> service adjustments,
//! rounding after every stage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{
    apply_meal_plan, apply_room_type_coefficient, apply_service_adjustment, round_price,
};
use super::curve::SeasonalCurve;
use super::error::{PricingError, PricingResult};
use super::models::{MealPlan, TariffRules};

/// Price after one service adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLine {
    pub service_type: String,
    pub price: Decimal,
}

/// Every intermediate stage of a nightly price
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub date: NaiveDate,
    pub room_type: String,
    pub meal_plan: MealPlan,
    pub base_price: Decimal,
    pub coefficient: Decimal,
    pub room_price: Decimal,
    pub meal_price: Decimal,
    pub services: Vec<ServiceLine>,
    pub final_price: Decimal,
}

/// Nightly price of `room_type` with `meal_plan` on `date`.
///
/// Fails with `Closed` on dates outside every operational period; no price
/// is ever produced for those.
pub fn price_for(
    curve: &SeasonalCurve,
    rules: &TariffRules,
    date: NaiveDate,
    room_type: &str,
    meal_plan: MealPlan,
) -> PricingResult<PriceBreakdown> {
    if !curve.is_open(date) {
        return Err(PricingError::Closed { date });
    }

    let coefficient = rules
        .coefficient(room_type)
        .ok_or_else(|| PricingError::UnknownRoomType {
            room_type: room_type.to_string(),
        })?;

    let base_price = round_price(curve.base_price_at(date)?);
    let room_price = apply_room_type_coefficient(base_price, coefficient)?;
    let meal_price = apply_meal_plan(room_price, meal_plan, &rules.meal_rules)?;

    Ok(PriceBreakdown {
        date,
        room_type: room_type.to_string(),
        meal_plan,
        base_price,
        coefficient,
        room_price,
        meal_price,
        services: Vec::new(),
        final_price: meal_price,
    })
}

/// `price_for` plus the requested service adjustments, applied in order
pub fn quote(
    curve: &SeasonalCurve,
    rules: &TariffRules,
    date: NaiveDate,
    room_type: &str,
    meal_plan: MealPlan,
    services: &[String],
) -> PricingResult<PriceBreakdown> {
    // Resolve every service first so an unknown one fails before any work
    let adjustments = services
        .iter()
        .map(|s| {
            rules
                .service_adjustment(s)
                .ok_or_else(|| PricingError::UnknownServiceType {
                    service_type: s.clone(),
                })
        })
        .collect::<PricingResult<Vec<_>>>()?;

    let mut breakdown = price_for(curve, rules, date, room_type, meal_plan)?;

    let mut price = breakdown.meal_price;
    for adjustment in adjustments {
        price = apply_service_adjustment(price, adjustment)?;
        breakdown.services.push(ServiceLine {
            service_type: adjustment.service_type.clone(),
            price,
        });
    }
    breakdown.final_price = price;

    Ok(breakdown)
}

/// One room type across all meal plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub room_type: String,
    pub coefficient: Decimal,
    pub base: Decimal,
    pub breakfast: Decimal,
    pub half_board: Decimal,
}

/// Rate table for a single date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceGrid {
    pub date: NaiveDate,
    pub base_price: Decimal,
    pub rows: Vec<GridRow>,
}

/// Every configured room type and meal plan on `date`
pub fn preview_grid(
    curve: &SeasonalCurve,
    rules: &TariffRules,
    date: NaiveDate,
) -> PricingResult<PriceGrid> {
    if !curve.is_open(date) {
        return Err(PricingError::Closed { date });
    }

    let base_price = round_price(curve.base_price_at(date)?);
    let meal_rules = &rules.meal_rules;

    let rows = rules
        .room_coefficients
        .iter()
        .map(|(room_type, &coefficient)| {
            let room_price = apply_room_type_coefficient(base_price, coefficient)?;
            Ok(GridRow {
                room_type: room_type.clone(),
                coefficient,
                base: room_price,
                breakfast: apply_meal_plan(room_price, MealPlan::Breakfast, meal_rules)?,
                half_board: apply_meal_plan(room_price, MealPlan::HalfBoard, meal_rules)?,
            })
        })
        .collect::<PricingResult<Vec<_>>>()?;

    Ok(PriceGrid {
        date,
        base_price,
        rows,
    })
}

/// Base price of one day on the chart; `None` when the hotel is closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: Option<Decimal>,
}

/// Daily rounded base prices over `from..=to`, for plotting the curve
pub fn sample_curve(
    curve: &SeasonalCurve,
    from: NaiveDate,
    to: NaiveDate,
) -> PricingResult<Vec<CurvePoint>> {
    if to < from {
        return Err(PricingError::InvalidRange { start: from, end: to });
    }
    if curve.is_empty() {
        return Err(PricingError::NoData);
    }

    from.iter_days()
        .take_while(|date| *date <= to)
        .map(|date| match curve.base_price_at(date) {
            Ok(value) => Ok(CurvePoint {
                date,
                value: Some(round_price(value)),
            }),
            Err(PricingError::Closed { .. }) => Ok(CurvePoint { date, value: None }),
            Err(e) => Err(e),
        })
        .collect()
}
