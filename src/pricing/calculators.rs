//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no state, no I/O.
//! Every adjustment stage rounds to whole currency units; rounding is
//! cumulative, so changing where it happens changes final prices.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::error::{PricingError, PricingResult};
use super::models::{AdjustmentMode, Keyframe, MealPlan, MealRule, MealRules, ServiceAdjustment};

/// Round to the nearest whole currency unit, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use hotel_pricing::pricing::round_price;
///
/// assert_eq!(round_price(dec!(2.5)), dec!(3));
/// assert_eq!(round_price(dec!(60109.89)), dec!(60110));
/// ```
pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Interpolate the base price of the curve on `date`.
///
/// Piecewise-linear between the keyframes bracketing `date`, clamped to the
/// first/last keyframe outside the covered range. A single keyframe is a
/// constant curve. The result is not rounded.
///
/// # Arguments
/// * `keyframes` - Curve anchors, expected sorted by date
/// * `date` - Day to price
pub fn interpolate_base_price(keyframes: &[Keyframe], date: NaiveDate) -> PricingResult<Decimal> {
    if keyframes.is_empty() {
        return Err(PricingError::NoData);
    }

    if !keyframes.windows(2).all(|w| w[0].date <= w[1].date) {
        let mut sorted = keyframes.to_vec();
        sorted.sort_by_key(|k| k.date);
        return interpolate_sorted(&sorted, date);
    }

    interpolate_sorted(keyframes, date)
}

fn interpolate_sorted(keyframes: &[Keyframe], date: NaiveDate) -> PricingResult<Decimal> {
    let first = &keyframes[0];
    let last = &keyframes[keyframes.len() - 1];

    if keyframes.len() == 1 || date <= first.date {
        return Ok(first.value);
    }
    if date >= last.date {
        return Ok(last.value);
    }

    // First keyframe strictly after `date`; the one before it is <= date
    let idx = keyframes.partition_point(|k| k.date <= date);
    let before = &keyframes[idx - 1];
    let after = &keyframes[idx];

    let elapsed = Decimal::from((date - before.date).num_days());
    let span = Decimal::from((after.date - before.date).num_days());
    if elapsed.is_zero() || span.is_zero() {
        return Ok(before.value);
    }

    let diff = checked(after.value.checked_sub(before.value))?;
    // Dividing first loses digits, so only fall back to it when the product overflows
    let delta = diff
        .checked_mul(elapsed)
        .and_then(|scaled| scaled.checked_div(span))
        .or_else(|| diff.checked_div(span)?.checked_mul(elapsed));
    checked(before.value.checked_add(checked(delta)?))
}

fn checked(amount: Option<Decimal>) -> PricingResult<Decimal> {
    amount.ok_or(PricingError::Overflow)
}

/// Apply a room-type multiplier to a base price, rounded.
pub fn apply_room_type_coefficient(base_price: Decimal, coefficient: Decimal) -> PricingResult<Decimal> {
    if coefficient < Decimal::ZERO {
        return Err(PricingError::InvalidCoefficient { coefficient });
    }
    checked(base_price.checked_mul(coefficient)).map(round_price)
}

fn apply_adjustment(price: Decimal, mode: AdjustmentMode, value: Decimal) -> PricingResult<Decimal> {
    let adjusted = match mode {
        AdjustmentMode::Fixed => price.checked_add(value),
        AdjustmentMode::Percentage => value
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|rate| Decimal::ONE.checked_add(rate))
            .and_then(|factor| price.checked_mul(factor)),
    };
    checked(adjusted).map(round_price)
}

/// Apply a single meal tier rule, rounded.
pub fn apply_meal_rule(price: Decimal, rule: &MealRule) -> PricingResult<Decimal> {
    apply_adjustment(price, rule.mode, rule.value)
}

/// Apply a meal plan to a room-type price.
///
/// Half-board applies dinner on top of the rounded breakfast price.
pub fn apply_meal_plan(
    price_for_room_type: Decimal,
    meal_plan: MealPlan,
    rules: &MealRules,
) -> PricingResult<Decimal> {
    match meal_plan {
        MealPlan::Base => Ok(price_for_room_type),
        MealPlan::Breakfast => apply_meal_rule(price_for_room_type, &rules.breakfast),
        MealPlan::HalfBoard => {
            let with_breakfast = apply_meal_rule(price_for_room_type, &rules.breakfast)?;
            apply_meal_rule(with_breakfast, &rules.dinner)
        }
    }
}

/// Apply a service-type surcharge or discount, rounded.
pub fn apply_service_adjustment(price: Decimal, adjustment: &ServiceAdjustment) -> PricingResult<Decimal> {
    apply_adjustment(price, adjustment.mode, adjustment.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn summer() -> Vec<Keyframe> {
        vec![
            Keyframe::new(d(2024, 6, 1), dec!(50000)),
            Keyframe::new(d(2024, 8, 31), dec!(70000)),
        ]
    }

    // ==================== round_price tests ====================

    #[test]
    fn test_round_price_midpoint_away_from_zero() {
        assert_eq!(round_price(dec!(2.5)), dec!(3));
        assert_eq!(round_price(dec!(3.5)), dec!(4));
        assert_eq!(round_price(dec!(-2.5)), dec!(-3));
    }

    #[test]
    fn test_round_price_normal_rounding() {
        assert_eq!(round_price(dec!(59890.11)), dec!(59890));
        assert_eq!(round_price(dec!(60109.89)), dec!(60110));
        assert_eq!(round_price(dec!(0)), dec!(0));
    }

    // ==================== interpolate_base_price tests ====================

    #[test]
    fn test_interpolate_empty_is_no_data() {
        assert_eq!(
            interpolate_base_price(&[], d(2024, 6, 1)),
            Err(PricingError::NoData)
        );
    }

    #[test]
    fn test_interpolate_single_keyframe_is_constant() {
        let kfs = vec![Keyframe::new(d(2024, 6, 1), dec!(42000))];
        assert_eq!(interpolate_base_price(&kfs, d(2020, 1, 1)).unwrap(), dec!(42000));
        assert_eq!(interpolate_base_price(&kfs, d(2030, 1, 1)).unwrap(), dec!(42000));
    }

    #[test]
    fn test_interpolate_exact_keyframe_dates() {
        let kfs = vec![
            Keyframe::new(d(2024, 6, 1), dec!(50000)),
            Keyframe::new(d(2024, 7, 3), dec!(61234.57)),
            Keyframe::new(d(2024, 8, 31), dec!(70000)),
        ];
        for kf in &kfs {
            assert_eq!(interpolate_base_price(&kfs, kf.date).unwrap(), kf.value);
        }
    }

    #[test]
    fn test_interpolate_clamps_outside_range() {
        let kfs = summer();
        assert_eq!(interpolate_base_price(&kfs, d(2024, 1, 1)).unwrap(), dec!(50000));
        assert_eq!(interpolate_base_price(&kfs, d(2024, 12, 24)).unwrap(), dec!(70000));
    }

    #[test]
    fn test_interpolate_linear_between_keyframes() {
        let kfs = summer();
        // 46 of 91 days elapsed
        let value = interpolate_base_price(&kfs, d(2024, 7, 17)).unwrap();
        assert_eq!(round_price(value), dec!(60110));

        // 45 of 91 days elapsed
        let value = interpolate_base_price(&kfs, d(2024, 7, 16)).unwrap();
        assert_eq!(round_price(value), dec!(59890));
    }

    #[test]
    fn test_interpolate_monotonic_and_bounded() {
        let kfs = summer();
        let mut previous = dec!(50000);
        let mut date = d(2024, 6, 2);
        while date < d(2024, 8, 31) {
            let value = interpolate_base_price(&kfs, date).unwrap();
            assert!(value >= dec!(50000) && value <= dec!(70000));
            assert!(value >= previous);
            previous = value;
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_interpolate_decreasing_segment() {
        let kfs = vec![
            Keyframe::new(d(2024, 3, 1), dec!(80000)),
            Keyframe::new(d(2024, 3, 11), dec!(60000)),
        ];
        assert_eq!(interpolate_base_price(&kfs, d(2024, 3, 6)).unwrap(), dec!(70000));
    }

    #[test]
    fn test_interpolate_unsorted_input() {
        let mut kfs = summer();
        kfs.reverse();
        assert_eq!(interpolate_base_price(&kfs, d(2024, 1, 1)).unwrap(), dec!(50000));
        assert_eq!(
            round_price(interpolate_base_price(&kfs, d(2024, 7, 17)).unwrap()),
            dec!(60110)
        );
    }

    #[test]
    fn test_interpolate_wide_span_does_not_overflow() {
        // 1e25 * 36524 elapsed days does not fit in a Decimal
        let top = Decimal::from_scientific("1e25").unwrap();
        let kfs = vec![
            Keyframe::new(d(1950, 1, 1), dec!(0)),
            Keyframe::new(d(2050, 1, 1), top),
        ];
        let value = interpolate_base_price(&kfs, d(2049, 12, 31)).unwrap();
        assert!(value > Decimal::ZERO && value < top);
    }

    // ==================== apply_room_type_coefficient tests ====================

    #[test]
    fn test_coefficient_multiplies_and_rounds() {
        assert_eq!(apply_room_type_coefficient(dec!(60110), dec!(1.5)).unwrap(), dec!(90165));
        assert_eq!(apply_room_type_coefficient(dec!(50000), dec!(0.62)).unwrap(), dec!(31000));
        assert_eq!(apply_room_type_coefficient(dec!(33333), dec!(0.5)).unwrap(), dec!(16667));
        assert_eq!(apply_room_type_coefficient(dec!(50000), dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_negative_coefficient_rejected() {
        assert_eq!(
            apply_room_type_coefficient(dec!(50000), dec!(-0.1)),
            Err(PricingError::InvalidCoefficient {
                coefficient: dec!(-0.1)
            })
        );
    }

    #[test]
    fn test_coefficient_overflow_is_an_error() {
        let coefficient = Decimal::from_scientific("1e25").unwrap();
        assert_eq!(
            apply_room_type_coefficient(dec!(50000), coefficient),
            Err(PricingError::Overflow)
        );
    }

    // ==================== apply_meal_plan tests ====================

    #[test]
    fn test_meal_plan_base_is_identity() {
        let rules = MealRules {
            breakfast: MealRule::fixed(dec!(1500)),
            dinner: MealRule::fixed(dec!(9000)),
        };
        assert_eq!(apply_meal_plan(dec!(90165), MealPlan::Base, &rules).unwrap(), dec!(90165));
    }

    #[test]
    fn test_meal_plan_breakfast_fixed() {
        let rules = MealRules {
            breakfast: MealRule::fixed(dec!(1500)),
            dinner: MealRule::default(),
        };
        assert_eq!(apply_meal_plan(dec!(90165), MealPlan::Breakfast, &rules).unwrap(), dec!(91665));
    }

    #[test]
    fn test_meal_plan_half_board_layers_percentages() {
        let rules = MealRules {
            breakfast: MealRule::percentage(dec!(15)),
            dinner: MealRule::percentage(dec!(20)),
        };
        assert_eq!(apply_meal_plan(dec!(10000), MealPlan::Breakfast, &rules).unwrap(), dec!(11500));
        assert_eq!(apply_meal_plan(dec!(10000), MealPlan::HalfBoard, &rules).unwrap(), dec!(13800));
    }

    #[test]
    fn test_meal_plan_rounds_between_layers() {
        // 7 * 1.5 = 10.5 -> 11, then 11 * 1.5 = 16.5 -> 17.
        // Rounding once at the end would give 7 * 2.25 = 15.75 -> 16.
        let rules = MealRules {
            breakfast: MealRule::percentage(dec!(50)),
            dinner: MealRule::percentage(dec!(50)),
        };
        assert_eq!(apply_meal_plan(dec!(7), MealPlan::HalfBoard, &rules).unwrap(), dec!(17));
    }

    #[test]
    fn test_meal_plan_mixed_modes() {
        let rules = MealRules {
            breakfast: MealRule::fixed(dec!(2000)),
            dinner: MealRule::percentage(dec!(10)),
        };
        // (50000 + 2000) * 1.10
        assert_eq!(apply_meal_plan(dec!(50000), MealPlan::HalfBoard, &rules).unwrap(), dec!(57200));
    }

    // ==================== apply_service_adjustment tests ====================

    #[test]
    fn test_service_adjustment_discount() {
        let adjustment = ServiceAdjustment {
            service_type: "agency".to_string(),
            mode: AdjustmentMode::Percentage,
            value: dec!(-10),
        };
        assert_eq!(apply_service_adjustment(dec!(91665), &adjustment).unwrap(), dec!(82499));
    }

    #[test]
    fn test_adjustment_overflow_is_an_error() {
        let adjustment = ServiceAdjustment {
            service_type: "gala".to_string(),
            mode: AdjustmentMode::Fixed,
            value: Decimal::MAX,
        };
        assert_eq!(
            apply_service_adjustment(dec!(91665), &adjustment),
            Err(PricingError::Overflow)
        );

        let rules = MealRules {
            breakfast: MealRule::percentage(Decimal::from_scientific("1e26").unwrap()),
            dinner: MealRule::default(),
        };
        assert_eq!(
            apply_meal_plan(dec!(90165), MealPlan::HalfBoard, &rules),
            Err(PricingError::Overflow)
        );
    }
}
