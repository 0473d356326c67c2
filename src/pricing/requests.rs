//! Request DTOs exchanged with the back-office API and UI.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::curve::SeasonalCurve;
use super::error::{PricingError, PricingResult};
use super::models::{
    calendar_date, Keyframe, MealPlan, MealRule, MealRules, OperationalPeriod, RoomCoefficients,
    ServiceAdjustment, TariffRules,
};

/// Full pricing configuration as stored by the persistence API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub periods: Vec<OperationalPeriod>,
    #[serde(default)]
    pub room_coefficients: RoomCoefficients,
    #[serde(default)]
    pub meal_rules: MealRules,
    #[serde(default)]
    pub service_adjustments: Vec<ServiceAdjustment>,
}

impl PricingSnapshot {
    /// Validate and split into the curve and the tariff rules
    pub fn into_parts(self) -> PricingResult<(SeasonalCurve, TariffRules)> {
        if let Some((_, &coefficient)) = self
            .room_coefficients
            .iter()
            .find(|(_, c)| **c < Decimal::ZERO)
        {
            return Err(PricingError::InvalidCoefficient { coefficient });
        }

        let curve = SeasonalCurve::from_parts(self.keyframes, self.periods)?;
        let rules = TariffRules {
            room_coefficients: self.room_coefficients,
            meal_rules: self.meal_rules,
            service_adjustments: self.service_adjustments,
        };
        Ok((curve, rules))
    }

    pub fn from_parts(curve: &SeasonalCurve, rules: &TariffRules) -> Self {
        Self {
            keyframes: curve.keyframes().to_vec(),
            periods: curve.periods().to_vec(),
            room_coefficients: rules.room_coefficients.clone(),
            meal_rules: rules.meal_rules,
            service_adjustments: rules.service_adjustments.clone(),
        }
    }
}

/// Request for a single nightly price
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub room_type: String,
    #[serde(default = "default_meal_plan")]
    pub meal_plan: MealPlan,
    #[serde(default)]
    pub services: Vec<String>,
}

fn default_meal_plan() -> MealPlan {
    MealPlan::Base
}

/// Meal tier addressed by a rule change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealTier {
    Breakfast,
    Dinner,
}

/// A single user gesture on the pricing screens, translated into an engine call
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CurveEdit {
    #[serde(rename_all = "camelCase")]
    AddKeyframe {
        #[serde(with = "calendar_date")]
        date: NaiveDate,
        value: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    MoveKeyframe {
        index: usize,
        #[serde(with = "calendar_date")]
        date: NaiveDate,
        value: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    DeleteKeyframe { index: usize },
    #[serde(rename_all = "camelCase")]
    CreatePeriod {
        #[serde(with = "calendar_date")]
        start_date: NaiveDate,
        #[serde(with = "calendar_date")]
        end_date: NaiveDate,
        #[serde(default)]
        label: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    DeletePeriod { period_id: Uuid },
    #[serde(rename_all = "camelCase")]
    SetCoefficient { room_type: String, coefficient: Decimal },
    #[serde(rename_all = "camelCase")]
    RemoveCoefficient { room_type: String },
    #[serde(rename_all = "camelCase")]
    SetMealRule { tier: MealTier, rule: MealRule },
    #[serde(rename_all = "camelCase")]
    SetServiceAdjustment { adjustment: ServiceAdjustment },
    #[serde(rename_all = "camelCase")]
    RemoveServiceAdjustment { service_type: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::AdjustmentMode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_round_trips_into_parts() {
        let snapshot: PricingSnapshot = serde_json::from_str(
            r#"{
                "keyframes": [
                    {"date": "2024-08-31", "value": 70000},
                    {"date": "2024-06-01", "value": 50000}
                ],
                "roomCoefficients": {"single": 0.62, "doble": 1.0},
                "mealRules": {
                    "breakfast": {"mode": "FIXED", "value": 1500},
                    "dinner": {"mode": "PERCENTAGE", "value": 20}
                }
            }"#,
        )
        .unwrap();

        let (curve, rules) = snapshot.into_parts().unwrap();
        assert_eq!(curve.keyframes().len(), 2);
        assert_eq!(rules.coefficient("single"), Some(dec!(0.62)));
        assert_eq!(rules.meal_rules.dinner.mode, AdjustmentMode::Percentage);
    }

    #[test]
    fn test_snapshot_json_keeps_prices_and_coefficients_exact() {
        let mut curve = SeasonalCurve::new();
        curve.add_keyframe(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), dec!(61234.57)).unwrap();
        curve.add_keyframe(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(), dec!(70000)).unwrap();
        let mut rules = TariffRules::default();
        rules.room_coefficients.insert("single".to_string(), dec!(0.62));
        rules.room_coefficients.insert("familiar".to_string(), dec!(1.125));
        let snapshot = PricingSnapshot::from_parts(&curve, &rules);

        let json = serde_json::to_string(&snapshot).unwrap();
        let reloaded: PricingSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded, snapshot);
        assert_eq!(reloaded.keyframes[0].value, dec!(61234.57));
    }

    #[test]
    fn test_snapshot_rejects_negative_coefficient() {
        let mut snapshot = PricingSnapshot::default();
        snapshot
            .room_coefficients
            .insert("single".to_string(), dec!(-0.62));

        assert_eq!(
            snapshot.into_parts(),
            Err(PricingError::InvalidCoefficient {
                coefficient: dec!(-0.62)
            })
        );
    }

    #[test]
    fn test_curve_edit_tagged_json() {
        let edits: Vec<CurveEdit> = serde_json::from_str(
            r#"[
                {"action": "addKeyframe", "date": "2024-07-01", "value": 61000},
                {"action": "createPeriod", "startDate": "2024-12-01", "endDate": "2025-03-31", "label": "Verano"},
                {"action": "setMealRule", "tier": "breakfast", "rule": {"mode": "PERCENTAGE", "value": 15}}
            ]"#,
        )
        .unwrap();

        assert!(matches!(edits[0], CurveEdit::AddKeyframe { .. }));
        match &edits[1] {
            CurveEdit::CreatePeriod { label, .. } => assert_eq!(label.as_deref(), Some("Verano")),
            other => panic!("unexpected edit {:?}", other),
        }
        assert!(matches!(
            edits[2],
            CurveEdit::SetMealRule {
                tier: MealTier::Breakfast,
                ..
            }
        ));
    }

    #[test]
    fn test_quote_request_defaults() {
        let request: QuoteRequest =
            serde_json::from_str(r#"{"date": "2024-07-17", "roomType": "doble"}"#).unwrap();
        assert_eq!(request.meal_plan, MealPlan::Base);
        assert!(request.services.is_empty());
    }
}
