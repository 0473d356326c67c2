//! Domain models for seasonal pricing.
//!
//! These are the shapes exchanged with the back-office API (camelCase JSON).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which boundary of an operational period a keyframe pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalType {
    Opening,
    Closing,
}

/// A pinned (date, base price) anchor of the seasonal curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub value: Decimal,
    #[serde(default)]
    pub is_operational: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_type: Option<OperationalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_id: Option<Uuid>,
}

impl Keyframe {
    /// Regular, freely editable keyframe
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self {
            date,
            value,
            is_operational: false,
            operational_type: None,
            period_id: None,
        }
    }

    /// Keyframe owned by an operational period boundary
    pub fn operational(
        date: NaiveDate,
        value: Decimal,
        period_id: Uuid,
        operational_type: OperationalType,
    ) -> Self {
        Self {
            date,
            value,
            is_operational: true,
            operational_type: Some(operational_type),
            period_id: Some(period_id),
        }
    }

    pub fn belongs_to(&self, period_id: Uuid) -> bool {
        self.is_operational && self.period_id == Some(period_id)
    }
}

/// Contiguous, inclusive date range during which the hotel is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalPeriod {
    pub id: Uuid,
    #[serde(with = "calendar_date")]
    pub start_date: NaiveDate,
    #[serde(with = "calendar_date")]
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl OperationalPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// How a modifier changes a price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentMode {
    /// Adds a flat amount
    Fixed,
    /// Multiplies by (1 + value / 100)
    Percentage,
}

/// Modifier for one meal tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRule {
    pub mode: AdjustmentMode,
    pub value: Decimal,
}

impl MealRule {
    pub fn fixed(value: Decimal) -> Self {
        Self {
            mode: AdjustmentMode::Fixed,
            value,
        }
    }

    pub fn percentage(value: Decimal) -> Self {
        Self {
            mode: AdjustmentMode::Percentage,
            value,
        }
    }
}

impl Default for MealRule {
    fn default() -> Self {
        Self::fixed(Decimal::ZERO)
    }
}

/// Breakfast and dinner rules; half-board layers dinner over breakfast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRules {
    #[serde(default)]
    pub breakfast: MealRule,
    #[serde(default)]
    pub dinner: MealRule,
}

/// Meal tier of a rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealPlan {
    Base,
    Breakfast,
    HalfBoard,
}

impl MealPlan {
    pub const ALL: [MealPlan; 3] = [MealPlan::Base, MealPlan::Breakfast, MealPlan::HalfBoard];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealPlan::Base => "base",
            MealPlan::Breakfast => "breakfast",
            MealPlan::HalfBoard => "halfBoard",
        }
    }
}

impl std::str::FromStr for MealPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(MealPlan::Base),
            "breakfast" => Ok(MealPlan::Breakfast),
            "halfBoard" | "half_board" | "half-board" => Ok(MealPlan::HalfBoard),
            other => Err(format!("unknown meal plan '{}'", other)),
        }
    }
}

/// Room type name -> multiplier over the base curve (`doble` is 1.0 by convention)
pub type RoomCoefficients = BTreeMap<String, Decimal>;

/// Surcharge or discount for an extra service, applied after the meal plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAdjustment {
    pub service_type: String,
    pub mode: AdjustmentMode,
    pub value: Decimal,
}

/// Everything layered on top of the base curve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffRules {
    #[serde(default)]
    pub room_coefficients: RoomCoefficients,
    #[serde(default)]
    pub meal_rules: MealRules,
    #[serde(default)]
    pub service_adjustments: Vec<ServiceAdjustment>,
}

impl TariffRules {
    pub fn coefficient(&self, room_type: &str) -> Option<Decimal> {
        self.room_coefficients.get(room_type).copied()
    }

    pub fn service_adjustment(&self, service_type: &str) -> Option<&ServiceAdjustment> {
        self.service_adjustments
            .iter()
            .find(|a| a.service_type == service_type)
    }
}

/// Calendar dates in JSON.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp; the time of day is
/// dropped so every comparison happens at day granularity.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid calendar date '{}'", raw)))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Some(date);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|dt| dt.date())
    }
}
