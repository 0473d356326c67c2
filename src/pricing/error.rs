//! Typed failures of the pricing engine.
//!
//! Every validation failure is reported to the caller; nothing is silently
//! corrected and no state is mutated when one of these is returned.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Pricing calculation and curve editing error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("No keyframes available to price the curve")]
    NoData,

    #[error("Invalid coefficient {coefficient}: must not be negative")]
    InvalidCoefficient { coefficient: Decimal },

    #[error("Hotel is closed on {date}")]
    Closed { date: NaiveDate },

    #[error("A keyframe already exists on {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("{date} is outside every operational period")]
    OutsideOperationalPeriod { date: NaiveDate },

    #[error("Operational keyframe on {date} cannot be moved to another date")]
    ImmutableOperationalDate { date: NaiveDate },

    #[error("Operational keyframe on {date} can only be removed with its period")]
    ImmutableOperationalKeyframe { date: NaiveDate },

    #[error("Invalid date range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Period {start}..={end} overlaps period {existing}")]
    OverlappingPeriod {
        start: NaiveDate,
        end: NaiveDate,
        existing: Uuid,
    },

    #[error("Negative price {value} on {date}")]
    NegativePrice { date: NaiveDate, value: Decimal },

    #[error("No keyframe at index {index}")]
    KeyframeNotFound { index: usize },

    #[error("Operational period {id} not found")]
    PeriodNotFound { id: Uuid },

    #[error("No coefficient configured for room type '{room_type}'")]
    UnknownRoomType { room_type: String },

    #[error("No adjustment configured for service type '{service_type}'")]
    UnknownServiceType { service_type: String },

    #[error("Operational keyframe on {date} does not match a boundary of its period")]
    OrphanedOperationalKeyframe { date: NaiveDate },

    #[error("Price arithmetic overflowed")]
    Overflow,
}

impl PricingError {
    /// Stable machine-readable name, used in JSON error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::NoData => "no_data",
            PricingError::InvalidCoefficient { .. } => "invalid_coefficient",
            PricingError::Closed { .. } => "closed",
            PricingError::DuplicateDate { .. } => "duplicate_date",
            PricingError::OutsideOperationalPeriod { .. } => "outside_operational_period",
            PricingError::ImmutableOperationalDate { .. } => "immutable_operational_date",
            PricingError::ImmutableOperationalKeyframe { .. } => "immutable_operational_keyframe",
            PricingError::InvalidRange { .. } => "invalid_range",
            PricingError::OverlappingPeriod { .. } => "overlapping_period",
            PricingError::NegativePrice { .. } => "negative_price",
            PricingError::KeyframeNotFound { .. } => "keyframe_not_found",
            PricingError::PeriodNotFound { .. } => "period_not_found",
            PricingError::UnknownRoomType { .. } => "unknown_room_type",
            PricingError::UnknownServiceType { .. } => "unknown_service_type",
            PricingError::OrphanedOperationalKeyframe { .. } => "orphaned_operational_keyframe",
            PricingError::Overflow => "overflow",
        }
    }
}

pub type PricingResult<T> = std::result::Result<T, PricingError>;
