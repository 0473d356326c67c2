//! Seasonal price curve: keyframes plus the operational periods that clip it.
//!
//! Every edit validates in full before touching state; a rejected edit leaves
//! the curve exactly as it was.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calculators::{interpolate_base_price, round_price};
use super::error::{PricingError, PricingResult};
use super::models::{Keyframe, OperationalPeriod, OperationalType};

/// Keyframe set, always sorted by date and unique per day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalCurve {
    keyframes: Vec<Keyframe>,
    periods: Vec<OperationalPeriod>,
}

impl SeasonalCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from data loaded from the back-office store.
    ///
    /// Sorts the keyframes and rejects anything that breaks the curve
    /// invariants instead of repairing it.
    pub fn from_parts(
        mut keyframes: Vec<Keyframe>,
        mut periods: Vec<OperationalPeriod>,
    ) -> PricingResult<Self> {
        keyframes.sort_by_key(|k| k.date);
        periods.sort_by_key(|p| p.start_date);

        for pair in keyframes.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(PricingError::DuplicateDate { date: pair[1].date });
            }
        }
        for kf in &keyframes {
            if kf.value < Decimal::ZERO {
                return Err(PricingError::NegativePrice {
                    date: kf.date,
                    value: kf.value,
                });
            }
        }

        for (i, period) in periods.iter().enumerate() {
            if period.end_date < period.start_date {
                return Err(PricingError::InvalidRange {
                    start: period.start_date,
                    end: period.end_date,
                });
            }
            if let Some(previous) = i.checked_sub(1).map(|j| &periods[j]) {
                if previous.overlaps(period.start_date, period.end_date) {
                    return Err(PricingError::OverlappingPeriod {
                        start: period.start_date,
                        end: period.end_date,
                        existing: previous.id,
                    });
                }
            }
        }

        for kf in keyframes.iter().filter(|k| k.is_operational) {
            let owner = kf
                .period_id
                .and_then(|id| periods.iter().find(|p| p.id == id));
            let matches_boundary = match (owner, kf.operational_type) {
                (Some(p), Some(OperationalType::Opening)) => p.start_date == kf.date,
                (Some(p), Some(OperationalType::Closing)) => p.end_date == kf.date,
                _ => false,
            };
            if !matches_boundary {
                return Err(PricingError::OrphanedOperationalKeyframe { date: kf.date });
            }
        }

        Ok(Self { keyframes, periods })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn periods(&self) -> &[OperationalPeriod] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn period_containing(&self, date: NaiveDate) -> Option<&OperationalPeriod> {
        self.periods.iter().find(|p| p.contains(date))
    }

    /// Open when no periods are configured, or when a period covers the date
    pub fn is_open(&self, date: NaiveDate) -> bool {
        self.periods.is_empty() || self.period_containing(date).is_some()
    }

    fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.keyframes.binary_search_by_key(&date, |k| k.date).ok()
    }

    /// Keyframes that shape the curve on `date`.
    ///
    /// With periods configured only the keyframes inside the period covering
    /// `date` count, so the curve never bridges a closed gap. Keyframes lying
    /// outside every period belong to no segment.
    pub fn segment_for(&self, date: NaiveDate) -> PricingResult<Vec<Keyframe>> {
        if self.periods.is_empty() {
            return Ok(self.keyframes.clone());
        }

        let period = self
            .period_containing(date)
            .ok_or(PricingError::Closed { date })?;

        Ok(self
            .keyframes
            .iter()
            .filter(|k| period.contains(k.date))
            .cloned()
            .collect())
    }

    /// Un-rounded base price on an open date
    pub fn base_price_at(&self, date: NaiveDate) -> PricingResult<Decimal> {
        let segment = self.segment_for(date)?;
        interpolate_base_price(&segment, date)
    }

    fn validate_new_date(&self, date: NaiveDate, value: Decimal, ignore: Option<usize>) -> PricingResult<()> {
        if value < Decimal::ZERO {
            return Err(PricingError::NegativePrice { date, value });
        }
        if let Some(existing) = self.position_of(date) {
            if Some(existing) != ignore {
                return Err(PricingError::DuplicateDate { date });
            }
        }
        if !self.is_open(date) {
            return Err(PricingError::OutsideOperationalPeriod { date });
        }
        Ok(())
    }

    fn insert_sorted(&mut self, keyframe: Keyframe) -> usize {
        let idx = self.keyframes.partition_point(|k| k.date < keyframe.date);
        self.keyframes.insert(idx, keyframe);
        idx
    }

    /// Add a regular keyframe, returning its index.
    ///
    /// Re-adding a keyframe identical to an existing regular one is a no-op.
    pub fn add_keyframe(&mut self, date: NaiveDate, value: Decimal) -> PricingResult<usize> {
        if let Some(idx) = self.position_of(date) {
            let existing = &self.keyframes[idx];
            if !existing.is_operational && existing.value == value {
                return Ok(idx);
            }
        }

        self.validate_new_date(date, value, None)?;
        Ok(self.insert_sorted(Keyframe::new(date, value)))
    }

    /// Move and/or re-price the keyframe at `index`, returning its new index.
    ///
    /// Operational keyframes only accept a new value.
    pub fn move_keyframe(
        &mut self,
        index: usize,
        new_date: NaiveDate,
        new_value: Decimal,
    ) -> PricingResult<usize> {
        let current = self
            .keyframes
            .get(index)
            .ok_or(PricingError::KeyframeNotFound { index })?;

        if current.is_operational {
            if new_date != current.date {
                return Err(PricingError::ImmutableOperationalDate { date: current.date });
            }
            if new_value < Decimal::ZERO {
                return Err(PricingError::NegativePrice {
                    date: new_date,
                    value: new_value,
                });
            }
            self.keyframes[index].value = new_value;
            return Ok(index);
        }

        self.validate_new_date(new_date, new_value, Some(index))?;

        let mut moved = self.keyframes.remove(index);
        moved.date = new_date;
        moved.value = new_value;
        Ok(self.insert_sorted(moved))
    }

    /// Remove a regular keyframe
    pub fn delete_keyframe(&mut self, index: usize) -> PricingResult<Keyframe> {
        let current = self
            .keyframes
            .get(index)
            .ok_or(PricingError::KeyframeNotFound { index })?;

        if current.is_operational {
            return Err(PricingError::ImmutableOperationalKeyframe { date: current.date });
        }

        Ok(self.keyframes.remove(index))
    }

    /// Open a new season.
    ///
    /// Its boundary keyframes take the price the whole existing curve (all
    /// keyframes, unsegmented) gives on those dates at creation time.
    /// Fails with `DuplicateDate` when any keyframe already sits on one of
    /// the boundaries, since keyframe dates stay unique.
    pub fn create_operational_period(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        label: Option<String>,
    ) -> PricingResult<OperationalPeriod> {
        if end_date < start_date {
            return Err(PricingError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        if let Some(existing) = self.periods.iter().find(|p| p.overlaps(start_date, end_date)) {
            return Err(PricingError::OverlappingPeriod {
                start: start_date,
                end: end_date,
                existing: existing.id,
            });
        }
        for date in [start_date, end_date] {
            if self.position_of(date).is_some() {
                return Err(PricingError::DuplicateDate { date });
            }
        }

        let opening_value = round_price(interpolate_base_price(&self.keyframes, start_date)?);
        let closing_value = round_price(interpolate_base_price(&self.keyframes, end_date)?);

        let period = OperationalPeriod {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            label,
        };

        self.insert_sorted(Keyframe::operational(
            start_date,
            opening_value,
            period.id,
            OperationalType::Opening,
        ));
        if end_date != start_date {
            self.insert_sorted(Keyframe::operational(
                end_date,
                closing_value,
                period.id,
                OperationalType::Closing,
            ));
        }

        let idx = self.periods.partition_point(|p| p.start_date < start_date);
        self.periods.insert(idx, period.clone());
        Ok(period)
    }

    /// Close a season: drops the period and exactly its boundary keyframes
    pub fn delete_operational_period(&mut self, period_id: Uuid) -> PricingResult<OperationalPeriod> {
        let idx = self
            .periods
            .iter()
            .position(|p| p.id == period_id)
            .ok_or(PricingError::PeriodNotFound { id: period_id })?;

        self.keyframes.retain(|k| !k.belongs_to(period_id));
        Ok(self.periods.remove(idx))
    }
}
