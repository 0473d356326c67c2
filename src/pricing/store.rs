//! Pricing store: the single owner of the curve and the tariff rules.
//!
//! Screens read prices from here and subscribe to `PricingEvent`s instead of
//! broadcasting changes to each other. Edits are applied to the in-memory
//! state immediately; persisting them, and re-fetching via
//! `replace_snapshot` when persistence fails, is the caller's job.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{CacheStats, PriceCache};

use super::curve::SeasonalCurve;
use super::engine::{self, CurvePoint, PriceBreakdown, PriceGrid};
use super::error::{PricingError, PricingResult};
use super::models::{Keyframe, MealPlan, MealRule, OperationalPeriod, ServiceAdjustment, TariffRules};
use super::requests::{CurveEdit, MealTier, PricingSnapshot};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notification published after every successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingEvent {
    KeyframesChanged,
    PeriodCreated { id: Uuid },
    PeriodDeleted { id: Uuid },
    CoefficientsChanged,
    MealRulesChanged,
    ServiceAdjustmentsChanged,
    SnapshotReplaced,
}

/// What an applied edit produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum EditOutcome {
    Keyframe { index: usize },
    KeyframeDeleted { keyframe: Keyframe },
    PeriodCreated { period: OperationalPeriod },
    PeriodDeleted { period: OperationalPeriod },
    RulesUpdated,
}

#[derive(Debug, Default)]
struct PricingState {
    curve: SeasonalCurve,
    rules: TariffRules,
}

/// Shared handle to the pricing state
#[derive(Clone)]
pub struct PricingStore {
    state: Arc<RwLock<PricingState>>,
    events: broadcast::Sender<PricingEvent>,
    cache: PriceCache,
}

impl PricingStore {
    pub fn new(curve: SeasonalCurve, rules: TariffRules, cache: PriceCache) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(PricingState { curve, rules })),
            events,
            cache,
        }
    }

    /// Build a store from a snapshot fetched from the persistence API
    pub fn from_snapshot(snapshot: PricingSnapshot, cache: PriceCache) -> PricingResult<Self> {
        let (curve, rules) = snapshot.into_parts()?;
        Ok(Self::new(curve, rules, cache))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PricingEvent> {
        self.events.subscribe()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn snapshot(&self) -> PricingSnapshot {
        let state = self.state.read().await;
        PricingSnapshot::from_parts(&state.curve, &state.rules)
    }

    pub async fn curve(&self) -> SeasonalCurve {
        self.state.read().await.curve.clone()
    }

    pub async fn rules(&self) -> TariffRules {
        self.state.read().await.rules.clone()
    }

    /// Caches are invalidated before the write guard is released
    fn committed(&self, state: RwLockWriteGuard<'_, PricingState>, event: PricingEvent) {
        self.cache.invalidate_all();
        drop(state);
        info!("Pricing change applied: {:?}", event);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn rejected<T>(action: &str, result: PricingResult<T>) -> PricingResult<T> {
        if let Err(e) = &result {
            warn!("Rejected {}: {}", action, e);
        }
        result
    }

    /// Reconcile with the authoritative copy after a failed persistence call
    pub async fn replace_snapshot(&self, snapshot: PricingSnapshot) -> PricingResult<()> {
        let (curve, rules) = Self::rejected("snapshot replacement", snapshot.into_parts())?;
        let mut state = self.state.write().await;
        state.curve = curve;
        state.rules = rules;
        self.committed(state, PricingEvent::SnapshotReplaced);
        Ok(())
    }

    pub async fn add_keyframe(&self, date: NaiveDate, value: Decimal) -> PricingResult<usize> {
        let mut state = self.state.write().await;
        let before = state.curve.keyframes().len();
        let idx = Self::rejected("keyframe add", state.curve.add_keyframe(date, value))?;
        if state.curve.keyframes().len() != before {
            self.committed(state, PricingEvent::KeyframesChanged);
        }
        Ok(idx)
    }

    pub async fn move_keyframe(
        &self,
        index: usize,
        new_date: NaiveDate,
        new_value: Decimal,
    ) -> PricingResult<usize> {
        let mut state = self.state.write().await;
        let before = state.curve.keyframes().get(index).cloned();
        let idx = Self::rejected(
            "keyframe move",
            state.curve.move_keyframe(index, new_date, new_value),
        )?;
        if before.as_ref() != state.curve.keyframes().get(idx) {
            self.committed(state, PricingEvent::KeyframesChanged);
        }
        Ok(idx)
    }

    pub async fn delete_keyframe(&self, index: usize) -> PricingResult<Keyframe> {
        let mut state = self.state.write().await;
        let removed = Self::rejected("keyframe delete", state.curve.delete_keyframe(index))?;
        self.committed(state, PricingEvent::KeyframesChanged);
        Ok(removed)
    }

    pub async fn create_operational_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        label: Option<String>,
    ) -> PricingResult<OperationalPeriod> {
        let mut state = self.state.write().await;
        let period = Self::rejected(
            "period creation",
            state.curve.create_operational_period(start_date, end_date, label),
        )?;
        self.committed(state, PricingEvent::PeriodCreated { id: period.id });
        Ok(period)
    }

    pub async fn delete_operational_period(&self, period_id: Uuid) -> PricingResult<OperationalPeriod> {
        let mut state = self.state.write().await;
        let period = Self::rejected(
            "period deletion",
            state.curve.delete_operational_period(period_id),
        )?;
        self.committed(state, PricingEvent::PeriodDeleted { id: period.id });
        Ok(period)
    }

    pub async fn set_room_coefficient(&self, room_type: &str, coefficient: Decimal) -> PricingResult<()> {
        if coefficient < Decimal::ZERO {
            return Self::rejected(
                "coefficient update",
                Err(PricingError::InvalidCoefficient { coefficient }),
            );
        }
        let mut state = self.state.write().await;
        state
            .rules
            .room_coefficients
            .insert(room_type.to_string(), coefficient);
        self.committed(state, PricingEvent::CoefficientsChanged);
        Ok(())
    }

    pub async fn remove_room_coefficient(&self, room_type: &str) -> PricingResult<Decimal> {
        let mut state = self.state.write().await;
        let removed = state.rules.room_coefficients.remove(room_type);
        let coefficient = Self::rejected(
            "coefficient removal",
            removed.ok_or_else(|| PricingError::UnknownRoomType {
                room_type: room_type.to_string(),
            }),
        )?;
        self.committed(state, PricingEvent::CoefficientsChanged);
        Ok(coefficient)
    }

    pub async fn set_meal_rule(&self, tier: MealTier, rule: MealRule) {
        let mut state = self.state.write().await;
        match tier {
            MealTier::Breakfast => state.rules.meal_rules.breakfast = rule,
            MealTier::Dinner => state.rules.meal_rules.dinner = rule,
        }
        self.committed(state, PricingEvent::MealRulesChanged);
    }

    /// Insert or replace the adjustment for its service type
    pub async fn set_service_adjustment(&self, adjustment: ServiceAdjustment) {
        let mut state = self.state.write().await;
        let adjustments = &mut state.rules.service_adjustments;
        match adjustments
            .iter_mut()
            .find(|a| a.service_type == adjustment.service_type)
        {
            Some(existing) => *existing = adjustment,
            None => adjustments.push(adjustment),
        }
        self.committed(state, PricingEvent::ServiceAdjustmentsChanged);
    }

    pub async fn remove_service_adjustment(&self, service_type: &str) -> PricingResult<ServiceAdjustment> {
        let mut state = self.state.write().await;
        let adjustments = &mut state.rules.service_adjustments;
        let removed = adjustments
            .iter()
            .position(|a| a.service_type == service_type)
            .map(|idx| adjustments.remove(idx));
        let adjustment = Self::rejected(
            "service adjustment removal",
            removed.ok_or_else(|| PricingError::UnknownServiceType {
                service_type: service_type.to_string(),
            }),
        )?;
        self.committed(state, PricingEvent::ServiceAdjustmentsChanged);
        Ok(adjustment)
    }

    /// Apply one UI gesture
    pub async fn apply(&self, edit: CurveEdit) -> PricingResult<EditOutcome> {
        match edit {
            CurveEdit::AddKeyframe { date, value } => self
                .add_keyframe(date, value)
                .await
                .map(|index| EditOutcome::Keyframe { index }),
            CurveEdit::MoveKeyframe { index, date, value } => self
                .move_keyframe(index, date, value)
                .await
                .map(|index| EditOutcome::Keyframe { index }),
            CurveEdit::DeleteKeyframe { index } => self
                .delete_keyframe(index)
                .await
                .map(|keyframe| EditOutcome::KeyframeDeleted { keyframe }),
            CurveEdit::CreatePeriod {
                start_date,
                end_date,
                label,
            } => self
                .create_operational_period(start_date, end_date, label)
                .await
                .map(|period| EditOutcome::PeriodCreated { period }),
            CurveEdit::DeletePeriod { period_id } => self
                .delete_operational_period(period_id)
                .await
                .map(|period| EditOutcome::PeriodDeleted { period }),
            CurveEdit::SetCoefficient {
                room_type,
                coefficient,
            } => self
                .set_room_coefficient(&room_type, coefficient)
                .await
                .map(|_| EditOutcome::RulesUpdated),
            CurveEdit::RemoveCoefficient { room_type } => self
                .remove_room_coefficient(&room_type)
                .await
                .map(|_| EditOutcome::RulesUpdated),
            CurveEdit::SetMealRule { tier, rule } => {
                self.set_meal_rule(tier, rule).await;
                Ok(EditOutcome::RulesUpdated)
            }
            CurveEdit::SetServiceAdjustment { adjustment } => {
                self.set_service_adjustment(adjustment).await;
                Ok(EditOutcome::RulesUpdated)
            }
            CurveEdit::RemoveServiceAdjustment { service_type } => self
                .remove_service_adjustment(&service_type)
                .await
                .map(|_| EditOutcome::RulesUpdated),
        }
    }

    /// Nightly price for `(date, room_type, meal_plan)`
    pub async fn price_for(
        &self,
        date: NaiveDate,
        room_type: &str,
        meal_plan: MealPlan,
    ) -> PricingResult<Arc<PriceBreakdown>> {
        self.quote(date, room_type, meal_plan, &[]).await
    }

    /// Nightly price with service adjustments, served from cache when possible
    pub async fn quote(
        &self,
        date: NaiveDate,
        room_type: &str,
        meal_plan: MealPlan,
        services: &[String],
    ) -> PricingResult<Arc<PriceBreakdown>> {
        let key = PriceCache::quote_key(date, room_type, meal_plan, services);
        if let Some(cached) = self.cache.quotes.get(&key).await {
            debug!("Cache HIT for quote: {:?}", key);
            return Ok(cached);
        }
        debug!("Cache MISS for quote: {:?}", key);

        // Hold the read guard until the insert lands; edits invalidate under the write guard
        let state = self.state.read().await;
        let breakdown = Arc::new(engine::quote(
            &state.curve,
            &state.rules,
            date,
            room_type,
            meal_plan,
            services,
        )?);
        self.cache.quotes.insert(key, breakdown.clone()).await;
        Ok(breakdown)
    }

    /// Rate preview for every room type on `date`
    pub async fn preview_grid(&self, date: NaiveDate) -> PricingResult<Arc<PriceGrid>> {
        if let Some(cached) = self.cache.grids.get(&date).await {
            debug!("Cache HIT for grid: {}", date);
            return Ok(cached);
        }
        debug!("Cache MISS for grid: {}", date);

        let state = self.state.read().await;
        let grid = Arc::new(engine::preview_grid(&state.curve, &state.rules, date)?);
        self.cache.grids.insert(date, grid.clone()).await;
        Ok(grid)
    }

    pub async fn sample_curve(&self, from: NaiveDate, to: NaiveDate) -> PricingResult<Vec<CurvePoint>> {
        let state = self.state.read().await;
        engine::sample_curve(&state.curve, from, to)
    }
}
