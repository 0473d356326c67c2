//! Seasonal pricing engine.
//!
//! A price curve defined by sparse date/value keyframes, interpolated
//! piecewise-linearly, clipped to the hotel's operational periods and
//! adjusted by room-type coefficients, meal plans and service adjustments.

pub mod calculators;
pub mod curve;
pub mod engine;
pub mod error;
pub mod models;
pub mod requests;
pub mod responses;
pub mod store;

// Re-export commonly used items
pub use calculators::round_price;
pub use curve::SeasonalCurve;
pub use engine::{price_for, PriceBreakdown};
pub use error::{PricingError, PricingResult};
pub use store::{PricingEvent, PricingStore};
