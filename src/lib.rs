//! Hotel back-office pricing: seasonal rate curves and the adjustments
//! layered on top of them.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

pub use config::Config;
pub use error::{AppError, Result};
