//! Error handling for the application

use crate::pricing::error::PricingError;
use crate::pricing::responses::PricingErrorResponse;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// JSON body describing the failure for the calling API/UI layer
    pub fn to_response(&self) -> PricingErrorResponse {
        match self {
            AppError::Pricing(e) => PricingErrorResponse::from(e),
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                PricingErrorResponse::new("invalid_json", e.to_string())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                PricingErrorResponse::new("io", e.to_string())
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                PricingErrorResponse::new("configuration", msg.clone())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_maps_to_its_type() {
        let err: AppError = PricingError::NoData.into();
        let response = err.to_response();
        assert_eq!(response.error_type, "no_data");
    }

    #[test]
    fn test_config_error_response() {
        let err = AppError::Config("bad".to_string());
        assert_eq!(err.to_response().error_type, "configuration");
        assert!(err.to_string().contains("bad"));
    }
}
