//! Crate-level error type.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Errors surfaced by the dashboard library.
///
/// Product fetch failures never reach callers of the refresh operations; they
/// are rendered as the load-failure state instead. This type covers setup
/// failures and rejected navigation.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A page outside `1..=total_pages` was requested.
    #[error("Page {page} is out of range (1-{total_pages})")]
    PageOutOfRange { page: u32, total_pages: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_out_of_range_display() {
        let err = DashboardError::PageOutOfRange {
            page: 7,
            total_pages: 3,
        };
        assert_eq!(err.to_string(), "Page 7 is out of range (1-3)");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: DashboardError =
            ConfigError::InvalidEnvVar("DASHBOARD_PAGE_SIZE".to_string(), "zero".to_string())
                .into();
        assert!(matches!(err, DashboardError::Config(_)));
        assert!(err.to_string().contains("DASHBOARD_PAGE_SIZE"));
    }
}
