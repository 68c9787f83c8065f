//! Backend product API client.
//!
//! Read-only access to the two endpoints the dashboard consumes:
//!
//! - `GET /api/products/` - paginated, filterable, orderable product listing
//! - `GET /api/max_price/` - highest price across the whole catalogue
//!
//! Responses are normalized into [`wb_dashboard_core::Product`] records;
//! malformed numeric fields never fail a request, only a malformed body does.

mod client;
mod types;

pub use client::ProductsClient;
pub use types::ProductPage;

use thiserror::Error;

/// Errors that can occur when talking to the product API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error: {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the request failed before a usable response arrived.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}
