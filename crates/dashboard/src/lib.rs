//! Product analytics dashboard client.
//!
//! Fetches product listings from the analytics backend, keeps pagination,
//! sort and filter state, derives chart data and drives a [`render::Renderer`].
//!
//! # Modules
//!
//! - [`api`] - HTTP client for `/api/products/` and `/api/max_price/`
//! - [`config`] - Environment-based configuration
//! - [`controller`] - Refresh state machine shared by user input and timer
//! - [`refresh`] - Cancellable auto-refresh task
//! - [`render`] - Renderer trait and the plain-text terminal renderer
//! - [`telemetry`] - Tracing subscriber and Sentry setup
//!
//! # Example
//!
//! ```rust,ignore
//! let config = DashboardConfig::from_env()?;
//! let client = ProductsClient::new(&config.api)?;
//! let controller = RefreshController::new(client, Arc::new(TerminalRenderer::stdout()));
//! controller.initialize().await;
//! let timer = controller.start_auto_refresh(config.refresh_interval);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod refresh;
pub mod render;
pub mod telemetry;

pub use api::{ApiError, ProductPage, ProductsClient};
pub use config::{ApiConfig, ConfigError, DashboardConfig};
pub use controller::{DashboardState, Phase, RefreshController, RefreshOutcome};
pub use error::DashboardError;
pub use refresh::AutoRefresh;
pub use render::{ChartData, ProductRow, Renderer, TerminalRenderer};
