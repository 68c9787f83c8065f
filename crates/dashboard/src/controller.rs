//! Refresh controller: the dashboard's state machine.
//!
//! Every user action and every auto-refresh tick funnels through
//! [`RefreshController`], which
//!
//! 1. updates sort/filter/page state and issues a sequence number,
//! 2. fetches the page without holding the state lock,
//! 3. applies the response only if no newer request was issued meanwhile,
//! 4. recomputes pagination and chart data and hands everything to the
//!    [`Renderer`].
//!
//! Product fetch failures never propagate to callers. They are reported to
//! tracing and Sentry and rendered as the load-failure state; charts keep
//! showing the last successfully loaded page.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use wb_dashboard_core::{
    FilterCriteria, PaginationState, Product, ProductQuery, SortField, SortState,
};

use crate::api::{ApiError, ProductPage, ProductsClient};
use crate::error::DashboardError;
use crate::refresh::AutoRefresh;
use crate::render::{ChartData, Renderer};

/// Whether a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

/// What happened to one refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The page was fetched and rendered.
    Applied,
    /// The fetch failed; the failure state was rendered.
    Failed,
    /// A newer request was issued before this one settled; its response was
    /// discarded.
    Superseded,
}

/// Everything the dashboard currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub phase: Phase,
    /// Products of the current page; empty after a failed fetch.
    pub products: Vec<Product>,
    pub sort: SortState,
    /// Filters sent with every request after the first load.
    pub filters: FilterCriteria,
    pub pagination: PaginationState,
    /// Page of the most recently issued request. Refreshes reload this page,
    /// so a tick never undoes a navigation that is still in flight.
    pub requested_page: u32,
    /// Catalogue-wide maximum price, `0` if unknown.
    pub absolute_max_price: f64,
    /// Chart data of the last successfully loaded page.
    pub charts: ChartData,
    /// Sequence number of the most recently issued request.
    pub latest_request: u64,
    /// Outcome of the most recently settled request that was not superseded.
    pub last_outcome: Option<RefreshOutcome>,
}

impl DashboardState {
    fn new(page_size: u32) -> Self {
        Self {
            phase: Phase::Idle,
            products: Vec::new(),
            sort: SortState::default(),
            filters: FilterCriteria::default(),
            pagination: PaginationState::new(page_size),
            requested_page: 1,
            absolute_max_price: 0.0,
            charts: ChartData::default(),
            latest_request: 0,
            last_outcome: None,
        }
    }

    /// Last fetched bounds, positioned at the requested page.
    const fn requested_pagination(&self) -> PaginationState {
        PaginationState {
            current_page: self.requested_page,
            ..self.pagination
        }
    }
}

/// Orchestrates fetch, state update and rendering.
///
/// Cheap to clone; clones share state, so the input loop and the
/// auto-refresh task can drive the same dashboard.
#[derive(Clone)]
pub struct RefreshController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    client: ProductsClient,
    renderer: Arc<dyn Renderer>,
    state: Mutex<DashboardState>,
}

impl std::fmt::Debug for RefreshController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshController")
            .field("client", &self.inner.client)
            .finish_non_exhaustive()
    }
}

impl RefreshController {
    #[must_use]
    pub fn new(client: ProductsClient, renderer: Arc<dyn Renderer>) -> Self {
        let state = DashboardState::new(client.page_size());
        Self {
            inner: Arc::new(ControllerInner {
                client,
                renderer,
                state: Mutex::new(state),
            }),
        }
    }

    /// First load: fetch the catalogue maximum price, then page 1 filtered
    /// only by that maximum.
    ///
    /// A failed max-price request degrades to no price bound.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> RefreshOutcome {
        let max_price = match self.inner.client.fetch_max_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!(error = %e, "Failed to fetch max price, continuing without bound");
                0.0
            }
        };
        info!(max_price, "Dashboard initializing");

        self.load(true, |state| {
            state.absolute_max_price = max_price;
            state.filters = if max_price > 0.0 {
                FilterCriteria::with_max_price(max_price)
            } else {
                FilterCriteria::default()
            };
            1
        })
        .await
    }

    /// Replace the filters and reload from page 1.
    #[instrument(skip(self))]
    pub async fn apply_filters(&self, filters: FilterCriteria) -> RefreshOutcome {
        self.load(false, |state| {
            state.filters = filters;
            1
        })
        .await
    }

    /// Sort by `field`, flipping direction if it is already active, and
    /// reload from page 1.
    #[instrument(skip(self))]
    pub async fn toggle_sort(&self, field: SortField) -> RefreshOutcome {
        self.load(false, |state| {
            state.sort = state.sort.toggled(field);
            1
        })
        .await
    }

    /// Navigate to `page`.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::PageOutOfRange` without fetching if `page` is
    /// outside `1..=total_pages`.
    #[instrument(skip(self))]
    pub async fn go_to_page(&self, page: u32) -> Result<RefreshOutcome, DashboardError> {
        let pagination = self.inner.state.lock().await.pagination;
        if !pagination.contains(page) {
            return Err(DashboardError::PageOutOfRange {
                page,
                total_pages: pagination.total_pages,
            });
        }
        Ok(self.load(false, |_| page).await)
    }

    /// Navigate one page forward from the most recently requested page;
    /// `None` when that is the last page.
    #[instrument(skip(self))]
    pub async fn next_page(&self) -> Option<RefreshOutcome> {
        let pagination = self.inner.state.lock().await.requested_pagination();
        if pagination.is_next_disabled() {
            debug!("Already on the last page");
            return None;
        }
        Some(self.load(false, |_| pagination.current_page + 1).await)
    }

    /// Navigate one page back from the most recently requested page; `None`
    /// when that is the first page.
    #[instrument(skip(self))]
    pub async fn prev_page(&self) -> Option<RefreshOutcome> {
        let pagination = self.inner.state.lock().await.requested_pagination();
        if pagination.is_prev_disabled() {
            debug!("Already on the first page");
            return None;
        }
        Some(self.load(false, |_| pagination.current_page - 1).await)
    }

    /// Reload the current page with the current sort and filters.
    ///
    /// While a navigation, sort or filter change is in flight, the current
    /// page is the one that request asked for.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        self.load(false, |state| state.requested_page).await
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> DashboardState {
        self.inner.state.lock().await.clone()
    }

    /// Start re-fetching the current page every `period`.
    ///
    /// Must be called from within a tokio runtime. The timer stops when the
    /// returned handle is stopped or dropped.
    #[must_use]
    pub fn start_auto_refresh(&self, period: Duration) -> AutoRefresh {
        let controller = self.clone();
        AutoRefresh::spawn(period, move || {
            let controller = controller.clone();
            async move {
                controller.refresh().await;
            }
        })
    }

    /// Issue one request.
    ///
    /// `prepare` mutates state before the request and returns the page to
    /// fetch. The state lock is released while the request is in flight.
    async fn load(
        &self,
        initial_load: bool,
        prepare: impl FnOnce(&mut DashboardState) -> u32,
    ) -> RefreshOutcome {
        let (seq, query) = {
            let mut state = self.inner.state.lock().await;
            let page = prepare(&mut state);
            state.requested_page = page;
            state.latest_request += 1;
            state.phase = Phase::Loading;
            let query = ProductQuery {
                page,
                sort: state.sort,
                filters: state.filters,
                initial_load,
            };
            (state.latest_request, query)
        };
        self.inner.renderer.set_loading(true);

        let result = self.inner.client.fetch_products(&query).await;

        let mut state = self.inner.state.lock().await;
        if seq != state.latest_request {
            debug!(
                seq,
                latest = state.latest_request,
                failed = result.is_err(),
                "Discarding superseded product response"
            );
            return RefreshOutcome::Superseded;
        }

        let outcome = match result {
            Ok(page) => {
                self.apply_page(&mut state, query.page, page);
                RefreshOutcome::Applied
            }
            Err(e) => {
                self.apply_failure(&mut state, query.page, &e);
                RefreshOutcome::Failed
            }
        };
        state.phase = Phase::Idle;
        state.last_outcome = Some(outcome);
        drop(state);

        self.inner.renderer.set_loading(false);
        outcome
    }

    fn apply_page(&self, state: &mut DashboardState, page_number: u32, page: ProductPage) {
        state.pagination = PaginationState::from_fetch(page_number, page.total_items, page.page_size);
        state.products = page.products;
        state.charts = ChartData::from_products(&state.products);
        debug!(
            page = page_number,
            products = state.products.len(),
            total_pages = state.pagination.total_pages,
            "Applied product page"
        );

        let renderer = &self.inner.renderer;
        renderer.render_table(&state.products);
        renderer.update_charts(&state.charts);
        renderer.update_pagination(&state.pagination, state.products.len());
        renderer.update_sort_indicators(&state.sort);
    }

    fn apply_failure(&self, state: &mut DashboardState, page_number: u32, err: &ApiError) {
        let event_id = sentry::capture_error(err);
        error!(
            error = %err,
            sentry_event_id = %event_id,
            page = page_number,
            "Failed to load products"
        );

        state.products.clear();
        self.inner.renderer.render_failure();
    }
}
