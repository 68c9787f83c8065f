//! Integration test support for the product analytics dashboard.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wb-dashboard-integration-tests
//! ```
//!
//! No external services are needed. Each test starts a [`MockBackend`], an
//! in-process axum server on an ephemeral port that imitates the product API
//! (filtering, ordering, page-number pagination), and records every request
//! it receives. [`RecordingRenderer`] captures what the controller asked to
//! display.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wb_dashboard::{
    ApiConfig, ChartData, ConfigError, DashboardError, ProductsClient, RefreshController, Renderer,
};
use wb_dashboard_core::{PaginationState, Product, SortState, coerce_f64};

/// Page size the mock paginates with.
pub const MOCK_PAGE_SIZE: usize = 50;

// =============================================================================
// Fixtures
// =============================================================================

/// Product JSON in the backend's wire format (decimals as strings).
#[must_use]
pub fn product_json(
    id: i64,
    price: f64,
    discount_price: Option<f64>,
    rating: Option<f64>,
    reviews_count: Option<u64>,
) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "price": format!("{price:.2}"),
        "discount_price": discount_price.map(|p| format!("{p:.2}")),
        "rating": rating,
        "reviews_count": reviews_count,
        "created_at": format!("2024-01-{:02}T10:00:00Z", (id % 28) + 1),
    })
}

/// `count` products with ids `1..=count`, price `id * 10`, a 10% discount on
/// every even id, rating cycling through `1.0..=5.0` and `id` reviews.
#[must_use]
#[allow(clippy::cast_precision_loss)] // fixture ids are small
pub fn catalogue(count: u32) -> Vec<Value> {
    (1..=i64::from(count))
        .map(|id| {
            let price = id as f64 * 10.0;
            let discount = (id % 2 == 0).then_some(price * 0.9);
            let rating = ((id % 5) + 1) as f64;
            product_json(id, price, discount, Some(rating), u64::try_from(id).ok())
        })
        .collect()
}

// =============================================================================
// Mock backend
// =============================================================================

/// One request received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RecordedRequest {
    /// Query parameter `key`, if sent.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[derive(Default)]
struct MockState {
    products: Mutex<Vec<Value>>,
    max_price: Mutex<Value>,
    requests: Mutex<Vec<RecordedRequest>>,
    failure: Mutex<Option<StatusCode>>,
    raw_body: Mutex<Option<String>>,
    bare_array: Mutex<bool>,
    delays: Mutex<HashMap<u32, Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the product API.
///
/// The server shuts down when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
    _task: JoinHandle<()>,
}

impl MockBackend {
    /// Serve `products` on an ephemeral port.
    ///
    /// `max_price` starts as the highest price in `products`, rendered as a
    /// decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind.
    pub async fn start(products: Vec<Value>) -> io::Result<Self> {
        let max_price = products
            .iter()
            .filter_map(|p| p.get("price").and_then(coerce_f64))
            .reduce(f64::max)
            .unwrap_or(0.0);

        let state = Arc::new(MockState::default());
        *lock(&state.products) = products;
        *lock(&state.max_price) = json!(format!("{max_price:.2}"));

        let app = Router::new()
            .route("/api/products/", get(list_products))
            .route("/api/max_price/", get(max_price_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            _task: task,
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:51234`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client settings pointing at this mock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the mock URL is rejected.
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        let mut config = ApiConfig::new(&self.url())?;
        config.page_size = u32::try_from(MOCK_PAGE_SIZE).unwrap_or(u32::MAX);
        config.request_timeout = Duration::from_secs(5);
        Ok(config)
    }

    /// Client pointing at this mock.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` if the client cannot be built.
    pub fn client(&self) -> Result<ProductsClient, DashboardError> {
        Ok(ProductsClient::new(&self.api_config()?)?)
    }

    /// Controller wired to this mock and a fresh [`RecordingRenderer`].
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` if the client cannot be built.
    pub fn controller(&self) -> Result<(RefreshController, Arc<RecordingRenderer>), DashboardError> {
        let recorder = Arc::new(RecordingRenderer::default());
        let renderer: Arc<dyn Renderer> = recorder.clone();
        Ok((RefreshController::new(self.client()?, renderer), recorder))
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests to `/api/products/` only.
    #[must_use]
    pub fn product_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == "/api/products/")
            .collect()
    }

    /// Respond to every request with `status` until cleared with `None`.
    pub fn set_failure(&self, status: Option<u16>) {
        *lock(&self.state.failure) = status.and_then(|s| StatusCode::from_u16(s).ok());
    }

    /// Answer `/api/products/` with `body` verbatim until cleared.
    pub fn set_raw_body(&self, body: Option<&str>) {
        *lock(&self.state.raw_body) = body.map(str::to_string);
    }

    /// Answer `/api/products/` with a bare JSON array instead of the
    /// paginated envelope.
    pub fn set_bare_array(&self, bare: bool) {
        *lock(&self.state.bare_array) = bare;
    }

    /// Delay responses for `page` by `delay`.
    pub fn set_delay(&self, page: u32, delay: Duration) {
        lock(&self.state.delays).insert(page, delay);
    }

    pub fn set_max_price(&self, value: Value) {
        *lock(&self.state.max_price) = value;
    }

    pub fn set_products(&self, products: Vec<Value>) {
        *lock(&self.state.products) = products;
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn max_price_handler(
    State(state): State<Arc<MockState>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    record(&state, "/api/max_price/", params);
    if let Some(status) = *lock(&state.failure) {
        return status.into_response();
    }
    let max_price = lock(&state.max_price).clone();
    Json(json!({ "max_price": max_price })).into_response()
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    record(&state, "/api/products/", params.clone());

    let delay = u32::try_from(page)
        .ok()
        .and_then(|p| lock(&state.delays).get(&p).copied());
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if let Some(status) = *lock(&state.failure) {
        return (status, Json(json!({ "detail": "mock failure" }))).into_response();
    }
    if let Some(body) = lock(&state.raw_body).clone() {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();
    }

    let mut matching: Vec<Value> = lock(&state.products)
        .iter()
        .filter(|product| matches_filters(product, &params))
        .cloned()
        .collect();
    if let Some(ordering) = params.get("ordering").filter(|o| !o.is_empty()) {
        order_by(&mut matching, ordering);
    }

    if *lock(&state.bare_array) {
        return Json(Value::Array(matching)).into_response();
    }

    let count = matching.len();
    let offset = page.saturating_sub(1) * MOCK_PAGE_SIZE;
    if page == 0 || (page > 1 && offset >= count) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Invalid page." })),
        )
            .into_response();
    }
    let results: Vec<Value> = matching
        .into_iter()
        .skip(offset)
        .take(MOCK_PAGE_SIZE)
        .collect();

    Json(json!({
        "count": count,
        "next": (offset + MOCK_PAGE_SIZE < count).then(|| format!("?page={}", page + 1)),
        "previous": (page > 1).then(|| format!("?page={}", page - 1)),
        "results": results,
    }))
    .into_response()
}

fn record(state: &MockState, path: &str, params: BTreeMap<String, String>) {
    lock(&state.requests).push(RecordedRequest {
        path: path.to_string(),
        params,
    });
}

fn number(product: &Value, key: &str) -> Option<f64> {
    product.get(key).and_then(coerce_f64)
}

fn matches_filters(product: &Value, params: &BTreeMap<String, String>) -> bool {
    let bound = |key: &str| params.get(key).and_then(|v| v.parse::<f64>().ok());
    let at_least = |field: &str, min: Option<f64>| {
        min.is_none_or(|min| number(product, field).is_some_and(|v| v >= min))
    };

    let price = number(product, "price").unwrap_or(0.0);
    at_least("price", bound("min_price"))
        && bound("max_price").is_none_or(|max| price <= max)
        && at_least("rating", bound("min_rating"))
        && at_least("reviews_count", bound("min_reviews"))
}

fn order_by(products: &mut [Value], ordering: &str) {
    let (field, descending) = ordering
        .strip_prefix('-')
        .map_or((ordering, false), |field| (field, true));

    if field == "created_at" {
        products.sort_by(|a, b| {
            let key = |p: &Value| p.get(field).and_then(Value::as_str).map(str::to_string);
            key(a).cmp(&key(b))
        });
    } else {
        products.sort_by(|a, b| {
            number(a, field)
                .partial_cmp(&number(b, field))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    if descending {
        products.reverse();
    }
}

// =============================================================================
// Recording renderer
// =============================================================================

/// One call received by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Loading(bool),
    Table(Vec<Product>),
    Failure,
    Charts(ChartData),
    Pagination(PaginationState, usize),
    Sort(SortState),
}

impl RenderEvent {
    /// Short name of the call, for order assertions.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Loading(true) => "loading",
            Self::Loading(false) => "idle",
            Self::Table(_) => "table",
            Self::Failure => "failure",
            Self::Charts(_) => "charts",
            Self::Pagination(..) => "pagination",
            Self::Sort(_) => "sort",
        }
    }
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn events(&self) -> Vec<RenderEvent> {
        lock(&self.events).clone()
    }

    /// Call names in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        lock(&self.events).iter().map(RenderEvent::kind).collect()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    /// Products of the most recent `render_table` call.
    #[must_use]
    pub fn last_table(&self) -> Option<Vec<Product>> {
        lock(&self.events).iter().rev().find_map(|event| match event {
            RenderEvent::Table(products) => Some(products.clone()),
            _ => None,
        })
    }

    /// Most recent `update_charts` payload.
    #[must_use]
    pub fn last_charts(&self) -> Option<ChartData> {
        lock(&self.events).iter().rev().find_map(|event| match event {
            RenderEvent::Charts(charts) => Some(charts.clone()),
            _ => None,
        })
    }

    /// Most recent `update_pagination` payload.
    #[must_use]
    pub fn last_pagination(&self) -> Option<(PaginationState, usize)> {
        lock(&self.events).iter().rev().find_map(|event| match event {
            RenderEvent::Pagination(state, shown) => Some((*state, *shown)),
            _ => None,
        })
    }

    fn push(&self, event: RenderEvent) {
        lock(&self.events).push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn set_loading(&self, loading: bool) {
        self.push(RenderEvent::Loading(loading));
    }

    fn render_table(&self, products: &[Product]) {
        self.push(RenderEvent::Table(products.to_vec()));
    }

    fn render_failure(&self) {
        self.push(RenderEvent::Failure);
    }

    fn update_charts(&self, charts: &ChartData) {
        self.push(RenderEvent::Charts(charts.clone()));
    }

    fn update_pagination(&self, pagination: &PaginationState, shown: usize) {
        self.push(RenderEvent::Pagination(*pagination, shown));
    }

    fn update_sort_indicators(&self, sort: &SortState) {
        self.push(RenderEvent::Sort(*sort));
    }
}
