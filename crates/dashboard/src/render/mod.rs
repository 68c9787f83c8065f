//! Render interface between the refresh controller and a display.
//!
//! The controller never formats anything itself; it hands products, chart
//! data, pagination and sort state to a [`Renderer`]. Display formatting that
//! every renderer shares (prices, ratings, placeholders) lives in
//! [`ProductRow`].

mod terminal;

pub use terminal::TerminalRenderer;

use serde::Serialize;
use wb_dashboard_core::{
    DiscountSeries, PaginationState, PriceBuckets, Product, SortState, discount_series,
    price_buckets,
};

/// Currency suffix used for every price column.
pub const CURRENCY_SYMBOL: &str = "₽";

/// Placeholder for missing values.
pub const EMPTY_CELL: &str = "-";

/// Table message shown when the current page has no products.
pub const NO_DATA_MESSAGE: &str = "No data to display";

/// Table message shown when a fetch failed.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data";

/// Display surface for the dashboard.
///
/// Implementations must not panic; a renderer that cannot write should log
/// and carry on.
pub trait Renderer: Send + Sync {
    /// Show or hide the busy indicator.
    fn set_loading(&self, loading: bool);

    /// Replace the table body with `products` (or the empty-state message).
    fn render_table(&self, products: &[Product]);

    /// Replace the table body with the load-failure message.
    fn render_failure(&self);

    /// Redraw both charts.
    fn update_charts(&self, charts: &ChartData);

    /// Redraw the pagination strip and page-info caption.
    fn update_pagination(&self, pagination: &PaginationState, shown: usize);

    /// Mark the active sort column.
    fn update_sort_indicators(&self, sort: &SortState);
}

/// Data behind the two dashboard charts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartData {
    pub price_buckets: PriceBuckets,
    pub discounts: DiscountSeries,
    /// Size of the page the histogram was computed from.
    pub product_count: usize,
}

impl ChartData {
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            price_buckets: price_buckets(products),
            discounts: discount_series(products),
            product_count: products.len(),
        }
    }

    /// Histogram caption, e.g. `Products (50)`.
    #[must_use]
    pub fn histogram_caption(&self) -> String {
        format!("Products ({})", self.product_count)
    }

    /// Scatter caption, e.g. `Discounted products (12)`.
    #[must_use]
    pub fn scatter_caption(&self) -> String {
        format!("Discounted products ({})", self.discounts.len())
    }
}

/// One formatted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub name: String,
    pub price: String,
    pub discount_price: String,
    pub rating: String,
    pub reviews: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            name: sanitize_name(&product.name),
            price: format_price(product.price),
            discount_price: product
                .discount_price
                .map_or_else(|| EMPTY_CELL.to_string(), format_price),
            rating: product
                .rating
                .map_or_else(|| EMPTY_CELL.to_string(), |r| format!("{r:.1}")),
            reviews: product
                .reviews_count
                .map_or_else(|| EMPTY_CELL.to_string(), |n| n.to_string()),
        }
    }
}

/// Format a price as `1234.50 ₽`.
#[must_use]
pub fn format_price(amount: f64) -> String {
    format!("{amount:.2} {CURRENCY_SYMBOL}")
}

/// Strip control characters so a product name cannot corrupt the display.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
