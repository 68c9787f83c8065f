//! Plain-text renderer for terminals and other byte sinks.
//!
//! Each call writes one self-contained block. Disabled pagination arrows are
//! drawn as `·` in place of `<` / `>`.

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};

use tracing::warn;
use wb_dashboard_core::{PaginationState, Product, SortDirection, SortField, SortState};

use super::{ChartData, LOAD_FAILED_MESSAGE, NO_DATA_MESSAGE, ProductRow, Renderer};

const NAME_WIDTH: usize = 40;
const MONEY_WIDTH: usize = 14;
const RATING_WIDTH: usize = 6;
const REVIEWS_WIDTH: usize = 8;
const BAR_WIDTH: usize = 30;
const LABEL_WIDTH: usize = 14;
const DISABLED_ARROW: char = '·';

/// Renderer writing plain text to `W`.
pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalRenderer<Stdout> {
    /// Renderer writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the renderer and return the sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(out, "{line}"))
            .and_then(|()| out.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to write dashboard output");
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn set_loading(&self, loading: bool) {
        if loading {
            self.emit(&["Loading...".to_string()]);
        }
    }

    fn render_table(&self, products: &[Product]) {
        self.emit(&table_lines(products));
    }

    fn render_failure(&self) {
        let mut lines = vec![table_header(), table_rule()];
        lines.push(LOAD_FAILED_MESSAGE.to_string());
        self.emit(&lines);
    }

    fn update_charts(&self, charts: &ChartData) {
        let mut lines = histogram_lines(charts);
        lines.push(String::new());
        lines.extend(discount_lines(charts));
        self.emit(&lines);
    }

    fn update_pagination(&self, pagination: &PaginationState, shown: usize) {
        self.emit(&[pagination_strip(pagination), pagination.page_info(shown)]);
    }

    fn update_sort_indicators(&self, sort: &SortState) {
        self.emit(&[sort_line(sort)]);
    }
}

// =============================================================================
// Table
// =============================================================================

fn table_header() -> String {
    format!(
        "{:<NAME_WIDTH$} {:>MONEY_WIDTH$} {:>MONEY_WIDTH$} {:>RATING_WIDTH$} {:>REVIEWS_WIDTH$}",
        "Name", "Price", "Discount", "Rating", "Reviews"
    )
}

fn table_rule() -> String {
    "-".repeat(NAME_WIDTH + 2 * MONEY_WIDTH + RATING_WIDTH + REVIEWS_WIDTH + 4)
}

fn table_lines(products: &[Product]) -> Vec<String> {
    let mut lines = vec![table_header(), table_rule()];
    if products.is_empty() {
        lines.push(NO_DATA_MESSAGE.to_string());
        return lines;
    }
    lines.extend(products.iter().map(|product| {
        let row = ProductRow::from(product);
        format!(
            "{:<NAME_WIDTH$} {:>MONEY_WIDTH$} {:>MONEY_WIDTH$} {:>RATING_WIDTH$} {:>REVIEWS_WIDTH$}",
            truncate(&row.name, NAME_WIDTH),
            row.price,
            row.discount_price,
            row.rating,
            row.reviews
        )
    }));
    lines
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// =============================================================================
// Charts
// =============================================================================

fn histogram_lines(charts: &ChartData) -> Vec<String> {
    let mut lines = vec![charts.histogram_caption()];
    let max = charts.price_buckets.max_count();
    for bucket in &charts.price_buckets {
        let bar = if max == 0 {
            0
        } else {
            bucket.count * BAR_WIDTH / max
        };
        lines.push(format!(
            "  {:<LABEL_WIDTH$} {:<BAR_WIDTH$} {}",
            bucket.label,
            "#".repeat(bar),
            bucket.count
        ));
    }
    lines
}

fn discount_lines(charts: &ChartData) -> Vec<String> {
    let mut lines = vec![charts.scatter_caption()];
    if let Some(y_max) = charts.discounts.y_axis_max() {
        lines.push(format!("  y max: {y_max:.2}"));
    }
    lines.extend(
        charts
            .discounts
            .points()
            .iter()
            .map(|point| format!("  rating {:.1}  discount {:.2}", point.rating, point.discount)),
    );
    lines
}

// =============================================================================
// Pagination & sort
// =============================================================================

fn pagination_strip(pagination: &PaginationState) -> String {
    let prev = if pagination.is_prev_disabled() {
        DISABLED_ARROW
    } else {
        '<'
    };
    let next = if pagination.is_next_disabled() {
        DISABLED_ARROW
    } else {
        '>'
    };

    let mut parts = vec![prev.to_string()];
    parts.extend(pagination.window().pages().map(|page| {
        if page == pagination.current_page {
            format!("[{page}]")
        } else {
            page.to_string()
        }
    }));
    parts.push(next.to_string());
    parts.join(" ")
}

fn sort_line(sort: &SortState) -> String {
    let Some(field) = sort.field else {
        return "Sorted by: default".to_string();
    };
    let arrow = match sort.indicator_for(field) {
        Some(SortDirection::Desc) => '▼',
        _ => '▲',
    };
    format!("Sorted by: {} {arrow}", column_title(field))
}

const fn column_title(field: SortField) -> &'static str {
    match field {
        SortField::Price => "Price",
        SortField::Rating => "Rating",
        SortField::ReviewsCount => "Reviews",
        SortField::CreatedAt => "Created",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wb_dashboard_core::ProductId;

    use super::*;

    fn product(name: &str, price: f64, discount: Option<f64>, rating: Option<f64>) -> Product {
        Product {
            id: ProductId::new(1),
            name: name.to_string(),
            price,
            discount_price: discount,
            rating,
            reviews_count: Some(3),
            created_at: None,
        }
    }

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    // =========================================================================
    // Table
    // =========================================================================

    #[test]
    fn test_render_table_rows() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.render_table(&[product("Kettle", 1500.0, Some(1200.0), Some(4.7))]);
        let text = output(renderer);
        assert!(text.contains("Kettle"));
        assert!(text.contains("1500.00 ₽"));
        assert!(text.contains("1200.00 ₽"));
        assert!(text.contains("4.7"));
        assert!(!text.contains(NO_DATA_MESSAGE));
    }

    #[test]
    fn test_render_empty_table() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.render_table(&[]);
        assert!(output(renderer).contains(NO_DATA_MESSAGE));
    }

    #[test]
    fn test_render_failure() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.render_failure();
        assert!(output(renderer).contains(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }

    #[test]
    fn test_loading_indicator() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.set_loading(true);
        renderer.set_loading(false);
        assert_eq!(output(renderer), "Loading...\n");
    }

    // =========================================================================
    // Charts
    // =========================================================================

    #[test]
    fn test_histogram_output() {
        let products = [
            product("a", 10.0, None, None),
            product("b", 50.0, None, None),
            product("c", 100.0, Some(80.0), Some(4.0)),
        ];
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.update_charts(&ChartData::from_products(&products));
        let text = output(renderer);
        assert!(text.contains("Products (3)"));
        assert!(text.contains("10-28"));
        assert!(text.contains("82+"));
        assert!(text.contains("Discounted products (1)"));
        assert!(text.contains("y max: 22.00"));
    }

    #[test]
    fn test_empty_charts() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.update_charts(&ChartData::default());
        let text = output(renderer);
        assert!(text.contains("Products (0)"));
        assert!(text.contains("Discounted products (0)"));
        assert!(!text.contains("y max"));
    }

    // =========================================================================
    // Pagination & sort
    // =========================================================================

    #[test]
    fn test_pagination_strip_middle_page() {
        let state = PaginationState::from_fetch(5, 500, 50);
        assert_eq!(pagination_strip(&state), "< 3 4 [5] 6 7 >");
    }

    #[test]
    fn test_pagination_strip_disabled_arrows() {
        let single = PaginationState::from_fetch(1, 10, 50);
        assert_eq!(pagination_strip(&single), "· [1] ·");

        let last = PaginationState::from_fetch(3, 120, 50);
        assert_eq!(pagination_strip(&last), "< 1 2 [3] ·");
    }

    #[test]
    fn test_pagination_page_info() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.update_pagination(&PaginationState::from_fetch(1, 312, 50), 50);
        assert!(output(renderer).contains("Showing 50 of 312 products"));
    }

    #[test]
    fn test_sort_line() {
        assert_eq!(sort_line(&SortState::default()), "Sorted by: default");
        assert_eq!(
            sort_line(&SortState::by(SortField::Price, SortDirection::Desc)),
            "Sorted by: Price ▼"
        );
        assert_eq!(
            sort_line(&SortState::by(SortField::ReviewsCount, SortDirection::Asc)),
            "Sorted by: Reviews ▲"
        );
    }

    #[test]
    fn test_write_failure_is_ignored() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let renderer = TerminalRenderer::new(Closed);
        renderer.render_table(&[]);
        renderer.render_failure();
    }
}
