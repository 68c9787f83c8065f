//! One-shot product listing.
//!
//! # Usage
//!
//! ```bash
//! wb-dash products --page 2 --sort price --desc --min-rating 4.5
//! ```
//!
//! Unlike `watch`, a failed request is an error and the command exits
//! non-zero.

use clap::Args;
use wb_dashboard::{ChartData, DashboardConfig, ProductsClient, Renderer, TerminalRenderer};
use wb_dashboard_core::{
    FilterCriteria, PaginationState, ProductQuery, SortDirection, SortField, SortState,
};

use super::CliError;

/// Arguments for `wb-dash products`.
#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Page number
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Sort field (`price`, `rating`, `reviews_count`, `created_at`)
    #[arg(short, long)]
    pub sort: Option<SortField>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Minimum price
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Minimum rating (0-5)
    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Minimum number of reviews
    #[arg(long)]
    pub min_reviews: Option<u64>,
}

impl ProductsArgs {
    fn query(&self) -> ProductQuery {
        let direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        ProductQuery {
            page: self.page,
            sort: self
                .sort
                .map_or_else(SortState::default, |field| SortState::by(field, direction)),
            filters: FilterCriteria {
                min_price: self.min_price,
                max_price: self.max_price,
                min_rating: self.min_rating,
                min_reviews: self.min_reviews,
            },
            initial_load: false,
        }
    }
}

/// Fetch one page and render it to stdout.
pub async fn run(config: &DashboardConfig, args: &ProductsArgs) -> Result<(), CliError> {
    let client = ProductsClient::new(&config.api)?;
    let query = args.query();
    let page = client.fetch_products(&query).await?;

    let pagination = PaginationState::from_fetch(query.page, page.total_items, page.page_size);
    let renderer = TerminalRenderer::stdout();
    renderer.render_table(&page.products);
    renderer.update_charts(&ChartData::from_products(&page.products));
    renderer.update_pagination(&pagination, page.products.len());
    renderer.update_sort_indicators(&query.sort);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ProductsArgs,
    }

    fn parse(argv: &[&str]) -> ProductsArgs {
        Harness::try_parse_from(std::iter::once("products").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_default_query() {
        let query = parse(&[]).query();
        assert_eq!(query.page, 1);
        assert_eq!(query.sort, SortState::default());
        assert!(query.filters.is_empty());
        assert!(!query.initial_load);
    }

    #[test]
    fn test_sort_and_filters() {
        let query = parse(&[
            "--page",
            "3",
            "--sort",
            "rating",
            "--desc",
            "--min-rating",
            "4.5",
            "--min-reviews",
            "20",
        ])
        .query();
        assert_eq!(query.page, 3);
        assert_eq!(query.sort.ordering_token(), "-rating");
        assert_eq!(query.filters.min_rating, Some(4.5));
        assert_eq!(query.filters.min_reviews, Some(20));
    }

    #[test]
    fn test_rejects_page_zero_and_unknown_sort() {
        assert!(Harness::try_parse_from(["products", "--page", "0"]).is_err());
        assert!(Harness::try_parse_from(["products", "--sort", "name"]).is_err());
        assert!(Harness::try_parse_from(["products", "--desc"]).is_err());
    }
}
