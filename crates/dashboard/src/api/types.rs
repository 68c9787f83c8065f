//! Wire types for the product API.

use serde::Deserialize;
use serde_json::Value;
use wb_dashboard_core::{Product, RawProduct, coerce_f64};

/// One normalized page of the product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total matching products across all pages.
    pub total_items: u64,
    /// Products per page, used for page-count arithmetic.
    pub page_size: u32,
}

/// Listing body: the paginated envelope, or a bare array when the backend
/// has pagination switched off.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ProductsPayload {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        results: Vec<RawProduct>,
    },
    Bare(Vec<RawProduct>),
}

impl ProductsPayload {
    /// Normalize into a [`ProductPage`].
    ///
    /// `configured_page_size` is the backend's page size; a bare array is
    /// treated as a single page holding everything.
    pub(super) fn into_page(self, configured_page_size: u32) -> ProductPage {
        match self {
            Self::Paginated { count, results } => {
                let returned = results.len();
                let products: Vec<Product> =
                    results.into_iter().map(RawProduct::normalize).collect();
                let page_size = u32::try_from(returned)
                    .unwrap_or(u32::MAX)
                    .max(configured_page_size);
                ProductPage {
                    total_items: count.unwrap_or(returned as u64),
                    page_size,
                    products,
                }
            }
            Self::Bare(results) => {
                let products: Vec<Product> =
                    results.into_iter().map(RawProduct::normalize).collect();
                ProductPage {
                    total_items: products.len() as u64,
                    page_size: u32::try_from(products.len()).unwrap_or(u32::MAX).max(1),
                    products,
                }
            }
        }
    }
}

/// `GET /api/max_price/` body. The backend renders decimals as strings.
#[derive(Debug, Deserialize)]
pub(super) struct MaxPricePayload {
    #[serde(default)]
    max_price: Value,
}

impl MaxPricePayload {
    /// The maximum price, `0` when absent or unparseable.
    pub(super) fn value(&self) -> f64 {
        coerce_f64(&self.max_price).map_or(0.0, |price| price.max(0.0))
    }
}
