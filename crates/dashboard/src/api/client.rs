//! HTTP client for the product API.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use wb_dashboard_core::ProductQuery;

use super::ApiError;
use super::types::{MaxPricePayload, ProductPage, ProductsPayload};
use crate::config::ApiConfig;

const PRODUCTS_PATH: &str = "api/products/";
const MAX_PRICE_PATH: &str = "api/max_price/";

/// Product API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ProductsClient {
    inner: Arc<ProductsClientInner>,
}

struct ProductsClientInner {
    client: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

impl std::fmt::Debug for ProductsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

impl ProductsClient {
    /// Create a new product API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ProductsClientInner {
                client,
                base_url: config.base_url.clone(),
                page_size: config.page_size,
            }),
        })
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Configured backend page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` on transport failures, `ApiError::Status`
    /// on a non-2xx response and `ApiError::Parse` if the body is not a
    /// product listing.
    #[instrument(skip(self, query), fields(page = query.page, initial_load = query.initial_load))]
    pub async fn fetch_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let pairs = query.to_pairs();
        let payload: ProductsPayload = self.get_json(PRODUCTS_PATH, &pairs).await?;
        let page = payload.into_page(self.inner.page_size);
        debug!(
            products = page.products.len(),
            total_items = page.total_items,
            "Fetched product page"
        );
        Ok(page)
    }

    /// Fetch the highest price across the catalogue.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::fetch_products`].
    #[instrument(skip(self))]
    pub async fn fetch_max_price(&self) -> Result<f64, ApiError> {
        let payload: MaxPricePayload = self.get_json(MAX_PRICE_PATH, &[]).await?;
        Ok(payload.value())
    }

    /// Build the absolute URL for `path` with `pairs` as its query string.
    fn endpoint(&self, path: &str, pairs: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path)?;
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Execute a GET request and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, pairs)?;
        debug!(url = %url, "GET");

        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wb_dashboard_core::{FilterCriteria, SortDirection, SortField, SortState};

    use super::*;

    fn client(base: &str) -> ProductsClient {
        ProductsClient::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_products_endpoint_query_string() {
        let query = ProductQuery {
            page: 2,
            sort: SortState::by(SortField::Rating, SortDirection::Desc),
            filters: FilterCriteria {
                min_rating: Some(4.5),
                ..FilterCriteria::default()
            },
            initial_load: false,
        };
        let url = client("http://localhost:8000")
            .endpoint(PRODUCTS_PATH, &query.to_pairs())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/products/?page=2&ordering=-rating&min_rating=4.5"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let url = client("http://localhost:8000/wb")
            .endpoint(MAX_PRICE_PATH, &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/wb/api/max_price/");
    }

    #[test]
    fn test_debug_output() {
        let debug = format!("{:?}", client("http://localhost:8000"));
        assert!(debug.contains("http://localhost:8000/"));
        assert!(debug.contains("page_size"));
    }
}
