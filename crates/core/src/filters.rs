//! Filter criteria and query composition for the product listing endpoint.

use serde::{Deserialize, Serialize};

use crate::sort::SortState;

/// User-supplied bounds for the product listing. Every bound is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub min_reviews: Option<u64>,
}

impl FilterCriteria {
    /// Criteria with only an upper price bound, as used for the first load.
    #[must_use]
    pub const fn with_max_price(max_price: f64) -> Self {
        Self {
            min_price: None,
            max_price: Some(max_price),
            min_rating: None,
            min_reviews: None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
            && self.min_reviews.is_none()
    }
}

/// One request against `GET /api/products/`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductQuery {
    pub page: u32,
    pub sort: SortState,
    pub filters: FilterCriteria,
    /// The dashboard's first load only honours the `max_price` filter; the
    /// remaining filters apply once the user submits them.
    pub initial_load: bool,
}

impl ProductQuery {
    /// Query string pairs, in the order the backend documents them.
    ///
    /// `ordering` is always present and empty when unsorted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("ordering", self.sort.ordering_token()),
        ];

        let filters = &self.filters;
        if self.initial_load {
            if let Some(max_price) = filters.max_price {
                pairs.push(("max_price", max_price.to_string()));
            }
            return pairs;
        }

        let bounds = [
            ("min_price", filters.min_price.map(|v| v.to_string())),
            ("max_price", filters.max_price.map(|v| v.to_string())),
            ("min_rating", filters.min_rating.map(|v| v.to_string())),
            ("min_reviews", filters.min_reviews.map(|v| v.to_string())),
        ];
        pairs.extend(
            bounds
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value))),
        );
        pairs
    }
}
