//! Chart data derived from the current page of products.
//!
//! Both charts are recomputed from scratch on every refresh; nothing here is
//! cached or persisted.

use serde::Serialize;

use crate::product::Product;

/// Number of price ranges in the histogram.
pub const BUCKET_COUNT: usize = 5;

/// Headroom added above the largest discount on the scatter y-axis.
const DISCOUNT_AXIS_HEADROOM: f64 = 1.1;

/// One price range of the histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBucket {
    /// `"start-end"`, or `"start+"` for the open-ended last range.
    pub label: String,
    pub range_start: f64,
    /// `None` for the last range, which has no upper edge.
    pub range_end: Option<f64>,
    pub count: usize,
}

impl PriceBucket {
    /// Whether `price` falls inside this range, edges included.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.range_start && self.range_end.is_none_or(|end| price <= end)
    }
}

/// Price histogram: either empty or exactly [`BUCKET_COUNT`] ranges.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PriceBuckets(Vec<PriceBucket>);

impl PriceBuckets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PriceBucket] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceBucket> {
        self.0.iter()
    }

    /// Number of products counted across all ranges.
    #[must_use]
    pub fn product_total(&self) -> usize {
        self.0.iter().map(|bucket| bucket.count).sum()
    }

    /// Largest single range count, `0` when empty.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.0.iter().map(|bucket| bucket.count).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a PriceBuckets {
    type Item = &'a PriceBucket;
    type IntoIter = std::slice::Iter<'a, PriceBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Split the positive prices of `products` into five equal-width ranges.
///
/// Range edges are floored to whole currency units. Each product is counted
/// once, in the first range containing it, so a price sitting exactly on a
/// shared edge belongs to the lower range. When every price is the same all
/// ranges collapse onto that value and the first range takes every product.
#[must_use]
#[allow(clippy::cast_precision_loss)] // bucket indices are tiny
pub fn price_buckets(products: &[Product]) -> PriceBuckets {
    let prices: Vec<f64> = products
        .iter()
        .map(|product| product.price)
        .filter(|price| *price > 0.0)
        .collect();

    let Some(min) = prices.iter().copied().reduce(f64::min) else {
        return PriceBuckets::default();
    };
    let max = prices.iter().copied().reduce(f64::max).unwrap_or(min);
    let width = (max - min) / BUCKET_COUNT as f64;

    let mut buckets: Vec<PriceBucket> = (0..BUCKET_COUNT)
        .map(|i| {
            let start = (i as f64).mul_add(width, min).floor();
            let end = ((i + 1) as f64).mul_add(width, min).floor();
            let is_last = i == BUCKET_COUNT - 1;
            PriceBucket {
                label: if is_last {
                    format!("{start}+")
                } else {
                    format!("{start}-{end}")
                },
                range_start: start,
                range_end: (!is_last).then_some(end),
                count: 0,
            }
        })
        .collect();

    for price in prices {
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.contains(price)) {
            bucket.count += 1;
        }
    }

    PriceBuckets(buckets)
}

/// One point of the discount-vs-rating scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscountPoint {
    pub rating: f64,
    /// Regular price minus discount price; always positive.
    pub discount: f64,
}

/// Scatter series of rated products that carry a genuine discount.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DiscountSeries(Vec<DiscountPoint>);

impl DiscountSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn points(&self) -> &[DiscountPoint] {
        &self.0
    }

    /// Upper bound for the y-axis: the largest discount plus 10%.
    #[must_use]
    pub fn y_axis_max(&self) -> Option<f64> {
        self.0
            .iter()
            .map(|point| point.discount)
            .reduce(f64::max)
            .map(|max| max * DISCOUNT_AXIS_HEADROOM)
    }
}

/// Rated products with `price > discount_price`, as `(rating, discount)`.
#[must_use]
pub fn discount_series(products: &[Product]) -> DiscountSeries {
    DiscountSeries(
        products
            .iter()
            .filter_map(|product| {
                let rating = product.rating?;
                let discount = product.discount_amount()?;
                Some(DiscountPoint { rating, discount })
            })
            .collect(),
    )
}
