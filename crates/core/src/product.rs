//! Product records as displayed by the dashboard.
//!
//! The backend serializes decimal columns as strings (`"100.00"`) and leaves
//! optional columns `null`, so records arrive as [`RawProduct`] with loosely
//! typed numeric fields. [`RawProduct::normalize`] turns them into a
//! [`Product`] without ever failing: malformed numbers degrade to `0` (price)
//! or `None` (everything else).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Highest rating the backend hands out.
pub const MAX_RATING: f64 = 5.0;

/// Backend primary key of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Create a new product ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A normalized product record.
///
/// Immutable once built; a refresh replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Regular price, never negative.
    pub price: f64,
    /// Price after discount. May be above, equal to or below `price`.
    pub discount_price: Option<f64>,
    /// Rating in `0.0..=5.0`.
    pub rating: Option<f64>,
    pub reviews_count: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Amount saved, if the product carries a genuine discount.
    ///
    /// Returns `None` when there is no discount price or when the discount
    /// price is not strictly below the regular price.
    #[must_use]
    pub fn discount_amount(&self) -> Option<f64> {
        self.discount_price
            .filter(|discount| self.price > *discount)
            .map(|discount| self.price - discount)
    }
}

/// A product exactly as the API returned it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub discount_price: Value,
    #[serde(default)]
    pub rating: Value,
    #[serde(default)]
    pub reviews_count: Value,
    #[serde(default)]
    pub created_at: Value,
}

impl RawProduct {
    /// Coerce the loosely typed fields into a [`Product`].
    #[must_use]
    pub fn normalize(self) -> Product {
        Product {
            id: self.id,
            name: self.name.unwrap_or_default(),
            price: coerce_f64(&self.price).map_or(0.0, |price| price.max(0.0)),
            discount_price: coerce_f64(&self.discount_price).filter(|d| *d >= 0.0),
            rating: coerce_f64(&self.rating).filter(|r| (0.0..=MAX_RATING).contains(r)),
            reviews_count: lenient_count(&self.reviews_count),
            created_at: self.created_at.as_str().and_then(parse_timestamp),
        }
    }
}

/// Read a finite float from a JSON number or numeric string.
#[must_use]
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Read a non-negative integer; fractional values truncate toward zero.
fn lenient_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let float = coerce_f64(value).filter(|v| *v >= 0.0)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // non-negative and finite
    let count = float.trunc() as u64;
    Some(count)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive timestamps come from backends running without time zone support
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_decimal_strings() {
        let product = raw(json!({
            "id": 7,
            "name": "Kettle",
            "price": "100.00",
            "discount_price": "90.50",
            "rating": 4.5,
            "reviews_count": 10,
            "created_at": "2024-03-01T12:30:00.123456Z"
        }))
        .normalize();

        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.name, "Kettle");
        assert!((product.price - 100.0).abs() < f64::EPSILON);
        assert_eq!(product.discount_price, Some(90.5));
        assert_eq!(product.rating, Some(4.5));
        assert_eq!(product.reviews_count, Some(10));
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_normalize_malformed_price_defaults_to_zero() {
        let product = raw(json!({"id": 1, "name": "x", "price": "abc"})).normalize();
        assert!((product.price - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_negative_price_clamped() {
        let product = raw(json!({"id": 1, "price": -5})).normalize();
        assert!((product.price - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_missing_fields_become_none() {
        let product = raw(json!({"id": 1, "name": null, "price": 10})).normalize();
        assert_eq!(product.name, "");
        assert_eq!(product.discount_price, None);
        assert_eq!(product.rating, None);
        assert_eq!(product.reviews_count, None);
        assert_eq!(product.created_at, None);
    }

    #[test]
    fn test_normalize_malformed_optionals_become_none() {
        let product = raw(json!({
            "id": 1,
            "price": 10,
            "discount_price": "n/a",
            "rating": "great",
            "reviews_count": "many",
            "created_at": "yesterday"
        }))
        .normalize();
        assert_eq!(product.discount_price, None);
        assert_eq!(product.rating, None);
        assert_eq!(product.reviews_count, None);
        assert_eq!(product.created_at, None);
    }

    #[test]
    fn test_normalize_rating_out_of_range() {
        let product = raw(json!({"id": 1, "price": 10, "rating": 7.2})).normalize();
        assert_eq!(product.rating, None);
    }

    #[test]
    fn test_normalize_reviews_count_truncates() {
        let product = raw(json!({"id": 1, "price": 10, "reviews_count": "12.7"})).normalize();
        assert_eq!(product.reviews_count, Some(12));

        let product = raw(json!({"id": 1, "price": 10, "reviews_count": -3})).normalize();
        assert_eq!(product.reviews_count, None);
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let parsed = parse_timestamp("2024-03-01T15:30:00+03:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_naive_timestamp() {
        assert!(parse_timestamp("2024-03-01T12:30:00.5").is_some());
    }

    #[test]
    fn test_discount_amount() {
        let mut product = raw(json!({"id": 1, "price": 100, "discount_price": 80})).normalize();
        assert_eq!(product.discount_amount(), Some(20.0));

        product.discount_price = Some(150.0);
        assert_eq!(product.discount_amount(), None);

        product.discount_price = Some(100.0);
        assert_eq!(product.discount_amount(), None);
    }

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::from(42).to_string(), "42");
        assert_eq!(ProductId::new(42).as_i64(), 42);
    }
}
