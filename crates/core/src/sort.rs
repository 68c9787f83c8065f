//! Sort state for the product table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Columns the backend accepts in its `ordering` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Price,
    Rating,
    ReviewsCount,
    CreatedAt,
}

impl SortField {
    /// All sortable fields, in column order.
    pub const ALL: [Self; 4] = [
        Self::Price,
        Self::Rating,
        Self::ReviewsCount,
        Self::CreatedAt,
    ];

    /// The token the backend expects for this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Rating => "rating",
            Self::ReviewsCount => "reviews_count",
            Self::CreatedAt => "created_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sort field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort field: {0}")]
pub struct SortFieldError(String);

impl FromStr for SortField {
    type Err = SortFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SortFieldError(s.to_string()))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Active sort column and direction.
///
/// `field == None` means the server's default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortState {
    /// Sort by `field` in `direction`.
    #[must_use]
    pub const fn by(field: SortField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// State after the user selects `field`.
    ///
    /// Reselecting the active field flips the direction; any other field
    /// starts ascending.
    #[must_use]
    pub fn toggled(self, field: SortField) -> Self {
        match self.field {
            Some(active) if active == field => Self {
                field: self.field,
                direction: self.direction.flipped(),
            },
            _ => Self::by(field, SortDirection::Asc),
        }
    }

    /// The backend `ordering` value: `field`, `-field` or empty.
    #[must_use]
    pub fn ordering_token(&self) -> String {
        match (self.field, self.direction) {
            (None, _) => String::new(),
            (Some(field), SortDirection::Asc) => field.as_str().to_string(),
            (Some(field), SortDirection::Desc) => format!("-{field}"),
        }
    }

    /// Direction to show next to `field`'s header, if it is the active one.
    #[must_use]
    pub fn indicator_for(&self, field: SortField) -> Option<SortDirection> {
        (self.field == Some(field)).then_some(self.direction)
    }
}
