//! Product dashboard core - shared types and derived data.
//!
//! This crate holds everything the dashboard computes without touching the
//! network or a display. It is shared by:
//! - `wb-dashboard` - Fetch pipeline, refresh controller and renderers
//! - `wb-dashboard-cli` - The `wb-dash` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. Every function here is deterministic, which keeps the
//! aggregation and state arithmetic testable in isolation.
//!
//! # Modules
//!
//! - [`product`] - Product records and lenient normalization of raw API JSON
//! - [`filters`] - Filter criteria and product query composition
//! - [`sort`] - Sort field/direction state and ordering tokens
//! - [`pagination`] - Page count, page window and boundary state
//! - [`aggregate`] - Price histogram buckets and discount scatter series

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod filters;
pub mod pagination;
pub mod product;
pub mod sort;

pub use aggregate::{
    DiscountPoint, DiscountSeries, PriceBucket, PriceBuckets, discount_series, price_buckets,
};
pub use filters::{FilterCriteria, ProductQuery};
pub use pagination::{PageWindow, PaginationState, page_window, total_pages};
pub use product::{Product, ProductId, RawProduct, coerce_f64};
pub use sort::{SortDirection, SortField, SortFieldError, SortState};
