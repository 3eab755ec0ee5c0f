//! Market data ingestion and per-symbol projection.

pub mod series;
pub mod store;

pub use series::extract;
pub use store::{fill_forward_then_backward, parse_price_table, TimeSeriesStore, DATE_COLUMN};
