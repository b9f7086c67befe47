//! Listing parsing for rigmate: manufacturer/model resolution, spec
//! extraction, and price normalization.
//!
//! Parsing is best-effort. A listing with an unresolvable name
//! or sparse text still produces a usable component; only prices that
//! cannot be read at all are errors.

pub mod models;
pub mod name;
pub mod price;
pub mod spec;

pub use models::{model_specs, normalize_model};
pub use name::{ParsedName, parse};
pub use price::normalize_price;
pub use spec::{ExtractorRule, extract, extractor_rules};
