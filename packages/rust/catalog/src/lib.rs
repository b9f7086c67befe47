//! Catalog identity and reconciliation for rigmate.
//!
//! Defines how listings map onto stable catalog rows: dedup keys, upsert
//! merge semantics, the read-only [`Catalog`] snapshot used by all read
//! paths, and the append-only [`PriceHistory`] interface.

pub mod dedup;
pub mod history;
pub mod merge;
pub mod snapshot;

pub use dedup::DedupKey;
pub use history::{MemoryPriceHistory, PriceHistory, PricePoint};
pub use merge::{ReconcileOutcome, Sighting, description_changed, refresh, respec};
pub use snapshot::Catalog;
