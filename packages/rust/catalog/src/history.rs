//! Append-only price history.
//!
//! Every sighting of a component records a price point. The catalog core
//! only defines the interface; the durable implementation lives in the
//! storage layer, and an in-memory one backs tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use rigmate_shared::{ComponentId, Result};

/// One observed price for a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    pub price_dzd: u64,
    pub observed_at: DateTime<Utc>,
}

/// Append-only price history store.
pub trait PriceHistory {
    fn append_price_point(
        &mut self,
        id: &ComponentId,
        price_dzd: u64,
        observed_at: DateTime<Utc>,
    ) -> Result<()>;

    /// All recorded points for a component, in append order.
    fn price_points(&self, id: &ComponentId) -> Result<Vec<PricePoint>>;
}

/// In-memory history for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryPriceHistory {
    points: HashMap<ComponentId, Vec<PricePoint>>,
}

impl MemoryPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriceHistory for MemoryPriceHistory {
    fn append_price_point(
        &mut self,
        id: &ComponentId,
        price_dzd: u64,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.points.entry(id.clone()).or_default().push(PricePoint {
            price_dzd,
            observed_at,
        });
        Ok(())
    }

    fn price_points(&self, id: &ComponentId) -> Result<Vec<PricePoint>> {
        Ok(self.points.get(id).cloned().unwrap_or_default())
    }
}
