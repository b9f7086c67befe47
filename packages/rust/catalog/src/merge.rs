//! Upsert merge semantics for re-ingested listings.
//!
//! A listing that maps to an existing dedup key mutates the stored row in
//! place: price, last_seen, and listing metadata refresh on every sighting;
//! specs and scores are recomputed only when the description changed. The
//! id, type, and first_seen never change after creation.

use chrono::{DateTime, Utc};

use rigmate_shared::{Component, Condition, Scores, Specs};

/// What reconciliation did with an incoming listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No existing row matched; a new component was created.
    Created,
    /// Matched with an unchanged description; price and metadata refreshed.
    Refreshed,
    /// Matched with a changed description; specs and scores recomputed.
    Respecced,
}

/// Listing metadata that refreshes on every sighting.
#[derive(Debug, Clone)]
pub struct Sighting {
    pub price_dzd: u64,
    pub condition: Option<Condition>,
    pub source_url: String,
    pub location: Option<String>,
    pub seen_at: DateTime<Utc>,
}

/// Re-ingestion of a matched listing whose description is unchanged.
/// Stored specs and scores are kept as-is.
pub fn refresh(existing: &Component, sighting: Sighting) -> Component {
    let mut updated = existing.clone();
    updated.price_dzd = sighting.price_dzd;
    updated.condition = sighting.condition.or(updated.condition);
    updated.source_url = sighting.source_url;
    updated.location = sighting.location.or(updated.location);
    updated.last_seen = sighting.seen_at;
    updated
}

/// Re-ingestion of a matched listing with new descriptive text. The caller
/// re-ran extraction and scoring on the new text.
pub fn respec(
    existing: &Component,
    sighting: Sighting,
    description: Option<String>,
    specs: Specs,
    scores: Option<Scores>,
) -> Component {
    let mut updated = refresh(existing, sighting);
    updated.description = description;
    updated.specs = specs;
    updated.scores = scores;
    updated
}

/// Whether an incoming description warrants recomputing specs and scores.
pub fn description_changed(existing: &Component, incoming: Option<&str>) -> bool {
    existing.description.as_deref() != incoming
}
