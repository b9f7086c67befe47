//! Public operations over the catalog.
//!
//! Thin orchestration over the parse, score, catalog, and compatibility
//! crates. Every read path takes a [`Catalog`] snapshot argument; nothing
//! here touches storage, so callers decide what to persist and when.

use chrono::{DateTime, Utc};
use tracing::instrument;

use rigmate_catalog::{Catalog, DedupKey, ReconcileOutcome, Sighting};
use rigmate_shared::{
    AppConfig, BuildCompat, BuildRecommendation, Component, ComponentId, ComponentType,
    RawListing, Result, RigmateError, UseCase,
};

use crate::agent::{self, AgentInput};
use crate::assemble::{self, AssemblyInput};
use crate::compat;

/// Outcome of ingesting one listing.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// The component to persist (created or updated).
    pub component: Component,
    pub outcome: ReconcileOutcome,
}

/// Ingest one raw listing into the catalog.
///
/// Idempotent over identical content: re-ingesting the same listing maps to
/// the same dedup key and leaves id and specs unchanged. The caller persists
/// the returned component and appends a price point.
#[instrument(skip(catalog, listing), fields(title = %listing.title, %ctype))]
pub fn ingest(
    catalog: &Catalog,
    ctype: ComponentType,
    listing: &RawListing,
    now: DateTime<Utc>,
) -> IngestResult {
    let parsed = rigmate_parse::parse(&listing.title, ctype);
    let key = DedupKey::compute(
        ctype,
        parsed.manufacturer.as_deref(),
        parsed.model.as_deref(),
        &listing.title,
    );

    let sighting = Sighting {
        price_dzd: listing.price_dzd,
        condition: listing.condition,
        source_url: listing.source_url.clone(),
        location: listing.location.clone(),
        seen_at: now,
    };

    match catalog.find_match(&key) {
        Some(existing)
            if !rigmate_catalog::description_changed(existing, listing.description.as_deref()) =>
        {
            tracing::debug!(id = %existing.id, "listing re-seen, refreshing price");
            IngestResult {
                component: rigmate_catalog::refresh(existing, sighting),
                outcome: ReconcileOutcome::Refreshed,
            }
        }
        Some(existing) => {
            let specs = rigmate_parse::extract(
                ctype,
                &listing.title,
                listing.description.as_deref(),
                parsed.model.as_deref(),
            );
            let scores = rigmate_score::score(
                ctype,
                parsed.manufacturer.as_deref(),
                parsed.model.as_deref(),
                &specs,
            );
            tracing::debug!(id = %existing.id, "description changed, recomputing specs");
            IngestResult {
                component: rigmate_catalog::respec(
                    existing,
                    sighting,
                    listing.description.clone(),
                    specs,
                    scores,
                ),
                outcome: ReconcileOutcome::Respecced,
            }
        }
        None => {
            let specs = rigmate_parse::extract(
                ctype,
                &listing.title,
                listing.description.as_deref(),
                parsed.model.as_deref(),
            );
            let scores = rigmate_score::score(
                ctype,
                parsed.manufacturer.as_deref(),
                parsed.model.as_deref(),
                &specs,
            );
            let id = ComponentId::generate(
                parsed.manufacturer.as_deref(),
                parsed.model.as_deref(),
                &listing.title,
            );
            tracing::debug!(%id, "new component");
            IngestResult {
                component: Component {
                    id,
                    ctype,
                    manufacturer: parsed.manufacturer,
                    model: parsed.model,
                    raw_name: listing.title.clone(),
                    description: listing.description.clone(),
                    specs,
                    price_dzd: listing.price_dzd,
                    scores,
                    condition: listing.condition,
                    source_url: listing.source_url.clone(),
                    location: listing.location.clone(),
                    first_seen: now,
                    last_seen: now,
                },
                outcome: ReconcileOutcome::Created,
            }
        }
    }
}

/// Assemble a build recommendation for a budget and use case.
///
/// `categories` defaults to all seven types when empty is not allowed;
/// an explicit empty set is a validation failure.
#[instrument(skip(catalog, config))]
pub fn get_build(
    catalog: &Catalog,
    config: &AppConfig,
    budget_dzd: u64,
    use_case: UseCase,
    categories: &[ComponentType],
) -> Result<BuildRecommendation> {
    if budget_dzd == 0 {
        return Err(RigmateError::validation("budget must be greater than zero"));
    }
    if categories.is_empty() {
        return Err(RigmateError::validation("category set must not be empty"));
    }

    Ok(assemble::assemble(
        catalog,
        &AssemblyInput {
            budget_dzd,
            weights: config.weights.for_use_case(use_case),
            categories: categories.iter().copied().collect(),
            pinned: Default::default(),
            backtrack_cap: config.assembly.backtrack_cap,
        },
    ))
}

/// Evaluate compatibility across a set of already-cataloged components.
#[instrument(skip(catalog))]
pub fn check_compatibility(
    catalog: &Catalog,
    ids: &[ComponentId],
) -> Result<(BuildCompat, Vec<String>)> {
    let mut components = Vec::with_capacity(ids.len());
    for id in ids {
        let component = catalog
            .get(id)
            .ok_or_else(|| RigmateError::validation(format!("unknown component id {id}")))?;
        components.push(component);
    }
    Ok(compat::evaluate(&components))
}

/// Reconcile untrusted agent text into a validated recommendation.
#[instrument(skip(catalog, config, text))]
pub fn reconcile_agent_output(
    catalog: &Catalog,
    config: &AppConfig,
    text: &str,
    budget_dzd: u64,
    use_case: UseCase,
    categories: &[ComponentType],
) -> Result<BuildRecommendation> {
    if budget_dzd == 0 {
        return Err(RigmateError::validation("budget must be greater than zero"));
    }
    if categories.is_empty() {
        return Err(RigmateError::validation("category set must not be empty"));
    }

    Ok(agent::reconcile(
        catalog,
        &AgentInput {
            text,
            budget_dzd,
            weights: config.weights.for_use_case(use_case),
            categories: categories.iter().copied().collect(),
            fuzzy_threshold: config.assembly.fuzzy_threshold,
            backtrack_cap: config.assembly.backtrack_cap,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, price: u64) -> RawListing {
        RawListing {
            title: title.to_string(),
            description: None,
            price_dzd: price,
            source_url: "https://example.test/listing".to_string(),
            location: None,
            condition: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-08-20T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn ingest_parses_and_scores() {
        let catalog = Catalog::new(Vec::new());
        let result = ingest(
            &catalog,
            ComponentType::Cpu,
            &listing("AMD Ryzen 5 5600X", 25_000),
            now(),
        );
        assert_eq!(result.outcome, ReconcileOutcome::Created);
        let c = &result.component;
        assert_eq!(c.manufacturer.as_deref(), Some("AMD"));
        assert_eq!(
            c.specs
                .get(rigmate_shared::spec_keys::SOCKET)
                .and_then(rigmate_shared::SpecValue::as_text),
            Some("AM4")
        );
        assert!(c.scores.is_some());
    }

    #[test]
    fn reingest_same_listing_is_idempotent() {
        let catalog = Catalog::new(Vec::new());
        let first = ingest(
            &catalog,
            ComponentType::Cpu,
            &listing("AMD Ryzen 5 5600X", 25_000),
            now(),
        );

        let catalog = Catalog::new(vec![first.component.clone()]);
        let second = ingest(
            &catalog,
            ComponentType::Cpu,
            &listing("AMD Ryzen 5 5600X", 25_000),
            now(),
        );
        assert_eq!(second.outcome, ReconcileOutcome::Refreshed);
        assert_eq!(second.component.id, first.component.id);
        assert_eq!(second.component.specs, first.component.specs);
    }

    #[test]
    fn price_drop_refreshes_without_respec() {
        let catalog = Catalog::new(Vec::new());
        let first = ingest(
            &catalog,
            ComponentType::Gpu,
            &listing("MSI RTX 3060 Ventus 12GB", 95_000),
            now(),
        );

        let catalog = Catalog::new(vec![first.component.clone()]);
        let second = ingest(
            &catalog,
            ComponentType::Gpu,
            &listing("MSI RTX 3060 Ventus 12GB", 88_000),
            now(),
        );
        assert_eq!(second.outcome, ReconcileOutcome::Refreshed);
        assert_eq!(second.component.price_dzd, 88_000);
        assert_eq!(second.component.scores, first.component.scores);
    }

    #[test]
    fn ryzen_and_b550_board_are_compatible() {
        let catalog = Catalog::new(Vec::new());
        let cpu = ingest(
            &catalog,
            ComponentType::Cpu,
            &listing("AMD Ryzen 5 5600X", 25_000),
            now(),
        )
        .component;
        let mobo = ingest(
            &catalog,
            ComponentType::Motherboard,
            &listing("ASUS ROG B550-F Gaming", 18_000),
            now(),
        )
        .component;

        let ids = [cpu.id.clone(), mobo.id.clone()];
        let catalog = Catalog::new(vec![cpu, mobo]);
        let (verdict, violations) = check_compatibility(&catalog, &ids).unwrap();
        assert_eq!(verdict, BuildCompat::Compatible);
        assert!(violations.is_empty());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let catalog = Catalog::new(Vec::new());
        let config = AppConfig::default();
        let err = get_build(
            &catalog,
            &config,
            0,
            UseCase::Gaming,
            &[ComponentType::Gpu],
        )
        .unwrap_err();
        assert!(matches!(err, RigmateError::Validation { .. }));
    }

    #[test]
    fn empty_categories_rejected() {
        let catalog = Catalog::new(Vec::new());
        let config = AppConfig::default();
        assert!(get_build(&catalog, &config, 100_000, UseCase::Balanced, &[]).is_err());
    }

    #[test]
    fn unknown_id_is_a_validation_failure() {
        let catalog = Catalog::new(Vec::new());
        let err = check_compatibility(&catalog, &[ComponentId::from("ghost")]).unwrap_err();
        assert!(matches!(err, RigmateError::Validation { .. }));
    }

    #[test]
    fn build_respects_budget_end_to_end() {
        let catalog = Catalog::new(Vec::new());
        let gpu = ingest(
            &catalog,
            ComponentType::Gpu,
            &listing("Gigabyte RTX 3060 12GB GDDR6", 95_000),
            now(),
        )
        .component;
        let psu = ingest(
            &catalog,
            ComponentType::Psu,
            &listing("Corsair RM650 650W 80+ Gold", 16_000),
            now(),
        )
        .component;

        let catalog = Catalog::new(vec![gpu, psu]);
        let config = AppConfig::default();
        let rec = get_build(
            &catalog,
            &config,
            150_000,
            UseCase::Gaming,
            &[ComponentType::Gpu, ComponentType::Psu],
        )
        .unwrap();
        assert!(rec.total_price_dzd <= 150_000);
        assert_eq!(rec.compatibility, BuildCompat::Compatible);
        assert_eq!(rec.components.len(), 2);
    }
}
