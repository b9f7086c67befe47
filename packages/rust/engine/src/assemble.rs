//! Build assembly.
//!
//! Picks one component per requested category, maximizing weighted
//! score-per-dinar subject to the budget and to the compatibility rule
//! engine. Selection walks categories in a fixed dependency order so the
//! compatibility-defining parts (board, CPU) are pinned before dependents,
//! with bounded backtracking when a category dead-ends. Exceeding the
//! backtrack cap degrades to a best-effort result rather than failing.

use std::collections::{BTreeMap, BTreeSet};

use rigmate_catalog::Catalog;
use rigmate_shared::{
    BuildCompat, BuildRecommendation, Component, ComponentType, WeightVector,
};

use crate::compat;

/// Parameters for one assembly run.
pub struct AssemblyInput<'a> {
    pub budget_dzd: u64,
    pub weights: WeightVector,
    /// Categories to fill from the catalog.
    pub categories: BTreeSet<ComponentType>,
    /// Components held fixed; their categories are not re-selected.
    pub pinned: BTreeMap<ComponentType, &'a Component>,
    pub backtrack_cap: u32,
}

/// Weighted score per dinar. Unscored components rank last but stay
/// selectable; zero is a valid score and must outrank "unknown".
fn utility(component: &Component, weights: &WeightVector) -> f64 {
    match &component.scores {
        Some(s) => {
            let weighted = f64::from(s.gaming) * weights[0]
                + f64::from(s.productivity) * weights[1]
                + f64::from(s.ai) * weights[2];
            weighted / component.price_dzd.max(1) as f64
        }
        None => 0.0,
    }
}

/// Candidates for one category, best first. Ties break toward the cheaper
/// part, then by id, to keep runs deterministic.
fn ranked_candidates<'a>(
    catalog: &'a Catalog,
    ctype: ComponentType,
    weights: &WeightVector,
) -> Vec<&'a Component> {
    let mut candidates: Vec<&Component> = catalog.by_type(ctype).collect();
    candidates.sort_by(|a, b| {
        utility(b, weights)
            .total_cmp(&utility(a, weights))
            .then_with(|| a.price_dzd.cmp(&b.price_dzd))
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates
}

/// Assemble a build from a catalog snapshot.
///
/// The result never exceeds the budget. When no fully compatible set fits,
/// the recommendation is a best-effort one flagged [`BuildCompat::Partial`]
/// (or carrying the violations found) with a rationale explaining why.
pub fn assemble(catalog: &Catalog, input: &AssemblyInput) -> BuildRecommendation {
    let order: Vec<ComponentType> = ComponentType::ASSEMBLY_ORDER
        .iter()
        .copied()
        .filter(|t| input.categories.contains(t) && !input.pinned.contains_key(t))
        .collect();

    let candidates: Vec<Vec<&Component>> = order
        .iter()
        .map(|&t| ranked_candidates(catalog, t, &input.weights))
        .collect();

    // Cheapest option per slot, used to reserve budget for the categories
    // not yet filled.
    let cheapest: Vec<u64> = candidates
        .iter()
        .map(|c| c.iter().map(|comp| comp.price_dzd).min().unwrap_or(0))
        .collect();

    let pinned_total: u64 = input.pinned.values().map(|c| c.price_dzd).sum();

    let mut chosen: Vec<Option<usize>> = vec![None; order.len()];
    let mut next_try: Vec<usize> = vec![0; order.len()];
    let mut backtracks = 0u32;
    let mut pos = 0usize;
    let mut degraded = false;

    while pos < order.len() {
        let spent = pinned_total + picked_price(&candidates, &chosen[..pos]);
        let reserve: u64 = cheapest[pos + 1..].iter().sum();

        let mut found = None;
        while next_try[pos] < candidates[pos].len() {
            let idx = next_try[pos];
            next_try[pos] += 1;
            let candidate = candidates[pos][idx];

            if spent + candidate.price_dzd + reserve > input.budget_dzd {
                continue;
            }
            let mut set = picked_set(input, &candidates, &chosen[..pos]);
            set.push(candidate);
            let (verdict, _) = compat::evaluate(&set);
            if verdict == BuildCompat::Incompatible {
                continue;
            }
            found = Some(idx);
            break;
        }

        match found {
            Some(idx) => {
                chosen[pos] = Some(idx);
                pos += 1;
            }
            None => {
                next_try[pos] = 0;
                if pos == 0 || backtracks >= input.backtrack_cap {
                    tracing::debug!(
                        backtracks,
                        category = %order[pos],
                        "assembly dead-ended, degrading to best effort"
                    );
                    degraded = true;
                    break;
                }
                backtracks += 1;
                pos -= 1;
                chosen[pos] = None;
            }
        }
    }

    // Best-effort fill for anything the search left open: highest-utility
    // candidate that still fits the budget, compatibility no longer gating.
    if degraded {
        for i in 0..chosen.len() {
            if chosen[i].is_some() {
                continue;
            }
            let spent = pinned_total + picked_price(&candidates, &chosen);
            chosen[i] = candidates[i]
                .iter()
                .position(|c| spent + c.price_dzd <= input.budget_dzd);
        }
    }

    finish(input, &order, &candidates, &chosen, degraded)
}

fn picked_price(candidates: &[Vec<&Component>], chosen: &[Option<usize>]) -> u64 {
    chosen
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.map(|idx| candidates[i][idx].price_dzd))
        .sum()
}

fn picked_set<'a>(
    input: &AssemblyInput<'a>,
    candidates: &[Vec<&'a Component>],
    chosen: &[Option<usize>],
) -> Vec<&'a Component> {
    let mut set: Vec<&Component> = input.pinned.values().copied().collect();
    set.extend(
        chosen
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|idx| candidates[i][idx])),
    );
    set
}

fn finish(
    input: &AssemblyInput,
    order: &[ComponentType],
    candidates: &[Vec<&Component>],
    chosen: &[Option<usize>],
    degraded: bool,
) -> BuildRecommendation {
    let picked = picked_set(input, candidates, chosen);
    let unfilled: Vec<ComponentType> = chosen
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(i, _)| order[i])
        .collect();

    let (mut compatibility, violations) = compat::evaluate(&picked);
    if degraded || !unfilled.is_empty() {
        // Best-effort results are advisory, never INCOMPATIBLE or
        // COMPATIBLE: rule failures stay listed in `violations` but the
        // verdict is capped at Partial.
        compatibility = BuildCompat::Partial;
    }

    let total_price_dzd: u64 = picked.iter().map(|c| c.price_dzd).sum();
    let components: BTreeMap<ComponentType, _> =
        picked.iter().map(|c| (c.ctype, c.id.clone())).collect();

    let mut rationale = if picked.is_empty() {
        "No feasible build: no candidates fit the budget.".to_string()
    } else {
        format!(
            "Selected {} of {} categories for {} DZD within a {} DZD budget.",
            picked.len(),
            input.categories.len() + input.pinned.len(),
            total_price_dzd,
            input.budget_dzd
        )
    };
    if degraded {
        rationale.push_str(" Search hit its backtrack limit; result is best effort.");
        if !violations.is_empty() {
            rationale.push_str(&format!(
                " Unresolved rule failures: {}.",
                violations.join(", ")
            ));
        }
    }
    if !unfilled.is_empty() {
        let names: Vec<&str> = unfilled.iter().map(|t| t.as_str()).collect();
        rationale.push_str(&format!(" Unfilled categories: {}.", names.join(", ")));
    }

    BuildRecommendation {
        components,
        total_price_dzd,
        compatibility,
        violations,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rigmate_shared::{ComponentId, Scores, SpecValue, spec_keys};

    fn component(
        id: &str,
        ctype: ComponentType,
        price: u64,
        scores: Option<Scores>,
        specs: &[(&str, SpecValue)],
    ) -> Component {
        let now = Utc::now();
        Component {
            id: ComponentId::from(id),
            ctype,
            manufacturer: None,
            model: None,
            raw_name: id.to_string(),
            description: None,
            specs: specs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            price_dzd: price,
            scores,
            condition: None,
            source_url: "https://example.test".to_string(),
            location: None,
            first_seen: now,
            last_seen: now,
        }
    }

    fn balanced() -> WeightVector {
        [0.34, 0.33, 0.33]
    }

    fn input(budget: u64, categories: &[ComponentType]) -> AssemblyInput<'static> {
        AssemblyInput {
            budget_dzd: budget,
            weights: balanced(),
            categories: categories.iter().copied().collect(),
            pinned: BTreeMap::new(),
            backtrack_cap: 32,
        }
    }

    fn scored(v: u8) -> Option<Scores> {
        Some(Scores::clamped(v.into(), v.into(), v.into(), v.into()))
    }

    #[test]
    fn picks_highest_utility_within_budget() {
        let catalog = Catalog::new(vec![
            component("gpu-strong", ComponentType::Gpu, 90_000, scored(90), &[]),
            component("gpu-value", ComponentType::Gpu, 30_000, scored(60), &[]),
        ]);
        let rec = assemble(&catalog, &input(100_000, &[ComponentType::Gpu]));
        // 60/30k beats 90/90k on score per dinar.
        assert_eq!(
            rec.components.get(&ComponentType::Gpu),
            Some(&ComponentId::from("gpu-value"))
        );
        assert_eq!(rec.total_price_dzd, 30_000);
    }

    #[test]
    fn never_exceeds_budget() {
        let catalog = Catalog::new(vec![
            component("gpu-a", ComponentType::Gpu, 90_000, scored(90), &[]),
            component("psu-a", ComponentType::Psu, 20_000, scored(70), &[]),
        ]);
        let rec = assemble(
            &catalog,
            &input(50_000, &[ComponentType::Gpu, ComponentType::Psu]),
        );
        assert!(rec.total_price_dzd <= 50_000);
    }

    #[test]
    fn total_price_is_sum_of_parts() {
        let catalog = Catalog::new(vec![
            component("gpu-a", ComponentType::Gpu, 60_000, scored(80), &[]),
            component("psu-a", ComponentType::Psu, 15_000, scored(70), &[]),
        ]);
        let rec = assemble(
            &catalog,
            &input(100_000, &[ComponentType::Gpu, ComponentType::Psu]),
        );
        assert_eq!(rec.total_price_dzd, 75_000);
        assert_eq!(rec.components.len(), 2);
    }

    #[test]
    fn incompatible_candidate_is_skipped() {
        let catalog = Catalog::new(vec![
            component(
                "mobo-am4",
                ComponentType::Motherboard,
                18_000,
                None,
                &[(spec_keys::SOCKET, SpecValue::Text("AM4".into()))],
            ),
            // Higher utility but wrong socket.
            component(
                "cpu-intel",
                ComponentType::Cpu,
                20_000,
                scored(90),
                &[(spec_keys::SOCKET, SpecValue::Text("LGA1700".into()))],
            ),
            component(
                "cpu-amd",
                ComponentType::Cpu,
                25_000,
                scored(70),
                &[(spec_keys::SOCKET, SpecValue::Text("AM4".into()))],
            ),
        ]);
        let rec = assemble(
            &catalog,
            &input(
                100_000,
                &[ComponentType::Motherboard, ComponentType::Cpu],
            ),
        );
        assert_eq!(
            rec.components.get(&ComponentType::Cpu),
            Some(&ComponentId::from("cpu-amd"))
        );
        assert!(rec.violations.is_empty());
    }

    #[test]
    fn underpowered_psu_pool_yields_partial_with_violation() {
        // GPU needs 320 * 1.3 = 416 W; nothing in the pool reaches it.
        let catalog = Catalog::new(vec![
            component(
                "gpu-320w",
                ComponentType::Gpu,
                80_000,
                scored(85),
                &[(spec_keys::TDP_W, SpecValue::Int(320))],
            ),
            component(
                "psu-400",
                ComponentType::Psu,
                12_000,
                scored(50),
                &[(spec_keys::WATTAGE, SpecValue::Int(400))],
            ),
        ]);
        let rec = assemble(
            &catalog,
            &input(300_000, &[ComponentType::Gpu, ComponentType::Psu]),
        );
        assert_eq!(rec.compatibility, BuildCompat::Partial);
        assert!(rec.violations.iter().any(|v| v == "psu-wattage"));
        assert!(rec.rationale.contains("psu-wattage"));
    }

    #[test]
    fn adequate_psu_is_selected_over_cheaper_weak_one() {
        let catalog = Catalog::new(vec![
            component(
                "gpu-320w",
                ComponentType::Gpu,
                80_000,
                scored(85),
                &[(spec_keys::TDP_W, SpecValue::Int(320))],
            ),
            component(
                "psu-400",
                ComponentType::Psu,
                8_000,
                scored(60),
                &[(spec_keys::WATTAGE, SpecValue::Int(400))],
            ),
            component(
                "psu-650",
                ComponentType::Psu,
                16_000,
                scored(60),
                &[(spec_keys::WATTAGE, SpecValue::Int(650))],
            ),
        ]);
        let rec = assemble(
            &catalog,
            &input(300_000, &[ComponentType::Gpu, ComponentType::Psu]),
        );
        assert_eq!(
            rec.components.get(&ComponentType::Psu),
            Some(&ComponentId::from("psu-650"))
        );
        assert_eq!(rec.compatibility, BuildCompat::Compatible);
    }

    #[test]
    fn empty_catalog_reports_no_feasible_build() {
        let catalog = Catalog::new(Vec::new());
        let rec = assemble(&catalog, &input(100_000, &[ComponentType::Gpu]));
        assert!(rec.components.is_empty());
        assert_eq!(rec.total_price_dzd, 0);
        assert_eq!(rec.compatibility, BuildCompat::Partial);
        assert!(rec.rationale.contains("Unfilled"));
    }

    #[test]
    fn pinned_components_are_kept() {
        let gpu = component("gpu-pin", ComponentType::Gpu, 70_000, scored(85), &[]);
        let catalog = Catalog::new(vec![
            gpu.clone(),
            component("psu-a", ComponentType::Psu, 15_000, scored(70), &[]),
        ]);
        let mut pinned = BTreeMap::new();
        pinned.insert(ComponentType::Gpu, &gpu);
        let req = AssemblyInput {
            budget_dzd: 100_000,
            weights: balanced(),
            categories: [ComponentType::Psu].into_iter().collect(),
            pinned,
            backtrack_cap: 32,
        };
        let rec = assemble(&catalog, &req);
        assert_eq!(
            rec.components.get(&ComponentType::Gpu),
            Some(&ComponentId::from("gpu-pin"))
        );
        assert_eq!(rec.total_price_dzd, 85_000);
    }

    #[test]
    fn unscored_parts_still_selectable() {
        let catalog = Catalog::new(vec![component(
            "case-a",
            ComponentType::Case,
            9_000,
            None,
            &[],
        )]);
        let rec = assemble(&catalog, &input(50_000, &[ComponentType::Case]));
        assert_eq!(rec.components.len(), 1);
    }
}
