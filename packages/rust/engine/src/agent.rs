//! Agent output reconciliation.
//!
//! An agent's build suggestion is untrusted free text: maybe a JSON object,
//! maybe prose naming parts, maybe neither. Reconciliation runs a pipeline
//! of independent stages, each tagging how a slot was resolved:
//!
//! 1. structured JSON extraction, mapping category keys to exact catalog ids
//! 2. fuzzy name matching by normalized token overlap
//! 3. fallback assembly for whatever is still open, holding resolved picks
//!    fixed
//!
//! The compatibility rule engine is the final gate. An INCOMPATIBLE
//! reconciled set is discarded wholesale in favor of a pure assembler
//! build, so the caller never receives an invalid recommendation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rigmate_catalog::Catalog;
use rigmate_shared::{
    BuildCompat, BuildRecommendation, Component, ComponentId, ComponentType, WeightVector,
};

use crate::assemble::{self, AssemblyInput};

/// Parameters for one reconciliation run.
pub struct AgentInput<'a> {
    pub text: &'a str,
    pub budget_dzd: u64,
    pub weights: WeightVector,
    pub categories: BTreeSet<ComponentType>,
    pub fuzzy_threshold: f64,
    pub backtrack_cap: u32,
}

/// How a slot in the reconciled build was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    JsonHit,
    FuzzyHit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::JsonHit => write!(f, "exact id"),
            Stage::FuzzyHit => write!(f, "name match"),
        }
    }
}

/// Reconcile agent text against the catalog into a valid recommendation.
pub fn reconcile(catalog: &Catalog, input: &AgentInput) -> BuildRecommendation {
    // (component, stage, ambiguity-resolved flag) per slot.
    let mut resolved: BTreeMap<ComponentType, (&Component, Stage, bool)> = BTreeMap::new();

    if let Some(object) = extract_json_object(input.text) {
        for (key, value) in &object {
            let Ok(ctype) = key.parse::<ComponentType>() else {
                continue;
            };
            if !input.categories.contains(&ctype) {
                continue;
            }
            let Some(phrase) = value.as_str() else {
                continue;
            };
            let id = ComponentId::from(phrase);
            if let Some(hit) = catalog.get(&id).filter(|c| c.ctype == ctype) {
                resolved.insert(ctype, (hit, Stage::JsonHit, false));
            } else if let Some((hit, tie_broken)) =
                fuzzy_match(catalog, ctype, phrase, input.fuzzy_threshold)
            {
                resolved.insert(ctype, (hit, Stage::FuzzyHit, tie_broken));
            } else {
                tracing::debug!(%ctype, phrase, "agent reference unresolvable, deferring to assembly");
            }
        }
    }

    // Prose without JSON can still name parts outright.
    for &ctype in &input.categories {
        if resolved.contains_key(&ctype) {
            continue;
        }
        if let Some(hit) = mention_match(catalog, ctype, input.text) {
            resolved.insert(ctype, (hit, Stage::FuzzyHit, false));
        }
    }

    let pinned: BTreeMap<ComponentType, &Component> =
        resolved.iter().map(|(&t, &(c, _, _))| (t, c)).collect();
    let open: BTreeSet<ComponentType> = input
        .categories
        .iter()
        .copied()
        .filter(|t| !pinned.contains_key(t))
        .collect();

    let mut recommendation = assemble::assemble(
        catalog,
        &AssemblyInput {
            budget_dzd: input.budget_dzd,
            weights: input.weights,
            categories: open.clone(),
            pinned,
            backtrack_cap: input.backtrack_cap,
        },
    );

    if recommendation.compatibility == BuildCompat::Incompatible {
        // Final gate failed; substitute a clean assembler build.
        let mut substitute = assemble::assemble(
            catalog,
            &AssemblyInput {
                budget_dzd: input.budget_dzd,
                weights: input.weights,
                categories: input.categories.clone(),
                pinned: BTreeMap::new(),
                backtrack_cap: input.backtrack_cap,
            },
        );
        substitute.rationale.push_str(
            " Agent-suggested parts were incompatible; the whole build was reassembled.",
        );
        return substitute;
    }

    let mut notes: Vec<String> = resolved
        .iter()
        .map(|(t, (c, stage, tie_broken))| {
            if *tie_broken {
                format!("{t} via {stage} ({}, tie broken by benchmark)", c.id)
            } else {
                format!("{t} via {stage} ({})", c.id)
            }
        })
        .collect();
    notes.extend(open.iter().map(|t| format!("{t} via assembly")));
    if !notes.is_empty() {
        recommendation
            .rationale
            .push_str(&format!(" Agent slots: {}.", notes.join(", ")));
    }
    recommendation
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Find the first balanced `{...}` substring that parses as a JSON object.
/// A `components` wrapper object is unwrapped.
fn extract_json_object(text: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if bytes[start] != b'{' {
            continue;
        }
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[start..=start + offset];
                        if let Ok(serde_json::Value::Object(map)) =
                            serde_json::from_str::<serde_json::Value>(candidate)
                        {
                            return Some(unwrap_components(map));
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    None
}

fn unwrap_components(
    map: serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    match map.get("components") {
        Some(serde_json::Value::Object(inner)) => inner.clone(),
        _ => map,
    }
}

// ---------------------------------------------------------------------------
// Fuzzy matching
// ---------------------------------------------------------------------------

fn tokens(s: &str) -> BTreeSet<String> {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Token-overlap similarity (Jaccard) between a phrase and a component's
/// names.
fn similarity(phrase_tokens: &BTreeSet<String>, component: &Component) -> f64 {
    let mut best: f64 = 0.0;
    let mut names = vec![component.raw_name.clone()];
    if let (Some(manufacturer), Some(model)) = (&component.manufacturer, &component.model) {
        names.push(format!("{manufacturer} {model}"));
    }
    for name in names {
        let name_tokens = tokens(&name);
        if name_tokens.is_empty() || phrase_tokens.is_empty() {
            continue;
        }
        let intersection = phrase_tokens.intersection(&name_tokens).count() as f64;
        let union = phrase_tokens.union(&name_tokens).count() as f64;
        best = best.max(intersection / union);
    }
    best
}

/// Best catalog match for a phrase within one category. Equally plausible
/// matches resolve deterministically toward the higher benchmark score,
/// then the smaller id; the returned flag marks that a tie was broken so
/// the caller can note it in the rationale.
fn fuzzy_match<'a>(
    catalog: &'a Catalog,
    ctype: ComponentType,
    phrase: &str,
    threshold: f64,
) -> Option<(&'a Component, bool)> {
    let phrase_tokens = tokens(phrase);
    let mut scored: Vec<(f64, &Component)> = catalog
        .by_type(ctype)
        .map(|c| (similarity(&phrase_tokens, c), c))
        .filter(|(score, _)| *score >= threshold)
        .collect();
    scored.sort_by(|(a, ca), (b, cb)| {
        b.total_cmp(a)
            .then_with(|| benchmark_of(cb).cmp(&benchmark_of(ca)))
            .then_with(|| ca.id.cmp(&cb.id))
    });
    let &(best_score, best) = scored.first()?;
    let tie_broken = scored.iter().skip(1).any(|&(s, _)| s == best_score);
    Some((best, tie_broken))
}

fn benchmark_of(component: &Component) -> i16 {
    component
        .scores
        .as_ref()
        .map(|s| i16::from(s.benchmark))
        .unwrap_or(-1)
}

/// Does the text mention a catalog component by name? Used for prose
/// responses that never produced parseable JSON.
fn mention_match<'a>(catalog: &'a Catalog, ctype: ComponentType, text: &str) -> Option<&'a Component> {
    let normalized_text = normalize_text(text);
    catalog
        .by_type(ctype)
        .filter(|c| {
            let by_model = match (&c.manufacturer, &c.model) {
                (Some(man), Some(model)) => {
                    normalized_text.contains(&normalize_text(&format!("{man} {model}")))
                        || normalized_text.contains(&normalize_text(model))
                }
                _ => false,
            };
            by_model || normalized_text.contains(&normalize_text(&c.raw_name))
        })
        .max_by(|a, b| {
            benchmark_of(a)
                .cmp(&benchmark_of(b))
                .then_with(|| b.id.cmp(&a.id))
        })
}

/// Order-preserving normalization for substring mention checks.
fn normalize_text(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
