//! Compatibility rule engine.
//!
//! A registry of pure pairwise/global rules evaluated over a candidate
//! component set. A rule runs only when every type it applies to is present
//! in the set; otherwise it is skipped outright, which is different from
//! returning [`Verdict::Unknown`] (a rule that ran but lacked spec fields).
//!
//! Rules are order-independent and individually addressable so violations
//! can name the rule that failed.

use std::collections::BTreeMap;

use rigmate_shared::{BuildCompat, Component, ComponentType, SpecValue, Verdict, spec_keys};

/// Components keyed by type, the shape every rule predicate reads.
pub type TypeSet<'a> = BTreeMap<ComponentType, &'a Component>;

/// One registered compatibility rule.
pub struct CompatRule {
    /// Stable identifier, surfaced in violation lists.
    pub id: &'static str,
    /// Types that must all be present for the rule to run.
    pub applies_to: &'static [ComponentType],
    /// Pure predicate over the present components' specs.
    pub predicate: fn(&TypeSet) -> Verdict,
}

// ---------------------------------------------------------------------------
// Spec accessors
// ---------------------------------------------------------------------------

fn text_spec<'a>(set: &'a TypeSet, ctype: ComponentType, key: &str) -> Option<&'a str> {
    set.get(&ctype)?.specs.get(key)?.as_text()
}

fn num_spec(set: &TypeSet, ctype: ComponentType, key: &str) -> Option<f64> {
    set.get(&ctype)?.specs.get(key)?.as_f64()
}

fn equality(verdict_when_equal: bool) -> Verdict {
    if verdict_when_equal {
        Verdict::Compatible
    } else {
        Verdict::Incompatible
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn cpu_mobo_socket(set: &TypeSet) -> Verdict {
    let cpu = text_spec(set, ComponentType::Cpu, spec_keys::SOCKET);
    let mobo = text_spec(set, ComponentType::Motherboard, spec_keys::SOCKET);
    match (cpu, mobo) {
        (Some(a), Some(b)) => equality(a.eq_ignore_ascii_case(b)),
        _ => Verdict::Unknown,
    }
}

fn mobo_ram_type(set: &TypeSet) -> Verdict {
    let mobo = text_spec(set, ComponentType::Motherboard, spec_keys::RAM_TYPE);
    let ram = text_spec(set, ComponentType::Ram, spec_keys::RAM_TYPE);
    match (mobo, ram) {
        (Some(a), Some(b)) => equality(a.eq_ignore_ascii_case(b)),
        _ => Verdict::Unknown,
    }
}

/// PSU must carry the GPU plus CPU load with a 1.3x safety margin. The CPU
/// is an optional contributor: absent from the set it adds nothing, present
/// without a TDP figure it makes the draw unknowable.
fn psu_wattage(set: &TypeSet) -> Verdict {
    let Some(wattage) = num_spec(set, ComponentType::Psu, spec_keys::WATTAGE) else {
        return Verdict::Unknown;
    };
    let Some(gpu_tdp) = num_spec(set, ComponentType::Gpu, spec_keys::TDP_W) else {
        return Verdict::Unknown;
    };
    let cpu_tdp = match set.get(&ComponentType::Cpu) {
        Some(cpu) => match cpu.specs.get(spec_keys::TDP_W).and_then(SpecValue::as_f64) {
            Some(tdp) => tdp,
            None => return Verdict::Unknown,
        },
        None => 0.0,
    };
    equality(wattage >= (gpu_tdp + cpu_tdp) * 1.3)
}

fn case_mobo_form_factor(set: &TypeSet) -> Verdict {
    let supported = set
        .get(&ComponentType::Case)
        .and_then(|c| c.specs.get(spec_keys::FORM_FACTOR_SUPPORT))
        .and_then(SpecValue::as_list);
    let form_factor = text_spec(set, ComponentType::Motherboard, spec_keys::FORM_FACTOR);
    match (supported, form_factor) {
        (Some(supported), Some(ff)) => {
            equality(supported.iter().any(|s| s.eq_ignore_ascii_case(ff)))
        }
        _ => Verdict::Unknown,
    }
}

fn case_gpu_length(set: &TypeSet) -> Verdict {
    let max = num_spec(set, ComponentType::Case, spec_keys::MAX_GPU_LENGTH_MM);
    let length = num_spec(set, ComponentType::Gpu, spec_keys::LENGTH_MM);
    match (max, length) {
        (Some(max), Some(length)) => equality(max >= length),
        _ => Verdict::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

use ComponentType::{Case, Cpu, Gpu, Motherboard, Psu, Ram};

/// The canonical rule set.
pub const RULES: &[CompatRule] = &[
    CompatRule {
        id: "cpu-mobo-socket",
        applies_to: &[Cpu, Motherboard],
        predicate: cpu_mobo_socket,
    },
    CompatRule {
        id: "mobo-ram-type",
        applies_to: &[Motherboard, Ram],
        predicate: mobo_ram_type,
    },
    CompatRule {
        id: "psu-wattage",
        applies_to: &[Psu, Gpu],
        predicate: psu_wattage,
    },
    CompatRule {
        id: "case-mobo-form-factor",
        applies_to: &[Case, Motherboard],
        predicate: case_mobo_form_factor,
    },
    CompatRule {
        id: "case-gpu-length",
        applies_to: &[Case, Gpu],
        predicate: case_gpu_length,
    },
];

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate every applicable rule over a component set.
///
/// Returns the aggregate verdict and the ids of rules that evaluated
/// INCOMPATIBLE, in registry order.
pub fn evaluate(components: &[&Component]) -> (BuildCompat, Vec<String>) {
    let set: TypeSet = components.iter().map(|c| (c.ctype, *c)).collect();

    let mut violations = Vec::new();
    let mut any_unknown = false;

    for rule in RULES {
        if !rule.applies_to.iter().all(|t| set.contains_key(t)) {
            continue;
        }
        match (rule.predicate)(&set) {
            Verdict::Compatible => {}
            Verdict::Unknown => any_unknown = true,
            Verdict::Incompatible => violations.push(rule.id.to_string()),
        }
    }

    let aggregate = if !violations.is_empty() {
        BuildCompat::Incompatible
    } else if any_unknown {
        BuildCompat::Partial
    } else {
        BuildCompat::Compatible
    };
    (aggregate, violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rigmate_shared::{ComponentId, Specs};

    fn component(id: &str, ctype: ComponentType, specs: &[(&str, SpecValue)]) -> Component {
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
            price_dzd: 10_000,
            scores: None,
            condition: None,
            source_url: "https://example.test".to_string(),
            location: None,
            first_seen: now,
            last_seen: now,
        }
    }

    fn am4_cpu() -> Component {
        component(
            "cpu-am4",
            Cpu,
            &[
                (spec_keys::SOCKET, SpecValue::Text("AM4".into())),
                (spec_keys::TDP_W, SpecValue::Int(65)),
            ],
        )
    }

    fn am4_mobo() -> Component {
        component(
            "mobo-am4",
            Motherboard,
            &[
                (spec_keys::SOCKET, SpecValue::Text("AM4".into())),
                (spec_keys::RAM_TYPE, SpecValue::Text("DDR4".into())),
                (spec_keys::FORM_FACTOR, SpecValue::Text("ATX".into())),
            ],
        )
    }

    #[test]
    fn matching_sockets_compatible() {
        let cpu = am4_cpu();
        let mobo = am4_mobo();
        let (verdict, violations) = evaluate(&[&cpu, &mobo]);
        assert_eq!(verdict, BuildCompat::Compatible);
        assert!(violations.is_empty());
    }

    #[test]
    fn socket_mismatch_names_the_rule() {
        let cpu = component(
            "cpu-lga",
            Cpu,
            &[(spec_keys::SOCKET, SpecValue::Text("LGA1700".into()))],
        );
        let mobo = am4_mobo();
        let (verdict, violations) = evaluate(&[&cpu, &mobo]);
        assert_eq!(verdict, BuildCompat::Incompatible);
        assert_eq!(violations, vec!["cpu-mobo-socket".to_string()]);
    }

    #[test]
    fn missing_spec_field_is_partial_not_violation() {
        let cpu = component("cpu-bare", Cpu, &[]);
        let mobo = am4_mobo();
        let (verdict, violations) = evaluate(&[&cpu, &mobo]);
        assert_eq!(verdict, BuildCompat::Partial);
        assert!(violations.is_empty());
    }

    #[test]
    fn absent_type_skips_rule_entirely() {
        // A lone CPU triggers nothing; no rule's type set is satisfied.
        let cpu = am4_cpu();
        let (verdict, violations) = evaluate(&[&cpu]);
        assert_eq!(verdict, BuildCompat::Compatible);
        assert!(violations.is_empty());
    }

    #[test]
    fn psu_margin_requires_thirty_percent_headroom() {
        let gpu = component("gpu", Gpu, &[(spec_keys::TDP_W, SpecValue::Int(320))]);
        let weak = component("psu-w", Psu, &[(spec_keys::WATTAGE, SpecValue::Int(400))]);
        let strong = component("psu-s", Psu, &[(spec_keys::WATTAGE, SpecValue::Int(450))]);

        // 320 * 1.3 = 416
        let (verdict, violations) = evaluate(&[&gpu, &weak]);
        assert_eq!(verdict, BuildCompat::Incompatible);
        assert_eq!(violations, vec!["psu-wattage".to_string()]);

        let (verdict, _) = evaluate(&[&gpu, &strong]);
        assert_eq!(verdict, BuildCompat::Compatible);
    }

    #[test]
    fn psu_margin_includes_cpu_draw() {
        let cpu = am4_cpu();
        let gpu = component("gpu", Gpu, &[(spec_keys::TDP_W, SpecValue::Int(320))]);
        // (320 + 65) * 1.3 = 500.5
        let psu = component("psu", Psu, &[(spec_keys::WATTAGE, SpecValue::Int(450))]);
        let (verdict, violations) = evaluate(&[&cpu, &gpu, &psu]);
        assert_eq!(verdict, BuildCompat::Incompatible);
        assert_eq!(violations, vec!["psu-wattage".to_string()]);
    }

    #[test]
    fn case_rules_cover_board_and_gpu_fit() {
        let mobo = am4_mobo();
        let gpu = component(
            "gpu-long",
            Gpu,
            &[
                (spec_keys::TDP_W, SpecValue::Int(200)),
                (spec_keys::LENGTH_MM, SpecValue::Int(336)),
            ],
        );
        let case = component(
            "case-small",
            Case,
            &[
                (
                    spec_keys::FORM_FACTOR_SUPPORT,
                    SpecValue::List(vec!["mATX".into(), "ITX".into()]),
                ),
                (spec_keys::MAX_GPU_LENGTH_MM, SpecValue::Int(280)),
            ],
        );
        let (verdict, violations) = evaluate(&[&mobo, &gpu, &case]);
        assert_eq!(verdict, BuildCompat::Incompatible);
        assert_eq!(
            violations,
            vec![
                "case-mobo-form-factor".to_string(),
                "case-gpu-length".to_string()
            ]
        );
    }

    #[test]
    fn full_compatible_build() {
        let cpu = am4_cpu();
        let mobo = am4_mobo();
        let ram = component(
            "ram",
            Ram,
            &[(spec_keys::RAM_TYPE, SpecValue::Text("DDR4".into()))],
        );
        let gpu = component(
            "gpu",
            Gpu,
            &[
                (spec_keys::TDP_W, SpecValue::Int(170)),
                (spec_keys::LENGTH_MM, SpecValue::Int(242)),
            ],
        );
        let psu = component("psu", Psu, &[(spec_keys::WATTAGE, SpecValue::Int(650))]);
        let case = component(
            "case",
            Case,
            &[
                (
                    spec_keys::FORM_FACTOR_SUPPORT,
                    SpecValue::List(vec!["ATX".into(), "mATX".into(), "ITX".into()]),
                ),
                (spec_keys::MAX_GPU_LENGTH_MM, SpecValue::Int(360)),
            ],
        );
        let (verdict, violations) = evaluate(&[&cpu, &mobo, &ram, &gpu, &psu, &case]);
        assert_eq!(verdict, BuildCompat::Compatible);
        assert!(violations.is_empty());
    }
}
