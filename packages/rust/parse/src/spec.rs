//! Spec extraction from listing text.
//!
//! Extraction is a per-type registry of rules. Each rule owns one spec key
//! and a matcher run over the lowercased title + description. Rules only
//! fill keys the text actually supports; gaps are normal, not errors.
//! Known-model canonical specs (see [`crate::models`]) are overlaid last
//! and win conflicts, since listing text is the less trusted source.

use std::sync::LazyLock;

use regex::Regex;
use rigmate_shared::{ComponentType, SpecValue, Specs, spec_keys};

use crate::models;

/// One extraction rule: the spec key it fills and the matcher that reads it
/// out of normalized listing text.
pub struct ExtractorRule {
    pub key: &'static str,
    pub extract: fn(&str) -> Option<SpecValue>,
}

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

static AMD_SOCKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bam([345])\b").unwrap());
static INTEL_SOCKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blga\s*(1\d{3})\b").unwrap());
static CORES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*(?:cores?|c(?:œ|oe)urs?)\b").unwrap());
static THREADS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*threads?\b").unwrap());
// Compact "6c/12t" shorthand, common in marketplace titles.
static CORES_THREADS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})c\s*/\s*(\d{1,2})t\b").unwrap());
static GHZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*ghz\b").unwrap());
static TDP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tdp\D{0,5}(\d{2,3})\s*w\b|(\d{2,3})\s*w\s*tdp\b").unwrap());
// "go" is the French gigabyte abbreviation, frequent in DZ listings.
static GB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,4})\s*(?:gb|go)\b").unwrap());
static TB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:tb|to)\b").unwrap());
static MHZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})\s*mhz\b").unwrap());
static DDR_SPEED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bddr[345][-\s](\d{4})\b").unwrap());
static CHIPSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([abxzh]\d{3})\b").unwrap());
static WATTAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3,4})\s*w(?:atts?)?\b").unwrap());
static EFFICIENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"80\s*(?:\+|plus)\s*(titanium|platinum|gold|silver|bronze|white)").unwrap()
});
static GPU_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:gpu|carte|graphi\w+)\D{0,24}?(\d{3})\s*mm\b").unwrap());
static LENGTH_MM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3})\s*mm\b").unwrap());

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

fn socket(text: &str) -> Option<SpecValue> {
    if let Some(cap) = AMD_SOCKET_RE.captures(text) {
        return Some(SpecValue::Text(format!("AM{}", &cap[1])));
    }
    if let Some(cap) = INTEL_SOCKET_RE.captures(text) {
        return Some(SpecValue::Text(format!("LGA{}", &cap[1])));
    }
    None
}

fn cores(text: &str) -> Option<SpecValue> {
    let n = CORES_RE
        .captures(text)
        .and_then(|c| c[1].parse::<i64>().ok())
        .or_else(|| {
            CORES_THREADS_RE
                .captures(text)
                .and_then(|c| c[1].parse::<i64>().ok())
        })?;
    Some(SpecValue::Int(n))
}

fn threads(text: &str) -> Option<SpecValue> {
    let n = THREADS_RE
        .captures(text)
        .and_then(|c| c[1].parse::<i64>().ok())
        .or_else(|| {
            CORES_THREADS_RE
                .captures(text)
                .and_then(|c| c[2].parse::<i64>().ok())
        })?;
    Some(SpecValue::Int(n))
}

fn base_clock_ghz(text: &str) -> Option<SpecValue> {
    let cap = GHZ_RE.captures(text)?;
    let v = cap[1].replace(',', ".").parse::<f64>().ok()?;
    Some(SpecValue::Float(v))
}

fn tdp_w(text: &str) -> Option<SpecValue> {
    let cap = TDP_RE.captures(text)?;
    let raw = cap.get(1).or_else(|| cap.get(2))?;
    Some(SpecValue::Int(raw.as_str().parse().ok()?))
}

fn vram_gb(text: &str) -> Option<SpecValue> {
    let cap = GB_RE.captures(text)?;
    Some(SpecValue::Int(cap[1].parse().ok()?))
}

fn gpu_memory_type(text: &str) -> Option<SpecValue> {
    // gddr6x must be checked before gddr6; substring order matters.
    for tag in ["gddr6x", "gddr6", "gddr5x", "gddr5", "hbm2"] {
        if text.contains(tag) {
            return Some(SpecValue::Text(tag.to_uppercase()));
        }
    }
    None
}

fn gpu_length_mm(text: &str) -> Option<SpecValue> {
    let cap = LENGTH_MM_RE.captures(text)?;
    Some(SpecValue::Int(cap[1].parse().ok()?))
}

fn ram_type(text: &str) -> Option<SpecValue> {
    for tag in ["ddr5", "ddr4", "ddr3"] {
        if text.contains(tag) {
            return Some(SpecValue::Text(tag.to_uppercase()));
        }
    }
    None
}

fn speed_mhz(text: &str) -> Option<SpecValue> {
    let n = MHZ_RE
        .captures(text)
        .and_then(|c| c[1].parse::<i64>().ok())
        .or_else(|| {
            // "DDR4-3200" style with no explicit MHz unit.
            DDR_SPEED_RE
                .captures(text)
                .and_then(|c| c[1].parse::<i64>().ok())
        })?;
    Some(SpecValue::Int(n))
}

/// Capacity in GB. TB (or French "To") listings convert at 1 TB = 1000 GB.
fn capacity_gb(text: &str) -> Option<SpecValue> {
    if let Some(cap) = TB_RE.captures(text) {
        let tb = cap[1].replace(',', ".").parse::<f64>().ok()?;
        return Some(SpecValue::Int((tb * 1000.0).round() as i64));
    }
    let cap = GB_RE.captures(text)?;
    Some(SpecValue::Int(cap[1].parse().ok()?))
}

fn storage_interface(text: &str) -> Option<SpecValue> {
    if text.contains("nvme") || text.contains("m.2") || text.contains("m2 ") {
        return Some(SpecValue::Text("NVMe".into()));
    }
    if text.contains("sata") {
        return Some(SpecValue::Text("SATA".into()));
    }
    None
}

fn chipset(text: &str) -> Option<SpecValue> {
    let cap = CHIPSET_RE.captures(text)?;
    Some(SpecValue::Text(cap[1].to_uppercase()))
}

/// Board form factor. ITX and mATX markers both contain "atx", so the
/// check order is smallest first.
fn form_factor(text: &str) -> Option<SpecValue> {
    if text.contains("mini-itx") || text.contains("mini itx") || text.contains("itx") {
        return Some(SpecValue::Text("ITX".into()));
    }
    if text.contains("micro-atx")
        || text.contains("micro atx")
        || text.contains("matx")
        || text.contains("m-atx")
    {
        return Some(SpecValue::Text("mATX".into()));
    }
    if text.contains("atx") {
        return Some(SpecValue::Text("ATX".into()));
    }
    None
}

fn psu_wattage(text: &str) -> Option<SpecValue> {
    let cap = WATTAGE_RE.captures(text)?;
    Some(SpecValue::Int(cap[1].parse().ok()?))
}

fn efficiency_rating(text: &str) -> Option<SpecValue> {
    let cap = EFFICIENCY_RE.captures(text)?;
    let tier = &cap[1];
    let mut label = String::with_capacity(4 + tier.len());
    label.push_str("80+ ");
    let mut chars = tier.chars();
    if let Some(first) = chars.next() {
        label.push(first.to_ascii_uppercase());
        label.push_str(chars.as_str());
    }
    Some(SpecValue::Text(label))
}

/// All board sizes a case claims to fit. An ATX case is assumed to also
/// fit the smaller standards unless the listing says otherwise.
fn form_factor_support(text: &str) -> Option<SpecValue> {
    let supported = match form_factor(text)? {
        SpecValue::Text(ff) if ff == "ATX" => vec!["ATX", "mATX", "ITX"],
        SpecValue::Text(ff) if ff == "mATX" => vec!["mATX", "ITX"],
        _ => vec!["ITX"],
    };
    Some(SpecValue::List(
        supported.into_iter().map(String::from).collect(),
    ))
}

fn max_gpu_length_mm(text: &str) -> Option<SpecValue> {
    let cap = GPU_LENGTH_RE.captures(text)?;
    Some(SpecValue::Int(cap[1].parse().ok()?))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const CPU_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::SOCKET, extract: socket },
    ExtractorRule { key: spec_keys::CORES, extract: cores },
    ExtractorRule { key: spec_keys::THREADS, extract: threads },
    ExtractorRule { key: spec_keys::BASE_CLOCK_GHZ, extract: base_clock_ghz },
    ExtractorRule { key: spec_keys::TDP_W, extract: tdp_w },
];

const GPU_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::VRAM_GB, extract: vram_gb },
    ExtractorRule { key: spec_keys::MEMORY_TYPE, extract: gpu_memory_type },
    ExtractorRule { key: spec_keys::TDP_W, extract: tdp_w },
    ExtractorRule { key: spec_keys::LENGTH_MM, extract: gpu_length_mm },
];

const MOBO_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::SOCKET, extract: socket },
    ExtractorRule { key: spec_keys::CHIPSET, extract: chipset },
    ExtractorRule { key: spec_keys::RAM_TYPE, extract: ram_type },
    ExtractorRule { key: spec_keys::FORM_FACTOR, extract: form_factor },
];

const RAM_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::RAM_TYPE, extract: ram_type },
    ExtractorRule { key: spec_keys::CAPACITY_GB, extract: capacity_gb },
    ExtractorRule { key: spec_keys::SPEED_MHZ, extract: speed_mhz },
];

const STORAGE_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::CAPACITY_GB, extract: capacity_gb },
    ExtractorRule { key: spec_keys::INTERFACE, extract: storage_interface },
];

const PSU_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::WATTAGE, extract: psu_wattage },
    ExtractorRule { key: spec_keys::EFFICIENCY_RATING, extract: efficiency_rating },
];

const CASE_RULES: &[ExtractorRule] = &[
    ExtractorRule { key: spec_keys::FORM_FACTOR_SUPPORT, extract: form_factor_support },
    ExtractorRule { key: spec_keys::MAX_GPU_LENGTH_MM, extract: max_gpu_length_mm },
];

/// Extraction rules for a component type, applied in declaration order.
pub fn extractor_rules(ctype: ComponentType) -> &'static [ExtractorRule] {
    match ctype {
        ComponentType::Cpu => CPU_RULES,
        ComponentType::Gpu => GPU_RULES,
        ComponentType::Motherboard => MOBO_RULES,
        ComponentType::Ram => RAM_RULES,
        ComponentType::Storage => STORAGE_RULES,
        ComponentType::Psu => PSU_RULES,
        ComponentType::Case => CASE_RULES,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Extract specs for a listing. Text-derived fields come first; canonical
/// specs from the known-model table overwrite them on conflict.
pub fn extract(
    ctype: ComponentType,
    title: &str,
    description: Option<&str>,
    model: Option<&str>,
) -> Specs {
    let mut text = title.to_lowercase();
    if let Some(desc) = description {
        text.push(' ');
        text.push_str(&desc.to_lowercase());
    }

    let mut specs = Specs::new();
    for rule in extractor_rules(ctype) {
        if specs.contains_key(rule.key) {
            continue;
        }
        if let Some(value) = (rule.extract)(&text) {
            specs.insert(rule.key.to_string(), value);
        }
    }

    if let Some(canonical) = model.and_then(|m| models::model_specs(ctype, m)) {
        let overridden: Vec<&str> = canonical
            .keys()
            .filter(|k| specs.contains_key(*k))
            .map(String::as_str)
            .collect();
        if !overridden.is_empty() {
            tracing::debug!(?ctype, ?overridden, "model table overrides text-derived specs");
        }
        specs.extend(canonical);
    }

    specs
}
