//! Core domain types for the rigmate component catalog.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ComponentType
// ---------------------------------------------------------------------------

/// Hardware component categories known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Cpu,
    Gpu,
    Motherboard,
    Ram,
    Storage,
    Psu,
    Case,
}

impl ComponentType {
    /// All component types, in build-assembly dependency order
    /// (compatibility-defining categories first).
    pub const ASSEMBLY_ORDER: [ComponentType; 7] = [
        ComponentType::Motherboard,
        ComponentType::Cpu,
        ComponentType::Ram,
        ComponentType::Gpu,
        ComponentType::Storage,
        ComponentType::Psu,
        ComponentType::Case,
    ];

    /// Lowercase name used in serialized form, CLI args, and dedup keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Cpu => "cpu",
            ComponentType::Gpu => "gpu",
            ComponentType::Motherboard => "motherboard",
            ComponentType::Ram => "ram",
            ComponentType::Storage => "storage",
            ComponentType::Psu => "psu",
            ComponentType::Case => "case",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" | "processor" => Ok(ComponentType::Cpu),
            "gpu" | "graphics" => Ok(ComponentType::Gpu),
            "motherboard" | "mobo" | "mainboard" => Ok(ComponentType::Motherboard),
            "ram" | "memory" => Ok(ComponentType::Ram),
            "storage" | "ssd" | "hdd" | "disk" => Ok(ComponentType::Storage),
            "psu" | "power" => Ok(ComponentType::Psu),
            "case" | "chassis" => Ok(ComponentType::Case),
            other => Err(format!("unknown component type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ComponentId
// ---------------------------------------------------------------------------

/// Stable component identifier, assigned at first ingestion.
///
/// Rendered as a slug of the resolved manufacturer/model (or the head of the
/// raw name) plus a short uuid-v7 suffix, e.g. `nvidia-rtx-4090-a1f3c2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    /// Generate a new id from the best available naming information.
    pub fn generate(manufacturer: Option<&str>, model: Option<&str>, raw_name: &str) -> Self {
        let head = match (manufacturer, model) {
            (Some(m), Some(mo)) => format!("{m} {mo}"),
            (None, Some(mo)) => mo.to_string(),
            _ => raw_name.split_whitespace().take(3).collect::<Vec<_>>().join(" "),
        };
        let slug = slugify(&head);
        // A v7 uuid front-loads the timestamp; the entropy lives in the
        // tail, so the suffix comes from there.
        let simple = Uuid::now_v7().simple().to_string();
        let suffix = &simple[simple.len() - 6..];
        if slug.is_empty() {
            Self(format!("component-{suffix}"))
        } else {
            Self(format!("{slug}-{suffix}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lowercase, keep alphanumerics, join runs of anything else with `-`.
fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

/// A single extracted specification value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl SpecValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SpecValue::Int(v) => Some(*v),
            SpecValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SpecValue::Int(v) => Some(*v as f64),
            SpecValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SpecValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SpecValue::List(v) => Some(v),
            _ => None,
        }
    }
}

/// Extracted specification fields, keyed by the vocabulary in [`spec_keys`].
/// Unresolved fields are absent, never sentinel values.
pub type Specs = BTreeMap<String, SpecValue>;

/// Canonical spec key names. Each component type admits a fixed subset
/// (see [`allowed_keys`]); the reconciler drops anything else.
pub mod spec_keys {
    pub const SOCKET: &str = "socket";
    pub const CORES: &str = "cores";
    pub const THREADS: &str = "threads";
    pub const BASE_CLOCK_GHZ: &str = "base_clock_ghz";
    pub const TDP_W: &str = "tdp_w";
    pub const VRAM_GB: &str = "vram_gb";
    pub const MEMORY_TYPE: &str = "memory_type";
    pub const LENGTH_MM: &str = "length_mm";
    pub const RAM_TYPE: &str = "ram_type";
    pub const SPEED_MHZ: &str = "speed_mhz";
    pub const CAPACITY_GB: &str = "capacity_gb";
    pub const INTERFACE: &str = "interface";
    pub const CHIPSET: &str = "chipset";
    pub const FORM_FACTOR: &str = "form_factor";
    pub const WATTAGE: &str = "wattage";
    pub const EFFICIENCY_RATING: &str = "efficiency_rating";
    pub const FORM_FACTOR_SUPPORT: &str = "form_factor_support";
    pub const MAX_GPU_LENGTH_MM: &str = "max_gpu_length_mm";
}

/// The spec keys a component of the given type may carry.
pub fn allowed_keys(ctype: ComponentType) -> &'static [&'static str] {
    use spec_keys::*;
    match ctype {
        ComponentType::Cpu => &[SOCKET, CORES, THREADS, BASE_CLOCK_GHZ, TDP_W],
        ComponentType::Gpu => &[VRAM_GB, MEMORY_TYPE, TDP_W, LENGTH_MM],
        ComponentType::Motherboard => &[SOCKET, CHIPSET, RAM_TYPE, SPEED_MHZ, FORM_FACTOR],
        ComponentType::Ram => &[RAM_TYPE, SPEED_MHZ, CAPACITY_GB],
        ComponentType::Storage => &[CAPACITY_GB, INTERFACE],
        ComponentType::Psu => &[WATTAGE, FORM_FACTOR, EFFICIENCY_RATING],
        ComponentType::Case => &[FORM_FACTOR_SUPPORT, MAX_GPU_LENGTH_MM],
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Normalized performance scores, each in `[0, 100]`.
///
/// A component is either fully scored or entirely unscored
/// (`Component::scores == None`); zero is a valid low score, not "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub benchmark: u8,
    pub gaming: u8,
    pub productivity: u8,
    pub ai: u8,
}

impl Scores {
    /// Clamp four raw values into `[0, 100]`.
    pub fn clamped(benchmark: f64, gaming: f64, productivity: f64, ai: f64) -> Self {
        let clamp = |v: f64| v.clamp(0.0, 100.0).round() as u8;
        Self {
            benchmark: clamp(benchmark),
            gaming: clamp(gaming),
            productivity: clamp(productivity),
            ai: clamp(ai),
        }
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Listing condition as advertised by the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

// ---------------------------------------------------------------------------
// RawListing
// ---------------------------------------------------------------------------

/// A raw marketplace listing as handed over by the ingestion pipeline.
/// Ephemeral: exists only for the duration of `ingest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    /// Free-text listing title.
    pub title: String,
    /// Free-text description, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Asking price, already normalized to integer DZD.
    pub price_dzd: u64,
    /// Where the listing was scraped from.
    pub source_url: String,
    /// Seller location (wilaya), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Advertised condition, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A normalized catalog component.
///
/// `ctype` and `id` are immutable once assigned; later ingestions of the same
/// dedup key refresh price, specs, and `last_seen` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Stable identity, assigned at first ingestion.
    pub id: ComponentId,
    /// Component category. Immutable.
    pub ctype: ComponentType,
    /// Canonical manufacturer name, when the Name Parser resolved one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Model designation, when resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Original listing title, retained for re-parsing.
    pub raw_name: String,
    /// Last-seen listing description; kept so re-ingestion can skip
    /// recomputing specs/scores when nothing changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extracted specification fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub specs: Specs,
    /// Current asking price in DZD.
    pub price_dzd: u64,
    /// Performance scores; `None` means unscored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    /// Advertised condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Source listing URL.
    pub source_url: String,
    /// Seller location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// When the component was first ingested.
    pub first_seen: DateTime<Utc>,
    /// When a listing for it was last seen.
    pub last_seen: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Compatibility verdicts
// ---------------------------------------------------------------------------

/// Outcome of evaluating a single compatibility rule.
///
/// `Unknown` is a first-class result: a required spec field was missing on
/// one side. It is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Compatible,
    Incompatible,
    Unknown,
}

/// Aggregate compatibility of a component set.
/// `Partial` means no rule failed but at least one could not be decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildCompat {
    Compatible,
    Incompatible,
    Partial,
}

impl std::fmt::Display for BuildCompat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildCompat::Compatible => "compatible",
            BuildCompat::Incompatible => "incompatible",
            BuildCompat::Partial => "partial",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// UseCase
// ---------------------------------------------------------------------------

/// Target workload used to weight performance scores during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase {
    Gaming,
    Productivity,
    Ai,
    Balanced,
}

impl std::str::FromStr for UseCase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gaming" => Ok(UseCase::Gaming),
            "productivity" => Ok(UseCase::Productivity),
            "ai" | "ai_ml" => Ok(UseCase::Ai),
            "balanced" => Ok(UseCase::Balanced),
            other => Err(format!("unknown use case: {other}")),
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UseCase::Gaming => "gaming",
            UseCase::Productivity => "productivity",
            UseCase::Ai => "ai",
            UseCase::Balanced => "balanced",
        };
        f.write_str(s)
    }
}

/// A `[gaming, productivity, ai]` weight vector. Components sum to ~1.0.
pub type WeightVector = [f64; 3];

// ---------------------------------------------------------------------------
// BuildRecommendation
// ---------------------------------------------------------------------------

/// A complete build proposal. Never mutated after creation; a new
/// recommendation supersedes rather than edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecommendation {
    /// Selected component per category (at most one each).
    pub components: BTreeMap<ComponentType, ComponentId>,
    /// Sum of the selected components' prices.
    pub total_price_dzd: u64,
    /// Aggregate compatibility verdict over the selected set.
    pub compatibility: BuildCompat,
    /// Rule ids that evaluated INCOMPATIBLE, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    /// Human-readable explanation of how the build was chosen.
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_type_roundtrip() {
        for ctype in ComponentType::ASSEMBLY_ORDER {
            let parsed: ComponentType = ctype.as_str().parse().expect("parse component type");
            assert_eq!(parsed, ctype);
        }
    }

    #[test]
    fn component_type_aliases() {
        assert_eq!("mobo".parse::<ComponentType>(), Ok(ComponentType::Motherboard));
        assert_eq!("SSD".parse::<ComponentType>(), Ok(ComponentType::Storage));
        assert!("toaster".parse::<ComponentType>().is_err());
    }

    #[test]
    fn component_id_slug_shape() {
        let id = ComponentId::generate(Some("NVIDIA"), Some("RTX 4090"), "ignored");
        assert!(id.as_str().starts_with("nvidia-rtx-4090-"), "got {id}");
        // slug + dash + 6 hex chars
        let suffix = id.as_str().rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
    }

    #[test]
    fn component_id_from_raw_name_only() {
        let id = ComponentId::generate(None, None, "Boitier gamer RGB tour");
        assert!(id.as_str().starts_with("boitier-gamer-rgb-"), "got {id}");
    }

    #[test]
    fn component_ids_with_same_slug_head_are_distinct() {
        // Two listings sharing their first three words must not alias.
        let a = ComponentId::generate(None, None, "Boitier gamer RGB tour");
        let b = ComponentId::generate(None, None, "Boitier gamer RGB moyen tour");
        assert_ne!(a, b);

        let c = ComponentId::generate(Some("NVIDIA"), Some("RTX 4090"), "x");
        let d = ComponentId::generate(Some("NVIDIA"), Some("RTX 4090"), "y");
        assert_ne!(c, d);
    }

    #[test]
    fn scores_clamped_to_range() {
        let s = Scores::clamped(120.0, -5.0, 99.6, 0.0);
        assert_eq!(s.benchmark, 100);
        assert_eq!(s.gaming, 0);
        assert_eq!(s.productivity, 100);
        assert_eq!(s.ai, 0);
    }

    #[test]
    fn allowed_keys_cover_compat_fields() {
        assert!(allowed_keys(ComponentType::Cpu).contains(&spec_keys::SOCKET));
        assert!(allowed_keys(ComponentType::Motherboard).contains(&spec_keys::SOCKET));
        assert!(allowed_keys(ComponentType::Psu).contains(&spec_keys::WATTAGE));
        assert!(allowed_keys(ComponentType::Case).contains(&spec_keys::FORM_FACTOR_SUPPORT));
    }

    #[test]
    fn spec_value_untagged_serde() {
        let specs: Specs = [
            (spec_keys::SOCKET.to_string(), SpecValue::Text("AM4".into())),
            (spec_keys::CORES.to_string(), SpecValue::Int(6)),
            (spec_keys::BASE_CLOCK_GHZ.to_string(), SpecValue::Float(3.7)),
        ]
        .into();
        let json = serde_json::to_string(&specs).expect("serialize");
        assert!(json.contains(r#""socket":"AM4""#));
        let parsed: Specs = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.get(spec_keys::CORES).and_then(SpecValue::as_i64), Some(6));
    }

    #[test]
    fn raw_listing_deserializes_with_optionals_absent() {
        let json = r#"{"title":"AMD Ryzen 5 5600X","price_dzd":25000,"source_url":"https://example.com/1"}"#;
        let listing: RawListing = serde_json::from_str(json).expect("deserialize listing");
        assert!(listing.description.is_none());
        assert!(listing.condition.is_none());
    }
}
