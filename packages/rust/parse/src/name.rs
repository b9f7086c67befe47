//! Listing-title name parser: manufacturer + model extraction.
//!
//! Input is free marketplace text: arbitrary casing, punctuation, marketing
//! filler, and the occasional misspelling. Output is best-effort: either
//! field may come back `None`, and downstream stages must tolerate that.

use std::sync::LazyLock;

use regex::Regex;
use rigmate_shared::ComponentType;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of parsing a listing title. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    /// Canonical manufacturer name (e.g. `NVIDIA`, `be quiet!`).
    pub manufacturer: Option<String>,
    /// Model designation as it appeared, whitespace-normalized.
    pub model: Option<String>,
}

// ---------------------------------------------------------------------------
// Manufacturer alias table
// ---------------------------------------------------------------------------

/// `(alias, canonical)` pairs, matched over the lowercased title.
/// When several aliases match, the longest wins: "western digital" beats
/// "wd", "cooler master" beats "msi" appearing inside other words.
/// Includes common misspellings and abbreviations seen in listings.
const MANUFACTURERS: &[(&str, &str)] = &[
    // CPU / GPU vendors
    ("intel", "Intel"),
    ("amd", "AMD"),
    ("ryzen", "AMD"),
    ("threadripper", "AMD"),
    ("radeon", "AMD"),
    ("nvidia", "NVIDIA"),
    ("geforce", "NVIDIA"),
    ("rtx", "NVIDIA"),
    ("gtx", "NVIDIA"),
    ("rx", "AMD"),
    // Board / card partners
    ("asus", "ASUS"),
    ("asuss", "ASUS"),
    ("msi", "MSI"),
    ("gigabyte", "Gigabyte"),
    ("gigabite", "Gigabyte"),
    ("asrock", "ASRock"),
    ("as rock", "ASRock"),
    ("evga", "EVGA"),
    ("biostar", "Biostar"),
    ("zotac", "Zotac"),
    ("sapphire", "Sapphire"),
    ("palit", "Palit"),
    // RAM / storage
    ("corsair", "Corsair"),
    ("g.skill", "G.Skill"),
    ("gskill", "G.Skill"),
    ("g skill", "G.Skill"),
    ("kingston", "Kingston"),
    ("crucial", "Crucial"),
    ("samsung", "Samsung"),
    ("hyperx", "HyperX"),
    ("team group", "Team Group"),
    ("teamgroup", "Team Group"),
    ("patriot", "Patriot"),
    ("western digital", "Western Digital"),
    ("wd", "Western Digital"),
    ("seagate", "Seagate"),
    ("sandisk", "SanDisk"),
    ("adata", "ADATA"),
    // PSU / case
    ("seasonic", "Seasonic"),
    ("be quiet", "be quiet!"),
    ("bequiet", "be quiet!"),
    ("cooler master", "Cooler Master"),
    ("coolermaster", "Cooler Master"),
    ("thermaltake", "Thermaltake"),
    ("antec", "Antec"),
    ("nzxt", "NZXT"),
    ("fractal design", "Fractal Design"),
    ("fractal", "Fractal Design"),
    ("lian li", "Lian Li"),
    ("lianli", "Lian Li"),
    ("phanteks", "Phanteks"),
];

// ---------------------------------------------------------------------------
// Model pattern families (per component type)
// ---------------------------------------------------------------------------

static CPU_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:core\s+)?(i[3579][\-\s]?\d{3,5}[a-z]{0,2}|ryzen\s?[3579]\s?\d{3,4}[a-z]{0,2}(?:\s?3d)?|threadripper\s?\d{3,4}[a-z]{0,2}|pentium\s?g?\d{3,5}|celeron\s?g?\d{3,5})\b",
    )
    .expect("CPU model regex")
});

static GPU_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:rtx|gtx|gt)\s?\d{3,4}\s?(?:ti\s?super|ti|super)?|rx\s?\d{3,4}\s?(?:xtx|xt|gre)?|arc\s?a\d{3})\b",
    )
    .expect("GPU model regex")
});

static MOBO_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Chipset-led designations: B550-F, X670E Hero, Z790 Tomahawk, H610M...
    Regex::new(r"(?i)\b([abxzh]\d{2,3}[a-z]?(?:[\-\s][a-z0-9]{1,12})?)\b").expect("mobo model regex")
});

static RAM_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ddr[345][\-\s]?\d{3,4}|vengeance|trident\s?z|fury|ripjaws)\b")
        .expect("RAM model regex")
});

static STORAGE_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(9[7-9]0\s?(?:evo|pro)(?:\s?plus)?|8[7-8]0\s?(?:evo|qvo)|sn\d{3}|mx\d{3}|bx\d{3}|p[1-5]\s?plus|a\d{3}|barracuda|ironwolf)\b",
    )
    .expect("storage model regex")
});

static PSU_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(rm[xie]?\s?\d{3,4}|cx[m]?\s?\d{3}|tx[m]?\s?\d{3}|focus\s?(?:gx|px|sgx)?[\-\s]?\d{3,4}|supernova\s?\d{3,4}|pure\s?power\s?\d{1,2}|straight\s?power\s?\d{1,2})\b",
    )
    .expect("PSU model regex")
});

static CASE_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(h[1579]\d{2}|[45]000[dx]|meshify\s?\w{0,3}|define\s?\w{0,3}|lancool\s?\d{0,3}|nr[26]00|td\d{3})\b",
    )
    .expect("case model regex")
});

fn model_regex(ctype: ComponentType) -> &'static Regex {
    match ctype {
        ComponentType::Cpu => &CPU_MODEL_RE,
        ComponentType::Gpu => &GPU_MODEL_RE,
        ComponentType::Motherboard => &MOBO_MODEL_RE,
        ComponentType::Ram => &RAM_MODEL_RE,
        ComponentType::Storage => &STORAGE_MODEL_RE,
        ComponentType::Psu => &PSU_MODEL_RE,
        ComponentType::Case => &CASE_MODEL_RE,
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a listing title into `(manufacturer, model)`.
///
/// Pure function: no side effects, deterministic. A miss on either field is
/// normal output, not an error.
pub fn parse(raw_name: &str, ctype: ComponentType) -> ParsedName {
    if raw_name.trim().is_empty() {
        return ParsedName::default();
    }

    let lower = raw_name.to_lowercase();

    // Longest matching alias wins.
    let manufacturer = MANUFACTURERS
        .iter()
        .filter(|(alias, _)| contains_word(&lower, alias))
        .max_by_key(|(alias, _)| alias.len())
        .map(|(_, canonical)| (*canonical).to_string());

    // Longest contiguous model match wins.
    let model = model_regex(ctype)
        .captures_iter(raw_name)
        .filter_map(|caps| caps.get(1))
        .max_by_key(|m| m.as_str().len())
        .map(|m| normalize_ws(m.as_str()));

    ParsedName {
        manufacturer,
        model,
    }
}

/// Substring match constrained to word boundaries, so "wd" does not fire
/// inside "hardware".
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let abs = start + pos;
        let before_ok = abs == 0
            || !haystack[..abs]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        let after = abs + needle.len();
        let after_ok = after >= haystack.len()
            || !haystack[after..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = abs + 1;
    }
    false
}

/// Collapse whitespace runs to single spaces and trim.
pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_amd_full_title() {
        let parsed = parse("AMD Ryzen 5 5600X neuf sous blister", ComponentType::Cpu);
        assert_eq!(parsed.manufacturer.as_deref(), Some("AMD"));
        assert_eq!(parsed.model.as_deref(), Some("Ryzen 5 5600X"));
    }

    #[test]
    fn cpu_intel_dashed_model() {
        let parsed = parse("Intel Core i5-12400 LGA1700", ComponentType::Cpu);
        assert_eq!(parsed.manufacturer.as_deref(), Some("Intel"));
        assert_eq!(parsed.model.as_deref(), Some("i5-12400"));
    }

    #[test]
    fn cpu_ryzen_implies_amd() {
        let parsed = parse("Ryzen 7 5800X tray", ComponentType::Cpu);
        assert_eq!(parsed.manufacturer.as_deref(), Some("AMD"));
        assert_eq!(parsed.model.as_deref(), Some("Ryzen 7 5800X"));
    }

    #[test]
    fn gpu_with_suffix() {
        let parsed = parse("MSI GeForce RTX 3060 Ti Ventus 8GB", ComponentType::Gpu);
        // "geforce" also matches but "msi" is shorter; longest alias is geforce → NVIDIA
        assert_eq!(parsed.manufacturer.as_deref(), Some("NVIDIA"));
        assert_eq!(parsed.model.as_deref(), Some("RTX 3060 Ti"));
    }

    #[test]
    fn gpu_radeon_xt() {
        let parsed = parse("Sapphire RX 6600 XT Pulse occasion", ComponentType::Gpu);
        assert_eq!(parsed.model.as_deref(), Some("RX 6600 XT"));
        assert_eq!(parsed.manufacturer.as_deref(), Some("Sapphire"));
    }

    #[test]
    fn motherboard_chipset_model() {
        let parsed = parse("ASUS ROG STRIX B550-F Gaming", ComponentType::Motherboard);
        assert_eq!(parsed.manufacturer.as_deref(), Some("ASUS"));
        assert_eq!(parsed.model.as_deref(), Some("B550-F Gaming"));
    }

    #[test]
    fn ram_ddr_model() {
        let parsed = parse("Corsair Vengeance LPX DDR4-3200 16GB", ComponentType::Ram);
        assert_eq!(parsed.manufacturer.as_deref(), Some("Corsair"));
        // longest contiguous match preferred over "vengeance"
        assert_eq!(parsed.model.as_deref(), Some("DDR4-3200"));
    }

    #[test]
    fn storage_wd_abbreviation() {
        let parsed = parse("WD SN850 1TB NVMe", ComponentType::Storage);
        assert_eq!(parsed.manufacturer.as_deref(), Some("Western Digital"));
        assert_eq!(parsed.model.as_deref(), Some("SN850"));
    }

    #[test]
    fn wd_alias_requires_word_boundary() {
        let parsed = parse("Boitier hardware tower", ComponentType::Case);
        assert_eq!(parsed.manufacturer, None);
    }

    #[test]
    fn misspelled_manufacturer() {
        let parsed = parse("Carte mere Gigabite B450M DS3H", ComponentType::Motherboard);
        assert_eq!(parsed.manufacturer.as_deref(), Some("Gigabyte"));
    }

    #[test]
    fn multiword_alias_beats_short() {
        let parsed = parse("be quiet Pure Power 11 600W", ComponentType::Psu);
        assert_eq!(parsed.manufacturer.as_deref(), Some("be quiet!"));
        assert_eq!(parsed.model.as_deref(), Some("Pure Power 11"));
    }

    #[test]
    fn no_match_is_not_an_error() {
        let parsed = parse("vends tour complete tres bon etat", ComponentType::Case);
        assert_eq!(parsed.manufacturer, None);
        assert_eq!(parsed.model, None);
    }

    #[test]
    fn empty_title() {
        assert_eq!(parse("", ComponentType::Cpu), ParsedName::default());
    }

    #[test]
    fn deterministic() {
        let a = parse("AMD Ryzen 5 5600X", ComponentType::Cpu);
        let b = parse("AMD Ryzen 5 5600X", ComponentType::Cpu);
        assert_eq!(a, b);
    }
}
