//! Known-model specification table.
//!
//! Maps resolved model designations to canonical specs, covering fields the
//! listing text rarely states outright (a "Ryzen 5 5600X" listing almost
//! never says "AM4"). Table hits are higher-confidence than textual cues and
//! win conflicts during extraction.

use rigmate_shared::{ComponentType, SpecValue, Specs, spec_keys};

/// One known model: a normalized key prefix and its canonical spec fields.
struct KnownModel {
    /// Normalized designation (lowercase, punctuation collapsed to spaces).
    /// Matches when it is a prefix of the normalized model, so `i5 12400`
    /// also covers `i5-12400F`.
    key: &'static str,
    specs: &'static [(&'static str, ModelSpec)],
}

/// Static-friendly spec literal.
enum ModelSpec {
    I(i64),
    F(f64),
    T(&'static str),
}

impl ModelSpec {
    fn to_value(&self) -> SpecValue {
        match self {
            ModelSpec::I(v) => SpecValue::Int(*v),
            ModelSpec::F(v) => SpecValue::Float(*v),
            ModelSpec::T(s) => SpecValue::Text((*s).to_string()),
        }
    }
}

use ModelSpec::{F, I, T};
use spec_keys::*;

const CPU_MODELS: &[KnownModel] = &[
    KnownModel { key: "ryzen 3 3100", specs: &[(SOCKET, T("AM4")), (CORES, I(4)), (THREADS, I(8)), (BASE_CLOCK_GHZ, F(3.6)), (TDP_W, I(65))] },
    KnownModel { key: "ryzen 5 3600", specs: &[(SOCKET, T("AM4")), (CORES, I(6)), (THREADS, I(12)), (BASE_CLOCK_GHZ, F(3.6)), (TDP_W, I(65))] },
    KnownModel { key: "ryzen 5 5600", specs: &[(SOCKET, T("AM4")), (CORES, I(6)), (THREADS, I(12)), (BASE_CLOCK_GHZ, F(3.5)), (TDP_W, I(65))] },
    KnownModel { key: "ryzen 5 5600x", specs: &[(SOCKET, T("AM4")), (CORES, I(6)), (THREADS, I(12)), (BASE_CLOCK_GHZ, F(3.7)), (TDP_W, I(65))] },
    KnownModel { key: "ryzen 7 5800x", specs: &[(SOCKET, T("AM4")), (CORES, I(8)), (THREADS, I(16)), (BASE_CLOCK_GHZ, F(3.8)), (TDP_W, I(105))] },
    KnownModel { key: "ryzen 9 5900x", specs: &[(SOCKET, T("AM4")), (CORES, I(12)), (THREADS, I(24)), (BASE_CLOCK_GHZ, F(3.7)), (TDP_W, I(105))] },
    KnownModel { key: "ryzen 5 7600", specs: &[(SOCKET, T("AM5")), (CORES, I(6)), (THREADS, I(12)), (BASE_CLOCK_GHZ, F(3.8)), (TDP_W, I(65))] },
    KnownModel { key: "ryzen 7 7700", specs: &[(SOCKET, T("AM5")), (CORES, I(8)), (THREADS, I(16)), (BASE_CLOCK_GHZ, F(3.8)), (TDP_W, I(65))] },
    KnownModel { key: "ryzen 9 7900x", specs: &[(SOCKET, T("AM5")), (CORES, I(12)), (THREADS, I(24)), (BASE_CLOCK_GHZ, F(4.7)), (TDP_W, I(170))] },
    KnownModel { key: "i3 12100", specs: &[(SOCKET, T("LGA1700")), (CORES, I(4)), (THREADS, I(8)), (BASE_CLOCK_GHZ, F(3.3)), (TDP_W, I(60))] },
    KnownModel { key: "i5 10400", specs: &[(SOCKET, T("LGA1200")), (CORES, I(6)), (THREADS, I(12)), (BASE_CLOCK_GHZ, F(2.9)), (TDP_W, I(65))] },
    KnownModel { key: "i5 12400", specs: &[(SOCKET, T("LGA1700")), (CORES, I(6)), (THREADS, I(12)), (BASE_CLOCK_GHZ, F(2.5)), (TDP_W, I(65))] },
    KnownModel { key: "i5 13400", specs: &[(SOCKET, T("LGA1700")), (CORES, I(10)), (THREADS, I(16)), (BASE_CLOCK_GHZ, F(2.5)), (TDP_W, I(65))] },
    KnownModel { key: "i7 12700", specs: &[(SOCKET, T("LGA1700")), (CORES, I(12)), (THREADS, I(20)), (BASE_CLOCK_GHZ, F(2.1)), (TDP_W, I(65))] },
    KnownModel { key: "i7 13700k", specs: &[(SOCKET, T("LGA1700")), (CORES, I(16)), (THREADS, I(24)), (BASE_CLOCK_GHZ, F(3.4)), (TDP_W, I(125))] },
    KnownModel { key: "i9 12900k", specs: &[(SOCKET, T("LGA1700")), (CORES, I(16)), (THREADS, I(24)), (BASE_CLOCK_GHZ, F(3.2)), (TDP_W, I(125))] },
];

const GPU_MODELS: &[KnownModel] = &[
    KnownModel { key: "rtx 4090", specs: &[(VRAM_GB, I(24)), (MEMORY_TYPE, T("GDDR6X")), (TDP_W, I(450)), (LENGTH_MM, I(336))] },
    KnownModel { key: "rtx 4080", specs: &[(VRAM_GB, I(16)), (MEMORY_TYPE, T("GDDR6X")), (TDP_W, I(320)), (LENGTH_MM, I(310))] },
    KnownModel { key: "rtx 4070", specs: &[(VRAM_GB, I(12)), (MEMORY_TYPE, T("GDDR6X")), (TDP_W, I(200)), (LENGTH_MM, I(244))] },
    KnownModel { key: "rtx 4060", specs: &[(VRAM_GB, I(8)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(115)), (LENGTH_MM, I(240))] },
    KnownModel { key: "rtx 3090", specs: &[(VRAM_GB, I(24)), (MEMORY_TYPE, T("GDDR6X")), (TDP_W, I(350)), (LENGTH_MM, I(313))] },
    KnownModel { key: "rtx 3080", specs: &[(VRAM_GB, I(10)), (MEMORY_TYPE, T("GDDR6X")), (TDP_W, I(320)), (LENGTH_MM, I(285))] },
    KnownModel { key: "rtx 3070", specs: &[(VRAM_GB, I(8)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(220)), (LENGTH_MM, I(242))] },
    KnownModel { key: "rtx 3060", specs: &[(VRAM_GB, I(12)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(170)), (LENGTH_MM, I(242))] },
    KnownModel { key: "gtx 1660", specs: &[(VRAM_GB, I(6)), (MEMORY_TYPE, T("GDDR5")), (TDP_W, I(120)), (LENGTH_MM, I(229))] },
    KnownModel { key: "gtx 1650", specs: &[(VRAM_GB, I(4)), (MEMORY_TYPE, T("GDDR5")), (TDP_W, I(75)), (LENGTH_MM, I(229))] },
    KnownModel { key: "rx 7900", specs: &[(VRAM_GB, I(20)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(300)), (LENGTH_MM, I(287))] },
    KnownModel { key: "rx 7800", specs: &[(VRAM_GB, I(16)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(263)), (LENGTH_MM, I(267))] },
    KnownModel { key: "rx 6700", specs: &[(VRAM_GB, I(12)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(230)), (LENGTH_MM, I(267))] },
    KnownModel { key: "rx 6600", specs: &[(VRAM_GB, I(8)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(132)), (LENGTH_MM, I(190))] },
    KnownModel { key: "rx 6500", specs: &[(VRAM_GB, I(4)), (MEMORY_TYPE, T("GDDR6")), (TDP_W, I(107)), (LENGTH_MM, I(165))] },
];

/// Chipset-led motherboard families. Socket and memory generation follow the
/// chipset; form factor varies per board, so it is deliberately absent here.
const MOBO_MODELS: &[KnownModel] = &[
    KnownModel { key: "a520", specs: &[(SOCKET, T("AM4")), (CHIPSET, T("A520")), (RAM_TYPE, T("DDR4"))] },
    KnownModel { key: "b450", specs: &[(SOCKET, T("AM4")), (CHIPSET, T("B450")), (RAM_TYPE, T("DDR4"))] },
    KnownModel { key: "b550", specs: &[(SOCKET, T("AM4")), (CHIPSET, T("B550")), (RAM_TYPE, T("DDR4"))] },
    KnownModel { key: "x570", specs: &[(SOCKET, T("AM4")), (CHIPSET, T("X570")), (RAM_TYPE, T("DDR4"))] },
    KnownModel { key: "a620", specs: &[(SOCKET, T("AM5")), (CHIPSET, T("A620")), (RAM_TYPE, T("DDR5"))] },
    KnownModel { key: "b650", specs: &[(SOCKET, T("AM5")), (CHIPSET, T("B650")), (RAM_TYPE, T("DDR5"))] },
    KnownModel { key: "x670", specs: &[(SOCKET, T("AM5")), (CHIPSET, T("X670")), (RAM_TYPE, T("DDR5"))] },
    // Alder/Raptor Lake boards ship in DDR4 and DDR5 variants; leave
    // ram_type to the listing text.
    KnownModel { key: "h610", specs: &[(SOCKET, T("LGA1700")), (CHIPSET, T("H610"))] },
    KnownModel { key: "b660", specs: &[(SOCKET, T("LGA1700")), (CHIPSET, T("B660"))] },
    KnownModel { key: "b760", specs: &[(SOCKET, T("LGA1700")), (CHIPSET, T("B760"))] },
    KnownModel { key: "z690", specs: &[(SOCKET, T("LGA1700")), (CHIPSET, T("Z690"))] },
    KnownModel { key: "z790", specs: &[(SOCKET, T("LGA1700")), (CHIPSET, T("Z790"))] },
    KnownModel { key: "b460", specs: &[(SOCKET, T("LGA1200")), (CHIPSET, T("B460")), (RAM_TYPE, T("DDR4"))] },
    KnownModel { key: "z490", specs: &[(SOCKET, T("LGA1200")), (CHIPSET, T("Z490")), (RAM_TYPE, T("DDR4"))] },
];

fn table(ctype: ComponentType) -> &'static [KnownModel] {
    match ctype {
        ComponentType::Cpu => CPU_MODELS,
        ComponentType::Gpu => GPU_MODELS,
        ComponentType::Motherboard => MOBO_MODELS,
        // RAM/storage/PSU/case specs are reliably present in listing text;
        // no canonical table needed.
        _ => &[],
    }
}

/// Look up canonical specs for a resolved model. Longest matching key wins
/// (`rx 7900` before a hypothetical `rx 790`).
pub fn model_specs(ctype: ComponentType, model: &str) -> Option<Specs> {
    let normalized = normalize_model(model);
    let hit = table(ctype)
        .iter()
        .filter(|m| normalized.starts_with(m.key))
        .max_by_key(|m| m.key.len())?;

    Some(
        hit.specs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_value()))
            .collect(),
    )
}

/// Lowercase and collapse punctuation/whitespace runs to single spaces,
/// so `i5-12400F`, `I5 12400f`, and `i5_12400` all normalize alike.
pub fn normalize_model(model: &str) -> String {
    let mut out = String::with_capacity(model.len());
    let mut pending_space = false;
    for c in model.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_variants_agree() {
        assert_eq!(normalize_model("i5-12400F"), "i5 12400f");
        assert_eq!(normalize_model("Ryzen 5  5600X"), "ryzen 5 5600x");
        assert_eq!(normalize_model("RTX3060"), "rtx3060");
    }

    #[test]
    fn cpu_lookup_gives_socket() {
        let specs = model_specs(ComponentType::Cpu, "Ryzen 5 5600X").expect("known model");
        assert_eq!(specs.get(SOCKET).and_then(SpecValue::as_text), Some("AM4"));
        assert_eq!(specs.get(CORES).and_then(SpecValue::as_i64), Some(6));
    }

    #[test]
    fn cpu_prefix_covers_sku_suffix() {
        let specs = model_specs(ComponentType::Cpu, "i5-12400F").expect("prefix match");
        assert_eq!(specs.get(SOCKET).and_then(SpecValue::as_text), Some("LGA1700"));
    }

    #[test]
    fn mobo_chipset_prefix_match() {
        let specs = model_specs(ComponentType::Motherboard, "B550-F Gaming").expect("chipset");
        assert_eq!(specs.get(SOCKET).and_then(SpecValue::as_text), Some("AM4"));
        assert_eq!(specs.get(RAM_TYPE).and_then(SpecValue::as_text), Some("DDR4"));
    }

    #[test]
    fn ddr_agnostic_chipset_omits_ram_type() {
        let specs = model_specs(ComponentType::Motherboard, "Z690 Tomahawk").expect("chipset");
        assert!(specs.get(RAM_TYPE).is_none());
    }

    #[test]
    fn gpu_lookup() {
        let specs = model_specs(ComponentType::Gpu, "RTX 4090").expect("known model");
        assert_eq!(specs.get(VRAM_GB).and_then(SpecValue::as_i64), Some(24));
        assert_eq!(specs.get(TDP_W).and_then(SpecValue::as_i64), Some(450));
    }

    #[test]
    fn unknown_model_is_none() {
        assert!(model_specs(ComponentType::Cpu, "Athlon XP 2000").is_none());
        assert!(model_specs(ComponentType::Ram, "DDR4-3200").is_none());
    }

    #[test]
    fn longest_key_wins() {
        // "ryzen 5 5600x" must hit the 5600x row, not the bare 5600 row.
        let specs = model_specs(ComponentType::Cpu, "Ryzen 5 5600X").unwrap();
        assert_eq!(
            specs.get(BASE_CLOCK_GHZ).and_then(SpecValue::as_f64),
            Some(3.7)
        );
    }
}
