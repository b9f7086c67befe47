//! Benchmark scoring for rigmate.
//!
//! Maps a resolved model (or, failing that, extracted specs) onto four
//! performance axes: benchmark, gaming, productivity, ai. All values live
//! in `[0, 100]`. Scores are either all present or all absent; a component
//! with no usable signal stays unscored (`None`), which is distinct from
//! scoring zero.
//!
//! The tier and model tables are policy, not contract. Only monotonicity
//! and the `[0, 100]` range are load-bearing; the exact coefficients are
//! tunable.

use rigmate_shared::{ComponentType, Scores, SpecValue, Specs, spec_keys};

/// Base axes for one tier or model row: (benchmark, gaming, productivity, ai).
type Axes = (f64, f64, f64, f64);

// ---------------------------------------------------------------------------
// Known-tier tables
// ---------------------------------------------------------------------------

/// CPU tiers, matched by substring against the normalized model. The family
/// tier carries most of the signal; spec adjustments refine it.
const CPU_TIERS: &[(&str, Axes)] = &[
    ("i9", (90.0, 85.0, 95.0, 80.0)),
    ("i7", (75.0, 80.0, 85.0, 70.0)),
    ("i5", (60.0, 70.0, 70.0, 55.0)),
    ("i3", (40.0, 50.0, 50.0, 35.0)),
    ("ryzen 9", (92.0, 88.0, 98.0, 85.0)),
    ("ryzen 7", (78.0, 82.0, 88.0, 75.0)),
    ("ryzen 5", (65.0, 72.0, 75.0, 60.0)),
    ("ryzen 3", (45.0, 55.0, 55.0, 40.0)),
];

const GPU_MODELS: &[(&str, Axes)] = &[
    ("rtx 4090", (100.0, 100.0, 95.0, 100.0)),
    ("rtx 4080", (90.0, 95.0, 90.0, 95.0)),
    ("rtx 4070", (75.0, 85.0, 75.0, 80.0)),
    ("rtx 4060", (60.0, 70.0, 60.0, 65.0)),
    ("rtx 3090", (95.0, 95.0, 90.0, 98.0)),
    ("rtx 3080", (85.0, 90.0, 85.0, 90.0)),
    ("rtx 3070", (70.0, 80.0, 70.0, 75.0)),
    ("rtx 3060", (55.0, 65.0, 55.0, 60.0)),
    ("gtx 1660", (40.0, 50.0, 35.0, 30.0)),
    ("gtx 1650", (30.0, 40.0, 25.0, 20.0)),
    ("rx 7900", (88.0, 92.0, 85.0, 75.0)),
    ("rx 7800", (75.0, 82.0, 70.0, 60.0)),
    ("rx 7700", (65.0, 72.0, 60.0, 50.0)),
    ("rx 6600", (50.0, 60.0, 45.0, 35.0)),
    ("rx 6500", (35.0, 45.0, 30.0, 25.0)),
];

fn lookup(table: &[(&str, Axes)], model: &str) -> Option<Axes> {
    let normalized = normalize(model);
    table
        .iter()
        .find(|(key, _)| normalized.contains(key))
        .map(|(_, axes)| *axes)
}

fn normalize(s: &str) -> String {
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

// ---------------------------------------------------------------------------
// Per-type scoring
// ---------------------------------------------------------------------------

fn score_cpu(model: Option<&str>, specs: &Specs) -> Option<Scores> {
    let cores = specs.get(spec_keys::CORES).and_then(SpecValue::as_f64);
    let clock = specs
        .get(spec_keys::BASE_CLOCK_GHZ)
        .and_then(SpecValue::as_f64);

    let (benchmark, mut gaming, mut productivity, mut ai) =
        match model.and_then(|m| lookup(CPU_TIERS, m)) {
            Some(axes) => axes,
            // Heuristic composite, monotonic in cores and clock.
            None => {
                let cores = cores?;
                let clock = clock.unwrap_or(3.0);
                let base = cores * 5.0 + (clock - 2.0) * 12.0;
                (base, base, base, base * 0.9)
            }
        };

    if let Some(cores) = cores {
        productivity += (cores * 2.0).min(20.0);
        ai += (cores * 1.5).min(15.0);
    }
    if let Some(clock) = clock {
        gaming += ((clock - 3.0) * 10.0).min(15.0);
    }

    Some(Scores::clamped(benchmark, gaming, productivity, ai))
}

fn score_gpu(model: Option<&str>, specs: &Specs) -> Option<Scores> {
    let vram = specs.get(spec_keys::VRAM_GB).and_then(SpecValue::as_f64);
    let tdp = specs.get(spec_keys::TDP_W).and_then(SpecValue::as_f64);

    let (benchmark, mut gaming, productivity, mut ai) =
        match model.and_then(|m| lookup(GPU_MODELS, m)) {
            Some(axes) => axes,
            // Heuristic composite, monotonic in VRAM and board power.
            None => {
                let vram = vram?;
                let tdp = tdp.unwrap_or(120.0);
                let base = vram * 3.5 + tdp * 0.12;
                (base, base * 1.1, base * 0.9, base)
            }
        };

    // VRAM headroom matters most for ai workloads.
    if let Some(vram) = vram {
        ai += match vram as i64 {
            v if v >= 24 => 20.0,
            v if v >= 16 => 15.0,
            v if v >= 12 => 10.0,
            v if v >= 8 => 5.0,
            _ => 0.0,
        };
    }
    if specs.get(spec_keys::MEMORY_TYPE).and_then(SpecValue::as_text) == Some("GDDR6X") {
        gaming += 5.0;
        ai += 5.0;
    }

    Some(Scores::clamped(benchmark, gaming, productivity, ai))
}

fn score_ram(specs: &Specs) -> Option<Scores> {
    let capacity = specs
        .get(spec_keys::CAPACITY_GB)
        .and_then(SpecValue::as_f64)?;
    let speed = specs
        .get(spec_keys::SPEED_MHZ)
        .and_then(SpecValue::as_f64)
        .unwrap_or(0.0);
    let ram_type = specs
        .get(spec_keys::RAM_TYPE)
        .and_then(SpecValue::as_text)
        .unwrap_or("");

    let mut benchmark = (capacity / 32.0 * 100.0).min(100.0);
    if ram_type == "DDR5" {
        benchmark += 10.0;
    } else if ram_type == "DDR4" && speed >= 3600.0 {
        benchmark += 5.0;
    }

    let productivity = capacity / 16.0 * 100.0;
    let ai = capacity / 32.0 * 100.0;
    // Capacity past the working set does little for games.
    let gaming = benchmark * 0.3;

    Some(Scores::clamped(benchmark, gaming, productivity, ai))
}

fn score_storage(specs: &Specs) -> Option<Scores> {
    let interface = specs
        .get(spec_keys::INTERFACE)
        .and_then(SpecValue::as_text);
    let capacity = specs
        .get(spec_keys::CAPACITY_GB)
        .and_then(SpecValue::as_f64);

    if interface.is_none() && capacity.is_none() {
        return None;
    }

    let mut base = match interface {
        Some("NVMe") => 80.0,
        Some("SATA") => 60.0,
        _ => 40.0,
    };
    match capacity.unwrap_or(0.0) as i64 {
        c if c >= 2000 => base += 10.0,
        c if c >= 1000 => base += 5.0,
        _ => {}
    }

    Some(Scores::clamped(base, base * 0.8, base, base * 0.7))
}

fn score_psu(specs: &Specs) -> Option<Scores> {
    let wattage = specs.get(spec_keys::WATTAGE).and_then(SpecValue::as_f64)?;
    let efficiency = specs
        .get(spec_keys::EFFICIENCY_RATING)
        .and_then(SpecValue::as_text)
        .unwrap_or("");

    let mut base = match wattage as i64 {
        w if w >= 1000 => 90.0,
        w if w >= 750 => 80.0,
        w if w >= 650 => 70.0,
        w if w >= 550 => 60.0,
        _ => 50.0,
    };
    base += match efficiency {
        e if e.contains("Titanium") => 10.0,
        e if e.contains("Platinum") => 8.0,
        e if e.contains("Gold") => 5.0,
        e if e.contains("Bronze") => 2.0,
        _ => 0.0,
    };

    Some(Scores::clamped(base, base, base, base))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Score a component. Returns `None` when there is not enough signal to
/// compute even the heuristic fallback. Deterministic: same inputs always
/// yield the same scores, so recommendation ranking stays stable across
/// re-ingestion.
pub fn score(
    ctype: ComponentType,
    _manufacturer: Option<&str>,
    model: Option<&str>,
    specs: &Specs,
) -> Option<Scores> {
    let scores = match ctype {
        ComponentType::Cpu => score_cpu(model, specs),
        ComponentType::Gpu => score_gpu(model, specs),
        ComponentType::Ram => score_ram(specs),
        ComponentType::Storage => score_storage(specs),
        ComponentType::Psu => score_psu(specs),
        // Boards and cases are compatibility anchors, not performance parts.
        ComponentType::Motherboard | ComponentType::Case => None,
    };
    if scores.is_none() {
        tracing::debug!(?ctype, ?model, "insufficient signal, leaving unscored");
    }
    scores
}
