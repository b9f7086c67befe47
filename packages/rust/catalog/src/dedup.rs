//! Dedup keys for catalog identity.
//!
//! Two listings refer to the same component when their dedup keys match.
//! A fully resolved name yields a `(type, manufacturer, model)` key; when
//! the Name Parser could not classify the listing, identity falls back to
//! a hash of the normalized raw name so re-posts of the same unclassified
//! item still collapse into one row.

use sha2::{Digest, Sha256};

use rigmate_shared::{Component, ComponentType};

/// Catalog identity key for one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Manufacturer and model both resolved.
    Resolved {
        ctype: ComponentType,
        manufacturer: String,
        model: String,
    },
    /// Unresolved name; identity is a digest of the normalized raw name.
    Fallback {
        ctype: ComponentType,
        name_digest: String,
    },
}

impl DedupKey {
    /// Compute the key for a parsed listing.
    pub fn compute(
        ctype: ComponentType,
        manufacturer: Option<&str>,
        model: Option<&str>,
        raw_name: &str,
    ) -> Self {
        match (manufacturer, model) {
            (Some(manufacturer), Some(model)) => DedupKey::Resolved {
                ctype,
                manufacturer: normalize(manufacturer),
                model: normalize(model),
            },
            _ => DedupKey::Fallback {
                ctype,
                name_digest: digest(&normalize(raw_name)),
            },
        }
    }

    /// Key for an existing catalog component.
    pub fn of(component: &Component) -> Self {
        Self::compute(
            component.ctype,
            component.manufacturer.as_deref(),
            component.model.as_deref(),
            &component.raw_name,
        )
    }

    pub fn ctype(&self) -> ComponentType {
        match self {
            DedupKey::Resolved { ctype, .. } | DedupKey::Fallback { ctype, .. } => *ctype,
        }
    }

    /// Stable string form, suitable for a UNIQUE column in storage.
    pub fn storage_key(&self) -> String {
        match self {
            DedupKey::Resolved {
                manufacturer,
                model,
                ..
            } => format!("resolved:{manufacturer}:{model}"),
            DedupKey::Fallback { name_digest, .. } => format!("name:{name_digest}"),
        }
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
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

fn digest(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}
