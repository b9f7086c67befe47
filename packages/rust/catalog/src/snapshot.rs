//! In-memory catalog snapshot.
//!
//! Read paths (assembly, compatibility checks, agent reconciliation) take a
//! snapshot as an argument and never re-query mid-run, so a single run is
//! deterministic even while ingestion mutates the backing store.

use std::collections::HashMap;

use rigmate_shared::{Component, ComponentId, ComponentType};

use crate::dedup::DedupKey;

/// Immutable view over a set of components, indexed by id and dedup key.
#[derive(Debug, Default)]
pub struct Catalog {
    components: Vec<Component>,
    by_id: HashMap<ComponentId, usize>,
    by_key: HashMap<DedupKey, usize>,
}

impl Catalog {
    pub fn new(components: Vec<Component>) -> Self {
        let mut by_id = HashMap::with_capacity(components.len());
        let mut by_key = HashMap::with_capacity(components.len());
        for (i, component) in components.iter().enumerate() {
            by_id.insert(component.id.clone(), i);
            by_key.insert(DedupKey::of(component), i);
        }
        Self {
            components,
            by_id,
            by_key,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.by_id.get(id).map(|&i| &self.components[i])
    }

    /// All components of one category.
    pub fn by_type(&self, ctype: ComponentType) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.ctype == ctype)
    }

    /// Look up an existing component by dedup key.
    pub fn find_match(&self, key: &DedupKey) -> Option<&Component> {
        self.by_key.get(key).map(|&i| &self.components[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rigmate_shared::Specs;

    fn component(id: &str, ctype: ComponentType, raw_name: &str) -> Component {
        let now = Utc::now();
        Component {
            id: ComponentId::from(id),
            ctype,
            manufacturer: None,
            model: None,
            raw_name: raw_name.to_string(),
            description: None,
            specs: Specs::new(),
            price_dzd: 10_000,
            scores: None,
            condition: None,
            source_url: "https://example.test/listing".to_string(),
            location: None,
            first_seen: now,
            last_seen: now,
        }
    }

    #[test]
    fn lookup_by_id_and_type() {
        let catalog = Catalog::new(vec![
            component("cpu-1", ComponentType::Cpu, "cpu one"),
            component("gpu-1", ComponentType::Gpu, "gpu one"),
            component("gpu-2", ComponentType::Gpu, "gpu two"),
        ]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get(&ComponentId::from("gpu-1")).is_some());
        assert!(catalog.get(&ComponentId::from("nope")).is_none());
        assert_eq!(catalog.by_type(ComponentType::Gpu).count(), 2);
    }

    #[test]
    fn find_match_by_fallback_key() {
        let catalog = Catalog::new(vec![component("cpu-1", ComponentType::Cpu, "Mystery CPU!")]);
        let key = DedupKey::compute(ComponentType::Cpu, None, None, "mystery cpu");
        assert!(catalog.find_match(&key).is_some());
    }
}
