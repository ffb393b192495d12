//! The deduplicated store set consumed by the map engine.

use std::collections::HashMap;

use storemap_core::{ExternalId, SelectionTargets, Store};

/// Stores keyed by code. Only the first occurrence of a code is kept; later
/// duplicates are ignored, never merged.
///
/// Provided and synthesized codes live in separate key spaces, so a derived
/// key never shadows a code a feed actually sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreCatalog {
    stores: Vec<Store>,
    index: HashMap<ExternalId, usize>,
}

impl StoreCatalog {
    pub fn from_stores<I>(stores: I) -> Self
    where
        I: IntoIterator<Item = Store>,
    {
        let mut catalog = Self::default();
        for store in stores {
            catalog.insert(store);
        }
        catalog
    }

    /// Insert unless the code is already present. Returns whether it was kept.
    pub fn insert(&mut self, store: Store) -> bool {
        if self.index.contains_key(&store.code) {
            return false;
        }
        self.index.insert(store.code.clone(), self.stores.len());
        self.stores.push(store);
        true
    }

    /// Look up by key, preferring a provided code over a synthesized one.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Store> {
        self.get_id(&ExternalId::Provided(code.to_string()))
            .or_else(|| self.get_id(&ExternalId::Synthesized(code.to_string())))
    }

    #[must_use]
    pub fn get_id(&self, id: &ExternalId) -> Option<&Store> {
        self.index.get(id).map(|&idx| &self.stores[idx])
    }

    #[must_use]
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn iter(&self) -> impl Iterator<Item = &Store> {
        self.stores.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Stores whose zone, area, or city tag satisfies the targets.
    pub fn matching<'a, 't>(
        &'a self,
        targets: &'t SelectionTargets,
    ) -> impl Iterator<Item = &'a Store> + use<'a, 't> {
        self.stores.iter().filter(move |store| {
            targets.matches(
                store.city.as_deref(),
                store.area.as_deref(),
                store.zone_name.as_deref(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use storemap_core::Selection;

    use super::*;

    fn store(code: &str, name: &str, city: &str) -> Store {
        Store {
            code: ExternalId::Provided(code.to_string()),
            name: name.to_string(),
            sqm: Some(100.0),
            location: None,
            address: None,
            format: None,
            city: Some(city.to_string()),
            area: None,
            zone_code: code.to_string(),
            zone_name: None,
            region: None,
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let catalog = StoreCatalog::from_stores([
            store("D1", "First", "Pristina"),
            store("D2", "Other", "Prizren"),
            store("D1", "Second", "Peja"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("D1").map(|s| s.name.as_str()), Some("First"));
    }

    #[test]
    fn insert_reports_duplicates() {
        let mut catalog = StoreCatalog::default();
        assert!(catalog.insert(store("D1", "A", "Pristina")));
        assert!(!catalog.insert(store("D1", "B", "Pristina")));
        assert_eq!(catalog.stores().len(), 1);
    }

    #[test]
    fn matching_uses_normalized_city() {
        let catalog = StoreCatalog::from_stores([
            store("D1", "A", "Pristina"),
            store("D2", "B", "Prizren"),
        ]);
        let targets = Selection::City {
            name: " PRISTINA ".to_string(),
        }
        .targets();
        let codes: Vec<&str> = catalog.matching(&targets).map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["D1"]);
    }

    #[test]
    fn matched_stores_outlive_the_targets() {
        let catalog = StoreCatalog::from_stores([
            store("D1", "A", "Pristina"),
            store("D2", "B", "Prizren"),
        ]);
        let found: Vec<&Store> = {
            let targets = Selection::City {
                name: "prizren".to_string(),
            }
            .targets();
            catalog.matching(&targets).collect()
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "B");
    }

    #[test]
    fn synthesized_key_never_shadows_provided_code() {
        let mut derived = store("D1", "Derived", "Pristina");
        derived.code = ExternalId::Synthesized("D1".to_string());
        let catalog = StoreCatalog::from_stores([derived, store("D1", "Real", "Pristina")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("D1").map(|s| s.name.as_str()), Some("Real"));
        assert_eq!(
            catalog
                .get_id(&ExternalId::Synthesized("D1".to_string()))
                .map(|s| s.name.as_str()),
            Some("Derived")
        );
    }

    #[test]
    fn get_missing_code_is_none() {
        assert!(StoreCatalog::default().get("nope").is_none());
    }
}
