//! Builds the city/area/zone hierarchy from the three flat feeds.

use std::{cmp::Ordering, collections::HashMap};

use storemap_core::{
    compare_names, normalize_name, Area, AreaRecord, BrowseMode, City, CityRecord,
    DepartmentRecord, ExternalId, LngLat, Metrics, NameSet, SelectItem, Selection,
    SelectionError, Store, Zone, ZoneRecord,
};

use crate::catalog::StoreCatalog;

pub const UNKNOWN_CITY: &str = "Unknown city";
pub const UNKNOWN_AREA: &str = "Unknown area";
pub const UNASSIGNED_ZONE: &str = "Unassigned zone";

/// One refresh's worth of aggregated entities. Immutable once built; the
/// next refresh replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    pub cities: Vec<City>,
    pub areas: Vec<Area>,
    pub zones: Vec<Zone>,
    pub catalog: StoreCatalog,
}

impl Hierarchy {
    #[must_use]
    pub fn find_city(&self, name: &str) -> Option<&City> {
        let wanted = normalize_name(name);
        self.cities.iter().find(|c| normalize_name(&c.name) == wanted)
    }

    #[must_use]
    pub fn find_area(&self, name: &str) -> Option<&Area> {
        let wanted = normalize_name(name);
        self.areas.iter().find(|a| normalize_name(&a.name) == wanted)
    }

    #[must_use]
    pub fn find_zone(&self, name: &str) -> Option<&Zone> {
        let wanted = normalize_name(name);
        self.zones.iter().find(|z| normalize_name(&z.name) == wanted)
    }

    /// Resolve a name picked under `mode` to the entity it refers to.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownName`] when no entity of that level
    /// carries the name.
    pub fn resolve(&self, mode: BrowseMode, name: &str) -> Result<SelectItem<'_>, SelectionError> {
        let found = match mode {
            BrowseMode::City => self.find_city(name).map(SelectItem::City),
            BrowseMode::Area => self.find_area(name).map(SelectItem::Area),
            BrowseMode::Zone => self.find_zone(name).map(SelectItem::Zone),
        };
        found.ok_or_else(|| SelectionError::UnknownName {
            mode,
            name: name.trim().to_string(),
        })
    }

    /// The stores a selection covers, for summaries.
    ///
    /// Cities have no store list of their own, so a city selection scans the
    /// catalog. Area and zone selections use the entity's own stores; an
    /// entity that no longer exists yields nothing.
    #[must_use]
    pub fn stores_for(&self, selection: &Selection) -> Vec<&Store> {
        match selection {
            Selection::None => self.catalog.iter().collect(),
            Selection::City { .. } => {
                let targets = selection.targets();
                self.catalog.matching(&targets).collect()
            }
            Selection::Area { name, .. } => self
                .find_area(name)
                .map(|area| area.stores.iter().collect())
                .unwrap_or_default(),
            Selection::Zone { name, .. } => self
                .find_zone(name)
                .map(|zone| zone.stores.iter().collect())
                .unwrap_or_default(),
        }
    }
}

/// Aggregate the city list, area-grouped departments, and zone-tagged
/// departments into a [`Hierarchy`].
///
/// Pure and deterministic. Area and city metrics derive from the area feed;
/// zone entities derive from the zone feed alone, so the two views can
/// disagree when the feeds do.
#[must_use]
pub fn aggregate(
    cities: &[CityRecord],
    areas: &[AreaRecord],
    zones: &[ZoneRecord],
) -> Hierarchy {
    let zone_index = build_zone_index(zones);

    let area_entities: Vec<Area> = areas
        .iter()
        .enumerate()
        .map(|(idx, record)| build_area(idx, record, &zone_index))
        .collect();

    let catalog = StoreCatalog::from_stores(
        area_entities
            .iter()
            .flat_map(|area| area.stores.iter().cloned()),
    );

    let zone_entities = build_zones(zones);
    let city_entities = build_cities(cities, &catalog);

    let synthesized = area_entities
        .iter()
        .flat_map(|a| a.stores.iter())
        .chain(zone_entities.iter().flat_map(|z| z.stores.iter()))
        .filter(|s| s.code.is_synthesized())
        .count();
    if synthesized > 0 {
        tracing::debug!(synthesized, "synthesized identifiers for stores without a code");
    }

    let mut hierarchy = Hierarchy {
        cities: city_entities,
        areas: area_entities,
        zones: zone_entities,
        catalog,
    };
    sort_hierarchy(&mut hierarchy);

    tracing::debug!(
        cities = hierarchy.cities.len(),
        areas = hierarchy.areas.len(),
        zones = hierarchy.zones.len(),
        stores = hierarchy.catalog.len(),
        "hierarchy aggregated"
    );
    hierarchy
}

/// Department code → zone record. Records without a department code are
/// indexed by zone code, then zone name. First writer wins.
fn build_zone_index(zones: &[ZoneRecord]) -> HashMap<String, &ZoneRecord> {
    let mut index = HashMap::new();
    for record in zones {
        let key = clean(record.department_code.as_deref())
            .or_else(|| clean(record.zone_code.as_deref()))
            .or_else(|| clean(record.zone_name.as_deref()));
        if let Some(key) = key {
            index.entry(key).or_insert(record);
        }
    }
    index
}

fn zone_key(record: &ZoneRecord) -> ExternalId {
    ExternalId::provided_or_else(record.zone_code.as_deref(), || {
        match clean(record.zone_name.as_deref()) {
            Some(name) => format!("zone-{name}"),
            None => UNASSIGNED_ZONE.to_string(),
        }
    })
}

fn zone_label(record: &ZoneRecord) -> String {
    clean(record.zone_name.as_deref()).unwrap_or_else(|| UNASSIGNED_ZONE.to_string())
}

fn build_area(idx: usize, record: &AreaRecord, zone_index: &HashMap<String, &ZoneRecord>) -> Area {
    let name = clean(record.name.as_deref());
    let code = ExternalId::provided_or_else(record.code.as_deref(), || match &name {
        Some(name) => format!("area-{name}"),
        None => format!("area-{idx}"),
    });
    let name = name.unwrap_or_else(|| UNKNOWN_AREA.to_string());

    let stores: Vec<Store> = record
        .departments
        .iter()
        .enumerate()
        .map(|(dept_idx, dept)| area_store(idx, &name, dept_idx, dept, zone_index))
        .collect();

    let zone_names = distinct_names(stores.iter().map(|s| s.zone_name.as_deref()));
    let cities = distinct_names(record.cities.iter().map(|c| Some(c.as_str())));
    let metrics = Metrics::from_stores(&stores);

    Area {
        code,
        name,
        cities,
        stores,
        zone_names,
        metrics,
    }
}

/// A department without a code is keyed by its position in the feed (area
/// record index, then department index), which no other record can share.
fn area_store(
    area_idx: usize,
    area_name: &str,
    dept_idx: usize,
    dept: &DepartmentRecord,
    zone_index: &HashMap<String, &ZoneRecord>,
) -> Store {
    let code = ExternalId::provided_or_else(dept.code.as_deref(), || {
        format!("area-{area_idx}-dept-{dept_idx}")
    });

    let zone = match &code {
        ExternalId::Provided(key) => zone_index.get(key.as_str()).copied(),
        ExternalId::Synthesized(_) => None,
    };
    let (zone_code, zone_name, region) = match zone {
        Some(record) => (
            zone_key(record).as_str().to_string(),
            Some(zone_label(record)),
            clean(record.region.as_deref()),
        ),
        None => (code.as_str().to_string(), None, None),
    };

    Store {
        name: clean(dept.name.as_deref()).unwrap_or_else(|| code.as_str().to_string()),
        sqm: dept.sqm,
        location: LngLat::from_pair(dept.longitude, dept.latitude),
        address: clean(dept.address.as_deref()),
        format: clean(dept.format.as_deref()),
        city: clean(dept.city.as_deref()),
        area: Some(area_name.to_string()),
        zone_code,
        zone_name,
        region,
        code,
    }
}

struct ZoneGroup {
    code: ExternalId,
    name: String,
    stores: Vec<Store>,
}

fn build_zones(zones: &[ZoneRecord]) -> Vec<Zone> {
    let mut groups: Vec<ZoneGroup> = Vec::new();
    let mut by_key: HashMap<ExternalId, usize> = HashMap::new();

    for record in zones {
        let key = zone_key(record);
        let slot = *by_key.entry(key.clone()).or_insert_with(|| {
            groups.push(ZoneGroup {
                code: key.clone(),
                name: zone_label(record),
                stores: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        let store = zone_store(slot, &group.code, &group.name, group.stores.len(), record);
        group.stores.push(store);
    }

    groups
        .into_iter()
        .map(|group| Zone {
            cities: distinct_names(group.stores.iter().map(|s| s.city.as_deref())),
            areas: distinct_names(group.stores.iter().map(|s| s.area.as_deref())),
            regions: distinct_names(group.stores.iter().map(|s| s.region.as_deref())),
            metrics: Metrics::from_stores(&group.stores),
            code: group.code,
            name: group.name,
            stores: group.stores,
        })
        .collect()
}

fn zone_store(
    zone_idx: usize,
    zone_code: &ExternalId,
    zone_name: &str,
    idx: usize,
    record: &ZoneRecord,
) -> Store {
    let code = ExternalId::provided_or_else(record.department_code.as_deref(), || {
        format!("zone-{zone_idx}-dept-{idx}")
    });
    Store {
        name: clean(record.department_name.as_deref())
            .unwrap_or_else(|| code.as_str().to_string()),
        sqm: record.sqm,
        location: LngLat::from_pair(record.longitude, record.latitude),
        address: clean(record.address.as_deref()),
        format: clean(record.format.as_deref()),
        city: clean(record.city.as_deref()),
        area: clean(record.area.as_deref()),
        zone_code: zone_code.as_str().to_string(),
        zone_name: Some(zone_name.to_string()),
        region: clean(record.region.as_deref()),
        code,
    }
}

/// City metrics come from the deduplicated area-derived catalog, grouped by
/// normalized city tag.
fn build_cities(cities: &[CityRecord], catalog: &StoreCatalog) -> Vec<City> {
    let mut by_city: HashMap<String, Vec<&Store>> = HashMap::new();
    for store in catalog.iter() {
        if let Some(city) = store.city.as_deref() {
            let key = normalize_name(city);
            if !key.is_empty() {
                by_city.entry(key).or_default().push(store);
            }
        }
    }

    cities
        .iter()
        .map(|record| {
            let name = clean(record.name.as_deref());
            let code = ExternalId::provided_or_else(record.code.as_deref(), || {
                format!("city-{}", name.as_deref().unwrap_or(UNKNOWN_CITY))
            });
            let name = name.unwrap_or_else(|| UNKNOWN_CITY.to_string());

            let stores = by_city
                .get(&normalize_name(&name))
                .map(Vec::as_slice)
                .unwrap_or_default();
            let areas = NameSet::from_names(stores.iter().filter_map(|s| s.area.as_deref()));

            City {
                code,
                name,
                metrics: Metrics::from_stores(stores.iter().copied()),
                area_count: areas.len(),
            }
        })
        .collect()
}

fn sort_hierarchy(hierarchy: &mut Hierarchy) {
    hierarchy
        .cities
        .sort_by(|a, b| by_count_then_name(&a.metrics, &a.name, &b.metrics, &b.name));
    hierarchy
        .areas
        .sort_by(|a, b| by_count_then_name(&a.metrics, &a.name, &b.metrics, &b.name));
    hierarchy
        .zones
        .sort_by(|a, b| by_count_then_name(&a.metrics, &a.name, &b.metrics, &b.name));
}

/// Store count descending, then collated name ascending.
fn by_count_then_name(a: &Metrics, a_name: &str, b: &Metrics, b_name: &str) -> Ordering {
    b.store_count
        .cmp(&a.store_count)
        .then_with(|| compare_names(a_name, b_name))
}

/// Distinct non-blank names in first-seen order, compared normalized but
/// returned as first spelled.
fn distinct_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut seen = NameSet::new();
    names
        .into_iter()
        .flatten()
        .filter(|name| seen.insert(name))
        .map(|name| name.trim().to_string())
        .collect()
}

fn clean(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
