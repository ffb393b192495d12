//! Aggregated hierarchy entities. Rebuilt wholesale on every refresh and
//! never mutated afterwards.

use serde::Serialize;

use crate::ids::ExternalId;

/// A WGS84 position. Only constructed when both halves are present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LngLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LngLat {
    /// Pair up optional coordinates; a store is geocoded only when both exist.
    #[must_use]
    pub fn from_pair(longitude: Option<f64>, latitude: Option<f64>) -> Option<Self> {
        match (longitude, latitude) {
            (Some(longitude), Some(latitude)) => Some(Self {
                longitude,
                latitude,
            }),
            _ => None,
        }
    }
}

/// Rollup metrics, always derived from a store list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub store_count: usize,
    pub total_sqm: f64,
    pub geocoded_count: usize,
}

impl Metrics {
    pub fn from_stores<'a, I>(stores: I) -> Self
    where
        I: IntoIterator<Item = &'a Store>,
    {
        stores.into_iter().fold(Self::default(), |mut acc, store| {
            acc.store_count += 1;
            acc.total_sqm += store.sqm.unwrap_or(0.0);
            if store.is_geocoded() {
                acc.geocoded_count += 1;
            }
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Store {
    pub code: ExternalId,
    pub name: String,
    pub sqm: Option<f64>,
    pub location: Option<LngLat>,
    pub address: Option<String>,
    pub format: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    /// Canonical zone key, or the store's own code when no zone record
    /// covers it.
    pub zone_code: String,
    /// `None` means "no zone", which is distinct from "Unassigned zone".
    pub zone_name: Option<String>,
    pub region: Option<String>,
}

impl Store {
    #[must_use]
    pub fn is_geocoded(&self) -> bool {
        self.location.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub code: ExternalId,
    pub name: String,
    #[serde(flatten)]
    pub metrics: Metrics,
    /// Distinct areas among the city's stores.
    pub area_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    pub code: ExternalId,
    pub name: String,
    /// Declared upstream; may disagree with the cities of `stores`.
    pub cities: Vec<String>,
    pub stores: Vec<Store>,
    pub zone_names: Vec<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub code: ExternalId,
    pub name: String,
    pub cities: Vec<String>,
    pub areas: Vec<String>,
    pub regions: Vec<String>,
    pub stores: Vec<Store>,
    #[serde(flatten)]
    pub metrics: Metrics,
}
