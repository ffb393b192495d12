//! Administrative boundary geometry and the bounding boxes used to fit the
//! camera on a selection.

use geojson::{FeatureCollection, GeoJson};
use serde::Serialize;
use storemap_core::{normalize_name, NameSet};
use thiserror::Error;

/// Property written onto every boundary feature holding its normalized name,
/// so filters can match without re-normalizing on the render surface.
pub const MATCH_NAME_PROPERTY: &str = "match_name";

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("boundary document is not valid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("boundary document must be a FeatureCollection")]
    NotFeatureCollection,
}

/// Axis-aligned box in longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Componentwise min/max over `(lng, lat)` pairs. `None` when empty.
    pub fn from_positions<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = positions.into_iter();
        let (lng, lat) = iter.next()?;
        let mut bounds = Self {
            min_lng: lng,
            min_lat: lat,
            max_lng: lng,
            max_lat: lat,
        };
        for (lng, lat) in iter {
            bounds.min_lng = bounds.min_lng.min(lng);
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lng = bounds.max_lng.max(lng);
            bounds.max_lat = bounds.max_lat.max(lat);
        }
        Some(bounds)
    }

    /// `[[west, south], [east, north]]`, the order map surfaces expect.
    #[must_use]
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lng, self.min_lat], [self.max_lng, self.max_lat]]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BoundaryShape {
    match_name: Option<String>,
    rings: Vec<Vec<(f64, f64)>>,
}

/// A parsed boundary document.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    collection: FeatureCollection,
    shapes: Vec<BoundaryShape>,
}

impl BoundaryLayer {
    /// Parse a FeatureCollection, reading each feature's name from the first
    /// of `name_keys` holding a non-blank string.
    ///
    /// Features without a name or without polygon geometry are kept in the
    /// document but never match a selection.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the text is not GeoJSON or not a
    /// FeatureCollection.
    pub fn parse(raw: &str, name_keys: &[String]) -> Result<Self, BoundaryError> {
        match raw.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => Ok(Self::from_collection(collection, name_keys)),
            _ => Err(BoundaryError::NotFeatureCollection),
        }
    }

    #[must_use]
    pub fn from_collection(mut collection: FeatureCollection, name_keys: &[String]) -> Self {
        let mut shapes = Vec::with_capacity(collection.features.len());
        let mut unnamed = 0usize;

        for feature in &mut collection.features {
            let match_name = name_keys
                .iter()
                .find_map(|key| feature.property(key).and_then(serde_json::Value::as_str))
                .map(normalize_name)
                .filter(|name| !name.is_empty());

            match &match_name {
                Some(name) => feature.set_property(MATCH_NAME_PROPERTY, name.clone()),
                None => unnamed += 1,
            }

            let rings = feature
                .geometry
                .as_ref()
                .map(|geometry| polygon_rings(&geometry.value))
                .unwrap_or_default();
            shapes.push(BoundaryShape { match_name, rings });
        }

        if unnamed > 0 {
            tracing::warn!(unnamed, keys = ?name_keys, "boundary features without a usable name");
        }

        Self { collection, shapes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Normalized names of the named features, in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| s.match_name.as_deref())
    }

    /// Bounding box over every ring of every feature whose name is in
    /// `names`. `None` when nothing matches.
    #[must_use]
    pub fn bounds_for(&self, names: &NameSet) -> Option<Bounds> {
        if names.is_empty() {
            return None;
        }
        Bounds::from_positions(
            self.shapes
                .iter()
                .filter(|shape| names.contains(shape.match_name.as_deref()))
                .flat_map(|shape| shape.rings.iter().flatten().copied()),
        )
    }

    /// The annotated document as JSON, for loading into the map surface.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        GeoJson::from(self.collection.clone()).to_json_value()
    }
}

/// Outer and inner rings of a Polygon or MultiPolygon; other geometry kinds
/// contribute nothing.
fn polygon_rings(value: &geojson::Value) -> Vec<Vec<(f64, f64)>> {
    match value {
        geojson::Value::Polygon(rings) => rings.iter().map(|ring| ring_positions(ring)).collect(),
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .map(|ring| ring_positions(ring))
            .collect(),
        _ => Vec::new(),
    }
}

fn ring_positions(ring: &[Vec<f64>]) -> Vec<(f64, f64)> {
    ring.iter()
        .filter_map(|position| match position.as_slice() {
            [lng, lat, ..] => Some((*lng, *lat)),
            _ => None,
        })
        .collect()
}
