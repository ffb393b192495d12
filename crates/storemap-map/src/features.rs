//! GeoJSON sources loaded into the render surface.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject};
use serde_json::{json, Value};
use storemap_core::{normalize_name, BusinessPoi, Store};
use storemap_hierarchy::StoreCatalog;

use crate::boundary::BoundaryLayer;

/// Source data refreshed whenever a new dashboard snapshot lands.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSources {
    pub stores: Value,
    pub boundaries: Option<Value>,
}

impl MapSources {
    #[must_use]
    pub fn new(catalog: &StoreCatalog, boundaries: Option<&BoundaryLayer>) -> Self {
        Self {
            stores: stores_feature_collection(catalog.iter()),
            boundaries: boundaries.map(BoundaryLayer::to_json),
        }
    }
}

/// Geocoded stores as point features. The code property is what the store
/// filters test; tag properties are normalized for display-side matching.
pub fn stores_feature_collection<'a, I>(stores: I) -> Value
where
    I: IntoIterator<Item = &'a Store>,
{
    let features = stores
        .into_iter()
        .filter_map(|store| {
            let location = store.location?;
            let mut properties = JsonObject::new();
            properties.insert("code".to_string(), json!(store.code.as_str()));
            properties.insert("name".to_string(), json!(store.name));
            properties.insert("sqm".to_string(), json!(store.sqm));
            properties.insert("format".to_string(), json!(store.format));
            properties.insert("city".to_string(), json!(store.city.as_deref().map(normalize_name)));
            properties.insert("area".to_string(), json!(store.area.as_deref().map(normalize_name)));
            properties.insert(
                "zone".to_string(),
                json!(store.zone_name.as_deref().map(normalize_name)),
            );
            Some(point_feature(location.longitude, location.latitude, properties))
        })
        .collect();
    collection(features)
}

#[must_use]
pub fn businesses_feature_collection(pois: &[BusinessPoi]) -> Value {
    let features = pois
        .iter()
        .map(|poi| {
            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), json!(poi.id));
            properties.insert("name".to_string(), json!(poi.name));
            properties.insert("category".to_string(), json!(poi.category));
            properties.insert("address".to_string(), json!(poi.address));
            point_feature(poi.longitude, poi.latitude, properties)
        })
        .collect();
    collection(features)
}

fn point_feature(longitude: f64, latitude: f64, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![longitude, latitude]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> Value {
    GeoJson::from(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
    .to_json_value()
}

#[cfg(test)]
mod tests {
    use storemap_core::{ExternalId, LngLat};

    use super::*;

    fn store(code: &str, location: Option<LngLat>) -> Store {
        Store {
            code: ExternalId::Provided(code.to_string()),
            name: format!("Store {code}"),
            sqm: Some(120.0),
            location,
            address: None,
            format: Some("Express".to_string()),
            city: Some(" Pristina ".to_string()),
            area: Some("Center".to_string()),
            zone_code: "Z1".to_string(),
            zone_name: Some("North".to_string()),
            region: None,
        }
    }

    #[test]
    fn only_geocoded_stores_become_features() {
        let here = LngLat {
            longitude: 21.1,
            latitude: 42.6,
        };
        let stores = [store("D1", Some(here)), store("D2", None)];
        let fc = stores_feature_collection(&stores);
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["properties"]["code"], "D1");
        assert_eq!(features[0]["properties"]["city"], "pristina");
        assert_eq!(features[0]["geometry"]["coordinates"], json!([21.1, 42.6]));
    }

    #[test]
    fn businesses_keep_category() {
        let poi = BusinessPoi {
            id: "b1".to_string(),
            name: "Corner".to_string(),
            category: "bakery".to_string(),
            latitude: 42.6,
            longitude: 21.1,
            address: None,
            area: None,
            city: None,
            zone: None,
        };
        let fc = businesses_feature_collection(&[poi]);
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"][0]["properties"]["category"], "bakery");
    }
}
