//! Raw record shapes served by the backend feeds.
//!
//! These mirror the wire format loosely: every field is optional, codes may
//! be strings or numbers, and coordinates may arrive as numbers or numeric
//! strings. Cleaning happens in the aggregator, not here.

use serde::{Deserialize, Deserializer};

use crate::ids::deserialize_code;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityRecord {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// City names declared upstream for this area.
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub departments: Vec<DepartmentRecord>,
}

/// A store as listed under an area record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRecord {
    #[serde(
        default,
        alias = "departmentCode",
        deserialize_with = "deserialize_code"
    )]
    pub code: Option<String>,
    #[serde(default, alias = "departmentName")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub sqm: Option<f64>,
    #[serde(
        default,
        alias = "lon",
        alias = "lng",
        deserialize_with = "deserialize_opt_f64"
    )]
    pub longitude: Option<f64>,
    #[serde(default, alias = "lat", deserialize_with = "deserialize_opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, alias = "cityName")]
    pub city: Option<String>,
}

/// A store as listed in the zone/region feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub zone_code: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(default, alias = "regionName")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub department_code: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub sqm: Option<f64>,
    #[serde(
        default,
        alias = "lon",
        alias = "lng",
        deserialize_with = "deserialize_opt_f64"
    )]
    pub longitude: Option<f64>,
    #[serde(default, alias = "lat", deserialize_with = "deserialize_opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, alias = "cityName")]
    pub city: Option<String>,
    #[serde(default, alias = "areaName")]
    pub area: Option<String>,
}

/// One entry of the combined store + nearby-business feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreBusinessesRecord {
    #[serde(default)]
    pub store: FeedStore,
    #[serde(default)]
    pub businesses: Vec<BusinessRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStore {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "cityName")]
    pub city: Option<String>,
    #[serde(default, alias = "areaName")]
    pub area: Option<String>,
    #[serde(default, alias = "zoneName")]
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessRecord {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "lat", deserialize_with = "deserialize_opt_f64")]
    pub latitude: Option<f64>,
    #[serde(
        default,
        alias = "lon",
        alias = "lng",
        deserialize_with = "deserialize_opt_f64"
    )]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Deserialize an optional number that may be sent as a numeric string.
///
/// Blank strings, unparsable strings, and non-finite values become `None`;
/// a bad coordinate downgrades the record to "not geocoded" rather than
/// failing the whole feed.
fn deserialize_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|f| f.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_record_accepts_short_coordinate_keys() {
        let json = r#"{
            "code": "A1",
            "name": "Center",
            "cities": ["Pristina"],
            "departments": [
                {"code": "D1", "name": "Store A", "sqm": 500, "lon": 21.1, "lat": 42.6, "city": "Pristina"}
            ]
        }"#;
        let area: AreaRecord = serde_json::from_str(json).unwrap();
        let dept = &area.departments[0];
        assert_eq!(area.code.as_deref(), Some("A1"));
        assert_eq!(dept.longitude, Some(21.1));
        assert_eq!(dept.latitude, Some(42.6));
        assert_eq!(dept.sqm, Some(500.0));
    }

    #[test]
    fn zone_record_reads_camel_case_fields() {
        let json = r#"{"zoneCode":"Z1","zoneName":"North","departmentCode":"D1","sqm":500,"lon":21.1,"lat":42.6}"#;
        let zone: ZoneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(zone.zone_code.as_deref(), Some("Z1"));
        assert_eq!(zone.zone_name.as_deref(), Some("North"));
        assert_eq!(zone.department_code.as_deref(), Some("D1"));
        assert!(zone.region.is_none());
    }

    #[test]
    fn numeric_strings_parse_and_garbage_becomes_none() {
        let json = r#"{"code":"D2","sqm":"1250.5","longitude":"n/a","latitude":""}"#;
        let dept: DepartmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(dept.sqm, Some(1250.5));
        assert!(dept.longitude.is_none());
        assert!(dept.latitude.is_none());
    }

    #[test]
    fn city_code_may_be_numeric() {
        let city: CityRecord = serde_json::from_str(r#"{"code":1,"name":"Pristina"}"#).unwrap();
        assert_eq!(city.code.as_deref(), Some("1"));
    }

    #[test]
    fn business_feed_record_parses() {
        let json = r#"{
            "store": {"code": "D1", "name": "Store A", "city": "Pristina", "area": "Center", "zone": "North"},
            "businesses": [
                {"id": 77, "name": "Viva Fresh", "category": "Supermarket", "lat": 42.66, "lon": 21.16}
            ]
        }"#;
        let record: StoreBusinessesRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.store.area.as_deref(), Some("Center"));
        assert_eq!(record.businesses[0].id.as_deref(), Some("77"));
        assert_eq!(record.businesses[0].latitude, Some(42.66));
    }
}
