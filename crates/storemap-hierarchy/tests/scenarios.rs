use serde_json::json;
use storemap_core::{
    AreaRecord, BrowseMode, CityRecord, MatchTier, SelectItem, Selection, SelectionModel,
    StoreBusinessesRecord, ZoneRecord,
};
use storemap_hierarchy::{aggregate, summarize};

fn feeds(
    cities: serde_json::Value,
    areas: serde_json::Value,
    zones: serde_json::Value,
) -> (Vec<CityRecord>, Vec<AreaRecord>, Vec<ZoneRecord>) {
    (
        serde_json::from_value(cities).unwrap(),
        serde_json::from_value(areas).unwrap(),
        serde_json::from_value(zones).unwrap(),
    )
}

fn pristina_feeds() -> (Vec<CityRecord>, Vec<AreaRecord>, Vec<ZoneRecord>) {
    feeds(
        json!([{ "code": 1, "name": "Pristina" }]),
        json!([{
            "code": "A1",
            "name": "Center",
            "cities": ["Pristina"],
            "departments": [{
                "code": "D1",
                "name": "Store A",
                "sqm": 500,
                "lon": 21.1,
                "lat": 42.6,
                "city": "Pristina"
            }]
        }]),
        json!([{
            "zoneCode": "Z1",
            "zoneName": "North",
            "departmentCode": "D1",
            "sqm": 500,
            "lon": 21.1,
            "lat": 42.6
        }]),
    )
}

#[test]
fn pristina_center_north_rollup() {
    let (cities, areas, zones) = pristina_feeds();
    let hierarchy = aggregate(&cities, &areas, &zones);

    let city = serde_json::to_value(&hierarchy.cities).unwrap();
    assert_eq!(city[0]["code"], "1");
    assert_eq!(city[0]["store_count"], 1);
    assert_eq!(city[0]["total_sqm"], 500.0);
    assert_eq!(city[0]["geocoded_count"], 1);

    assert_eq!(hierarchy.areas.len(), 1);
    assert_eq!(hierarchy.areas[0].code.as_str(), "A1");
    assert_eq!(hierarchy.areas[0].metrics.store_count, 1);
    assert_eq!(hierarchy.areas[0].zone_names, vec!["North".to_string()]);

    assert_eq!(hierarchy.zones.len(), 1);
    assert_eq!(hierarchy.zones[0].code.as_str(), "Z1");
    assert_eq!(hierarchy.zones[0].metrics.store_count, 1);
}

#[test]
fn department_without_zone_record_is_absent_from_zone_names() {
    let (cities, areas, zones) = feeds(
        json!([{ "code": 1, "name": "Pristina" }]),
        json!([
            {
                "code": "A1",
                "name": "Center",
                "departments": [
                    { "code": "D1", "name": "Store A", "city": "Pristina" },
                    { "code": "D2", "name": "Store B", "city": "Pristina" }
                ]
            },
            {
                "code": "A2",
                "name": "Outskirts",
                "departments": [{ "code": "D3", "name": "Store C", "city": "Pristina" }]
            }
        ]),
        json!([{ "zoneCode": "Z1", "zoneName": "North", "departmentCode": "D1" }]),
    );
    let hierarchy = aggregate(&cities, &areas, &zones);

    let orphan = hierarchy.catalog.get("D3").unwrap();
    assert_eq!(orphan.zone_name, None);
    assert!(hierarchy.areas.iter().all(|a| a.zone_names.len() <= 1));
    let outskirts = hierarchy.find_area("Outskirts").unwrap();
    assert!(outskirts.zone_names.is_empty());
}

#[test]
fn catalog_never_repeats_a_code() {
    let (cities, areas, zones) = feeds(
        json!([{ "code": "1", "name": "Pristina" }, { "code": "2", "name": "Prizren" }]),
        json!([
            { "code": "A1", "name": "Center", "departments": [
                { "code": "D1", "city": "Pristina" },
                { "code": "D2", "city": "Pristina" },
                { "code": "D1", "city": "Prizren" }
            ]},
            { "code": "A2", "name": "South", "departments": [
                { "code": 2, "city": "Prizren" },
                { "code": "D2", "city": "Prizren" }
            ]}
        ]),
        json!([]),
    );
    let hierarchy = aggregate(&cities, &areas, &zones);

    let mut codes: Vec<&str> = hierarchy.catalog.iter().map(|s| s.code.as_str()).collect();
    let total = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), total);
    assert_eq!(total, 3);

    for area in &hierarchy.areas {
        let sqm: f64 = area.stores.iter().map(|s| s.sqm.unwrap_or(0.0)).sum();
        assert_eq!(area.metrics.store_count, area.stores.len());
        assert!((area.metrics.total_sqm - sqm).abs() < f64::EPSILON);
    }
}

#[test]
fn zone_selection_reaches_poi_through_area_tag() {
    let (cities, areas, zones) = feeds(
        json!([{ "code": 1, "name": "Pristina" }]),
        json!([{
            "code": "A1",
            "name": "Center",
            "cities": ["Pristina"],
            "departments": [{ "code": "D1", "city": "Pristina" }]
        }]),
        json!([{
            "zoneCode": "Z1",
            "zoneName": "North",
            "departmentCode": "D1",
            "city": "Pristina",
            "area": "Center"
        }]),
    );
    let hierarchy = aggregate(&cities, &areas, &zones);
    let feed: Vec<StoreBusinessesRecord> = serde_json::from_value(json!([{
        "store": { "code": "D1", "city": "", "area": "Center" },
        "businesses": [{ "id": "b1", "name": "Corner Shop", "category": "Grocery", "lat": 42.6, "lon": 21.1 }]
    }]))
    .unwrap();
    let pois = storemap_core::ingest_business_feed(&feed);

    let north = hierarchy.find_zone("north").unwrap();
    let mut model = SelectionModel::new(BrowseMode::Zone);
    let outcome = model.select(SelectItem::Zone(north));
    let targets = outcome.selection.targets();

    let poi = &pois[0];
    assert_eq!(poi.city, None);
    assert_eq!(
        targets.match_tier(poi.city.as_deref(), poi.area.as_deref(), poi.zone.as_deref()),
        Some(MatchTier::Area)
    );
}

#[test]
fn city_selection_summarizes_its_catalog_stores() {
    let (cities, areas, zones) = feeds(
        json!([{ "code": 1, "name": "Pristina" }, { "code": 2, "name": "Prizren" }]),
        json!([
            {
                "code": "A1",
                "name": "Center",
                "departments": [
                    { "code": "D1", "name": "Store A", "sqm": 500, "city": "Pristina" },
                    { "code": "D2", "name": "Store B", "sqm": 250, "city": "Prizren" }
                ]
            },
            {
                "code": "A2",
                "name": "Dardania",
                "departments": [{ "code": "D3", "name": "Store C", "sqm": 300, "city": "pristina" }]
            }
        ]),
        json!([]),
    );
    let hierarchy = aggregate(&cities, &areas, &zones);

    let stores = hierarchy.stores_for(&Selection::City {
        name: "Pristina".to_string(),
    });
    let mut codes: Vec<&str> = stores.iter().map(|s| s.code.as_str()).collect();
    codes.sort_unstable();
    assert_eq!(codes, vec!["D1", "D3"]);

    let summary = summarize(&stores, 3);
    assert_eq!(summary.store_count, 2);
}
