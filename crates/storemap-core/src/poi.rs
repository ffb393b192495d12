//! Nearby third-party businesses used for competitive-density analysis.

use std::collections::HashSet;

use serde::Serialize;

use crate::records::StoreBusinessesRecord;

pub const OTHER_CATEGORY: &str = "other";

/// A business near one of our stores. The area/city/zone tags are copied
/// from that store at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessPoi {
    pub id: String,
    pub name: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub zone: Option<String>,
}

/// Flatten the store + nearby-business feed into POIs.
///
/// Categories are lower-cased with blanks mapped to `"other"`. Businesses
/// without both coordinates are skipped. A business listed near several
/// stores keeps the tags of the first store that lists it. Businesses with
/// no id are keyed by their position in the feed.
#[must_use]
pub fn ingest_business_feed(records: &[StoreBusinessesRecord]) -> Vec<BusinessPoi> {
    let mut seen = HashSet::new();
    let mut pois = Vec::new();
    let mut skipped = 0usize;

    for (store_idx, record) in records.iter().enumerate() {
        let store = &record.store;
        for (biz_idx, business) in record.businesses.iter().enumerate() {
            let (Some(latitude), Some(longitude)) = (business.latitude, business.longitude) else {
                skipped += 1;
                continue;
            };

            let id = business
                .id
                .clone()
                .unwrap_or_else(|| format!("poi-{store_idx}-{biz_idx}"));
            if !seen.insert(id.clone()) {
                continue;
            }

            let category = business
                .category
                .as_deref()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| OTHER_CATEGORY.to_string());

            pois.push(BusinessPoi {
                id,
                name: clean(business.name.as_deref()).unwrap_or_default(),
                category,
                latitude,
                longitude,
                address: clean(business.address.as_deref()),
                area: clean(store.area.as_deref()),
                city: clean(store.city.as_deref()),
                zone: clean(store.zone.as_deref()),
            });
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped businesses without coordinates");
    }

    pois
}

fn clean(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}
