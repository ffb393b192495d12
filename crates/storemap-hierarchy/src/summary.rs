//! Headline numbers for the current selection's store set.

use std::collections::HashMap;

use serde::Serialize;
use storemap_core::{compare_names, Store};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatCount {
    pub format: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub store_count: usize,
    pub total_sqm: f64,
    /// Share of stores with both coordinates, 0–100 with one decimal.
    pub geocoded_pct: f64,
    pub top_formats: Vec<FormatCount>,
}

/// Summarize a store set. Blank formats are not counted; format ties are
/// broken by name.
#[must_use]
pub fn summarize(stores: &[&Store], top_n: usize) -> SelectionSummary {
    let store_count = stores.len();
    let total_sqm: f64 = stores.iter().filter_map(|s| s.sqm).sum();
    let geocoded = stores.iter().filter(|s| s.is_geocoded()).count();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for format in stores.iter().filter_map(|s| s.format.as_deref()) {
        let format = format.trim();
        if !format.is_empty() {
            *counts.entry(format).or_default() += 1;
        }
    }
    let mut top_formats: Vec<FormatCount> = counts
        .into_iter()
        .map(|(format, count)| FormatCount {
            format: format.to_string(),
            count,
        })
        .collect();
    top_formats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| compare_names(&a.format, &b.format))
    });
    top_formats.truncate(top_n);

    SelectionSummary {
        store_count,
        total_sqm,
        geocoded_pct: percentage(geocoded, store_count),
        top_formats,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let pct = part as f64 / whole as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use storemap_core::{ExternalId, LngLat};

    use super::*;

    fn store(code: &str, sqm: Option<f64>, geocoded: bool, format: Option<&str>) -> Store {
        Store {
            code: ExternalId::Provided(code.to_string()),
            name: code.to_string(),
            sqm,
            location: geocoded.then_some(LngLat {
                longitude: 21.1,
                latitude: 42.6,
            }),
            address: None,
            format: format.map(str::to_string),
            city: None,
            area: None,
            zone_code: code.to_string(),
            zone_name: None,
            region: None,
        }
    }

    #[test]
    fn empty_set_is_all_zero() {
        let summary = summarize(&[], 5);
        assert_eq!(summary.store_count, 0);
        assert!(summary.total_sqm.abs() < f64::EPSILON);
        assert!(summary.geocoded_pct.abs() < f64::EPSILON);
        assert!(summary.top_formats.is_empty());
    }

    #[test]
    fn geocoded_share_rounds_to_one_decimal() {
        let stores = [
            store("1", Some(100.0), true, None),
            store("2", None, false, None),
            store("3", Some(50.0), false, None),
        ];
        let refs: Vec<&Store> = stores.iter().collect();
        let summary = summarize(&refs, 5);
        assert!((summary.geocoded_pct - 33.3).abs() < 1e-9);
        assert!((summary.total_sqm - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn top_formats_rank_by_count_then_name() {
        let stores = [
            store("1", None, false, Some("Express")),
            store("2", None, false, Some("Hyper")),
            store("3", None, false, Some("Hyper")),
            store("4", None, false, Some("City")),
            store("5", None, false, Some("  ")),
            store("6", None, false, None),
        ];
        let refs: Vec<&Store> = stores.iter().collect();
        let summary = summarize(&refs, 2);
        assert_eq!(
            summary.top_formats,
            vec![
                FormatCount {
                    format: "Hyper".to_string(),
                    count: 2
                },
                FormatCount {
                    format: "City".to_string(),
                    count: 1
                },
            ]
        );
    }
}
