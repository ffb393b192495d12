//! `aggregate` command: roll local feed files up into the hierarchy.

use storemap_hierarchy::{aggregate, Hierarchy};

use crate::feeds::FeedArgs;

/// Load the feeds, aggregate them, and print the result.
///
/// # Errors
///
/// Returns an error if a feed file cannot be read or parsed.
pub(crate) fn run_aggregate(feeds: &FeedArgs, json: bool) -> anyhow::Result<()> {
    let loaded = feeds.load()?;
    let hierarchy = aggregate(&loaded.cities, &loaded.areas, &loaded.zones);
    tracing::info!(
        cities = hierarchy.cities.len(),
        areas = hierarchy.areas.len(),
        zones = hierarchy.zones.len(),
        stores = hierarchy.catalog.len(),
        "aggregated feeds"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&hierarchy_json(&hierarchy))?);
    } else {
        print_tables(&hierarchy);
    }
    Ok(())
}

pub(crate) fn hierarchy_json(hierarchy: &Hierarchy) -> serde_json::Value {
    serde_json::json!({
        "cities": hierarchy.cities,
        "areas": hierarchy.areas,
        "zones": hierarchy.zones,
        "store_count": hierarchy.catalog.len(),
    })
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        format!("{}...", name.chars().take(width - 3).collect::<String>())
    } else {
        name.to_string()
    }
}

fn print_tables(hierarchy: &Hierarchy) {
    println!("CITIES");
    println!(
        "{:<16}{:<24}{:>8}{:>12}{:>10}{:>7}",
        "CODE", "NAME", "STORES", "SQM", "GEOCODED", "AREAS"
    );
    for city in &hierarchy.cities {
        println!(
            "{:<16}{:<24}{:>8}{:>12.0}{:>10}{:>7}",
            truncate(city.code.as_str(), 15),
            truncate(&city.name, 23),
            city.metrics.store_count,
            city.metrics.total_sqm,
            city.metrics.geocoded_count,
            city.area_count
        );
    }

    println!();
    println!("AREAS");
    println!(
        "{:<16}{:<24}{:>8}{:>12}  ZONES",
        "CODE", "NAME", "STORES", "SQM"
    );
    for area in &hierarchy.areas {
        println!(
            "{:<16}{:<24}{:>8}{:>12.0}  {}",
            truncate(area.code.as_str(), 15),
            truncate(&area.name, 23),
            area.metrics.store_count,
            area.metrics.total_sqm,
            area.zone_names.join(", ")
        );
    }

    println!();
    println!("ZONES");
    println!(
        "{:<16}{:<24}{:>8}{:>12}  AREAS",
        "CODE", "NAME", "STORES", "SQM"
    );
    for zone in &hierarchy.zones {
        println!(
            "{:<16}{:<24}{:>8}{:>12.0}  {}",
            truncate(zone.code.as_str(), 15),
            truncate(&zone.name, 23),
            zone.metrics.store_count,
            zone.metrics.total_sqm,
            zone.areas.join(", ")
        );
    }
}
