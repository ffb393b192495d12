//! `fetch` command: one refresh cycle against the configured backend.

use storemap_client::{fetch_snapshot, DashboardSnapshot, DataClient, RefreshGate};
use storemap_core::{load_map_style_or_default, Selection};
use storemap_hierarchy::summarize;

/// # Errors
///
/// Returns an error if configuration is missing or invalid, or a core
/// dataset cannot be fetched.
pub(crate) async fn run_fetch(json: bool) -> anyhow::Result<()> {
    let config = storemap_core::load_app_config()?;
    let style = load_map_style_or_default(&config.map_style_path)?;
    let client = DataClient::from_config(&config)?;

    let gate = RefreshGate::new();
    let snapshot = fetch_snapshot(&client, gate.begin(), &style.boundary_name_keys).await?;

    let report = fetch_report(&snapshot, style.top_formats);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub(crate) fn fetch_report(snapshot: &DashboardSnapshot, top_n: usize) -> serde_json::Value {
    let stores = snapshot.hierarchy.stores_for(&Selection::None);
    serde_json::json!({
        "refreshed_at": snapshot.refreshed_at,
        "cities": snapshot.hierarchy.cities.len(),
        "areas": snapshot.hierarchy.areas.len(),
        "zones": snapshot.hierarchy.zones.len(),
        "businesses": snapshot.businesses.as_ref().map(Vec::len),
        "boundaries": snapshot.boundaries.as_ref().map(|b| b.len()),
        "summary": summarize(&stores, top_n),
    })
}

fn print_report(report: &serde_json::Value) {
    let count = |key: &str| {
        report[key]
            .as_u64()
            .map_or_else(|| "unavailable".to_string(), |n| n.to_string())
    };
    println!("refreshed at {}", report["refreshed_at"].as_str().unwrap_or_default());
    println!("cities:     {}", count("cities"));
    println!("areas:      {}", count("areas"));
    println!("zones:      {}", count("zones"));
    println!("businesses: {}", count("businesses"));
    println!("boundaries: {}", count("boundaries"));

    let summary = &report["summary"];
    println!();
    println!(
        "{} stores, {} sqm, {}% geocoded",
        summary["store_count"], summary["total_sqm"], summary["geocoded_pct"]
    );
    if let Some(formats) = summary["top_formats"].as_array() {
        for entry in formats {
            println!(
                "  {:<20}{}",
                entry["format"].as_str().unwrap_or_default(),
                entry["count"]
            );
        }
    }
}
