//! Map style configuration: zoom thresholds, home viewport, and layer colors.
//!
//! Loaded from YAML. Every field has a default so a partial file only needs
//! to name what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyleConfig {
    /// Labels never show below this zoom.
    pub label_min_zoom: f64,
    /// At or above this zoom the POI category filter is bypassed and labels
    /// show even without a selection.
    pub close_zoom: f64,
    pub home: HomeView,
    pub fit: FitOptions,
    /// Category picked automatically when present in the relevant set.
    pub preferred_category: String,
    /// Number of store formats reported in the selection summary.
    pub top_formats: usize,
    /// Feature property names tried, in order, to read a boundary's name.
    pub boundary_name_keys: Vec<String>,
    pub boundary: BoundaryStyle,
    pub stores: StoreStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeView {
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub padding: u32,
    pub max_zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryStyle {
    pub fill_color: String,
    pub highlight_color: String,
    pub fill_opacity: f64,
    pub highlight_opacity: f64,
    pub dimmed_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreStyle {
    pub color: String,
    pub highlight_color: String,
    pub opacity: f64,
    pub dimmed_opacity: f64,
    pub radius: f64,
    pub highlight_radius: f64,
}

impl Default for MapStyleConfig {
    fn default() -> Self {
        Self {
            label_min_zoom: 9.0,
            close_zoom: 14.5,
            home: HomeView {
                center: [20.9, 42.6],
                zoom: 8.0,
            },
            fit: FitOptions {
                padding: 40,
                max_zoom: 13.0,
            },
            preferred_category: "supermarket".to_string(),
            top_formats: 5,
            boundary_name_keys: vec![
                "name".to_string(),
                "NAME".to_string(),
                "shapeName".to_string(),
                "municipality".to_string(),
            ],
            boundary: BoundaryStyle::default(),
            stores: StoreStyle::default(),
        }
    }
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            fill_color: "#cbd5e1".to_string(),
            highlight_color: "#2563eb".to_string(),
            fill_opacity: 0.25,
            highlight_opacity: 0.45,
            dimmed_opacity: 0.08,
        }
    }
}

impl Default for StoreStyle {
    fn default() -> Self {
        Self {
            color: "#0f766e".to_string(),
            highlight_color: "#dc2626".to_string(),
            opacity: 0.9,
            dimmed_opacity: 0.25,
            radius: 5.0,
            highlight_radius: 7.0,
        }
    }
}

/// Load and validate the map style from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_map_style(path: &Path) -> Result<MapStyleConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MapStyleIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_map_style(&content)
}

/// Like [`load_map_style`], but a missing file yields the built-in defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// validated.
pub fn load_map_style_or_default(path: &Path) -> Result<MapStyleConfig, ConfigError> {
    match load_map_style(path) {
        Err(ConfigError::MapStyleIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::warn!(
                path = %path.display(),
                "map style file not found; using built-in defaults"
            );
            Ok(MapStyleConfig::default())
        }
        other => other,
    }
}

/// Parse and validate a map style document.
///
/// # Errors
///
/// Returns [`ConfigError::MapStyleParse`] for malformed YAML and
/// [`ConfigError::Validation`] for out-of-range values.
pub fn parse_map_style(content: &str) -> Result<MapStyleConfig, ConfigError> {
    let style: MapStyleConfig =
        serde_yaml::from_str(content).map_err(ConfigError::MapStyleParse)?;
    validate_map_style(&style)?;
    Ok(style)
}

fn validate_map_style(style: &MapStyleConfig) -> Result<(), ConfigError> {
    let zooms = [
        ("label_min_zoom", style.label_min_zoom),
        ("close_zoom", style.close_zoom),
        ("home.zoom", style.home.zoom),
        ("fit.max_zoom", style.fit.max_zoom),
    ];
    for (field, zoom) in zooms {
        if !(0.0..=24.0).contains(&zoom) {
            return Err(ConfigError::Validation(format!(
                "{field} must be within 0..=24, got {zoom}"
            )));
        }
    }

    if style.close_zoom < style.label_min_zoom {
        return Err(ConfigError::Validation(format!(
            "close_zoom ({}) must not be below label_min_zoom ({})",
            style.close_zoom, style.label_min_zoom
        )));
    }

    let opacities = [
        ("boundary.fill_opacity", style.boundary.fill_opacity),
        ("boundary.highlight_opacity", style.boundary.highlight_opacity),
        ("boundary.dimmed_opacity", style.boundary.dimmed_opacity),
        ("stores.opacity", style.stores.opacity),
        ("stores.dimmed_opacity", style.stores.dimmed_opacity),
    ];
    for (field, opacity) in opacities {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ConfigError::Validation(format!(
                "{field} must be within 0..=1, got {opacity}"
            )));
        }
    }

    let [lng, lat] = style.home.center;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(ConfigError::Validation(format!(
            "home.center [{lng}, {lat}] is not a valid longitude/latitude pair"
        )));
    }

    if style.boundary_name_keys.iter().all(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "boundary_name_keys must name at least one property".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let style = parse_map_style("{}").unwrap();
        assert_eq!(style, MapStyleConfig::default());
        assert!((style.close_zoom - 14.5).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let style = parse_map_style(
            "close_zoom: 15.0\npreferred_category: pharmacy\nstores:\n  color: \"#000000\"\n",
        )
        .unwrap();
        assert!((style.close_zoom - 15.0).abs() < f64::EPSILON);
        assert_eq!(style.preferred_category, "pharmacy");
        assert_eq!(style.stores.color, "#000000");
        assert_eq!(style.stores.highlight_color, StoreStyle::default().highlight_color);
        assert!((style.label_min_zoom - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_zoom_below_label_zoom_is_rejected() {
        let err = parse_map_style("label_min_zoom: 12\nclose_zoom: 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("close_zoom")));
    }

    #[test]
    fn opacity_out_of_range_is_rejected() {
        let err = parse_map_style("boundary:\n  fill_opacity: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("fill_opacity")));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_map_style("close_zoom: [not, a, number]").unwrap_err();
        assert!(matches!(err, ConfigError::MapStyleParse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/storemap/map.yaml");
        let style = load_map_style_or_default(path).unwrap();
        assert_eq!(style, MapStyleConfig::default());
    }

    #[test]
    fn missing_file_is_an_error_for_strict_loader() {
        let path = Path::new("/nonexistent/storemap/map.yaml");
        assert!(matches!(
            load_map_style(path),
            Err(ConfigError::MapStyleIo { .. })
        ));
    }
}
