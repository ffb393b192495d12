//! The current map selection and the browsing level it lives under.
//!
//! Browsing level and selection are orthogonal: switching the level always
//! clears the selection, while selecting never changes the level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{Area, City, Zone};
use crate::normalize::NameSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowseMode {
    #[default]
    City,
    Area,
    Zone,
}

impl std::fmt::Display for BrowseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowseMode::City => write!(f, "city"),
            BrowseMode::Area => write!(f, "area"),
            BrowseMode::Zone => write!(f, "zone"),
        }
    }
}

impl std::str::FromStr for BrowseMode {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city" => Ok(BrowseMode::City),
            "area" => Ok(BrowseMode::Area),
            "zone" | "region" => Ok(BrowseMode::Zone),
            other => Err(SelectionError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown browse mode \"{0}\"; expected city, area, or zone")]
    UnknownMode(String),

    #[error("no {mode} named \"{name}\"")]
    UnknownName { mode: BrowseMode, name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    City {
        name: String,
    },
    Area {
        name: String,
        cities: Vec<String>,
    },
    Zone {
        name: String,
        cities: Vec<String>,
        areas: Vec<String>,
    },
}

impl Selection {
    #[must_use]
    pub fn for_city(city: &City) -> Self {
        Selection::City {
            name: city.name.clone(),
        }
    }

    #[must_use]
    pub fn for_area(area: &Area) -> Self {
        Selection::Area {
            name: area.name.clone(),
            cities: area.cities.clone(),
        }
    }

    #[must_use]
    pub fn for_zone(zone: &Zone) -> Self {
        Selection::Zone {
            name: zone.name.clone(),
            cities: zone.cities.clone(),
            areas: zone.areas.clone(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Selection::None)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::City { name }
            | Selection::Area { name, .. }
            | Selection::Zone { name, .. } => Some(name),
        }
    }

    #[must_use]
    pub fn mode(&self) -> Option<BrowseMode> {
        match self {
            Selection::None => None,
            Selection::City { .. } => Some(BrowseMode::City),
            Selection::Area { .. } => Some(BrowseMode::Area),
            Selection::Zone { .. } => Some(BrowseMode::Zone),
        }
    }

    /// Normalized name sets the map engine matches against.
    #[must_use]
    pub fn targets(&self) -> SelectionTargets {
        match self {
            Selection::None => SelectionTargets::default(),
            Selection::City { name } => SelectionTargets {
                cities: NameSet::from_names([name]),
                ..SelectionTargets::default()
            },
            Selection::Area { name, cities } => SelectionTargets {
                areas: NameSet::from_names([name]),
                cities: NameSet::from_names(cities),
                ..SelectionTargets::default()
            },
            Selection::Zone {
                name,
                cities,
                areas,
            } => SelectionTargets {
                zones: NameSet::from_names([name]),
                areas: NameSet::from_names(areas),
                cities: NameSet::from_names(cities),
            },
        }
    }
}

/// Which tag of an entity satisfied a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Zone,
    Area,
    City,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTargets {
    pub zones: NameSet,
    pub areas: NameSet,
    pub cities: NameSet,
}

impl SelectionTargets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.areas.is_empty() && self.cities.is_empty()
    }

    /// Match an entity's tags, broadest first: a zone match wins regardless
    /// of the city/area tags, then area, then city. An entity whose own city
    /// tag is missing or stale is still caught by a broader match.
    #[must_use]
    pub fn match_tier(
        &self,
        city: Option<&str>,
        area: Option<&str>,
        zone: Option<&str>,
    ) -> Option<MatchTier> {
        if self.zones.contains(zone) {
            Some(MatchTier::Zone)
        } else if self.areas.contains(area) {
            Some(MatchTier::Area)
        } else if self.cities.contains(city) {
            Some(MatchTier::City)
        } else {
            None
        }
    }

    #[must_use]
    pub fn matches(&self, city: Option<&str>, area: Option<&str>, zone: Option<&str>) -> bool {
        self.match_tier(city, area, zone).is_some()
    }
}

/// Outward event raised when a city is picked; navigation reacts to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityChosen {
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOutcome {
    pub selection: Selection,
    pub city_chosen: Option<CityChosen>,
}

/// An entity a selection can be made from.
#[derive(Debug, Clone, Copy)]
pub enum SelectItem<'a> {
    City(&'a City),
    Area(&'a Area),
    Zone(&'a Zone),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    mode: BrowseMode,
    selection: Selection,
}

impl SelectionModel {
    #[must_use]
    pub fn new(mode: BrowseMode) -> Self {
        Self {
            mode,
            selection: Selection::None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> BrowseMode {
        self.mode
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Switch the browsing level. Always clears the selection, even when the
    /// level does not change.
    pub fn set_mode(&mut self, mode: BrowseMode) -> &Selection {
        self.mode = mode;
        self.clear()
    }

    pub fn select(&mut self, item: SelectItem<'_>) -> SelectOutcome {
        let (selection, city_chosen) = match item {
            SelectItem::City(city) => (
                Selection::for_city(city),
                Some(CityChosen {
                    city: city.name.clone(),
                }),
            ),
            SelectItem::Area(area) => (Selection::for_area(area), None),
            SelectItem::Zone(zone) => (Selection::for_zone(zone), None),
        };
        tracing::debug!(
            mode = ?selection.mode(),
            name = selection.name().unwrap_or_default(),
            "selection changed"
        );
        self.selection = selection;
        SelectOutcome {
            selection: self.selection.clone(),
            city_chosen,
        }
    }

    /// The explicit "back" action.
    pub fn clear(&mut self) -> &Selection {
        self.selection = Selection::None;
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Metrics;
    use crate::ids::ExternalId;

    fn city(name: &str) -> City {
        City {
            code: ExternalId::Provided("1".to_string()),
            name: name.to_string(),
            metrics: Metrics::default(),
            area_count: 0,
        }
    }

    fn zone(name: &str, cities: &[&str], areas: &[&str]) -> Zone {
        Zone {
            code: ExternalId::Provided("Z1".to_string()),
            name: name.to_string(),
            cities: cities.iter().map(|s| (*s).to_string()).collect(),
            areas: areas.iter().map(|s| (*s).to_string()).collect(),
            regions: vec![],
            stores: vec![],
            metrics: Metrics::default(),
        }
    }

    #[test]
    fn select_clear_select_is_identical() {
        let pristina = city("Pristina");
        let mut model = SelectionModel::new(BrowseMode::City);
        let first = model.select(SelectItem::City(&pristina));
        model.clear();
        let second = model.select(SelectItem::City(&pristina));
        assert_eq!(first, second);
        assert_eq!(
            first.city_chosen,
            Some(CityChosen {
                city: "Pristina".to_string()
            })
        );
    }

    #[test]
    fn zone_selection_raises_no_city_event() {
        let north = zone("North", &["Pristina"], &["Center"]);
        let mut model = SelectionModel::new(BrowseMode::Zone);
        let outcome = model.select(SelectItem::Zone(&north));
        assert!(outcome.city_chosen.is_none());
        assert!(model.selection().is_active());
    }

    #[test]
    fn changing_mode_always_clears() {
        let north = zone("North", &["Pristina"], &["Center"]);
        let mut model = SelectionModel::new(BrowseMode::Zone);
        model.select(SelectItem::Zone(&north));
        assert_eq!(model.set_mode(BrowseMode::Zone), &Selection::None);

        model.select(SelectItem::Zone(&north));
        model.set_mode(BrowseMode::Area);
        assert_eq!(model.mode(), BrowseMode::Area);
        assert!(!model.selection().is_active());
    }

    #[test]
    fn city_targets_match_case_and_whitespace_insensitively() {
        let selection = Selection::City {
            name: " PRISTINA ".to_string(),
        };
        let targets = selection.targets();
        assert_eq!(
            targets.match_tier(Some("Pristina"), None, None),
            Some(MatchTier::City)
        );
        assert!(!targets.matches(Some("Prizren"), None, None));
    }

    #[test]
    fn zone_match_beats_area_and_city() {
        let targets = Selection::for_zone(&zone("North", &["Pristina"], &["Center"])).targets();
        assert_eq!(
            targets.match_tier(Some("Elsewhere"), Some("Elsewhere"), Some("north")),
            Some(MatchTier::Zone)
        );
        assert_eq!(
            targets.match_tier(Some("Pristina"), Some("Center"), None),
            Some(MatchTier::Area)
        );
    }

    #[test]
    fn area_match_supersedes_missing_city_tag() {
        let targets = Selection::for_zone(&zone("North", &["Pristina"], &["Center"])).targets();
        assert_eq!(
            targets.match_tier(Some(""), Some("Center"), None),
            Some(MatchTier::Area)
        );
    }

    #[test]
    fn no_selection_matches_nothing() {
        let targets = Selection::None.targets();
        assert!(targets.is_empty());
        assert!(!targets.matches(Some("Pristina"), Some("Center"), Some("North")));
    }

    #[test]
    fn browse_mode_parses_region_as_zone() {
        assert_eq!("Region".parse::<BrowseMode>().unwrap(), BrowseMode::Zone);
        assert!(matches!(
            "district".parse::<BrowseMode>(),
            Err(SelectionError::UnknownMode(_))
        ));
    }

    #[test]
    fn selection_serializes_with_kind_tag() {
        let json = serde_json::to_value(Selection::City {
            name: "Pristina".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "city");
        assert_eq!(json["name"], "Pristina");
    }
}
