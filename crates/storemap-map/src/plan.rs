//! Render plan computation.
//!
//! A [`RenderPlan`] is a pure description of every layer property the map
//! needs for one (selection, data, zoom, category) state. Nothing here
//! touches the surface; see [`crate::viewport`].

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{json, Value};
use storemap_core::{BusinessPoi, MapStyleConfig, NameSet, Selection, SelectionTargets};
use storemap_hierarchy::StoreCatalog;

use crate::boundary::{BoundaryLayer, Bounds, MATCH_NAME_PROPERTY};
use crate::category::{CategoryError, CategoryFilter, CategoryRestriction, CategoryState};
use crate::expression;

/// Where the camera should go, if anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportTarget {
    Unchanged,
    FitBounds {
        bounds: Bounds,
        padding: u32,
        max_zoom: f64,
    },
    Home {
        center: [f64; 2],
        zoom: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryPaint {
    pub fill_color: Value,
    pub fill_opacity: Value,
    pub highlight_filter: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorePaint {
    pub base_filter: Value,
    pub base_color: Value,
    pub base_opacity: Value,
    pub base_radius: Value,
    pub highlight_filter: Value,
    pub highlight_color: Value,
    pub highlight_radius: Value,
    pub label_filter: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub boundary: BoundaryPaint,
    pub stores: StorePaint,
    pub clusters_visible: bool,
    pub labels_visible: bool,
    /// Categories among the POIs relevant to the selection, sorted.
    pub categories: Vec<String>,
    pub category_state: CategoryState,
    pub category: CategoryRestriction,
    pub businesses: Vec<BusinessPoi>,
    pub selected_store_count: usize,
    pub viewport: ViewportTarget,
}

/// Everything a plan is computed from, borrowed from the current snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub selection: &'a Selection,
    pub catalog: &'a StoreCatalog,
    pub businesses: &'a [BusinessPoi],
    pub boundaries: Option<&'a BoundaryLayer>,
    pub zoom: f64,
}

/// Holds the state that outlives a single plan: the category filter, the
/// selection the camera was last aimed at, and whether it moved.
#[derive(Debug, Clone)]
pub struct MapFilterEngine {
    style: MapStyleConfig,
    category: CategoryFilter,
    last_selection: Selection,
    camera_fitted: bool,
}

impl MapFilterEngine {
    #[must_use]
    pub fn new(style: MapStyleConfig) -> Self {
        let category = CategoryFilter::new(&style.preferred_category);
        Self {
            style,
            category,
            last_selection: Selection::None,
            camera_fitted: false,
        }
    }

    #[must_use]
    pub fn style(&self) -> &MapStyleConfig {
        &self.style
    }

    #[must_use]
    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Explicit category choice from the user.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError`] when the category is not offered for the
    /// current selection.
    pub fn set_category(&mut self, category: &str) -> Result<(), CategoryError> {
        self.category.set_category(category)
    }

    /// Compute the plan for `inputs`.
    ///
    /// Lookups that find nothing (an unknown name, no boundary document, no
    /// matching stores) produce filters that match nothing rather than
    /// errors. The viewport is retargeted only when the selection differs
    /// from the previous call.
    pub fn compute_render_plan(&mut self, inputs: &PlanInputs<'_>) -> RenderPlan {
        let selection = inputs.selection;
        let active = selection.is_active();
        let targets = selection.targets();

        let selected_codes: Vec<String> = if active {
            inputs
                .catalog
                .matching(&targets)
                .map(|store| store.code.as_str().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let boundary_names = boundary_names(&targets);
        let boundary = self.boundary_paint(active, &boundary_names);
        let stores = self.store_paint(active, &selected_codes);

        let relevant: Vec<&BusinessPoi> = inputs
            .businesses
            .iter()
            .filter(|poi| {
                !active
                    || targets.matches(poi.city.as_deref(), poi.area.as_deref(), poi.zone.as_deref())
            })
            .collect();
        let offered: BTreeSet<String> = relevant.iter().map(|poi| poi.category.clone()).collect();
        self.category.reconcile(&offered);
        let restriction = self.category.effective(inputs.zoom, self.style.close_zoom);
        let businesses: Vec<BusinessPoi> = relevant
            .into_iter()
            .filter(|poi| restriction.admits(&poi.category))
            .cloned()
            .collect();

        let viewport = self.viewport_target(selection, &boundary_names, inputs.boundaries);

        RenderPlan {
            boundary,
            stores,
            clusters_visible: !active,
            labels_visible: inputs.zoom >= self.style.label_min_zoom
                && (active || inputs.zoom > self.style.close_zoom),
            categories: offered.into_iter().collect(),
            category_state: self.category.state().clone(),
            category: restriction,
            businesses,
            selected_store_count: selected_codes.len(),
            viewport,
        }
    }

    fn boundary_paint(&self, active: bool, names: &NameSet) -> BoundaryPaint {
        let style = &self.style.boundary;
        if !active {
            return BoundaryPaint {
                fill_color: json!(style.fill_color),
                fill_opacity: json!(style.fill_opacity),
                highlight_filter: expression::never(),
            };
        }
        let member = expression::name_in(MATCH_NAME_PROPERTY, names);
        BoundaryPaint {
            fill_color: expression::case(
                member.clone(),
                json!(style.highlight_color),
                json!(style.fill_color),
            ),
            fill_opacity: expression::case(
                member.clone(),
                json!(style.highlight_opacity),
                json!(style.dimmed_opacity),
            ),
            highlight_filter: member,
        }
    }

    fn store_paint(&self, active: bool, selected_codes: &[String]) -> StorePaint {
        let style = &self.style.stores;
        if !active {
            return StorePaint {
                base_filter: expression::unclustered(),
                base_color: json!(style.color),
                base_opacity: json!(style.opacity),
                base_radius: json!(style.radius),
                highlight_filter: expression::never(),
                highlight_color: json!(style.highlight_color),
                highlight_radius: json!(style.highlight_radius),
                label_filter: expression::unclustered(),
            };
        }
        let member = expression::property_in("code", selected_codes.iter().cloned());
        let selected = expression::all(vec![expression::unclustered(), member.clone()]);
        StorePaint {
            base_filter: expression::all(vec![expression::unclustered(), expression::not(member)]),
            base_color: json!(style.color),
            base_opacity: json!(style.dimmed_opacity),
            base_radius: json!(style.radius),
            highlight_filter: selected.clone(),
            highlight_color: json!(style.highlight_color),
            highlight_radius: json!(style.highlight_radius),
            label_filter: selected,
        }
    }

    fn viewport_target(
        &mut self,
        selection: &Selection,
        names: &NameSet,
        boundaries: Option<&BoundaryLayer>,
    ) -> ViewportTarget {
        if *selection == self.last_selection {
            return ViewportTarget::Unchanged;
        }
        self.last_selection = selection.clone();

        if !selection.is_active() {
            if !self.camera_fitted {
                return ViewportTarget::Unchanged;
            }
            self.camera_fitted = false;
            return ViewportTarget::Home {
                center: self.style.home.center,
                zoom: self.style.home.zoom,
            };
        }

        match boundaries.and_then(|layer| layer.bounds_for(names)) {
            Some(bounds) => {
                self.camera_fitted = true;
                ViewportTarget::FitBounds {
                    bounds,
                    padding: self.style.fit.padding,
                    max_zoom: self.style.fit.max_zoom,
                }
            }
            None => {
                tracing::debug!(
                    selection = selection.name().unwrap_or_default(),
                    "no boundary matches selection; camera stays"
                );
                ViewportTarget::Unchanged
            }
        }
    }
}

/// Names boundary features are matched against: every level the selection
/// names, so documents keyed by municipality, area, or zone all highlight.
fn boundary_names(targets: &SelectionTargets) -> NameSet {
    NameSet::from_names(
        targets
            .cities
            .iter()
            .chain(targets.areas.iter())
            .chain(targets.zones.iter()),
    )
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
