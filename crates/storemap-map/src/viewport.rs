//! The single owner of the render surface.
//!
//! All layer mutation goes through [`ViewportController`]: plans computed
//! elsewhere are applied here, or held until the surface reports ready.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::boundary::Bounds;
use crate::features::{businesses_feature_collection, MapSources};
use crate::plan::{RenderPlan, ViewportTarget};

/// Layer and source ids on the render surface.
pub mod layers {
    pub const BOUNDARIES_SOURCE: &str = "boundaries";
    pub const STORES_SOURCE: &str = "stores";
    pub const BUSINESSES_SOURCE: &str = "businesses";

    pub const BOUNDARIES_FILL: &str = "boundaries-fill";
    pub const BOUNDARIES_HIGHLIGHT: &str = "boundaries-highlight";
    pub const STORES_CLUSTERS: &str = "stores-clusters";
    pub const STORES_CLUSTER_COUNT: &str = "stores-cluster-count";
    pub const STORES_BASE: &str = "stores-base";
    pub const STORES_HIGHLIGHT: &str = "stores-highlight";
    pub const STORES_LABELS: &str = "stores-labels";
    pub const BUSINESSES: &str = "businesses";
}

/// Operations a map surface exposes: addressable layers with filters and
/// paint properties, replaceable sources, and a camera.
pub trait LayerSurface {
    fn set_filter(&mut self, layer: &str, filter: &Value);
    fn set_paint(&mut self, layer: &str, property: &str, value: &Value);
    fn set_visibility(&mut self, layer: &str, visible: bool);
    fn set_source_data(&mut self, source: &str, data: &Value);
    fn fit_bounds(&mut self, bounds: Bounds, padding: u32, max_zoom: f64);
    fn ease_to(&mut self, center: [f64; 2], zoom: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The surface is not ready; the plan replaced any earlier queued one.
    Queued,
    /// Identical to what is already on the surface.
    Unchanged,
}

#[derive(Debug)]
pub struct ViewportController<S> {
    surface: S,
    ready: bool,
    queued: Option<RenderPlan>,
    last_applied: Option<RenderPlan>,
    sources: Option<MapSources>,
    sources_pending: bool,
}

impl<S: LayerSurface> ViewportController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            ready: false,
            queued: None,
            last_applied: None,
            sources: None,
            sources_pending: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn queued(&self) -> Option<&RenderPlan> {
        self.queued.as_ref()
    }

    pub fn last_applied(&self) -> Option<&RenderPlan> {
        self.last_applied.as_ref()
    }

    /// Apply a plan now, or queue it when the surface is not ready.
    ///
    /// Only one plan is ever queued. A pending camera move carries over when
    /// a later plan that does not move the camera replaces it.
    pub fn apply(&mut self, mut plan: RenderPlan) -> ApplyOutcome {
        if !self.ready {
            if plan.viewport == ViewportTarget::Unchanged {
                if let Some(queued) = self.queued.take() {
                    plan.viewport = queued.viewport;
                }
            }
            tracing::debug!("render surface not ready; plan queued");
            self.queued = Some(plan);
            return ApplyOutcome::Queued;
        }
        if self.last_applied.as_ref() == Some(&plan) {
            return ApplyOutcome::Unchanged;
        }
        self.write_plan(&plan);
        self.last_applied = Some(plan);
        ApplyOutcome::Applied
    }

    /// Replace the store and boundary sources. Written immediately when
    /// ready, otherwise on the next ready signal.
    pub fn load_sources(&mut self, sources: MapSources) -> ApplyOutcome {
        if self.sources.as_ref() == Some(&sources) && !self.sources_pending {
            return ApplyOutcome::Unchanged;
        }
        self.sources = Some(sources);
        self.sources_pending = true;
        if self.ready {
            self.flush_sources();
            ApplyOutcome::Applied
        } else {
            ApplyOutcome::Queued
        }
    }

    /// Record a readiness change.
    ///
    /// Becoming ready writes pending sources and replays the queued plan.
    /// Losing readiness (a style reload wipes layer state) re-queues what was
    /// on the surface, without its camera move, so the next ready signal
    /// restores it.
    pub fn set_ready(&mut self, ready: bool) -> ApplyOutcome {
        if ready == self.ready {
            return ApplyOutcome::Unchanged;
        }
        self.ready = ready;

        if !ready {
            if self.queued.is_none() {
                if let Some(mut plan) = self.last_applied.take() {
                    plan.viewport = ViewportTarget::Unchanged;
                    self.queued = Some(plan);
                }
            }
            self.last_applied = None;
            if self.sources.is_some() {
                self.sources_pending = true;
            }
            tracing::debug!("render surface lost readiness");
            return ApplyOutcome::Queued;
        }

        let flushed = self.flush_sources();
        match self.queued.take() {
            Some(plan) => {
                tracing::debug!("replaying queued plan");
                self.apply(plan)
            }
            None if flushed => ApplyOutcome::Applied,
            None => ApplyOutcome::Unchanged,
        }
    }

    fn flush_sources(&mut self) -> bool {
        if !self.sources_pending {
            return false;
        }
        if let Some(sources) = &self.sources {
            self.surface
                .set_source_data(layers::STORES_SOURCE, &sources.stores);
            if let Some(boundaries) = &sources.boundaries {
                self.surface
                    .set_source_data(layers::BOUNDARIES_SOURCE, boundaries);
            }
        }
        self.sources_pending = false;
        true
    }

    fn write_plan(&mut self, plan: &RenderPlan) {
        let s = &mut self.surface;

        s.set_paint(layers::BOUNDARIES_FILL, "fill-color", &plan.boundary.fill_color);
        s.set_paint(layers::BOUNDARIES_FILL, "fill-opacity", &plan.boundary.fill_opacity);
        s.set_filter(layers::BOUNDARIES_HIGHLIGHT, &plan.boundary.highlight_filter);

        s.set_visibility(layers::STORES_CLUSTERS, plan.clusters_visible);
        s.set_visibility(layers::STORES_CLUSTER_COUNT, plan.clusters_visible);

        s.set_filter(layers::STORES_BASE, &plan.stores.base_filter);
        s.set_paint(layers::STORES_BASE, "circle-color", &plan.stores.base_color);
        s.set_paint(layers::STORES_BASE, "circle-opacity", &plan.stores.base_opacity);
        s.set_paint(layers::STORES_BASE, "circle-radius", &plan.stores.base_radius);

        s.set_filter(layers::STORES_HIGHLIGHT, &plan.stores.highlight_filter);
        s.set_paint(layers::STORES_HIGHLIGHT, "circle-color", &plan.stores.highlight_color);
        s.set_paint(layers::STORES_HIGHLIGHT, "circle-radius", &plan.stores.highlight_radius);

        s.set_filter(layers::STORES_LABELS, &plan.stores.label_filter);
        s.set_visibility(layers::STORES_LABELS, plan.labels_visible);

        s.set_source_data(
            layers::BUSINESSES_SOURCE,
            &businesses_feature_collection(&plan.businesses),
        );
        s.set_visibility(layers::BUSINESSES, !plan.businesses.is_empty());

        match &plan.viewport {
            ViewportTarget::Unchanged => {}
            ViewportTarget::FitBounds {
                bounds,
                padding,
                max_zoom,
            } => s.fit_bounds(*bounds, *padding, *max_zoom),
            ViewportTarget::Home { center, zoom } => s.ease_to(*center, *zoom),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerState {
    pub filter: Option<Value>,
    pub paint: BTreeMap<String, Value>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraMove {
    FitBounds {
        bounds: Bounds,
        padding: u32,
        max_zoom: f64,
    },
    EaseTo {
        center: [f64; 2],
        zoom: f64,
    },
}

/// A surface that records what was written to it. Backs the HTTP service's
/// layer inspection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerStateSurface {
    pub layers: BTreeMap<String, LayerState>,
    /// Feature counts per source; the data itself is not retained.
    pub sources: BTreeMap<String, usize>,
    pub camera: Option<CameraMove>,
    pub camera_moves: usize,
    pub writes: usize,
}

impl LayerStateSurface {
    fn layer(&mut self, id: &str) -> &mut LayerState {
        self.writes += 1;
        self.layers.entry(id.to_string()).or_insert_with(|| LayerState {
            visible: true,
            ..LayerState::default()
        })
    }
}

impl LayerSurface for LayerStateSurface {
    fn set_filter(&mut self, layer: &str, filter: &Value) {
        self.layer(layer).filter = (!filter.is_null()).then(|| filter.clone());
    }

    fn set_paint(&mut self, layer: &str, property: &str, value: &Value) {
        self.layer(layer)
            .paint
            .insert(property.to_string(), value.clone());
    }

    fn set_visibility(&mut self, layer: &str, visible: bool) {
        self.layer(layer).visible = visible;
    }

    fn set_source_data(&mut self, source: &str, data: &Value) {
        self.writes += 1;
        let count = data["features"].as_array().map_or(0, Vec::len);
        self.sources.insert(source.to_string(), count);
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: u32, max_zoom: f64) {
        self.camera_moves += 1;
        self.camera = Some(CameraMove::FitBounds {
            bounds,
            padding,
            max_zoom,
        });
    }

    fn ease_to(&mut self, center: [f64; 2], zoom: f64) {
        self.camera_moves += 1;
        self.camera = Some(CameraMove::EaseTo { center, zoom });
    }
}

#[cfg(test)]
#[path = "viewport_test.rs"]
mod tests;
