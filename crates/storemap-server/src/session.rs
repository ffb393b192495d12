//! The interactive dashboard session served over HTTP.
//!
//! One session per process: browsing level, selection, zoom, category
//! filter, and the controller that owns the layer state. Every mutation is
//! followed by [`Session::render`], so the applied layer state always
//! reflects the latest command.

use storemap_client::DashboardSnapshot;
use storemap_core::{BrowseMode, MapStyleConfig, SelectionModel};
use storemap_map::{
    ApplyOutcome, LayerStateSurface, MapFilterEngine, MapSources, PlanInputs, RenderPlan,
    ViewportController,
};

#[derive(Debug)]
pub struct Session {
    pub model: SelectionModel,
    pub engine: MapFilterEngine,
    pub zoom: f64,
    pub controller: ViewportController<LayerStateSurface>,
    /// Generation whose sources are loaded into the controller.
    loaded_generation: Option<u64>,
}

impl Session {
    #[must_use]
    pub fn new(style: MapStyleConfig) -> Self {
        let zoom = style.home.zoom;
        Self {
            model: SelectionModel::new(BrowseMode::default()),
            engine: MapFilterEngine::new(style),
            zoom,
            controller: ViewportController::new(LayerStateSurface::default()),
            loaded_generation: None,
        }
    }

    /// Compute the plan for the current session against `snapshot` and hand
    /// it to the controller. Sources are reloaded first when the snapshot is
    /// newer than the one last loaded.
    pub fn render(&mut self, snapshot: &DashboardSnapshot) -> (RenderPlan, ApplyOutcome) {
        if self.loaded_generation != Some(snapshot.generation) {
            self.controller.load_sources(MapSources::new(
                &snapshot.hierarchy.catalog,
                snapshot.boundaries.as_ref(),
            ));
            self.loaded_generation = Some(snapshot.generation);
            tracing::debug!(generation = snapshot.generation, "map sources loaded");
        }

        let plan = self.engine.compute_render_plan(&PlanInputs {
            selection: self.model.selection(),
            catalog: &snapshot.hierarchy.catalog,
            businesses: snapshot.businesses(),
            boundaries: snapshot.boundaries.as_ref(),
            zoom: self.zoom,
        });
        let outcome = self.controller.apply(plan.clone());
        (plan, outcome)
    }
}
