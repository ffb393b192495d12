//! Selection-driven map rendering.
//!
//! [`MapFilterEngine`] turns the current selection, store catalog, POIs, and
//! zoom into a [`RenderPlan`]; [`ViewportController`] is the only thing that
//! touches the render surface, applying plans once the surface is ready.

pub mod boundary;
pub mod category;
pub mod expression;
pub mod features;
pub mod plan;
pub mod viewport;

pub use boundary::{BoundaryError, BoundaryLayer, Bounds, MATCH_NAME_PROPERTY};
pub use category::{CategoryError, CategoryFilter, CategoryRestriction, CategoryState, ALL_CATEGORIES};
pub use features::MapSources;
pub use plan::{
    BoundaryPaint, MapFilterEngine, PlanInputs, RenderPlan, StorePaint, ViewportTarget,
};
pub use viewport::{
    layers, ApplyOutcome, CameraMove, LayerState, LayerStateSurface, LayerSurface,
    ViewportController,
};
