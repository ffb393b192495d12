//! `plan` command: compute a render plan offline from feed files.

use std::path::PathBuf;

use storemap_core::{
    ingest_business_feed, load_map_style, MapStyleConfig, SelectionModel, StoreBusinessesRecord,
};
use storemap_hierarchy::aggregate;
use storemap_map::{BoundaryLayer, MapFilterEngine, PlanInputs, RenderPlan};

use crate::feeds::{read_collection, read_text, FeedArgs, SelectArg};

pub(crate) struct PlanArgs {
    pub feeds: FeedArgs,
    pub boundaries: Option<PathBuf>,
    pub businesses: Option<PathBuf>,
    pub select: Option<SelectArg>,
    pub zoom: Option<f64>,
    pub category: Option<String>,
    pub style: Option<PathBuf>,
}

/// Compute and print the plan as JSON.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed, the selection
/// names nothing in the hierarchy, or the category is not offered for it.
pub(crate) fn run_plan(args: &PlanArgs) -> anyhow::Result<()> {
    let plan = compute_plan(args)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

pub(crate) fn compute_plan(args: &PlanArgs) -> anyhow::Result<RenderPlan> {
    let style = match &args.style {
        Some(path) => load_map_style(path)?,
        None => MapStyleConfig::default(),
    };
    let feeds = args.feeds.load()?;
    let hierarchy = aggregate(&feeds.cities, &feeds.areas, &feeds.zones);

    let boundaries = args
        .boundaries
        .as_deref()
        .map(|path| -> anyhow::Result<BoundaryLayer> {
            Ok(BoundaryLayer::parse(&read_text(path)?, &style.boundary_name_keys)?)
        })
        .transpose()?;
    let businesses = match &args.businesses {
        Some(path) => ingest_business_feed(&read_collection::<StoreBusinessesRecord>(path)?),
        None => Vec::new(),
    };

    let mut model = SelectionModel::default();
    if let Some(select) = &args.select {
        let item = hierarchy.resolve(select.mode, &select.name)?;
        model.select(item);
    }

    let zoom = args.zoom.unwrap_or(style.home.zoom);
    let mut engine = MapFilterEngine::new(style);
    let inputs = PlanInputs {
        selection: model.selection(),
        catalog: &hierarchy.catalog,
        businesses: &businesses,
        boundaries: boundaries.as_ref(),
        zoom,
    };
    let mut plan = engine.compute_render_plan(&inputs);

    // A category can only be chosen once the offered set is known, so the
    // plan is computed again with the choice applied.
    if let Some(category) = &args.category {
        engine.set_category(category)?;
        let viewport = plan.viewport;
        plan = engine.compute_render_plan(&inputs);
        plan.viewport = viewport;
    }
    Ok(plan)
}
