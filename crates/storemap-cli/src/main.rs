mod aggregate;
mod feeds;
mod fetch;
mod plan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::feeds::{FeedArgs, SelectArg};

#[derive(Debug, Parser)]
#[command(name = "storemap-cli")]
#[command(about = "Retail store map dashboard tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Aggregate local feed files into city, area, and zone tables
    Aggregate {
        #[command(flatten)]
        feeds: FeedArgs,
        /// Print the hierarchy as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Compute the render plan for a selection over local feed files
    Plan {
        #[command(flatten)]
        feeds: FeedArgs,
        /// Boundary GeoJSON FeatureCollection
        #[arg(long)]
        boundaries: Option<PathBuf>,
        /// Store-with-businesses feed
        #[arg(long)]
        businesses: Option<PathBuf>,
        /// Selection as `city:NAME`, `area:NAME`, or `zone:NAME`
        #[arg(long, value_parser = feeds::parse_select)]
        select: Option<SelectArg>,
        /// Map zoom level (defaults to the configured home zoom)
        #[arg(long)]
        zoom: Option<f64>,
        /// Business category to show (`all` for every category)
        #[arg(long)]
        category: Option<String>,
        /// Map style YAML (defaults to built-in style)
        #[arg(long)]
        style: Option<PathBuf>,
    },
    /// Run one refresh against the configured backend and print a summary
    Fetch {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Aggregate { feeds, json }) => aggregate::run_aggregate(&feeds, json)?,
        Some(Commands::Plan {
            feeds,
            boundaries,
            businesses,
            select,
            zoom,
            category,
            style,
        }) => plan::run_plan(&plan::PlanArgs {
            feeds,
            boundaries,
            businesses,
            select,
            zoom,
            category,
            style,
        })?,
        Some(Commands::Fetch { json }) => fetch::run_fetch(json).await?,
        None => println!("storemap-cli: use --help to list commands"),
    }

    Ok(())
}
