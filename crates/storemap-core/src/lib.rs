//! Domain types, configuration, and name handling shared by every storemap
//! crate.

pub mod app_config;
pub mod config;
pub mod entities;
pub mod ids;
pub mod map_style;
pub mod normalize;
pub mod poi;
pub mod records;
pub mod selection;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entities::{Area, City, LngLat, Metrics, Store, Zone};
pub use ids::ExternalId;
pub use map_style::{load_map_style, load_map_style_or_default, MapStyleConfig};
pub use normalize::{collation_key, compare_names, normalize_name, NameSet};
pub use poi::{ingest_business_feed, BusinessPoi};
pub use records::{
    AreaRecord, BusinessRecord, CityRecord, DepartmentRecord, FeedStore, StoreBusinessesRecord,
    ZoneRecord,
};
pub use selection::{
    BrowseMode, CityChosen, MatchTier, SelectItem, SelectOutcome, Selection, SelectionError,
    SelectionModel, SelectionTargets,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read map style file {path}: {source}")]
    MapStyleIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse map style file: {0}")]
    MapStyleParse(#[source] serde_yaml::Error),

    #[error("map style validation failed: {0}")]
    Validation(String),
}
