//! Reading feed files from disk and parsing selection arguments.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::de::DeserializeOwned;
use storemap_core::{AreaRecord, BrowseMode, CityRecord, ZoneRecord};

/// The three core feeds, as files in the backend's response format.
#[derive(Debug, Clone, Args)]
pub struct FeedArgs {
    /// City list (`api/cities` response)
    #[arg(long)]
    pub cities: PathBuf,
    /// Area-grouped departments (`api/areas` response)
    #[arg(long)]
    pub areas: PathBuf,
    /// Zone-tagged departments (`api/zones` response)
    #[arg(long)]
    pub zones: PathBuf,
}

pub struct CoreFeeds {
    pub cities: Vec<CityRecord>,
    pub areas: Vec<AreaRecord>,
    pub zones: Vec<ZoneRecord>,
}

impl FeedArgs {
    pub fn load(&self) -> anyhow::Result<CoreFeeds> {
        Ok(CoreFeeds {
            cities: read_collection(&self.cities)?,
            areas: read_collection(&self.areas)?,
            zones: read_collection(&self.zones)?,
        })
    }
}

pub fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read a bare array or `{ "data": [...] }` envelope from `path`.
pub fn read_collection<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let body = read_text(path)?;
    let records = storemap_client::parse_collection(&body, &path.display().to_string())?;
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectArg {
    pub mode: BrowseMode,
    pub name: String,
}

/// Parse `kind:NAME`, where kind is `city`, `area`, or `zone`.
pub fn parse_select(raw: &str) -> Result<SelectArg, String> {
    let (kind, name) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:NAME, got \"{raw}\""))?;
    let mode = kind.parse::<BrowseMode>().map_err(|e| e.to_string())?;
    if name.trim().is_empty() {
        return Err("selection name must not be empty".to_string());
    }
    Ok(SelectArg {
        mode,
        name: name.to_string(),
    })
}
