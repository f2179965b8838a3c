use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Args;
use humantime::format_duration;
use muniloc_core::{
    index::IndexKind, input::open_source, LoadReport, Locator, LocatorConfig, PolygonStore,
};
use tracing::{info, warn};

pub mod batch;
pub mod coordinates;
pub mod info;
pub mod locate;
pub mod shell;

/// Where to load regions from and how to index them
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// The polygon source (.shp, .geojson, or .json)
    #[arg(long, global = true, default_value = "data/BR_Municipios_2024.shp")]
    pub source: PathBuf,

    /// A TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The spatial index to build (grid, rtree, or linear)
    #[arg(long, global = true)]
    pub index: Option<IndexKind>,

    /// Number of regions a grid index aims to store per cell
    #[arg(long, global = true)]
    pub target_per_cell: Option<usize>,

    /// An attribute to report for a region. May be given more than once.
    /// The first one present wins.
    #[arg(long = "name-field", global = true)]
    pub name_fields: Vec<String>,
}

impl LoadArgs {
    /// Reads the configuration file (if any) and applies all overrides
    pub fn locator_config(&self) -> Result<LocatorConfig> {
        let mut config = match &self.config {
            Some(path) => LocatorConfig::from_path(path)?,
            None => LocatorConfig::default(),
        };
        if let Some(index) = self.index {
            config.index = index;
        }
        if let Some(target_per_cell) = self.target_per_cell {
            config.target_per_cell = target_per_cell;
        }
        if !self.name_fields.is_empty() {
            config.name_fields = self.name_fields.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// A locator ready for queries
pub struct Session {
    pub locator: Locator,
    pub report: LoadReport,
    pub elapsed: Duration,
}

/// Loads the source and builds the locator
pub fn load_locator(args: &LoadArgs) -> Result<Session> {
    let config = args.locator_config()?;
    let start = Instant::now();

    let mut source = open_source(&args.source)?;
    let loaded = PolygonStore::load(source.records())
        .with_context(|| format!("Unable to load regions from `{}'", args.source.display()))?;

    if let Some(err) = &loaded.report.interrupted {
        warn!(
            loaded = loaded.report.loaded,
            "Source ended early, only some regions are available: {err:#}"
        );
    }

    let locator = Locator::build(loaded.store, &config);
    let elapsed = start.elapsed();
    info!(
        "Ready after {}",
        format_duration(Duration::from_millis(elapsed.as_millis() as u64))
    );

    Ok(Session {
        locator,
        report: loaded.report,
        elapsed,
    })
}
