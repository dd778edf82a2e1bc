//! Construction-time configuration for a [`TerrainPlot`](crate::scene::TerrainPlot).
//!
//! Every field has the original widget's default; a JSON file can override any
//! subset of them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::data::PointAttr;
use crate::error::{PlotError, PlotResult};
use crate::math::scale::{Extent, ScaleKind};

/// Maps a raw value onto a `0xRRGGBB` colour.
#[derive(Clone)]
pub struct ValueRenderer(Arc<dyn Fn(f64) -> u32 + Send + Sync>);

impl ValueRenderer {
    pub fn new<F: Fn(f64) -> u32 + Send + Sync + 'static>(f: F) -> Self {
        Self(Arc::new(f))
    }

    pub fn color(&self, value: f64) -> u32 {
        (self.0)(value)
    }
}

impl fmt::Debug for ValueRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueRenderer(..)")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub point_size: f64,
    pub allow_selection: bool,
    /// Ray-to-point distance, in scene units, that still counts as a hit.
    /// Defaults to a third of `point_size`.
    pub pick_threshold: Option<f64>,

    pub x_attr: PointAttr,
    pub x_label: String,
    pub x_domain: Option<Extent>,

    pub y_attr: PointAttr,
    pub y_label: String,
    pub y_domain: Option<Extent>,

    pub z_label: String,
    pub z_domain: Option<Extent>,

    pub value_attr: PointAttr,
    pub value_label: String,
    pub value_domain: Option<Extent>,
    pub value_scale: ScaleKind,

    pub height_range: (f64, f64),

    #[serde(skip)]
    pub value_renderer: Option<ValueRenderer>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            point_size: 10.0,
            allow_selection: false,
            pick_threshold: None,

            x_attr: PointAttr::X,
            x_label: "X".to_string(),
            x_domain: None,

            y_attr: PointAttr::Y,
            y_label: "Y".to_string(),
            y_domain: None,

            z_label: "Elevation".to_string(),
            z_domain: None,

            value_attr: PointAttr::Water(0),
            value_label: "Value".to_string(),
            value_domain: None,
            value_scale: ScaleKind::Linear,

            height_range: (-10.0, 10.0),

            value_renderer: None,
        }
    }
}

impl PlotConfig {
    pub fn from_json(text: &str) -> PlotResult<Self> {
        let config: PlotConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> PlotResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn pick_threshold(&self) -> f64 {
        self.pick_threshold.unwrap_or(self.point_size / 3.0)
    }

    /// Checks settings that do not depend on the dataset.
    pub fn validate(&self) -> PlotResult<()> {
        if !(self.point_size.is_finite() && self.point_size > 0.0) {
            return Err(PlotError::config(format!(
                "point size must be positive, got {}",
                self.point_size
            )));
        }
        if self.height_range.0 >= self.height_range.1 {
            return Err(PlotError::config(format!(
                "height range ({}, {}) must be increasing",
                self.height_range.0, self.height_range.1
            )));
        }
        Ok(())
    }
}

/// Command line of the `terrain3d` viewer.
#[derive(Parser, Debug)]
#[command(name = "terrain3d")]
#[command(about = "View a terrain with its water surface over time", long_about = None)]
pub struct Cli {
    /// Dataset JSON, either `{"data": {...}}` or a bare dataset
    pub data: PathBuf,

    /// Plot configuration JSON; command line flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Value scale: linear or log
    #[arg(long)]
    pub value_scale: Option<ScaleKind>,

    /// Point size in scene units
    #[arg(long)]
    pub point_size: Option<f64>,

    /// Enable point selection
    #[arg(long)]
    pub select: bool,

    /// Stage to show once the dataset is plotted
    #[arg(long)]
    pub stage: Option<i64>,
}

impl Cli {
    /// Loads `--config` (or the defaults) and applies the flag overrides.
    pub fn plot_config(&self) -> PlotResult<PlotConfig> {
        let mut config = match &self.config {
            Some(path) => PlotConfig::load(path)?,
            None => PlotConfig::default(),
        };
        if let Some(kind) = self.value_scale {
            config.value_scale = kind;
        }
        if let Some(size) = self.point_size {
            config.point_size = size;
        }
        if self.select {
            config.allow_selection = true;
        }
        config.validate()?;
        Ok(config)
    }
}
