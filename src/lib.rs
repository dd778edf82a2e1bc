pub mod colormap;
pub mod config;
pub mod data;
pub mod error;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod ui;

pub use config::{Cli, PlotConfig, ValueRenderer};
pub use data::{FaceRecord, PointAttr, PointRecord, TerrainDataset, load_payload, parse_payload};
pub use error::{PlotError, PlotResult};
pub use scene::{PlotEvent, TerrainPlot};
