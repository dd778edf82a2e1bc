pub mod graph;
pub mod plot;
pub mod selection;
pub mod stage;

pub use graph::{Lights, Scene, SceneObject};
pub use plot::TerrainPlot;
pub use selection::{DRAG_TOLERANCE, PlotEvent, SelectionMarker};
pub use stage::StageSet;
