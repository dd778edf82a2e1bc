pub mod axes;
pub mod engine;
pub mod mesh;
pub mod scale;

pub use axes::{AxisLabel, SceneScales};
pub use engine::{BuiltScene, TerrainEngine};
pub use mesh::{Material, TerrainMeshes, TriangleMesh};
pub use scale::{AxisScale, Extent, ScaleKind};
