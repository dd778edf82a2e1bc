pub mod attr;
pub mod dataset;
pub mod payload;

pub use attr::PointAttr;
pub use dataset::{FaceRecord, PointRecord, TerrainDataset};
pub use payload::{load_payload, parse_payload};
