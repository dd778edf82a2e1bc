pub mod buffers;
pub mod camera;
pub mod gpu;

pub use buffers::StageBufferPool;
pub use camera::{Camera, Ray};
pub use gpu::GpuState;
