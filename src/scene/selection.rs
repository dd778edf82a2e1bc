use glam::{Vec2, Vec3};

use crate::data::PointRecord;
use crate::math::mesh::{TriangleMesh, uv_sphere};
use crate::renderer::camera::Ray;

/// Pointer travel (`|dx| + |dy|`, pixels) above which a release is a drag.
pub const DRAG_TOLERANCE: f32 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub enum PlotEvent {
    Select { index: usize, point: PointRecord },
    Deselect,
}

/// Tells clicks from drags between a press and its release.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    down: Option<Vec2>,
}

impl PointerTracker {
    pub fn press(&mut self, px: Vec2) {
        self.down = Some(px);
    }

    /// True when the release completes a click. A release without a press is not one.
    pub fn release(&mut self, px: Vec2) -> bool {
        match self.down.take() {
            Some(down) => (px.x - down.x).abs() + (px.y - down.y).abs() <= DRAG_TOLERANCE,
            None => false,
        }
    }
}

/// Sphere shown at the selected point.
pub struct SelectionMarker {
    pub mesh: TriangleMesh,
    pub position: Vec3,
    pub color: u32,
}

impl SelectionMarker {
    pub fn new(point_size: f32) -> Self {
        Self {
            mesh: uv_sphere(point_size * 0.8, 8, 8),
            position: Vec3::ZERO,
            color: 0xffffff,
        }
    }

    pub fn radius(&self) -> f32 {
        self.mesh.position(0).length()
    }
}

/// Index of the vertex within `threshold` of `ray` that is nearest the ray origin.
pub fn pick_nearest(ray: &Ray, mesh: &TriangleMesh, threshold: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for i in 0..mesh.vertex_count() {
        let Some((t, dist)) = ray.closest_approach(mesh.position(i)) else {
            continue;
        };
        if dist > threshold {
            continue;
        }
        if best.is_none_or(|(_, best_t)| t < best_t) {
            best = Some((i, t));
        }
    }

    best.map(|(i, _)| i)
}
