use glam::Vec3;

use crate::data::TerrainDataset;
use crate::math::axes::SceneScales;

pub struct TriangleMesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Builds a mesh with smooth per-vertex normals. Winding is kept as given.
    pub fn from_positions(positions: &[Vec3], indices: Vec<u32>) -> Self {
        let normals = compute_vertex_normals(positions, &indices);
        Self {
            vertices: positions.iter().flat_map(|p| p.to_array()).collect(),
            normals: normals.iter().flat_map(|n| n.to_array()).collect(),
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[i * 3..i * 3 + 3])
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.normals[i * 3..i * 3 + 3])
    }
}

/// Averages the unit normals of the faces around each vertex.
///
/// Degenerate faces contribute nothing; vertices with no usable face get +Y.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let a = tri[0] as usize;
        let b = tri[1] as usize;
        let c = tri[2] as usize;

        let n = (positions[b] - positions[a])
            .cross(positions[c] - positions[a])
            .normalize_or_zero();

        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { Vec3::Y } else { n }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: u32,
    pub opacity: f32,
    pub shininess: f32,
}

impl Material {
    pub const LAND: Material = Material {
        color: 0xd2a95f,
        opacity: 1.0,
        shininess: 0.0,
    };

    pub const WATER: Material = Material {
        color: 0x5555ff,
        opacity: 0.8,
        shininess: 30.0,
    };

    pub const AXES: Material = Material {
        color: 0xc0c0c0,
        opacity: 1.0,
        shininess: 0.0,
    };

    pub fn rgba(&self) -> [f32; 4] {
        let [r, g, b] = rgb_to_f32(self.color);
        [r, g, b, self.opacity]
    }
}

pub fn rgb_to_f32(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    ]
}

/// Land surface plus one water surface per stage, all sharing one topology.
pub struct TerrainMeshes {
    pub land: TriangleMesh,
    pub water: Vec<TriangleMesh>,
}

impl TerrainMeshes {
    pub fn build(dataset: &TerrainDataset, scales: &SceneScales) -> Self {
        let indices: Vec<u32> = dataset.faces.iter().flat_map(|f| f.0).collect();

        let land_positions: Vec<Vec3> = dataset
            .points
            .iter()
            .map(|p| scales.position(p, p.e))
            .collect();
        let land = TriangleMesh::from_positions(&land_positions, indices.clone());

        let water = (0..dataset.number_of_stages())
            .map(|stage| {
                let positions: Vec<Vec3> = dataset
                    .points
                    .iter()
                    .map(|p| scales.position(p, p.w[stage]))
                    .collect();
                TriangleMesh::from_positions(&positions, indices.clone())
            })
            .collect();

        Self { land, water }
    }
}

/// Latitude/longitude sphere centred on the origin.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> TriangleMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut positions = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * std::f32::consts::PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * std::f32::consts::TAU;
            positions.push(Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    let normals: Vec<f32> = positions
        .iter()
        .flat_map(|p| p.normalize_or(Vec3::Y).to_array())
        .collect();

    TriangleMesh {
        vertices: positions.iter().flat_map(|p| p.to_array()).collect(),
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::data::{FaceRecord, PointRecord};

    fn grid_dataset(stages: usize, slope: f64) -> TerrainDataset {
        let mut points = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                points.push(PointRecord {
                    x: i as f64,
                    y: j as f64,
                    e: slope * i as f64,
                    w: (0..stages).map(|s| 1.0 + s as f64).collect(),
                });
            }
        }
        let mut faces = Vec::new();
        for j in 0..2u32 {
            for i in 0..2u32 {
                let tl = j * 3 + i;
                faces.push(FaceRecord([tl, tl + 3, tl + 1]));
                faces.push(FaceRecord([tl + 1, tl + 3, tl + 4]));
            }
        }
        TerrainDataset::new(points, faces)
    }

    #[test]
    fn flat_surface_normals_point_up() {
        let ds = grid_dataset(1, 0.0);
        let scales = SceneScales::compute(&ds, &PlotConfig::default()).unwrap();
        let meshes = TerrainMeshes::build(&ds, &scales);

        for i in 0..meshes.land.vertex_count() {
            let n = meshes.land.normal(i);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(n.y.abs() > 0.999, "normal {} is {:?}", i, n);
        }
    }

    #[test]
    fn one_water_mesh_per_stage_with_shared_topology() {
        let ds = grid_dataset(4, 0.5);
        let scales = SceneScales::compute(&ds, &PlotConfig::default()).unwrap();
        let meshes = TerrainMeshes::build(&ds, &scales);

        assert_eq!(meshes.water.len(), 4);
        for w in &meshes.water {
            assert_eq!(w.vertex_count(), meshes.land.vertex_count());
            assert_eq!(w.indices, meshes.land.indices);
        }
        assert_eq!(meshes.land.triangle_count(), 8);
    }

    #[test]
    fn water_height_follows_stage_value() {
        let ds = grid_dataset(3, 0.5);
        let scales = SceneScales::compute(&ds, &PlotConfig::default()).unwrap();
        let meshes = TerrainMeshes::build(&ds, &scales);

        assert_eq!(meshes.water[0].position(0).y, scales.height.apply(1.0) as f32);
        assert_eq!(meshes.water[2].position(0).y, scales.height.apply(3.0) as f32);
        assert_eq!(meshes.land.position(4).x, meshes.water[1].position(4).x);
    }

    #[test]
    fn winding_is_not_reordered() {
        let ds = grid_dataset(1, 0.5);
        let scales = SceneScales::compute(&ds, &PlotConfig::default()).unwrap();
        let meshes = TerrainMeshes::build(&ds, &scales);
        assert_eq!(&meshes.land.indices[..3], &[0, 3, 1]);
    }

    #[test]
    fn isolated_vertex_gets_up_normal() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::new(9.0, 9.0, 9.0)];
        let normals = compute_vertex_normals(&positions, &[0, 2, 1]);
        assert_eq!(normals[3], Vec3::Y);
        assert!((normals[0] - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn sphere_is_closed_and_unit_radius() {
        let s = uv_sphere(2.0, 8, 8);
        assert_eq!(s.vertex_count(), 81);
        for i in 0..s.vertex_count() {
            assert!((s.position(i).length() - 2.0).abs() < 1e-4);
        }
        assert!(s.indices.iter().all(|&i| (i as usize) < s.vertex_count()));
    }

    #[test]
    fn material_color_unpacks() {
        assert_eq!(rgb_to_f32(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(Material::WATER.rgba()[3], 0.8);
    }
}
