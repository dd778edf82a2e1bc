use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// One sampled location: planar position, ground elevation and the water
/// surface elevation at every simulation stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub e: f64,
    #[serde(default)]
    pub w: Vec<f64>,
}

/// A triangle as three indices into the point list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRecord(pub [u32; 3]);

impl FaceRecord {
    pub fn indices(&self) -> [usize; 3] {
        [self.0[0] as usize, self.0[1] as usize, self.0[2] as usize]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDataset {
    #[serde(default)]
    pub points: Vec<PointRecord>,
    #[serde(default)]
    pub faces: Vec<FaceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_label: Option<String>,
}

impl TerrainDataset {
    pub fn new(points: Vec<PointRecord>, faces: Vec<FaceRecord>) -> Self {
        Self {
            points,
            faces,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the water series, taken from the first point.
    pub fn number_of_stages(&self) -> usize {
        self.points.first().map_or(0, |p| p.w.len())
    }

    /// Checks the per-point stage count and that every face index is in range.
    pub fn validate(&self) -> PlotResult<()> {
        let stages = self.number_of_stages();
        if !self.points.is_empty() && stages == 0 {
            return Err(PlotError::dataset("points carry no water stages"));
        }

        if let Some((i, p)) = self
            .points
            .iter()
            .enumerate()
            .find(|(_, p)| p.w.len() != stages)
        {
            return Err(PlotError::dataset(format!(
                "point {} has {} water stages, expected {}",
                i,
                p.w.len(),
                stages
            )));
        }

        let count = self.points.len();
        for (f, face) in self.faces.iter().enumerate() {
            if let Some(&idx) = face.indices().iter().find(|&&idx| idx >= count) {
                return Err(PlotError::dataset(format!(
                    "face {} references point {} but only {} points exist",
                    f, idx, count
                )));
            }
        }

        Ok(())
    }

    /// Shoelace sign test on the planar coordinates of one face.
    ///
    /// Returns `None` when the face index or one of its points is missing.
    pub fn face_is_clockwise(&self, face: usize) -> Option<bool> {
        let [a, b, c] = self.faces.get(face)?.indices();
        let (a, b, c) = (self.points.get(a)?, self.points.get(b)?, self.points.get(c)?);

        let twice_area = a.x * b.y + b.x * c.y + c.x * a.y - a.y * b.x - b.y * c.x - c.y * a.x;
        Some(twice_area < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64, e: f64, w: &[f64]) -> PointRecord {
        PointRecord {
            x,
            y,
            e,
            w: w.to_vec(),
        }
    }

    #[test]
    fn stage_count_comes_from_first_point() {
        let ds = TerrainDataset::new(
            vec![point(0.0, 0.0, 1.0, &[1.0, 2.0, 3.0])],
            vec![],
        );
        assert_eq!(ds.number_of_stages(), 3);
        assert_eq!(TerrainDataset::default().number_of_stages(), 0);
    }

    #[test]
    fn ragged_water_series_is_rejected() {
        let ds = TerrainDataset::new(
            vec![point(0.0, 0.0, 0.0, &[1.0, 2.0]), point(1.0, 0.0, 0.0, &[1.0])],
            vec![],
        );
        let err = ds.validate().unwrap_err();
        assert!(matches!(err, PlotError::InvalidDataset(ref m) if m.contains("point 1")));
    }

    #[test]
    fn face_index_out_of_range_is_rejected() {
        let ds = TerrainDataset::new(
            vec![
                point(0.0, 0.0, 0.0, &[0.0]),
                point(1.0, 0.0, 0.0, &[0.0]),
                point(0.0, 1.0, 0.0, &[0.0]),
            ],
            vec![FaceRecord([0, 1, 3])],
        );
        let err = ds.validate().unwrap_err();
        assert!(matches!(err, PlotError::InvalidDataset(ref m) if m.contains("face 0")));
    }

    #[test]
    fn points_without_stages_are_rejected() {
        let ds = TerrainDataset::new(vec![point(0.0, 0.0, 0.0, &[])], vec![]);
        assert!(ds.validate().is_err());
    }

    #[test]
    fn winding_follows_shoelace_sign() {
        let pts = vec![
            point(0.0, 0.0, 0.0, &[0.0]),
            point(1.0, 0.0, 0.0, &[0.0]),
            point(0.0, 1.0, 0.0, &[0.0]),
        ];
        let ccw = TerrainDataset::new(pts.clone(), vec![FaceRecord([0, 1, 2])]);
        let cw = TerrainDataset::new(pts, vec![FaceRecord([0, 2, 1])]);

        assert_eq!(ccw.face_is_clockwise(0), Some(false));
        assert_eq!(cw.face_is_clockwise(0), Some(true));
        assert_eq!(cw.face_is_clockwise(5), None);
    }
}
