use glam::Vec3;

use crate::config::PlotConfig;
use crate::data::{PointAttr, PointRecord, TerrainDataset};
use crate::error::{PlotError, PlotResult};
use crate::math::scale::{AxisScale, Extent};

/// Width of the rendered footprint along its longer horizontal axis.
pub const HORIZONTAL_SPAN: f64 = 100.0;

/// Below this short/long extent ratio both horizontal axes use the full span.
pub const MIN_ASPECT_RATIO: f64 = 0.05;

/// Scale functions for one plotted dataset.
#[derive(Clone, Debug)]
pub struct SceneScales {
    pub we: AxisScale,
    pub ns: AxisScale,
    pub height: AxisScale,
    pub value: AxisScale,

    pub we_attr: PointAttr,
    pub ns_attr: PointAttr,

    pub elevation_extent: Extent,
    pub height_extent: Extent,
}

impl SceneScales {
    pub fn compute(dataset: &TerrainDataset, config: &PlotConfig) -> PlotResult<Self> {
        let stages = dataset.number_of_stages();
        for (name, attr) in [
            ("x", config.x_attr),
            ("y", config.y_attr),
            ("value", config.value_attr),
        ] {
            if let PointAttr::Water(stage) = attr {
                if stage >= stages {
                    return Err(PlotError::config(format!(
                        "{} attribute {} refers to a missing stage ({} stages)",
                        name, attr, stages
                    )));
                }
            }
        }

        let we_extent = resolve_extent(dataset, config.x_domain, config.x_attr)?;
        let ns_extent = resolve_extent(dataset, config.y_domain, config.y_attr)?;
        let elevation_extent = resolve_extent(dataset, config.z_domain, PointAttr::Elevation)?;
        let value_extent = resolve_extent(dataset, config.value_domain, config.value_attr)?;
        let height_extent = elevation_extent.union(&value_extent);

        let (we_range, ns_range) = horizontal_ranges(we_extent.span(), ns_extent.span());

        let value = AxisScale::new(config.value_scale, value_extent, (0.0, 1.0))?;

        Ok(Self {
            we: AxisScale::linear(we_extent, we_range)?,
            ns: AxisScale::linear(ns_extent, ns_range)?,
            height: AxisScale::linear(height_extent, config.height_range)?,
            value,
            we_attr: config.x_attr,
            ns_attr: config.y_attr,
            elevation_extent,
            height_extent,
        })
    }

    /// Scene position of `point` with its vertical coordinate taken from `level`.
    pub fn position(&self, point: &PointRecord, level: f64) -> Vec3 {
        let x = self.we_attr.read(point).unwrap_or(f64::NAN);
        let y = self.ns_attr.read(point).unwrap_or(f64::NAN);
        Vec3::new(
            self.we.apply(x) as f32,
            self.height.apply(level) as f32,
            self.ns.apply(y) as f32,
        )
    }
}

fn resolve_extent(
    dataset: &TerrainDataset,
    fixed: Option<Extent>,
    attr: PointAttr,
) -> PlotResult<Extent> {
    if let Some(domain) = fixed {
        return Ok(domain);
    }
    Extent::of(dataset.points.iter().filter_map(|p| attr.read(p)))
        .ok_or_else(|| PlotError::dataset(format!("attribute {} has no finite values", attr)))
}

/// Display ranges for the west-east and north-south axes.
///
/// North-south runs from +z to -z so north sits away from the default camera.
pub fn horizontal_ranges(we: f64, ns: f64) -> ((f64, f64), (f64, f64)) {
    let half = HORIZONTAL_SPAN / 2.0;
    let ratio = we.min(ns) / we.max(ns);

    if !(ratio >= MIN_ASPECT_RATIO) {
        return ((-half, half), (half, -half));
    }

    if ns > we {
        let wex = (HORIZONTAL_SPAN / ns) * we / 2.0;
        ((-wex, wex), (half, -half))
    } else {
        let nsx = (HORIZONTAL_SPAN / we) * ns / 2.0;
        ((-half, half), (nsx, -nsx))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisLabel {
    pub text: String,
    pub position: Vec3,
}

/// Line list outlining the min, centre and max planes of every axis.
pub fn axes_cube_lines(scales: &SceneScales) -> Vec<Vec3> {
    let levels = |s: &AxisScale| {
        let d = s.domain();
        [s.apply(d.min) as f32, s.apply(d.center()) as f32, s.apply(d.max) as f32]
    };
    let xs = levels(&scales.we);
    let ys = levels(&scales.height);
    let zs = levels(&scales.ns);

    let (x0, x1) = (xs[0], xs[2]);
    let (y0, y1) = (ys[0], ys[2]);
    let (z0, z1) = (zs[0], zs[2]);

    let mut lines = Vec::with_capacity(9 * 8);
    let mut rect = |corners: [Vec3; 4]| {
        for i in 0..4 {
            lines.push(corners[i]);
            lines.push(corners[(i + 1) % 4]);
        }
    };

    for &z in &zs {
        rect([
            Vec3::new(x0, y0, z),
            Vec3::new(x1, y0, z),
            Vec3::new(x1, y1, z),
            Vec3::new(x0, y1, z),
        ]);
    }
    for &x in &xs {
        rect([
            Vec3::new(x, y0, z0),
            Vec3::new(x, y1, z0),
            Vec3::new(x, y1, z1),
            Vec3::new(x, y0, z1),
        ]);
    }
    for &y in &ys {
        rect([
            Vec3::new(x0, y, z0),
            Vec3::new(x1, y, z0),
            Vec3::new(x1, y, z1),
            Vec3::new(x0, y, z1),
        ]);
    }

    lines
}

pub fn axis_labels(scales: &SceneScales, elevation_title: &str) -> Vec<AxisLabel> {
    let we = scales.we.domain();
    let ns = scales.ns.domain();
    let h = scales.height_extent;
    let elev = scales.elevation_extent;

    let west = scales.we.apply(we.min) as f32;
    let east = scales.we.apply(we.max) as f32;
    let south = scales.ns.apply(ns.min) as f32;
    let north = scales.ns.apply(ns.max) as f32;
    let bottom = scales.height.apply(h.min) as f32;
    let top = scales.height.apply(h.max) as f32;

    let label = |text: String, position: Vec3| AxisLabel { text, position };

    vec![
        label("West".to_string(), Vec3::new(west - 12.0, 0.0, 0.0)),
        label("East".to_string(), Vec3::new(east + 12.0, 0.0, 0.0)),
        label(elevation_title.to_string(), Vec3::new(0.0, bottom - 5.0, 0.0)),
        label(format!("{:+.3}", elev.min), Vec3::new(0.0, bottom - 15.0, 0.0)),
        label(elevation_title.to_string(), Vec3::new(0.0, top + 15.0, 0.0)),
        label(format!("{:+.3}", elev.max), Vec3::new(0.0, top + 5.0, 0.0)),
        label("South".to_string(), Vec3::new(0.0, 0.0, south + 2.0)),
        label("North".to_string(), Vec3::new(0.0, 0.0, north - 2.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FaceRecord;
    use crate::math::scale::ScaleKind;

    fn dataset(points: &[(f64, f64, f64, f64)]) -> TerrainDataset {
        TerrainDataset::new(
            points
                .iter()
                .map(|&(x, y, e, w)| PointRecord {
                    x,
                    y,
                    e,
                    w: vec![w],
                })
                .collect(),
            vec![FaceRecord([0, 1, 2])],
        )
    }

    #[test]
    fn wider_axis_keeps_full_span() {
        let ((we0, we1), (ns0, ns1)) = horizontal_ranges(200.0, 50.0);
        assert_eq!((we0, we1), (-50.0, 50.0));
        assert_eq!((ns0, ns1), (12.5, -12.5));

        let ((we0, we1), (ns0, ns1)) = horizontal_ranges(50.0, 200.0);
        assert_eq!((we0, we1), (-12.5, 12.5));
        assert_eq!((ns0, ns1), (50.0, -50.0));
    }

    #[test]
    fn thin_footprint_falls_back_to_full_ranges() {
        let (we, ns) = horizontal_ranges(1000.0, 10.0);
        assert_eq!(we, (-50.0, 50.0));
        assert_eq!(ns, (50.0, -50.0));

        let (we, ns) = horizontal_ranges(0.0, 0.0);
        assert_eq!(we, (-50.0, 50.0));
        assert_eq!(ns, (50.0, -50.0));
    }

    #[test]
    fn height_covers_elevation_and_water() {
        let ds = dataset(&[(0.0, 0.0, 5.0, 2.0), (10.0, 0.0, 8.0, 12.0), (0.0, 10.0, 6.0, 3.0)]);
        let s = SceneScales::compute(&ds, &PlotConfig::default()).unwrap();

        assert_eq!(s.height_extent, Extent::new(2.0, 12.0));
        assert_eq!(s.elevation_extent, Extent::new(5.0, 8.0));
        assert_eq!(s.height.apply(2.0), -10.0);
        assert_eq!(s.height.apply(12.0), 10.0);
        assert_eq!(s.value.apply(2.0), 0.0);
        assert_eq!(s.value.apply(12.0), 1.0);
    }

    #[test]
    fn fixed_domains_override_extents() {
        let ds = dataset(&[(0.0, 0.0, 5.0, 2.0), (10.0, 0.0, 8.0, 12.0), (0.0, 10.0, 6.0, 3.0)]);
        let config = PlotConfig {
            x_domain: Some(Extent::new(-10.0, 10.0)),
            ..Default::default()
        };
        let s = SceneScales::compute(&ds, &config).unwrap();
        assert_eq!(s.we.domain(), Extent::new(-10.0, 10.0));
        assert_eq!(s.we.apply(-10.0), -50.0);
        assert_eq!(s.we.apply(10.0), 50.0);
    }

    #[test]
    fn log_value_scale_with_non_positive_water_fails() {
        let ds = dataset(&[(0.0, 0.0, 5.0, 0.0), (10.0, 0.0, 8.0, 12.0), (0.0, 10.0, 6.0, 3.0)]);
        let config = PlotConfig {
            value_scale: ScaleKind::Log,
            ..Default::default()
        };
        assert!(matches!(
            SceneScales::compute(&ds, &config),
            Err(PlotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn value_attr_on_missing_stage_fails() {
        let ds = dataset(&[(0.0, 0.0, 5.0, 1.0), (10.0, 0.0, 8.0, 12.0), (0.0, 10.0, 6.0, 3.0)]);
        let config = PlotConfig {
            value_attr: PointAttr::Water(3),
            ..Default::default()
        };
        assert!(SceneScales::compute(&ds, &config).is_err());
    }

    #[test]
    fn cube_has_nine_rectangles() {
        let ds = dataset(&[(0.0, 0.0, 5.0, 2.0), (10.0, 0.0, 8.0, 12.0), (0.0, 10.0, 6.0, 3.0)]);
        let s = SceneScales::compute(&ds, &PlotConfig::default()).unwrap();
        assert_eq!(axes_cube_lines(&s).len(), 9 * 8);

        let labels = axis_labels(&s, "Elevation");
        assert_eq!(labels[0].text, "West");
        assert_eq!(labels[3].text, "+5.000");
        assert_eq!(labels[0].position.x, -62.0);
    }
}
