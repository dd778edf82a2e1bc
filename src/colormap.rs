use crate::config::PlotConfig;
use crate::data::PointRecord;
use crate::math::scale::AxisScale;

/// Blue (0) through cyan, green and yellow to red (1).
pub fn rainbow(t: f64) -> u32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let hue = (1.0 - t) * 240.0;
    hsv_to_rgb(hue, 1.0, 1.0)
}

pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> u32 {
    let c = value * saturation;
    let h = (hue / 60.0).rem_euclid(6.0);
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u32;
    (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}

/// Colour of `point` on the value channel, honouring a custom renderer.
pub fn value_color(config: &PlotConfig, value_scale: &AxisScale, point: &PointRecord) -> u32 {
    let value = config.value_attr.read(point).unwrap_or(f64::NAN);
    match &config.value_renderer {
        Some(renderer) => renderer.color(value),
        None => rainbow(value_scale.apply(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValueRenderer;
    use crate::math::scale::Extent;

    #[test]
    fn ramp_endpoints() {
        assert_eq!(rainbow(0.0), 0x0000ff);
        assert_eq!(rainbow(1.0), 0xff0000);
        assert_eq!(rainbow(0.5), 0x00ff00);
        assert_eq!(rainbow(f64::NAN), 0x0000ff);
        assert_eq!(rainbow(7.0), 0xff0000);
    }

    #[test]
    fn custom_renderer_overrides_ramp() {
        let config = PlotConfig {
            value_renderer: Some(ValueRenderer::new(|_| 0x123456)),
            ..Default::default()
        };
        let scale = AxisScale::linear(Extent::new(0.0, 1.0), (0.0, 1.0)).unwrap();
        let p = PointRecord {
            x: 0.0,
            y: 0.0,
            e: 0.0,
            w: vec![0.5],
        };
        assert_eq!(value_color(&config, &scale, &p), 0x123456);
        assert_eq!(value_color(&PlotConfig::default(), &scale, &p), 0x00ff00);
    }
}
