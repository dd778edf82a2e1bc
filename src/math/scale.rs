use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// `[min, max]` of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Extent of the finite values yielded by `values`, `None` if there are none.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Extent::new(v, v)),
                Some(e) => Some(Extent::new(e.min.min(v), e.max.max(v))),
            })
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl From<[f64; 2]> for Extent {
    fn from(v: [f64; 2]) -> Self {
        Extent::new(v[0], v[1])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    Log,
}

impl FromStr for ScaleKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(ScaleKind::Linear),
            "log" => Ok(ScaleKind::Log),
            other => Err(PlotError::config(format!("Invalid valueScale: {}", other))),
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleKind::Linear => write!(f, "linear"),
            ScaleKind::Log => write!(f, "log"),
        }
    }
}

/// Monotonic mapping from a data domain onto a display range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisScale {
    kind: ScaleKind,
    domain: Extent,
    range: (f64, f64),
}

impl AxisScale {
    pub fn new(kind: ScaleKind, domain: Extent, range: (f64, f64)) -> PlotResult<Self> {
        if !domain.min.is_finite() || !domain.max.is_finite() {
            return Err(PlotError::config(format!(
                "domain [{}, {}] is not finite",
                domain.min, domain.max
            )));
        }
        if domain.min > domain.max {
            return Err(PlotError::config(format!(
                "domain [{}, {}] is reversed",
                domain.min, domain.max
            )));
        }
        if kind == ScaleKind::Log && domain.min <= 0.0 {
            return Err(PlotError::config(format!(
                "log scale domain [{}, {}] must be strictly positive",
                domain.min, domain.max
            )));
        }

        Ok(Self {
            kind,
            domain,
            range,
        })
    }

    pub fn linear(domain: Extent, range: (f64, f64)) -> PlotResult<Self> {
        Self::new(ScaleKind::Linear, domain, range)
    }

    pub fn domain(&self) -> Extent {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (start, end) = self.range;

        if self.domain.min == self.domain.max {
            return (start + end) / 2.0;
        }

        let t = match self.kind {
            ScaleKind::Linear => (value - self.domain.min) / self.domain.span(),
            ScaleKind::Log => {
                let lo = self.domain.min.ln();
                (value.ln() - lo) / (self.domain.max.ln() - lo)
            }
        };

        start * (1.0 - t) + end * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_endpoints_exactly() {
        let s = AxisScale::linear(Extent::new(-3.7, 12.1), (50.0, -50.0)).unwrap();
        assert_eq!(s.apply(-3.7), 50.0);
        assert_eq!(s.apply(12.1), -50.0);
        assert!(s.apply(s.domain().center()).abs() < 1e-9);
    }

    #[test]
    fn linear_is_monotonic() {
        let s = AxisScale::linear(Extent::new(0.0, 10.0), (-10.0, 10.0)).unwrap();
        let mut prev = f64::NEG_INFINITY;
        for i in 0..=100 {
            let v = s.apply(i as f64 / 10.0);
            assert!(v > prev);
            prev = v;
        }
    }

    #[test]
    fn log_scale_endpoints_and_midpoint() {
        let s = AxisScale::new(ScaleKind::Log, Extent::new(1.0, 100.0), (0.0, 1.0)).unwrap();
        assert_eq!(s.apply(1.0), 0.0);
        assert_eq!(s.apply(100.0), 1.0);
        assert!((s.apply(10.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn log_scale_rejects_non_positive_domain() {
        for domain in [Extent::new(0.0, 5.0), Extent::new(-1.0, 5.0)] {
            let err = AxisScale::new(ScaleKind::Log, domain, (0.0, 1.0)).unwrap_err();
            assert!(matches!(err, PlotError::InvalidConfig(_)));
        }
    }

    #[test]
    fn degenerate_domain_maps_to_range_midpoint() {
        let s = AxisScale::linear(Extent::new(4.0, 4.0), (-10.0, 30.0)).unwrap();
        assert_eq!(s.apply(4.0), 10.0);
        assert_eq!(s.apply(-100.0), 10.0);
        assert!(!s.apply(4.0).is_nan());
    }

    #[test]
    fn reversed_domain_is_rejected() {
        assert!(AxisScale::linear(Extent::new(5.0, 1.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn unknown_scale_kind_is_a_config_error() {
        assert_eq!("log".parse::<ScaleKind>().unwrap(), ScaleKind::Log);
        let err = "sqrt".parse::<ScaleKind>().unwrap_err();
        assert!(matches!(err, PlotError::InvalidConfig(_)));
    }

    #[test]
    fn extent_skips_non_finite_values() {
        let e = Extent::of([3.0, f64::NAN, -2.0, 7.5]).unwrap();
        assert_eq!(e, Extent::new(-2.0, 7.5));
        assert!(Extent::of(std::iter::empty()).is_none());
    }
}
