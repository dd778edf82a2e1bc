use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::data::PointRecord;
use crate::error::PlotError;

/// Which point attribute feeds an axis or the value channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointAttr {
    X,
    Y,
    Elevation,
    Water(usize),
}

impl PointAttr {
    pub fn read(&self, point: &PointRecord) -> Option<f64> {
        match self {
            PointAttr::X => Some(point.x),
            PointAttr::Y => Some(point.y),
            PointAttr::Elevation => Some(point.e),
            PointAttr::Water(stage) => point.w.get(*stage).copied(),
        }
    }
}

impl FromStr for PointAttr {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" => Ok(PointAttr::X),
            "y" => Ok(PointAttr::Y),
            "e" => Ok(PointAttr::Elevation),
            "w" => Ok(PointAttr::Water(0)),
            other => other
                .strip_prefix("w:")
                .and_then(|n| n.parse::<usize>().ok())
                .map(PointAttr::Water)
                .ok_or_else(|| PlotError::config(format!("unknown point attribute '{}'", other))),
        }
    }
}

impl fmt::Display for PointAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointAttr::X => write!(f, "x"),
            PointAttr::Y => write!(f, "y"),
            PointAttr::Elevation => write!(f, "e"),
            PointAttr::Water(0) => write!(f, "w"),
            PointAttr::Water(n) => write!(f, "w:{}", n),
        }
    }
}

impl Serialize for PointAttr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PointAttr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
