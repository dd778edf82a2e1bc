use std::fmt::Display;

/// Errors raised while configuring, validating or building a terrain plot.
#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("stage {requested} out of range (dataset has {stages} stages)")]
    StageOutOfRange { requested: i64, stages: usize },

    #[error("payload parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("terrain engine stopped")]
    EngineStopped,

    #[error("build {0} was superseded by a newer request")]
    Superseded(u64),
}

impl PlotError {
    pub fn config<T: Display>(msg: T) -> Self {
        PlotError::InvalidConfig(msg.to_string())
    }

    pub fn dataset<T: Display>(msg: T) -> Self {
        PlotError::InvalidDataset(msg.to_string())
    }
}

pub type PlotResult<T> = Result<T, PlotError>;
