// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    /// A vertex index outside the interval an operation accepts.
    #[error("{value} is not in range [{min}, {max}]")]
    IndexOutOfRange { value: isize, min: isize, max: isize },

    #[error("A Task can not depend on itself: {0} === {0}")]
    SelfDependency(usize),

    #[error("{0} is not a valid Task index")]
    InvalidTaskId(String),

    #[error("Invalid stage transition: {0}")]
    InvalidStageTransition(String),

    #[error("Malformed serialized state: {0}")]
    MalformedSerializedState(String),

    #[error("Cycle detected in chart: {0}")]
    DagCycle(String),

    #[error("Invalid chart: {0}")]
    InvalidChart(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown resource value: {0}")]
    UnknownResource(String),

    #[error("Expected one span per task ({expected}), got {got}")]
    SpanMismatch { expected: usize, got: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlanError {
    pub(crate) fn out_of_range(value: impl TryInto<isize>, min: usize, max: isize) -> Self {
        PlanError::IndexOutOfRange {
            value: value.try_into().unwrap_or(isize::MAX),
            min: min as isize,
            max,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
