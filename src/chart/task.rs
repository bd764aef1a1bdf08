// src/chart/task.rs

//! Tasks: the vertices of a chart.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the static metric that holds a task's duration.
pub const DURATION_METRIC: &str = "Duration";

/// Stable identity of a task, independent of its position in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 characters of the id, for log output.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single unit of work in the plan.
///
/// `duration` is exposed as the `Duration` metric; every other metric and
/// resource lives in the open maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            description: String::new(),
            duration: 0.0,
            metrics: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    /// A copy with the same values but a fresh identity.
    pub fn dup(&self) -> Self {
        Self {
            id: TaskId::new(),
            ..self.clone()
        }
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        if name == DURATION_METRIC {
            return Some(self.duration);
        }
        self.metrics.get(name).copied()
    }

    pub fn set_metric(&mut self, name: &str, value: f64) {
        if name == DURATION_METRIC {
            self.duration = value;
        } else {
            self.metrics.insert(name.to_string(), value);
        }
    }

    pub fn resource(&self, name: &str) -> Option<&str> {
        self.resources.get(name).map(String::as_str)
    }

    pub fn set_resource(&mut self, name: &str, value: impl Into<String>) {
        self.resources.insert(name.to_string(), value.into());
    }
}
