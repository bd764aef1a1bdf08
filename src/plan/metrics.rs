// src/plan/metrics.rs

//! Schemas for the open metric and resource maps carried by every task.

use serde::{Deserialize, Serialize};

/// Number of decimal places values are rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Precision(pub u32);

impl Precision {
    pub fn new(places: u32) -> Self {
        Self(places)
    }

    /// Round half away from zero at this precision.
    pub fn round(&self, value: f64) -> f64 {
        let mul = 10f64.powi(self.0 as i32);
        (value * mul).round() / mul
    }

    pub fn rounder(self) -> impl Fn(f64) -> f64 {
        move |value| self.round(value)
    }
}

/// Closed interval a metric is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range bounded only from below.
    pub fn at_least(min: f64) -> Self {
        Self { min, max: f64::MAX }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Default for MetricRange {
    fn default() -> Self {
        Self::at_least(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    #[serde(default)]
    pub range: MetricRange,
    #[serde(default)]
    pub default: f64,
    #[serde(default)]
    pub precision: Precision,
    /// Static definitions are built in and never serialized.
    #[serde(skip)]
    pub is_static: bool,
}

impl MetricDefinition {
    pub fn new(default: f64, range: MetricRange, precision: Precision) -> Self {
        Self {
            range,
            default: precision.round(range.clamp(default)),
            precision,
            is_static: false,
        }
    }

    pub fn clamp_and_round(&self, value: f64) -> f64 {
        self.precision.round(self.range.clamp(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub values: Vec<String>,
    #[serde(skip)]
    pub is_static: bool,
}

impl ResourceDefinition {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            is_static: false,
        }
    }

    /// The first value is the default.
    pub fn default_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn allows(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
