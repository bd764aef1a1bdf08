// src/simulation/triangular.rs

use tracing::warn;

use crate::chart::Task;
use crate::types::{UNCERTAINTY_RESOURCE, Uncertainty};

/// Triangular distribution over `[min, max]` with peak at `mode`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangular {
    pub min: f64,
    pub mode: f64,
    pub max: f64,
}

impl Triangular {
    pub fn new(min: f64, mode: f64, max: f64) -> Self {
        Self { min, mode, max }
    }

    /// Distribution of a task's duration given how uncertain the estimate is.
    ///
    /// The estimate is the mode; the bounds are the estimate divided and
    /// multiplied by the uncertainty multiplier.
    pub fn for_estimate(duration: f64, uncertainty: Uncertainty) -> Self {
        let m = uncertainty.multiplier();
        Self::new(duration / m, duration, duration * m)
    }

    /// Inverse CDF: map `u` in `[0, 1]` to a value in `[min, max]`.
    pub fn sample(&self, u: f64) -> f64 {
        let Self { min, mode, max } = *self;
        let width = max - min;
        if width <= 0.0 {
            return mode;
        }

        let u = u.clamp(0.0, 1.0);
        let at_mode = (mode - min) / width;
        if u < at_mode {
            min + (u * width * (mode - min)).sqrt()
        } else {
            max - ((1.0 - u) * width * (max - mode)).sqrt()
        }
    }
}

/// The uncertainty level of `task`, falling back to [`Uncertainty::Low`].
pub fn task_uncertainty(task: &Task) -> Uncertainty {
    match task.resource(UNCERTAINTY_RESOURCE) {
        None => Uncertainty::default(),
        Some(value) => value.parse().unwrap_or_else(|err: String| {
            warn!(task = %task.name, error = %err, "falling back to low uncertainty");
            Uncertainty::default()
        }),
    }
}

