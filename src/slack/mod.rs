// src/slack/mod.rs

//! Critical path method: early/late start and finish plus slack for every
//! vertex of a chart.

pub mod critical_path;

pub use critical_path::{critical_path, zero_slack_tasks};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::{Chart, TaskId, validate_chart};
use crate::errors::Result;

/// Half-open `[start, finish)` range of days.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub finish: f64,
}

impl Span {
    pub fn new(start: f64, finish: f64) -> Self {
        Self { start, finish }
    }
}

/// CPM timing for one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Slack {
    pub early: Span,
    pub late: Span,
    pub slack: f64,
}

/// Supplies the duration to use for the vertex at an index.
pub type DurationSource<'a> = &'a dyn Fn(usize) -> f64;

/// Supplies a fixed early start for a vertex, e.g. the actual start of a task
/// that is already under way.
pub type EarlyStartOverride<'a> = &'a dyn Fn(usize, &TaskId) -> Option<f64>;

/// Compute slack for every vertex of `chart`, indexed like its vertices.
///
/// - `duration_of` defaults to each task's own duration.
/// - `round` is applied to every computed value to avoid float drift.
/// - `early_start_override` pins the early start of selected tasks. Pinned
///   tasks keep `late == early` and do not constrain their predecessors.
///
/// The chart is validated first; an invalid chart is an error, never a
/// partial result.
pub fn compute_slack(
    chart: &Chart,
    duration_of: Option<DurationSource<'_>>,
    round: &dyn Fn(f64) -> f64,
    early_start_override: Option<EarlyStartOverride<'_>>,
) -> Result<Vec<Slack>> {
    let order = validate_chart(chart)?;
    let adj = chart.adjacency();
    let vertices = chart.vertices();

    let duration = |index: usize| -> f64 {
        match duration_of {
            Some(f) => f(index),
            None => vertices[index].duration,
        }
    };
    let overridden = |index: usize| -> Option<f64> {
        early_start_override.and_then(|f| f(index, &vertices[index].id))
    };

    let mut slacks = vec![Slack::default(); vertices.len()];

    // Forward pass: early start is the latest early finish of the predecessors.
    for &v in &order {
        let early_start = match overridden(v) {
            Some(value) => value,
            None => adj.by_dst[v]
                .iter()
                .map(|&p| slacks[p].early.finish)
                .fold(0.0_f64, f64::max),
        };
        let early_start = round(early_start);
        slacks[v].early = Span::new(early_start, round(early_start + duration(v)));
    }

    // Backward pass: late finish is the earliest late start of the successors
    // that still constrain this vertex.
    for &v in order.iter().rev() {
        let constraining: Vec<usize> = adj.by_src[v]
            .iter()
            .copied()
            .filter(|&s| overridden(s).is_none())
            .collect();

        let slack = &slacks[v];
        let late = if overridden(v).is_some() || constraining.is_empty() {
            slack.early
        } else {
            let late_finish = constraining
                .iter()
                .map(|&s| slacks[s].late.start)
                .fold(f64::INFINITY, f64::min);
            let late_finish = round(late_finish);
            Span::new(round(late_finish - duration(v)), late_finish)
        };
        slacks[v].late = late;
        slacks[v].slack = round(late.start - slacks[v].early.start);
    }

    debug!(
        vertices = vertices.len(),
        project_finish = slacks[chart.finish_index()].early.finish,
        "computed slack"
    );

    Ok(slacks)
}

/// Early spans of every vertex, the usual input to catch-up.
pub fn early_spans(slacks: &[Slack]) -> Vec<Span> {
    slacks.iter().map(|s| s.early).collect()
}
