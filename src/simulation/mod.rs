// src/simulation/mod.rs

//! Monte Carlo exploration of alternate critical paths.
//!
//! Each loop resamples the duration of every unfinished task from its
//! uncertainty, recomputes slack and records which critical path came out.

pub mod triangular;

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use tracing::{debug, info};

pub use triangular::{Triangular, task_uncertainty};

use crate::chart::{Chart, validate_chart};
use crate::errors::Result;
use crate::plan::{Plan, Precision};
use crate::slack::{compute_slack, critical_path};

/// Resolution of the uniform draw fed to the inverse CDF.
const MAX_RANDOM: u32 = 1000;

/// Decimal places sampled durations and slack are rounded to.
pub const SIMULATION_PRECISION: Precision = Precision(2);

/// How often one critical path came out, and a sample of durations that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPathEntry {
    pub count: usize,
    pub critical_path: Vec<usize>,
    pub durations: Vec<f64>,
}

/// How often one task was on a critical path, weighted by path counts.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPathTaskEntry {
    pub task_index: usize,
    pub duration: f64,
    pub num_times_appeared: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults {
    pub paths: BTreeMap<Vec<usize>, CriticalPathEntry>,
    /// Sorted by duration, longest first.
    pub tasks: Vec<CriticalPathTaskEntry>,
}

/// Run `loops` rounds of duration sampling over `chart`.
///
/// `original_critical_path` seeds the table with a zero count so that it is
/// always reported. Tasks in `finished` keep their recorded duration.
pub fn simulate<R: Rng + ?Sized>(
    chart: &Chart,
    loops: usize,
    original_critical_path: &[usize],
    finished: &HashSet<usize>,
    rng: &mut R,
) -> Result<SimulationResults> {
    simulate_with_precision(
        chart,
        loops,
        original_critical_path,
        finished,
        SIMULATION_PRECISION,
        rng,
    )
}

/// [`simulate`] with sampled durations and slack rounded to `precision`.
pub fn simulate_with_precision<R: Rng + ?Sized>(
    chart: &Chart,
    loops: usize,
    original_critical_path: &[usize],
    finished: &HashSet<usize>,
    precision: Precision,
    rng: &mut R,
) -> Result<SimulationResults> {
    validate_chart(chart)?;
    let vertices = chart.vertices();
    let round = precision.rounder();

    let mut paths: BTreeMap<Vec<usize>, CriticalPathEntry> = BTreeMap::new();
    paths.insert(
        original_critical_path.to_vec(),
        CriticalPathEntry {
            count: 0,
            critical_path: original_critical_path.to_vec(),
            durations: vertices.iter().map(|t| t.duration).collect(),
        },
    );

    let distributions: Vec<Triangular> = vertices
        .iter()
        .map(|t| Triangular::for_estimate(t.duration, task_uncertainty(t)))
        .collect();

    for round_index in 0..loops {
        let durations: Vec<f64> = vertices
            .iter()
            .enumerate()
            .map(|(index, task)| {
                if finished.contains(&index) {
                    return task.duration;
                }
                let u = f64::from(rng.gen_range(0..MAX_RANDOM)) / f64::from(MAX_RANDOM);
                round(distributions[index].sample(u))
            })
            .collect();

        let duration_of = |index: usize| durations[index];
        let slacks = compute_slack(chart, Some(&duration_of), &round, None)?;
        let path = critical_path(chart, &slacks, &round);

        let entry = paths
            .entry(path.clone())
            .or_insert_with(|| CriticalPathEntry {
                count: 0,
                critical_path: path,
                durations: durations.clone(),
            });
        entry.count += 1;

        debug!(round = round_index, paths = paths.len(), "simulation round");
    }

    let tasks = critical_task_frequencies(&paths, chart);
    info!(loops, distinct_paths = paths.len(), "simulation finished");

    Ok(SimulationResults { paths, tasks })
}

/// Simulate a plan with its own finished tasks held fixed.
pub fn simulate_plan<R: Rng + ?Sized>(
    plan: &Plan,
    loops: usize,
    precision: Precision,
    rng: &mut R,
) -> Result<SimulationResults> {
    let chart = plan.chart();
    let round = precision.rounder();
    let slacks = compute_slack(chart, None, &round, None)?;
    let original = critical_path(chart, &slacks, &round);
    let finished = plan.finished_task_indices();
    simulate_with_precision(chart, loops, &original, &finished, precision, rng)
}

/// Per task, the number of simulated critical paths it appeared on.
pub fn critical_task_frequencies(
    paths: &BTreeMap<Vec<usize>, CriticalPathEntry>,
    chart: &Chart,
) -> Vec<CriticalPathTaskEntry> {
    let mut by_task: BTreeMap<usize, CriticalPathTaskEntry> = BTreeMap::new();
    for entry in paths.values() {
        for &task_index in &entry.critical_path {
            let Some(task) = chart.task(task_index) else {
                continue;
            };
            by_task
                .entry(task_index)
                .or_insert_with(|| CriticalPathTaskEntry {
                    task_index,
                    duration: task.duration,
                    num_times_appeared: 0,
                })
                .num_times_appeared += entry.count;
        }
    }

    let mut tasks: Vec<CriticalPathTaskEntry> = by_task.into_values().collect();
    tasks.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    tasks
}
