// tests/simulation.rs
mod common;
use crate::common::{PlanBuilder, abc_chain, index_of, init_tracing};

use std::collections::HashSet;
use std::error::Error;

use plandag::chart::{Chart, DirectedEdge, Task};
use plandag::completion::TaskCompletion;
use plandag::errors::PlanError;
use plandag::plan::{Plan, Precision};
use plandag::simulation::{
    SIMULATION_PRECISION, Triangular, simulate, simulate_plan, task_uncertainty,
};
use plandag::slack::Span;
use plandag::types::{UNCERTAINTY_RESOURCE, Uncertainty};
use rand::SeedableRng;
use rand::rngs::StdRng;

type TestResult = Result<(), Box<dyn Error>>;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn triangular_bounds_follow_the_uncertainty_multiplier() {
    let dist = Triangular::for_estimate(10.0, Uncertainty::High);
    assert_eq!(dist, Triangular::new(5.0, 10.0, 20.0));

    assert!(close(dist.sample(0.0), 5.0));
    assert!(close(dist.sample(1.0), 20.0));
    assert!(close(dist.sample(1.0 / 3.0), 10.0));

    // Out of range draws are clamped.
    assert!(close(dist.sample(-0.5), 5.0));
    assert!(close(dist.sample(1.5), 20.0));
}

#[test]
fn triangular_samples_are_monotonic_in_u() {
    let dist = Triangular::for_estimate(7.0, Uncertainty::Extreme);
    let samples: Vec<f64> = (0..=100).map(|k| dist.sample(f64::from(k) / 100.0)).collect();
    for pair in samples.windows(2) {
        assert!(pair[0] <= pair[1], "{} > {}", pair[0], pair[1]);
    }
    assert!(samples.iter().all(|&s| (dist.min..=dist.max).contains(&s)));
}

#[test]
fn zero_duration_always_samples_zero() {
    let dist = Triangular::for_estimate(0.0, Uncertainty::Extreme);
    for u in [0.0, 0.25, 0.999] {
        assert_eq!(dist.sample(u), 0.0);
    }
}

#[test]
fn unknown_uncertainty_falls_back_to_low() {
    init_tracing();
    let mut task = Task::new("A");
    assert_eq!(task_uncertainty(&task), Uncertainty::Low);

    task.set_resource(UNCERTAINTY_RESOURCE, "cosmic");
    assert_eq!(task_uncertainty(&task), Uncertainty::Low);

    task.set_resource(UNCERTAINTY_RESOURCE, "Extreme");
    assert_eq!(task_uncertainty(&task), Uncertainty::Extreme);
}

/// Two parallel tasks of similar length, so either may end up critical.
fn contested() -> Plan {
    PlanBuilder::new()
        .task("A", 10.0)
        .task("B", 11.0)
        .uncertainty("A", Uncertainty::High)
        .uncertainty("B", Uncertainty::High)
        .build()
}

#[test]
fn seeded_runs_are_reproducible() -> TestResult {
    init_tracing();
    let plan = contested();

    let first = simulate_plan(&plan, 200, SIMULATION_PRECISION, &mut StdRng::seed_from_u64(7))?;
    let second = simulate_plan(&plan, 200, SIMULATION_PRECISION, &mut StdRng::seed_from_u64(7))?;

    assert_eq!(first, second);
    let total: usize = first.paths.values().map(|e| e.count).sum();
    assert_eq!(total, 200);
    assert_eq!(first.paths.len(), 2, "both tasks should be critical sometimes");
    Ok(())
}

#[test]
fn original_critical_path_is_always_reported() -> TestResult {
    init_tracing();
    let plan = abc_chain();
    let original = vec![0, 1, 2, 3, 4];

    let results = simulate(
        plan.chart(),
        0,
        &original,
        &HashSet::new(),
        &mut StdRng::seed_from_u64(1),
    )?;

    assert_eq!(results.paths.len(), 1);
    let entry = &results.paths[&original];
    assert_eq!(entry.count, 0);
    assert_eq!(entry.durations, vec![0.0, 10.0, 10.0, 10.0, 0.0]);
    Ok(())
}

#[test]
fn a_single_chain_is_always_critical() -> TestResult {
    init_tracing();
    let plan = abc_chain();

    let results = simulate_plan(&plan, 50, SIMULATION_PRECISION, &mut StdRng::seed_from_u64(3))?;

    assert_eq!(results.paths.len(), 1);
    assert_eq!(results.paths[&vec![0, 1, 2, 3, 4]].count, 50);
    for entry in &results.tasks {
        assert_eq!(entry.num_times_appeared, 50);
    }
    Ok(())
}

#[test]
fn finished_tasks_keep_their_duration() -> TestResult {
    init_tracing();
    let plan = PlanBuilder::new()
        .task("A", 10.0)
        .task("B", 10.0)
        .uncertainty("A", Uncertainty::Extreme)
        .completion(
            "A",
            TaskCompletion::Finished {
                span: Span::new(0.0, 10.0),
            },
        )
        .build();
    let a = index_of(&plan, "A");
    let b = index_of(&plan, "B");
    assert_eq!(plan.finished_task_indices(), HashSet::from([a]));

    let results = simulate_plan(&plan, 100, SIMULATION_PRECISION, &mut StdRng::seed_from_u64(11))?;

    for entry in results.paths.values() {
        assert_eq!(entry.durations[a], 10.0);
    }
    assert!(
        results.paths.values().any(|e| e.durations[b] != 10.0),
        "unfinished tasks are resampled"
    );
    Ok(())
}

#[test]
fn sampled_durations_are_rounded() -> TestResult {
    init_tracing();
    let plan = contested();

    let results = simulate_plan(&plan, 20, Precision::new(0), &mut StdRng::seed_from_u64(5))?;

    for entry in results.paths.values() {
        for d in &entry.durations {
            assert_eq!(d.fract(), 0.0, "{d} is not a whole number of days");
        }
    }
    Ok(())
}

#[test]
fn task_frequencies_are_sorted_longest_first() -> TestResult {
    init_tracing();
    let plan = PlanBuilder::new()
        .task("Short", 3.0)
        .task("Long", 30.0)
        .task("Mid", 12.0)
        .chain(&["Short", "Long", "Mid"])
        .build();

    let results = simulate_plan(&plan, 10, SIMULATION_PRECISION, &mut StdRng::seed_from_u64(9))?;

    let durations: Vec<f64> = results.tasks.iter().map(|t| t.duration).collect();
    assert_eq!(durations, vec![30.0, 12.0, 3.0, 0.0, 0.0]);
    Ok(())
}

#[test]
fn simulation_rejects_an_invalid_chart_even_with_no_loops() {
    init_tracing();
    let vertices = vec![Task::new("Start"), Task::new("A"), Task::new("Finish")];
    // A is left without a predecessor.
    let chart = Chart::from_parts(
        vertices,
        &[DirectedEdge::new(0, 2), DirectedEdge::new(1, 2)],
    )
    .expect("chart");

    match simulate(&chart, 0, &[], &HashSet::new(), &mut StdRng::seed_from_u64(1)) {
        Err(PlanError::InvalidChart(_)) => {}
        other => panic!("Expected InvalidChart, got: {:?}", other),
    }
}
