// tests/slack.rs
mod common;
use crate::common::{PlanBuilder, init_tracing};

use std::error::Error;

use plandag::chart::{Chart, DirectedEdge, Task, TaskId, rationalize};
use plandag::errors::PlanError;
use plandag::ops::{Op, SubOp, recipes};
use plandag::plan::{Plan, Precision};
use plandag::slack::{Slack, Span, compute_slack, critical_path, early_spans, zero_slack_tasks};
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

/// `A(10)` and `B(20)` both feed `C(10)`.
///
/// Vertex indices: Start 0, A 1, B 2, C 3, Finish 4.
fn diamond() -> Plan {
    PlanBuilder::new()
        .task("A", 10.0)
        .task("B", 20.0)
        .task("C", 10.0)
        .edge("A", "C")
        .edge("B", "C")
        .build()
}

fn span(start: f64, finish: f64) -> Span {
    Span::new(start, finish)
}

#[test]
fn builder_produces_the_expected_diamond() {
    init_tracing();
    let plan = diamond();
    let mut edges = plan.chart().directed_edges();
    edges.sort();
    assert_eq!(
        edges,
        vec![
            DirectedEdge::new(0, 1),
            DirectedEdge::new(0, 2),
            DirectedEdge::new(1, 3),
            DirectedEdge::new(2, 3),
            DirectedEdge::new(3, 4),
        ]
    );
}

#[test]
fn slack_without_overrides() -> TestResult {
    init_tracing();
    let plan = diamond();
    let round = Precision::new(0).rounder();

    let slacks = compute_slack(plan.chart(), None, &round, None)?;

    let expected = [
        (span(0.0, 0.0), span(0.0, 0.0), 0.0),
        (span(0.0, 10.0), span(10.0, 20.0), 10.0),
        (span(0.0, 20.0), span(0.0, 20.0), 0.0),
        (span(20.0, 30.0), span(20.0, 30.0), 0.0),
        (span(30.0, 30.0), span(30.0, 30.0), 0.0),
    ];
    for (index, (early, late, slack)) in expected.into_iter().enumerate() {
        assert_eq!(
            slacks[index],
            Slack { early, late, slack },
            "vertex {index}"
        );
    }

    assert_eq!(critical_path(plan.chart(), &slacks, &round), vec![0, 2, 3, 4]);
    assert_eq!(zero_slack_tasks(&slacks, &round), vec![0, 2, 3, 4]);
    Ok(())
}

#[test]
fn early_start_override_pins_the_task_and_releases_its_predecessors() -> TestResult {
    init_tracing();
    let plan = diamond();
    let round = Precision::new(0).rounder();
    let c_id = plan.chart().vertices()[3].id;
    let started = move |_: usize, id: &TaskId| (*id == c_id).then_some(5.0);

    let slacks = compute_slack(plan.chart(), None, &round, Some(&started))?;

    let early = [
        span(0.0, 0.0),
        span(0.0, 10.0),
        span(0.0, 20.0),
        span(5.0, 15.0),
        span(15.0, 15.0),
    ];
    assert_eq!(early_spans(&slacks), early.to_vec());
    for (index, s) in slacks.iter().enumerate() {
        assert_eq!(s.late, s.early, "vertex {index}");
        assert_eq!(s.slack, 0.0, "vertex {index}");
    }

    // No zero-gap walk exists, so the first zero-slack walk is reported.
    assert_eq!(critical_path(plan.chart(), &slacks, &round), vec![0, 1, 3, 4]);
    Ok(())
}

#[test]
fn duration_source_replaces_task_durations() -> TestResult {
    init_tracing();
    let plan = diamond();
    let round = Precision::new(0).rounder();
    let durations = [0.0, 30.0, 20.0, 10.0, 0.0];
    let duration_of = |index: usize| durations[index];

    let slacks = compute_slack(plan.chart(), Some(&duration_of), &round, None)?;

    assert_eq!(slacks[4].early, span(40.0, 40.0));
    assert_eq!(slacks[2].slack, 10.0);
    assert_eq!(critical_path(plan.chart(), &slacks, &round), vec![0, 1, 3, 4]);
    Ok(())
}

#[test]
fn rounding_is_applied_to_every_value() -> TestResult {
    init_tracing();
    let plan = PlanBuilder::new().task("A", 1.0).task("B", 1.0).chain(&["A", "B"]).build();
    let round = Precision::new(2).rounder();
    let durations = [0.0, 0.1, 0.2, 0.0];
    let duration_of = |index: usize| durations[index];

    let slacks = compute_slack(plan.chart(), Some(&duration_of), &round, None)?;

    assert_eq!(slacks[3].early.finish, 0.3);
    Ok(())
}

#[test]
fn slack_reports_cycles() -> TestResult {
    init_tracing();
    let mut plan = PlanBuilder::new()
        .task("A", 1.0)
        .task("B", 1.0)
        .chain(&["A", "B"])
        .build();
    Op::new("Loop", vec![SubOp::AddEdge { i: 2, j: 1 }]).apply_to(&mut plan)?;

    let round = Precision::new(0).rounder();
    match compute_slack(plan.chart(), None, &round, None) {
        Err(PlanError::DagCycle(msg)) => assert!(msg.contains("cycle"), "{msg}"),
        other => panic!("Expected DagCycle, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn slack_rejects_disconnected_tasks() -> TestResult {
    init_tracing();
    let mut plan = PlanBuilder::new().task("A", 1.0).build();
    Op::new("Dangle", vec![SubOp::RemoveEdge { i: 1, j: -1 }]).apply_to(&mut plan)?;

    let round = Precision::new(0).rounder();
    assert!(matches!(
        compute_slack(plan.chart(), None, &round, None),
        Err(PlanError::InvalidChart(_))
    ));

    recipes::rationalize_edges().apply_to(&mut plan)?;
    assert!(compute_slack(plan.chart(), None, &round, None).is_ok());
    Ok(())
}

/// A random DAG: `n` tasks with integer durations and forward-only edges.
fn arb_chart() -> impl Strategy<Value = Chart> {
    (1usize..8)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(0u32..20, n),
                prop::collection::vec((1usize..=n, 1usize..=n), 0..(n * 2)),
            )
        })
        .prop_map(|(durations, pairs)| {
            let n = durations.len();
            let mut vertices = vec![Task::new("Start")];
            for (k, d) in durations.iter().enumerate() {
                let mut task = Task::new(format!("T{k}"));
                task.duration = f64::from(*d);
                vertices.push(task);
            }
            vertices.push(Task::new("Finish"));

            let edges: Vec<DirectedEdge> = pairs
                .into_iter()
                .filter(|(i, j)| i < j)
                .map(|(i, j)| DirectedEdge::new(i, j))
                .collect();
            debug_assert!(edges.iter().all(|e| e.j <= n));

            let mut chart = Chart::from_parts(vertices, &edges).expect("valid parts");
            rationalize(&mut chart);
            chart
        })
}

proptest! {
    #[test]
    fn critical_path_runs_start_to_finish_through_zero_slack(chart in arb_chart()) {
        let round = Precision::new(0).rounder();
        let slacks = compute_slack(&chart, None, &round, None).expect("slack on a DAG");

        for s in &slacks {
            prop_assert!(s.slack >= 0.0);
            prop_assert!(s.late.start >= s.early.start);
        }

        let project_finish = slacks.iter().map(|s| s.early.finish).fold(0.0, f64::max);
        prop_assert_eq!(slacks[chart.finish_index()].early.finish, project_finish);

        let path = critical_path(&chart, &slacks, &round);
        prop_assert_eq!(path.first().copied(), Some(chart.start_index()));
        prop_assert_eq!(path.last().copied(), Some(chart.finish_index()));
        for v in &path {
            prop_assert_eq!(slacks[*v].slack, 0.0);
        }
        for pair in path.windows(2) {
            prop_assert_eq!(slacks[pair[1]].early.start, slacks[pair[0]].early.finish);
        }

        let path_length: f64 = path.iter().map(|&v| chart.vertices()[v].duration).sum();
        prop_assert_eq!(path_length, project_finish);
    }
}
