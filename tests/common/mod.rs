#![allow(dead_code)]

pub use plandag_test_utils::builders::{self, PlanBuilder, index_of};
pub use plandag_test_utils::ops_harness::{
    Step, arrow_summary, test_ops_forward_and_back, test_ops_forward_and_back_from,
};
pub use plandag_test_utils::init_tracing;

use plandag::plan::{Plan, Precision};
use plandag::slack::{Span, compute_slack, early_spans};

/// `Start -> A -> B -> C -> Finish`, each task 10 days long.
pub fn abc_chain() -> Plan {
    PlanBuilder::new()
        .task("A", 10.0)
        .task("B", 10.0)
        .task("C", 10.0)
        .chain(&["A", "B", "C"])
        .build()
}

/// Early spans of every vertex, in whole days.
pub fn spans_of(plan: &Plan) -> Vec<Span> {
    let round = Precision::new(0).rounder();
    let slacks = compute_slack(plan.chart(), None, &round, None).expect("slack");
    early_spans(&slacks)
}
