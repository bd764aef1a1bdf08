use plandag::ops::Op;
use plandag::plan::Plan;

/// One step of an op round-trip test.
pub enum Step {
    /// Applied going forward, its inverse applied coming back.
    Op(Op),
    /// Runs only on the forward pass.
    Check(Box<dyn Fn(&Plan)>),
    /// Runs on both passes; the flag is `true` going forward.
    CheckBoth(Box<dyn Fn(&Plan, bool)>),
}

impl Step {
    pub fn check(f: impl Fn(&Plan) + 'static) -> Self {
        Step::Check(Box::new(f))
    }

    pub fn check_both(f: impl Fn(&Plan, bool) + 'static) -> Self {
        Step::CheckBoth(Box::new(f))
    }
}

impl From<Op> for Step {
    fn from(op: Op) -> Self {
        Step::Op(op)
    }
}

/// Apply `steps` to an empty plan, then undo them all in reverse order, and
/// assert the plan ends up equal to where it started.
///
/// Returns the plan as it was at the end of the forward pass.
pub fn test_ops_forward_and_back(steps: Vec<Step>) -> Plan {
    test_ops_forward_and_back_from(Plan::new(), steps)
}

/// Like [`test_ops_forward_and_back`], starting from `initial`.
pub fn test_ops_forward_and_back_from(initial: Plan, steps: Vec<Step>) -> Plan {
    let mut plan = initial.clone();
    let mut inverses = Vec::new();

    for step in &steps {
        match step {
            Step::Op(op) => {
                let inverse = op
                    .apply_to(&mut plan)
                    .unwrap_or_else(|e| panic!("{} failed going forward: {e}", op.name()));
                inverses.push(inverse);
            }
            Step::Check(f) => f(&plan),
            Step::CheckBoth(f) => f(&plan, true),
        }
    }
    let forward = plan.clone();

    for step in steps.iter().rev() {
        match step {
            Step::Op(op) => {
                let inverse = inverses.pop().expect("one inverse per op");
                inverse
                    .apply_to(&mut plan)
                    .unwrap_or_else(|e| panic!("undo of {} failed: {e}", op.name()));
            }
            Step::Check(_) => {}
            Step::CheckBoth(f) => f(&plan, false),
        }
    }

    assert_eq!(plan, initial, "plan did not return to its initial state");
    forward
}

/// Sorted `"From->To"` strings for every edge, by task name.
pub fn arrow_summary(plan: &Plan) -> Vec<String> {
    let vertices = plan.chart().vertices();
    let mut arrows: Vec<String> = plan
        .chart()
        .directed_edges()
        .iter()
        .map(|e| format!("{}->{}", vertices[e.i].name, vertices[e.j].name))
        .collect();
    arrows.sort();
    arrows
}
