// tests/property_undo.rs
mod common;
use crate::common::abc_chain;

use proptest::prelude::*;
use plandag::completion::TaskCompletion;
use plandag::ops::{EditSession, Op, recipes};
use plandag::plan::Plan;

// Indices deliberately run past both ends of the chart so that a good share
// of the generated edits fail their range checks.
fn index() -> impl Strategy<Value = isize> {
    -2isize..8
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (index(), 0u32..30).prop_map(|(i, d)| {
            recipes::insert_new_empty_task_after(i, format!("T{i}"), f64::from(d))
        }),
        index().prop_map(recipes::split_task),
        index().prop_map(recipes::dup_task),
        index().prop_map(recipes::delete_task),
        (index(), index()).prop_map(|(i, j)| recipes::add_edge(i, j)),
        (index(), index()).prop_map(|(i, j)| recipes::remove_edge(i, j)),
        (index(), index(), any::<bool>()).prop_map(|(s, t, split)| {
            if split {
                recipes::split_duration(s, t)
            } else {
                recipes::merge_duration(s, t)
            }
        }),
        (index(), 0u32..40, any::<bool>()).prop_map(|(i, v, rename)| {
            if rename {
                recipes::set_task_name(i, format!("renamed {v}"))
            } else {
                recipes::set_metric_value("Duration", f64::from(v), i)
            }
        }),
        (index(), 0u32..=100, 0u32..20).prop_map(|(i, pct, start)| {
            recipes::set_task_completion(
                i,
                TaskCompletion::Started {
                    start: f64::from(start),
                    percent_complete: pct,
                },
            )
        }),
        (index(), 0u32..40).prop_map(|(i, today)| recipes::recalculate_duration(f64::from(today), i)),
    ]
}

proptest! {
    #[test]
    fn failed_ops_leave_the_plan_unchanged_and_undo_restores_everything(
        ops in proptest::collection::vec(op_strategy(), 1..30)
    ) {
        let initial = abc_chain();
        let mut plan = initial.clone();
        let mut inverses = Vec::new();

        for op in &ops {
            let before = plan.clone();
            match op.apply_atomically(&mut plan) {
                Ok(inverse) => inverses.push(inverse),
                Err(_) => prop_assert_eq!(&plan, &before, "{} failed but changed the plan", op.name()),
            }
        }

        while let Some(inverse) = inverses.pop() {
            let result = inverse.apply_to(&mut plan);
            prop_assert!(result.is_ok(), "undo of {} failed: {:?}", inverse.name(), result.err());
        }
        prop_assert_eq!(plan, initial);
    }

    #[test]
    fn session_undo_then_redo_returns_to_the_edited_plan(
        ops in proptest::collection::vec(op_strategy(), 1..20)
    ) {
        let initial = abc_chain();
        let mut session = EditSession::new(initial.clone());
        for op in &ops {
            let _ = session.execute(op);
        }
        let edited: Plan = session.plan().clone();

        let mut undone = 0;
        while session.undo().expect("undo") {
            undone += 1;
        }
        prop_assert_eq!(session.plan(), &initial);

        for _ in 0..undone {
            prop_assert!(session.redo().expect("redo"));
        }
        prop_assert!(!session.can_redo());
        prop_assert_eq!(session.plan(), &edited);
    }
}
