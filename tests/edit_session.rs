// tests/edit_session.rs
mod common;
use crate::common::{abc_chain, arrow_summary, init_tracing};

use std::error::Error;

use plandag::config::EditConfig;
use plandag::ops::{EditSession, TaskNameCounter, recipes};
use plandag::plan::Plan;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn new_tasks_are_named_from_the_session_counter() -> TestResult {
    init_tracing();
    let mut session = EditSession::new(Plan::new());

    session.insert_new_task_after(0)?;
    session.insert_new_task_after(1)?;

    let names: Vec<&str> = session
        .plan()
        .chart()
        .vertices()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["Start", "Task 1", "Task 2", "Finish"]);
    assert_eq!(session.plan().chart().vertices()[2].duration, 14.0);

    // A fresh session starts counting again.
    let mut other = EditSession::new(Plan::new());
    other.insert_new_task_after(0)?;
    assert_eq!(other.plan().chart().vertices()[1].name, "Task 1");
    Ok(())
}

#[test]
fn task_name_counter_resets() {
    let mut names = TaskNameCounter::new();
    assert_eq!(names.next_name(), "Task 1");
    assert_eq!(names.next_name(), "Task 2");
    names.reset();
    assert_eq!(names.next_name(), "Task 1");
}

#[test]
fn configured_default_duration_is_used() -> TestResult {
    init_tracing();
    let cfg = EditConfig {
        default_task_duration: 5.0,
        history_limit: 0,
    };
    let mut session = EditSession::from_config(Plan::new(), &cfg);

    session.insert_new_task_after(0)?;

    assert_eq!(session.plan().chart().vertices()[1].duration, 5.0);
    Ok(())
}

#[test]
fn undo_and_redo_walk_the_history() -> TestResult {
    init_tracing();
    let initial = Plan::new();
    let mut session = EditSession::new(initial.clone());
    assert!(!session.undo()?);
    assert!(!session.redo()?);

    session.insert_new_task_after(0)?;
    let inserted = session.plan().clone();
    assert_eq!(
        arrow_summary(&inserted),
        vec!["Start->Task 1", "Task 1->Finish"]
    );

    assert!(session.undo()?);
    assert_eq!(session.plan(), &initial);
    assert_eq!(arrow_summary(session.plan()), vec!["Start->Finish"]);
    assert!(session.can_redo());

    // Redo puts back the very same task, id included.
    assert!(session.redo()?);
    assert_eq!(session.plan(), &inserted);
    assert!(!session.can_redo());
    Ok(())
}

#[test]
fn executing_a_new_edit_clears_redo() -> TestResult {
    init_tracing();
    let mut session = EditSession::new(abc_chain());

    session.execute(&recipes::set_task_name(1, "Design"))?;
    session.undo()?;
    assert!(session.can_redo());

    session.execute(&recipes::set_task_name(2, "Build"))?;
    assert!(!session.can_redo());
    assert_eq!(session.plan().chart().vertices()[1].name, "A");
    assert_eq!(session.plan().chart().vertices()[2].name, "Build");
    Ok(())
}

#[test]
fn failed_edits_leave_plan_and_history_alone() -> TestResult {
    init_tracing();
    let mut session = EditSession::new(abc_chain());
    session.execute(&recipes::set_task_name(1, "Design"))?;
    let before = session.plan().clone();

    assert!(session.execute(&recipes::add_edge(2, 2)).is_err());
    assert!(session.execute(&recipes::delete_task(0)).is_err());

    assert_eq!(session.plan(), &before);
    assert_eq!(session.undo_depth(), 1);
    Ok(())
}

#[test]
fn history_limit_drops_the_oldest_entries() -> TestResult {
    init_tracing();
    let cfg = EditConfig {
        default_task_duration: 1.0,
        history_limit: 2,
    };
    let mut session = EditSession::from_config(Plan::new(), &cfg);

    for _ in 0..3 {
        session.insert_new_task_after(0)?;
    }
    assert_eq!(session.undo_depth(), 2);

    assert!(session.undo()?);
    assert!(session.undo()?);
    assert!(!session.undo()?);

    let chart = session.plan().chart();
    assert_eq!(chart.len(), 3);
    assert_eq!(chart.vertices()[1].name, "Task 1");
    Ok(())
}

#[test]
fn into_plan_hands_back_the_edited_plan() -> TestResult {
    init_tracing();
    let mut session = EditSession::new(abc_chain());
    session.execute(&recipes::delete_task(2))?;

    let plan = session.into_plan();

    assert_eq!(plan.chart().len(), 4);
    assert_eq!(
        arrow_summary(&plan),
        vec!["A->Finish", "C->Finish", "Start->A", "Start->C"]
    );
    Ok(())
}
