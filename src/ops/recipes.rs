// src/ops/recipes.rs

//! Compound edits built from fixed sequences of [`SubOp`]s.

use crate::chart::DURATION_METRIC;
use crate::completion::TaskCompletion;
use crate::ops::{Op, SubOp};
use crate::plan::PlanStatus;
use crate::slack::Span;

/// Hands out default task names: "Task 1", "Task 2", ...
#[derive(Debug, Default, Clone)]
pub struct TaskNameCounter {
    next: u64,
}

impl TaskNameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self) -> String {
        self.next += 1;
        format!("Task {}", self.next)
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Insert a named task of `duration` days after `index`, connected to both
/// sentinels.
pub fn insert_new_empty_task_after(index: isize, name: String, duration: f64) -> Op {
    Op::new(
        "InsertNewEmptyTaskAfter",
        vec![
            SubOp::rationalize_edges(),
            SubOp::AddTaskAfter {
                index,
                restore: None,
            },
            SubOp::SetMetricValue {
                name: DURATION_METRIC.to_string(),
                value: duration,
                index: index + 1,
            },
            SubOp::SetTaskName {
                index: index + 1,
                name,
            },
            SubOp::AddEdge { i: 0, j: index + 1 },
            SubOp::AddEdge { i: index + 1, j: -1 },
            SubOp::rationalize_edges(),
        ],
    )
}

/// Insert a zero-duration task after `index`, connected to both sentinels.
pub fn insert_new_empty_milestone_after(index: isize) -> Op {
    Op::new(
        "InsertNewEmptyMilestoneAfter",
        vec![
            SubOp::rationalize_edges(),
            SubOp::AddTaskAfter {
                index,
                restore: None,
            },
            SubOp::AddEdge { i: 0, j: index + 1 },
            SubOp::AddEdge { i: index + 1, j: -1 },
            SubOp::rationalize_edges(),
        ],
    )
}

/// Split a task into two chained copies; the copy takes over its successors.
pub fn split_task(index: isize) -> Op {
    Op::new(
        "SplitTask",
        vec![
            SubOp::DupTask { index },
            SubOp::MoveAllOutgoingEdgesFromTo {
                from: index,
                to: index + 1,
                moves: None,
            },
            SubOp::AddEdge {
                i: index,
                j: index + 1,
            },
        ],
    )
}

/// Duplicate a task, giving the copy the same predecessors and successors.
pub fn dup_task(index: isize) -> Op {
    Op::new(
        "DupTask",
        vec![
            SubOp::DupTask { index },
            SubOp::CopyAllEdgesFromTo {
                from: index,
                to: index + 1,
            },
        ],
    )
}

pub fn delete_task(index: isize) -> Op {
    Op::new(
        "DeleteTask",
        vec![
            SubOp::rationalize_edges(),
            SubOp::DeleteTask { index },
            SubOp::rationalize_edges(),
        ],
    )
}

pub fn add_edge(i: isize, j: isize) -> Op {
    Op::new(
        "AddEdge",
        vec![
            SubOp::rationalize_edges(),
            SubOp::AddEdge { i, j },
            SubOp::rationalize_edges(),
        ],
    )
}

pub fn remove_edge(i: isize, j: isize) -> Op {
    Op::new(
        "RemoveEdge",
        vec![
            SubOp::rationalize_edges(),
            SubOp::RemoveEdge { i, j },
            SubOp::rationalize_edges(),
        ],
    )
}

pub fn rationalize_edges() -> Op {
    Op::new("RationalizeEdges", vec![SubOp::rationalize_edges()])
}

pub fn set_task_name(index: isize, name: impl Into<String>) -> Op {
    Op::new(
        "SetTaskName",
        vec![SubOp::SetTaskName {
            index,
            name: name.into(),
        }],
    )
}

pub fn set_task_description(index: isize, description: impl Into<String>) -> Op {
    Op::new(
        "SetTaskDescription",
        vec![SubOp::SetTaskDescription {
            index,
            description: description.into(),
        }],
    )
}

pub fn set_metric_value(name: impl Into<String>, value: f64, index: isize) -> Op {
    Op::new(
        "SetMetricValue",
        vec![SubOp::SetMetricValue {
            name: name.into(),
            value,
            index,
        }],
    )
}

pub fn set_resource_value(name: impl Into<String>, value: impl Into<String>, index: isize) -> Op {
    Op::new(
        "SetResourceValue",
        vec![SubOp::SetResourceValue {
            name: name.into(),
            value: value.into(),
            index,
        }],
    )
}

pub fn set_task_completion(index: isize, completion: TaskCompletion) -> Op {
    Op::new(
        "SetTaskCompletion",
        vec![SubOp::SetTaskCompletion { index, completion }],
    )
}

pub fn set_plan_status(status: PlanStatus) -> Op {
    Op::new("SetPlanStatus", vec![SubOp::SetPlanStatus { status }])
}

pub fn split_duration(source: isize, target: isize) -> Op {
    Op::new(
        "SplitDuration",
        vec![SubOp::SplitDuration {
            source,
            target,
            restore: None,
        }],
    )
}

pub fn merge_duration(source: isize, target: isize) -> Op {
    Op::new(
        "MergeDuration",
        vec![SubOp::MergeDuration {
            source,
            target,
            restore: None,
        }],
    )
}

/// Bring every task's completion in line with being exactly on time `today`.
pub fn catchup(today: f64, spans: Vec<Span>) -> Op {
    Op::new("Catchup", vec![SubOp::Catchup { today, spans }])
}

pub fn catchup_task(today: f64, index: isize, span: Span) -> Op {
    Op::new("CatchupTask", vec![SubOp::CatchupTask { today, index, span }])
}

pub fn recalculate_duration(today: f64, index: isize) -> Op {
    Op::new(
        "RecalculateDuration",
        vec![SubOp::RecalculateDuration { today, index }],
    )
}
