// src/ops/sub_op.rs

//! The primitive reversible edits.
//!
//! Each [`SubOp`] variant carries exactly the data it needs to apply itself,
//! and applying it returns another `SubOp` that undoes it. Inverses that must
//! put back captured state (a deleted task, the edges a rationalize pass
//! changed, the exact edge substitutions of a move) carry that state in their
//! own fields.

use tracing::{debug, warn};

use crate::chart::{DURATION_METRIC, Edge, Task, rationalize};
use crate::completion::{TaskCompletion, caught_up};
use crate::errors::{PlanError, Result};
use crate::ops::{checked_index, edit_index, inner_index, split_duration};
use crate::plan::{Plan, PlanStatus};
use crate::slack::Span;

/// Everything needed to put a deleted task back exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredTask {
    pub task: Task,
    pub edges: Vec<Edge>,
    pub completion: Option<TaskCompletion>,
}

/// A single reversible mutation of a [`Plan`].
///
/// Indices are signed so that callers can pass `-1` where it is meaningful
/// (the Finish vertex for edges) and so that bad input is reported as an
/// out-of-range error rather than failing to construct.
#[derive(Debug, Clone, PartialEq)]
pub enum SubOp {
    /// Add `i -> j`. `-1` for either end means Finish.
    AddEdge { i: isize, j: isize },
    /// Remove `i -> j`. `-1` for either end means Finish.
    RemoveEdge { i: isize, j: isize },
    /// Insert a new task at `index + 1`, or put back a deleted one.
    AddTaskAfter {
        index: isize,
        restore: Option<Box<RestoredTask>>,
    },
    /// Remove the task at `index` with its edges and completion record.
    DeleteTask { index: isize },
    /// Insert a copy of the task at `index` (fresh id, no edges) at `index + 1`.
    DupTask { index: isize },
    /// Give `ceil(total / 2)` to `source` and `floor(total / 2)` to `target`.
    ///
    /// With `restore` set, the two durations are set to those exact values.
    SplitDuration {
        source: isize,
        target: isize,
        restore: Option<(f64, f64)>,
    },
    /// Set `source = source + target`.
    ///
    /// With `restore` set, the two durations are set to those exact values.
    MergeDuration {
        source: isize,
        target: isize,
        restore: Option<(f64, f64)>,
    },
    /// Make every edge leaving `from` leave `to` instead.
    ///
    /// `moves` holds the `(before, after)` substitutions to replay exactly;
    /// when absent they are discovered from the chart.
    MoveAllOutgoingEdgesFromTo {
        from: isize,
        to: isize,
        moves: Option<Vec<(Edge, Edge)>>,
    },
    /// Copy every edge touching `from` onto `to`, keeping direction.
    CopyAllEdgesFromTo { from: isize, to: isize },
    RemoveAllEdges { edges: Vec<Edge> },
    AddAllEdges { edges: Vec<Edge> },
    /// Reconnect tasks to the sentinels. With `restore` set, the edge list is
    /// replaced by exactly those edges instead.
    RationalizeEdges { restore: Option<Vec<Edge>> },
    SetTaskName { index: isize, name: String },
    SetTaskDescription { index: isize, description: String },
    SetMetricValue {
        name: String,
        value: f64,
        index: isize,
    },
    SetResourceValue {
        name: String,
        value: String,
        index: isize,
    },
    SetTaskCompletion {
        index: isize,
        completion: TaskCompletion,
    },
    SetPlanStatus { status: PlanStatus },
    CatchupTask { today: f64, index: isize, span: Span },
    Catchup { today: f64, spans: Vec<Span> },
    /// Put every completion record back verbatim, one per vertex.
    RestoreTaskCompletions {
        completions: Vec<TaskCompletion>,
        today: f64,
        spans: Vec<Span>,
    },
    /// Re-estimate a started task's duration from its percent complete.
    RecalculateDuration { today: f64, index: isize },
}

impl SubOp {
    pub fn rationalize_edges() -> Self {
        SubOp::RationalizeEdges { restore: None }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubOp::AddEdge { .. } => "AddEdge",
            SubOp::RemoveEdge { .. } => "RemoveEdge",
            SubOp::AddTaskAfter { .. } => "AddTaskAfter",
            SubOp::DeleteTask { .. } => "DeleteTask",
            SubOp::DupTask { .. } => "DupTask",
            SubOp::SplitDuration { .. } => "SplitDuration",
            SubOp::MergeDuration { .. } => "MergeDuration",
            SubOp::MoveAllOutgoingEdgesFromTo { .. } => "MoveAllOutgoingEdgesFromTo",
            SubOp::CopyAllEdgesFromTo { .. } => "CopyAllEdgesFromTo",
            SubOp::RemoveAllEdges { .. } => "RemoveAllEdges",
            SubOp::AddAllEdges { .. } => "AddAllEdges",
            SubOp::RationalizeEdges { .. } => "RationalizeEdges",
            SubOp::SetTaskName { .. } => "SetTaskName",
            SubOp::SetTaskDescription { .. } => "SetTaskDescription",
            SubOp::SetMetricValue { .. } => "SetMetricValue",
            SubOp::SetResourceValue { .. } => "SetResourceValue",
            SubOp::SetTaskCompletion { .. } => "SetTaskCompletion",
            SubOp::SetPlanStatus { .. } => "SetPlanStatus",
            SubOp::CatchupTask { .. } => "CatchupTask",
            SubOp::Catchup { .. } => "Catchup",
            SubOp::RestoreTaskCompletions { .. } => "RestoreTaskCompletions",
            SubOp::RecalculateDuration { .. } => "RecalculateDuration",
        }
    }

    /// Apply to `plan` in place and return the inverse.
    ///
    /// Preconditions are checked before anything is mutated, so an error
    /// leaves the plan untouched.
    pub fn apply(&self, plan: &mut Plan) -> Result<SubOp> {
        let inverse = match self {
            SubOp::AddEdge { i, j } => add_edge(plan, *i, *j)?,
            SubOp::RemoveEdge { i, j } => remove_edge(plan, *i, *j)?,
            SubOp::AddTaskAfter { index, restore } => {
                add_task_after(plan, *index, restore.as_deref())?
            }
            SubOp::DeleteTask { index } => delete_task(plan, *index)?,
            SubOp::DupTask { index } => dup_task(plan, *index)?,
            SubOp::SplitDuration {
                source,
                target,
                restore,
            } => split_or_merge(plan, *source, *target, *restore, true)?,
            SubOp::MergeDuration {
                source,
                target,
                restore,
            } => split_or_merge(plan, *source, *target, *restore, false)?,
            SubOp::MoveAllOutgoingEdgesFromTo { from, to, moves } => {
                move_all_outgoing_edges(plan, *from, *to, moves.as_deref())?
            }
            SubOp::CopyAllEdgesFromTo { from, to } => copy_all_edges(plan, *from, *to)?,
            SubOp::RemoveAllEdges { edges } => {
                let chart = plan.chart_mut();
                let removed = edges
                    .iter()
                    .filter(|e| chart.remove_edge(e))
                    .copied()
                    .collect();
                SubOp::AddAllEdges { edges: removed }
            }
            SubOp::AddAllEdges { edges } => {
                let chart = plan.chart_mut();
                let added = edges
                    .iter()
                    .filter(|e| chart.add_edge(**e))
                    .copied()
                    .collect();
                SubOp::RemoveAllEdges { edges: added }
            }
            SubOp::RationalizeEdges { restore } => rationalize_edges(plan, restore.as_ref()),
            SubOp::SetTaskName { index, name } => {
                let idx = edit_index(plan.chart(), *index)?;
                let task = task_at(plan, idx)?;
                let old = std::mem::replace(&mut task.name, name.clone());
                SubOp::SetTaskName {
                    index: *index,
                    name: old,
                }
            }
            SubOp::SetTaskDescription { index, description } => {
                let idx = edit_index(plan.chart(), *index)?;
                let task = task_at(plan, idx)?;
                let old = std::mem::replace(&mut task.description, description.clone());
                SubOp::SetTaskDescription {
                    index: *index,
                    description: old,
                }
            }
            SubOp::SetMetricValue { name, value, index } => {
                set_metric_value(plan, name, *value, *index)?
            }
            SubOp::SetResourceValue { name, value, index } => {
                set_resource_value(plan, name, value, *index)?
            }
            SubOp::SetTaskCompletion { index, completion } => {
                let idx = completion_index(*index)?;
                let previous = plan.set_task_completion(idx, *completion)?;
                SubOp::SetTaskCompletion {
                    index: *index,
                    completion: previous,
                }
            }
            SubOp::SetPlanStatus { status } => SubOp::SetPlanStatus {
                status: plan.set_status(*status),
            },
            SubOp::CatchupTask { today, index, span } => {
                catchup_task(plan, *today, *index, *span)?
            }
            SubOp::Catchup { today, spans } => catchup(plan, *today, spans)?,
            SubOp::RestoreTaskCompletions {
                completions,
                today,
                spans,
            } => restore_task_completions(plan, completions, *today, spans)?,
            SubOp::RecalculateDuration { today, index } => {
                recalculate_duration(plan, *today, *index)?
            }
        };

        debug!(sub_op = self.kind(), inverse = inverse.kind(), "applied sub-op");
        Ok(inverse)
    }
}

fn task_at(plan: &mut Plan, index: usize) -> Result<&mut Task> {
    plan.chart_mut()
        .task_mut(index)
        .ok_or_else(|| PlanError::InvalidTaskId(index.to_string()))
}

/// Resolve an edge endpoint pair, mapping `-1` to Finish.
fn edge_endpoints(plan: &Plan, i: isize, j: isize) -> Result<(usize, usize)> {
    let chart = plan.chart();
    let finish = chart.finish_index() as isize;
    let i = if i == -1 { finish } else { i };
    let j = if j == -1 { finish } else { j };

    let i = checked_index(i, 0, finish)?;
    let j = checked_index(j, 0, finish)?;
    if i == j {
        return Err(PlanError::SelfDependency(i));
    }
    Ok((i, j))
}

fn resolved_edge(plan: &Plan, i: usize, j: usize) -> Result<Edge> {
    plan.chart()
        .edge_between(i, j)
        .ok_or_else(|| PlanError::InvalidTaskId(format!("{i} -> {j}")))
}

fn add_edge(plan: &mut Plan, i: isize, j: isize) -> Result<SubOp> {
    let (from, to) = edge_endpoints(plan, i, j)?;
    let edge = resolved_edge(plan, from, to)?;
    let (i, j) = (from as isize, to as isize);
    if plan.chart_mut().add_edge(edge) {
        Ok(SubOp::RemoveEdge { i, j })
    } else {
        // Already present: undoing must not remove it.
        Ok(SubOp::AddEdge { i, j })
    }
}

fn remove_edge(plan: &mut Plan, i: isize, j: isize) -> Result<SubOp> {
    let (from, to) = edge_endpoints(plan, i, j)?;
    let edge = resolved_edge(plan, from, to)?;
    let (i, j) = (from as isize, to as isize);
    if plan.chart_mut().remove_edge(&edge) {
        Ok(SubOp::AddEdge { i, j })
    } else {
        Ok(SubOp::RemoveEdge { i, j })
    }
}

fn add_task_after(plan: &mut Plan, index: isize, restore: Option<&RestoredTask>) -> Result<SubOp> {
    let idx = edit_index(plan.chart(), index)?;
    match restore {
        Some(restored) => {
            let id = restored.task.id;
            if plan.chart().index_of(&id).is_some() {
                return Err(PlanError::InvalidTaskId(format!(
                    "{id} is already in the chart"
                )));
            }
            let chart = plan.chart_mut();
            chart.insert_task(idx + 1, restored.task.clone());
            for edge in &restored.edges {
                chart.add_edge(*edge);
            }
            plan.restore_completion_by_id(id, restored.completion);
        }
        None => {
            let task = plan.new_task();
            plan.chart_mut().insert_task(idx + 1, task);
        }
    }
    Ok(SubOp::DeleteTask { index: index + 1 })
}

fn delete_task(plan: &mut Plan, index: isize) -> Result<SubOp> {
    let idx = inner_index(plan.chart(), index)?;
    let id = plan.chart().vertices()[idx].id;
    let edges = plan.chart().edges_touching(&id);
    let completion = plan.take_completion_by_id(&id);
    let task = plan.chart_mut().remove_task(idx);

    debug!(task_index = idx, task_id = %id.short(), edges = edges.len(), "deleted task");

    Ok(SubOp::AddTaskAfter {
        index: index - 1,
        restore: Some(Box::new(RestoredTask {
            task,
            edges,
            completion,
        })),
    })
}

fn dup_task(plan: &mut Plan, index: isize) -> Result<SubOp> {
    let idx = inner_index(plan.chart(), index)?;
    let copy = plan.chart().vertices()[idx].dup();
    plan.chart_mut().insert_task(idx + 1, copy);
    Ok(SubOp::DeleteTask { index: index + 1 })
}

fn split_or_merge(
    plan: &mut Plan,
    source: isize,
    target: isize,
    restore: Option<(f64, f64)>,
    split: bool,
) -> Result<SubOp> {
    let src = inner_index(plan.chart(), source)?;
    let tgt = inner_index(plan.chart(), target)?;

    let before = (
        plan.chart().vertices()[src].duration,
        plan.chart().vertices()[tgt].duration,
    );
    let (new_source, new_target) = match restore {
        Some(exact) => exact,
        None if split => split_duration(before.0),
        None => (before.0 + before.1, before.1),
    };
    task_at(plan, src)?.duration = new_source;
    task_at(plan, tgt)?.duration = new_target;

    let restore = Some(before);
    Ok(if split {
        SubOp::MergeDuration {
            source,
            target,
            restore,
        }
    } else {
        SubOp::SplitDuration {
            source,
            target,
            restore,
        }
    })
}

fn move_all_outgoing_edges(
    plan: &mut Plan,
    from: isize,
    to: isize,
    moves: Option<&[(Edge, Edge)]>,
) -> Result<SubOp> {
    let from_idx = inner_index(plan.chart(), from)?;
    let to_idx = inner_index(plan.chart(), to)?;

    let planned: Vec<(Edge, Edge)> = match moves {
        Some(moves) => moves.to_vec(),
        None => {
            let chart = plan.chart();
            let from_id = chart.vertices()[from_idx].id;
            let to_id = chart.vertices()[to_idx].id;
            chart
                .edges()
                .iter()
                .filter(|e| e.from == from_id && e.to != to_id)
                .map(|e| (*e, Edge::new(to_id, e.to)))
                .collect()
        }
    };

    let chart = plan.chart_mut();
    let mut applied = Vec::with_capacity(planned.len());
    for (before, after) in planned {
        if chart.has_edge(&after) {
            debug!("redirected edge already present; leaving original in place");
            continue;
        }
        if chart.replace_edge(&before, after) {
            applied.push((after, before));
        } else {
            warn!("edge to move is no longer in the chart; skipping");
        }
    }

    Ok(SubOp::MoveAllOutgoingEdgesFromTo {
        from: to,
        to: from,
        moves: Some(applied),
    })
}

fn copy_all_edges(plan: &mut Plan, from: isize, to: isize) -> Result<SubOp> {
    let from_idx = edit_index(plan.chart(), from)?;
    let to_idx = edit_index(plan.chart(), to)?;

    let chart = plan.chart_mut();
    let from_id = chart.vertices()[from_idx].id;
    let to_id = chart.vertices()[to_idx].id;

    let candidates: Vec<Edge> = chart
        .edges_touching(&from_id)
        .into_iter()
        .map(|e| {
            if e.from == from_id {
                Edge::new(to_id, e.to)
            } else {
                Edge::new(e.from, to_id)
            }
        })
        .filter(|e| e.from != e.to)
        .collect();

    let added = candidates
        .into_iter()
        .filter(|e| chart.add_edge(*e))
        .collect();
    Ok(SubOp::RemoveAllEdges { edges: added })
}

fn rationalize_edges(plan: &mut Plan, restore: Option<&Vec<Edge>>) -> SubOp {
    let chart = plan.chart_mut();
    let before = chart.edges().to_vec();
    match restore {
        Some(edges) => {
            chart.set_edges(edges.clone());
            SubOp::rationalize_edges()
        }
        None => {
            if rationalize(chart) {
                SubOp::RationalizeEdges {
                    restore: Some(before),
                }
            } else {
                SubOp::rationalize_edges()
            }
        }
    }
}

fn set_metric_value(plan: &mut Plan, name: &str, value: f64, index: isize) -> Result<SubOp> {
    let idx = edit_index(plan.chart(), index)?;
    let definition = plan
        .get_metric_definition(name)
        .cloned()
        .ok_or_else(|| PlanError::UnknownMetric(name.to_string()))?;

    let task = task_at(plan, idx)?;
    let old = task.metric(name).unwrap_or(definition.default);
    task.set_metric(name, definition.clamp_and_round(value));

    Ok(SubOp::SetMetricValue {
        name: name.to_string(),
        value: old,
        index,
    })
}

fn set_resource_value(plan: &mut Plan, name: &str, value: &str, index: isize) -> Result<SubOp> {
    let idx = edit_index(plan.chart(), index)?;
    let definition = plan
        .get_resource_definition(name)
        .cloned()
        .ok_or_else(|| PlanError::UnknownResource(name.to_string()))?;
    if !definition.allows(value) {
        return Err(PlanError::UnknownResource(format!(
            "'{value}' is not a value of resource '{name}'"
        )));
    }

    let task = task_at(plan, idx)?;
    let old = task
        .resource(name)
        .or(definition.default_value())
        .unwrap_or(value)
        .to_string();
    task.set_resource(name, value);

    Ok(SubOp::SetResourceValue {
        name: name.to_string(),
        value: old,
        index,
    })
}

fn completion_index(index: isize) -> Result<usize> {
    usize::try_from(index).map_err(|_| PlanError::InvalidTaskId(index.to_string()))
}

fn catchup_task(plan: &mut Plan, today: f64, index: isize, span: Span) -> Result<SubOp> {
    let idx = completion_index(index)?;
    let original = plan.get_task_completion(idx)?;
    let duration = plan.chart().vertices()[idx].duration;

    if let Some(updated) = caught_up(today, span, duration, &original) {
        plan.set_task_completion(idx, updated)?;
    }

    Ok(SubOp::SetTaskCompletion {
        index,
        completion: original,
    })
}

fn catchup(plan: &mut Plan, today: f64, spans: &[Span]) -> Result<SubOp> {
    let n = plan.chart().len();
    if spans.len() != n {
        return Err(PlanError::SpanMismatch {
            expected: n,
            got: spans.len(),
        });
    }

    let originals = (0..n)
        .map(|index| plan.get_task_completion(index))
        .collect::<Result<Vec<_>>>()?;

    let vertices = plan.chart().vertices();
    let updates: Vec<(usize, TaskCompletion)> = spans
        .iter()
        .enumerate()
        .filter_map(|(index, span)| {
            caught_up(today, *span, vertices[index].duration, &originals[index])
                .map(|updated| (index, updated))
        })
        .collect();
    // Every record is checked before any is written.
    for (_, updated) in &updates {
        updated.validate()?;
    }

    let changed = updates.len();
    for (index, updated) in updates {
        plan.set_task_completion(index, updated)?;
    }
    debug!(today, tasks = n, changed, "caught up plan");

    Ok(SubOp::RestoreTaskCompletions {
        completions: originals,
        today,
        spans: spans.to_vec(),
    })
}

fn restore_task_completions(
    plan: &mut Plan,
    completions: &[TaskCompletion],
    today: f64,
    spans: &[Span],
) -> Result<SubOp> {
    let n = plan.chart().len();
    if completions.len() != n {
        return Err(PlanError::SpanMismatch {
            expected: n,
            got: completions.len(),
        });
    }
    for completion in completions {
        completion.validate()?;
    }
    for (index, completion) in completions.iter().enumerate() {
        plan.set_task_completion(index, *completion)?;
    }
    Ok(SubOp::Catchup {
        today,
        spans: spans.to_vec(),
    })
}

fn recalculate_duration(plan: &mut Plan, today: f64, index: isize) -> Result<SubOp> {
    let idx = edit_index(plan.chart(), index)?;
    let (start, percent_complete) = match plan.get_task_completion(idx)? {
        TaskCompletion::Started {
            start,
            percent_complete,
        } => (start, percent_complete),
        other => {
            return Err(PlanError::InvalidStageTransition(format!(
                "recalculating duration can only be applied to started tasks, task {idx} is {}",
                other.stage()
            )));
        }
    };

    // percent_complete is at least 1 for started tasks.
    let raw = (today - start) / (f64::from(percent_complete) / 100.0);
    let definition = plan.duration_definition();
    let task = task_at(plan, idx)?;
    let original = task.duration;
    task.duration = definition.clamp_and_round(raw);

    debug!(
        task_index = idx,
        original,
        recalculated = task.duration,
        "recalculated task duration"
    );

    Ok(SubOp::SetMetricValue {
        name: DURATION_METRIC.to_string(),
        value: original,
        index,
    })
}
