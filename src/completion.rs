// src/completion.rs

//! Per-task progress and the catch-up rules that derive it from "today".

use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, Result};
use crate::slack::Span;

/// Lowest and highest percent complete a started task may report.
pub const MIN_PERCENT_COMPLETE: u32 = 1;
pub const MAX_PERCENT_COMPLETE: u32 = 99;

/// Progress of a single task.
///
/// Absence of a record means [`TaskCompletion::Unstarted`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(
    tag = "stage",
    rename_all = "camelCase",
    from = "TaskCompletionSerialized"
)]
pub enum TaskCompletion {
    #[default]
    Unstarted,
    Started {
        start: f64,
        #[serde(rename = "percentComplete")]
        percent_complete: u32,
    },
    Finished {
        span: Span,
    },
}

impl TaskCompletion {
    /// Check that the fields are legal for the stage.
    pub fn validate(&self) -> Result<()> {
        match self {
            TaskCompletion::Unstarted | TaskCompletion::Finished { .. } => Ok(()),
            TaskCompletion::Started {
                start,
                percent_complete,
            } => {
                if !start.is_finite() {
                    return Err(PlanError::InvalidStageTransition(format!(
                        "started task has a non-finite start: {start}"
                    )));
                }
                if !(MIN_PERCENT_COMPLETE..=MAX_PERCENT_COMPLETE).contains(percent_complete) {
                    return Err(PlanError::InvalidStageTransition(format!(
                        "started percentComplete {percent_complete} is not in range [{MIN_PERCENT_COMPLETE}, {MAX_PERCENT_COMPLETE}]"
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            TaskCompletion::Unstarted => "unstarted",
            TaskCompletion::Started { .. } => "started",
            TaskCompletion::Finished { .. } => "finished",
        }
    }
}

/// Whether catch-up may replace `current` with a started record at
/// `new_percent_complete`.
///
/// Finished tasks are never touched and a started task's progress never goes
/// backwards.
pub fn percent_complete_should_change(new_percent_complete: u32, current: &TaskCompletion) -> bool {
    match current {
        TaskCompletion::Finished { .. } => false,
        TaskCompletion::Started {
            percent_complete, ..
        } => *percent_complete <= new_percent_complete,
        TaskCompletion::Unstarted => true,
    }
}

/// The completion a task should have on `today` if it ran exactly to plan.
///
/// Returns `None` when the current record should be left alone.
pub fn caught_up(
    today: f64,
    span: Span,
    duration: f64,
    current: &TaskCompletion,
) -> Option<TaskCompletion> {
    if today <= span.start {
        return None;
    }
    if today >= span.finish {
        return Some(TaskCompletion::Finished { span });
    }

    let raw = (100.0 * (today - span.start) / duration).floor();
    let candidate = raw.clamp(MIN_PERCENT_COMPLETE as f64, MAX_PERCENT_COMPLETE as f64) as u32;
    if percent_complete_should_change(candidate, current) {
        Some(TaskCompletion::Started {
            start: span.start,
            percent_complete: candidate,
        })
    } else {
        None
    }
}

/// Wire shape of a completion record.
///
/// Every field is optional so that malformed records read back as
/// `unstarted` instead of failing the whole plan.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskCompletionSerialized {
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    percent_complete: Option<f64>,
    #[serde(default)]
    span: Option<Span>,
}

impl From<TaskCompletionSerialized> for TaskCompletion {
    fn from(raw: TaskCompletionSerialized) -> Self {
        match raw.stage.as_deref() {
            Some("started") => match (raw.start, raw.percent_complete) {
                (Some(start), Some(pct)) if pct.is_finite() => {
                    let percent_complete = pct
                        .round()
                        .clamp(MIN_PERCENT_COMPLETE as f64, MAX_PERCENT_COMPLETE as f64)
                        as u32;
                    TaskCompletion::Started {
                        start,
                        percent_complete,
                    }
                }
                _ => TaskCompletion::Unstarted,
            },
            Some("finished") => match raw.span {
                Some(span) => TaskCompletion::Finished { span },
                None => TaskCompletion::Unstarted,
            },
            _ => TaskCompletion::Unstarted,
        }
    }
}
