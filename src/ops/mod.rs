// src/ops/mod.rs

//! Reversible editing of a [`Plan`].
//!
//! - [`sub_op`] holds the primitive edits and their inverses.
//! - [`recipes`] builds the compound [`Op`]s an editor exposes.
//! - [`session`] keeps undo/redo history for a plan being edited.

pub mod recipes;
pub mod session;
pub mod sub_op;

use tracing::{debug, warn};

pub use recipes::TaskNameCounter;
pub use session::EditSession;
pub use sub_op::{RestoredTask, SubOp};

use crate::chart::Chart;
use crate::errors::{PlanError, Result};
use crate::plan::Plan;

/// Duration, in days, given to tasks inserted by the editor.
pub const DEFAULT_TASK_DURATION: f64 = 14.0;

/// Split a duration into `(ceil(total / 2), floor(total / 2))`.
pub fn split_duration(total: f64) -> (f64, f64) {
    let half = total / 2.0;
    (half.ceil(), half.floor())
}

/// Check `index` against the closed interval `[min, max]`.
pub(crate) fn checked_index(index: isize, min: usize, max: isize) -> Result<usize> {
    if index < min as isize || index > max {
        return Err(PlanError::out_of_range(index, min, max));
    }
    Ok(index as usize)
}

/// Any vertex but Finish: `[0, n - 2]`.
pub(crate) fn edit_index(chart: &Chart, index: isize) -> Result<usize> {
    checked_index(index, 0, chart.len() as isize - 2)
}

/// A real task, never a sentinel: `[1, n - 2]`.
pub(crate) fn inner_index(chart: &Chart, index: isize) -> Result<usize> {
    checked_index(index, 1, chart.len() as isize - 2)
}

/// A named, ordered list of [`SubOp`]s applied as one user-visible edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    name: String,
    sub_ops: Vec<SubOp>,
}

impl Op {
    pub fn new(name: impl Into<String>, sub_ops: Vec<SubOp>) -> Self {
        Self {
            name: name.into(),
            sub_ops,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sub_ops(&self) -> &[SubOp] {
        &self.sub_ops
    }

    /// Apply every sub-op in order and return the inverse [`Op`].
    ///
    /// Stops at the first failing sub-op and returns its error. Sub-ops that
    /// were already applied stay applied; use [`Op::apply_atomically`] when
    /// the plan must be left unchanged on failure.
    pub fn apply_to(&self, plan: &mut Plan) -> Result<Op> {
        let mut inverses = Vec::with_capacity(self.sub_ops.len());
        for sub_op in &self.sub_ops {
            inverses.push(sub_op.apply(plan)?);
        }
        Ok(self.inverse_from(inverses))
    }

    /// Like [`Op::apply_to`], but on failure the inverses of the sub-ops
    /// applied so far are replayed, newest first, before the error is
    /// returned.
    pub fn apply_atomically(&self, plan: &mut Plan) -> Result<Op> {
        let mut inverses = Vec::with_capacity(self.sub_ops.len());
        for (step, sub_op) in self.sub_ops.iter().enumerate() {
            match sub_op.apply(plan) {
                Ok(inverse) => inverses.push(inverse),
                Err(err) => {
                    debug!(op = %self.name, step, error = %err, "op failed; rolling back");
                    for inverse in inverses.iter().rev() {
                        if let Err(rollback_err) = inverse.apply(plan) {
                            warn!(
                                op = %self.name,
                                sub_op = inverse.kind(),
                                error = %rollback_err,
                                "rollback step failed"
                            );
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(self.inverse_from(inverses))
    }

    fn inverse_from(&self, mut inverses: Vec<SubOp>) -> Op {
        inverses.reverse();
        Op {
            name: self.name.clone(),
            sub_ops: inverses,
        }
    }
}
