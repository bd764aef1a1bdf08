// src/ops/session.rs

use std::collections::VecDeque;

use tracing::debug;

use crate::config::model::EditConfig;
use crate::errors::Result;
use crate::ops::recipes::{self, TaskNameCounter};
use crate::ops::{DEFAULT_TASK_DURATION, Op};
use crate::plan::Plan;

/// A plan being edited, with undo/redo history.
///
/// Every edit goes through [`Op::apply_atomically`], so a failed edit leaves
/// both the plan and the history untouched.
#[derive(Debug)]
pub struct EditSession {
    plan: Plan,
    names: TaskNameCounter,
    default_task_duration: f64,
    /// Maximum number of undo entries kept; 0 means unlimited.
    history_limit: usize,
    /// Inverses of executed ops, oldest first.
    undo: VecDeque<Op>,
    /// Inverses of undone ops, most recent last.
    redo: Vec<Op>,
}

impl EditSession {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            names: TaskNameCounter::new(),
            default_task_duration: DEFAULT_TASK_DURATION,
            history_limit: 0,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    /// Construct a session using the `[edit]` section of the configuration.
    pub fn from_config(plan: Plan, cfg: &EditConfig) -> Self {
        let mut session = Self::new(plan);
        session.default_task_duration = cfg.default_task_duration;
        session.history_limit = cfg.history_limit;
        session
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Apply `op` and record its inverse. Clears the redo stack.
    pub fn execute(&mut self, op: &Op) -> Result<()> {
        let inverse = op.apply_atomically(&mut self.plan)?;
        self.redo.clear();
        self.push_undo(inverse);
        debug!(op = op.name(), undo_depth = self.undo.len(), "executed op");
        Ok(())
    }

    /// Undo the most recent op. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(inverse) = self.undo.pop_back() else {
            return Ok(false);
        };
        match inverse.apply_atomically(&mut self.plan) {
            Ok(redo) => {
                debug!(op = inverse.name(), "undid op");
                self.redo.push(redo);
                Ok(true)
            }
            Err(err) => {
                self.undo.push_back(inverse);
                Err(err)
            }
        }
    }

    /// Redo the most recently undone op. Returns `false` if there was nothing
    /// to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(op) = self.redo.pop() else {
            return Ok(false);
        };
        match op.apply_atomically(&mut self.plan) {
            Ok(inverse) => {
                debug!(op = op.name(), "redid op");
                self.push_undo(inverse);
                Ok(true)
            }
            Err(err) => {
                self.redo.push(op);
                Err(err)
            }
        }
    }

    /// Insert a new task after `index`, named from the session counter and
    /// given the configured default duration.
    pub fn insert_new_task_after(&mut self, index: isize) -> Result<()> {
        let name = self.names.next_name();
        let op = recipes::insert_new_empty_task_after(index, name, self.default_task_duration);
        self.execute(&op)
    }

    fn push_undo(&mut self, inverse: Op) {
        self.undo.push_back(inverse);
        if self.history_limit > 0 && self.undo.len() > self.history_limit {
            debug!(
                history_limit = self.history_limit,
                "history limit reached; dropping oldest undo entries"
            );
            while self.undo.len() > self.history_limit {
                self.undo.pop_front();
            }
        }
    }
}
