// src/chart/edge.rs

use serde::{Deserialize, Serialize};

use crate::chart::task::TaskId;

/// A dependency between two tasks, addressed by identity.
///
/// `from` must finish before `to` starts. Because the endpoints are task ids,
/// inserting or removing vertices never requires rewriting edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub from: TaskId,
    pub to: TaskId,
}

impl Edge {
    pub fn new(from: TaskId, to: TaskId) -> Self {
        Self { from, to }
    }

    pub fn touches(&self, id: &TaskId) -> bool {
        self.from == *id || self.to == *id
    }
}

/// Positional view of an [`Edge`]: indices into the chart's vertices.
///
/// This is the shape used by serialization, slack computation and any other
/// consumer that thinks in array positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub i: usize,
    pub j: usize,
}

impl DirectedEdge {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}
