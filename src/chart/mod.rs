// src/chart/mod.rs

//! The task graph.
//!
//! - [`task`] holds the vertex type and its stable id.
//! - [`edge`] holds the id-addressed [`Edge`] and its positional
//!   [`DirectedEdge`] view.
//! - [`rationalize`] restores connectivity to the Start/Finish sentinels.
//! - [`validate`] checks the DAG invariants and yields a topological order.

pub mod edge;
pub mod rationalize;
pub mod task;
pub mod validate;

use std::collections::{HashMap, HashSet};

pub use edge::{DirectedEdge, Edge};
pub use rationalize::rationalize;
pub use task::{DURATION_METRIC, Task, TaskId};
pub use validate::validate_chart;

use crate::errors::{PlanError, Result};

/// Positional adjacency lists, in edge discovery order.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    /// `by_src[i]` lists the successors of vertex `i`.
    pub by_src: Vec<Vec<usize>>,
    /// `by_dst[j]` lists the predecessors of vertex `j`.
    pub by_dst: Vec<Vec<usize>>,
}

/// An ordered sequence of tasks bounded by the Start (first) and Finish
/// (last) sentinels, plus the dependencies between them.
#[derive(Debug, Clone)]
pub struct Chart {
    vertices: Vec<Task>,
    edges: Vec<Edge>,
}

impl Chart {
    /// An empty chart: `Start -> Finish`.
    pub fn new() -> Self {
        let start = Task::new("Start");
        let finish = Task::new("Finish");
        let edges = vec![Edge::new(start.id, finish.id)];
        Self {
            vertices: vec![start, finish],
            edges,
        }
    }

    /// Build a chart from serialized vertices and positional edges.
    ///
    /// Only structural sanity is checked here; DAG rules are left to
    /// [`validate_chart`].
    pub fn from_parts(vertices: Vec<Task>, edges: &[DirectedEdge]) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(PlanError::MalformedSerializedState(format!(
                "a chart needs at least the Start and Finish vertices, got {}",
                vertices.len()
            )));
        }

        let mut seen = HashSet::new();
        for task in &vertices {
            if !seen.insert(task.id) {
                return Err(PlanError::MalformedSerializedState(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
        }

        let mut chart = Self {
            vertices,
            edges: Vec::with_capacity(edges.len()),
        };
        let n = chart.vertices.len();
        for e in edges {
            if e.i >= n || e.j >= n {
                return Err(PlanError::MalformedSerializedState(format!(
                    "edge ({}, {}) is not in range [0, {}]",
                    e.i,
                    e.j,
                    n - 1
                )));
            }
            if e.i == e.j {
                return Err(PlanError::MalformedSerializedState(format!(
                    "edge ({}, {}) is a self dependency",
                    e.i, e.j
                )));
            }
            let edge = Edge::new(chart.vertices[e.i].id, chart.vertices[e.j].id);
            chart.add_edge(edge);
        }
        Ok(chart)
    }

    pub fn vertices(&self) -> &[Task] {
        &self.vertices
    }

    /// Number of vertices, sentinels included.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false: a chart holds at least its two sentinels.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn start_index(&self) -> usize {
        0
    }

    pub fn finish_index(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.vertices.get(index)
    }

    pub(crate) fn task_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.vertices.get_mut(index)
    }

    pub fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.vertices.iter().position(|t| t.id == *id)
    }

    /// Map from task id to current position.
    pub fn positions(&self) -> HashMap<TaskId, usize> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(index, task)| (task.id, index))
            .collect()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The edges as index pairs, in discovery order.
    pub fn directed_edges(&self) -> Vec<DirectedEdge> {
        let positions = self.positions();
        self.edges
            .iter()
            .filter_map(|e| {
                let i = positions.get(&e.from)?;
                let j = positions.get(&e.to)?;
                Some(DirectedEdge::new(*i, *j))
            })
            .collect()
    }

    pub fn adjacency(&self) -> Adjacency {
        let n = self.vertices.len();
        let mut adj = Adjacency {
            by_src: vec![Vec::new(); n],
            by_dst: vec![Vec::new(); n],
        };
        for e in self.directed_edges() {
            adj.by_src[e.i].push(e.j);
            adj.by_dst[e.j].push(e.i);
        }
        adj
    }

    pub fn has_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Edges with `id` at either end, in discovery order.
    pub fn edges_touching(&self, id: &TaskId) -> Vec<Edge> {
        self.edges.iter().filter(|e| e.touches(id)).copied().collect()
    }

    /// Returns `false` if the edge was already present.
    pub(crate) fn add_edge(&mut self, edge: Edge) -> bool {
        if self.has_edge(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Returns `false` if the edge was not present.
    pub(crate) fn remove_edge(&mut self, edge: &Edge) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e != edge);
        before != self.edges.len()
    }

    /// Swap `old` for `new` in place, keeping discovery order.
    pub(crate) fn replace_edge(&mut self, old: &Edge, new: Edge) -> bool {
        match self.edges.iter().position(|e| e == old) {
            Some(pos) => {
                self.edges[pos] = new;
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert_task(&mut self, index: usize, task: Task) {
        self.vertices.insert(index, task);
    }

    /// Remove the task at `index` together with every edge touching it.
    pub(crate) fn remove_task(&mut self, index: usize) -> Task {
        let task = self.vertices.remove(index);
        self.edges.retain(|e| !e.touches(&task.id));
        task
    }

    /// Edge ids for a positional pair, or `None` if either index is stale.
    pub(crate) fn edge_between(&self, i: usize, j: usize) -> Option<Edge> {
        let from = self.vertices.get(i)?.id;
        let to = self.vertices.get(j)?.id;
        Some(Edge::new(from, to))
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertices compare in order; edges compare as a set.
impl PartialEq for Chart {
    fn eq(&self, other: &Self) -> bool {
        if self.vertices != other.vertices {
            return false;
        }
        let mut ours = self.directed_edges();
        let mut theirs = other.directed_edges();
        ours.sort();
        theirs.sort();
        ours == theirs
    }
}
