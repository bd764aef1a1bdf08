// src/chart/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::chart::Chart;
use crate::errors::{PlanError, Result};

/// Check the chart's DAG invariants and return a topological order of its
/// vertex indices.
///
/// - Start has no incoming edges and Finish has no outgoing edges.
/// - Start and Finish take no time.
/// - Every vertex other than Start has a predecessor and every vertex other
///   than Finish has a successor, which together with acyclicity means every
///   vertex lies on a Start..Finish path.
/// - There are no cycles.
pub fn validate_chart(chart: &Chart) -> Result<Vec<usize>> {
    let n = chart.len();
    if n < 2 {
        return Err(PlanError::InvalidChart(format!(
            "a chart needs at least the Start and Finish vertices, got {n}"
        )));
    }
    let start = chart.start_index();
    let finish = chart.finish_index();

    // Edge direction: i -> j, "i must finish before j starts".
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for index in 0..n {
        graph.add_node(index);
    }
    let adj = chart.adjacency();
    for (i, successors) in adj.by_src.iter().enumerate() {
        for &j in successors {
            graph.add_edge(i, j, ());
        }
    }

    // A topological sort will fail if there is a cycle.
    let order = match toposort(&graph, None) {
        Ok(order) => order,
        Err(cycle) => {
            let node = cycle.node_id();
            let name = chart.task(node).map(|t| t.name.as_str()).unwrap_or("");
            return Err(PlanError::DagCycle(format!(
                "cycle detected in chart involving task {node} ('{name}')"
            )));
        }
    };

    if !adj.by_dst[start].is_empty() {
        return Err(PlanError::InvalidChart(
            "Start must not have any predecessors".to_string(),
        ));
    }
    if !adj.by_src[finish].is_empty() {
        return Err(PlanError::InvalidChart(
            "Finish must not have any successors".to_string(),
        ));
    }
    for sentinel in [start, finish] {
        if let Some(task) = chart.task(sentinel) {
            if task.duration != 0.0 {
                return Err(PlanError::InvalidChart(format!(
                    "{} must have zero duration, got {}",
                    task.name, task.duration
                )));
            }
        }
    }
    for index in 0..n {
        let name = chart.task(index).map(|t| t.name.as_str()).unwrap_or("");
        if index != start && adj.by_dst[index].is_empty() {
            return Err(PlanError::InvalidChart(format!(
                "task {index} ('{name}') has no predecessors"
            )));
        }
        if index != finish && adj.by_src[index].is_empty() {
            return Err(PlanError::InvalidChart(format!(
                "task {index} ('{name}') has no successors"
            )));
        }
    }

    Ok(order)
}
