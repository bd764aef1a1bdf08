// src/chart/rationalize.rs

//! Keeps every task connected to the Start and Finish sentinels.
//!
//! After a structural edit a task may be left without predecessors or
//! successors, or may carry a sentinel edge that another edge has made
//! redundant. [`rationalize`] fixes both:
//!
//! - a non-Finish vertex with no outgoing edge gets `v -> Finish`;
//! - a vertex with several outgoing edges drops its `v -> Finish`;
//! - the same rules apply to incoming edges relative to Start;
//! - a chart with no edges at all gets `Start -> Finish`.

use tracing::{debug, warn};

use crate::chart::Chart;

/// Upper bound on rationalization rounds. The passes reach their fixpoint in
/// at most three rounds; the bound only guards against a logic error.
const MAX_ROUNDS: usize = 8;

/// Rationalize the chart's edges in place. Returns `true` if anything changed.
///
/// The result is a fixpoint, so applying this twice is the same as applying
/// it once.
pub fn rationalize(chart: &mut Chart) -> bool {
    let before = chart.edges().to_vec();

    let mut rounds = 0;
    while rationalize_once(chart) {
        rounds += 1;
        if rounds >= MAX_ROUNDS {
            warn!(rounds, "rationalize did not settle; stopping");
            break;
        }
    }

    if chart.edges().is_empty() {
        let (start, finish) = (chart.start_index(), chart.finish_index());
        if let Some(edge) = chart.edge_between(start, finish) {
            chart.add_edge(edge);
        }
    }

    let changed = before.as_slice() != chart.edges();
    if changed {
        debug!(
            edges_before = before.len(),
            edges_after = chart.edges().len(),
            "rationalized chart edges"
        );
    }
    changed
}

/// One outgoing pass followed by one incoming pass.
fn rationalize_once(chart: &mut Chart) -> bool {
    let start = chart.start_index();
    let finish = chart.finish_index();
    let mut changed = false;

    let adj = chart.adjacency();
    for i in start..finish {
        let destinations = &adj.by_src[i];
        if destinations.is_empty() {
            if let Some(edge) = chart.edge_between(i, finish) {
                changed |= chart.add_edge(edge);
            }
        } else if destinations.len() > 1 && destinations.contains(&finish) {
            if let Some(edge) = chart.edge_between(i, finish) {
                changed |= chart.remove_edge(&edge);
            }
        }
    }

    let adj = chart.adjacency();
    for j in (start + 1)..finish {
        let sources = &adj.by_dst[j];
        if sources.is_empty() {
            if let Some(edge) = chart.edge_between(start, j) {
                changed |= chart.add_edge(edge);
            }
        } else if sources.len() > 1 && sources.contains(&start) {
            if let Some(edge) = chart.edge_between(start, j) {
                changed |= chart.remove_edge(&edge);
            }
        }
    }

    changed
}
