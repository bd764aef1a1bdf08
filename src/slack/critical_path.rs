// src/slack/critical_path.rs

use crate::chart::Chart;
use crate::slack::Slack;

/// Indices of every vertex with zero slack.
pub fn zero_slack_tasks(slacks: &[Slack], round: &dyn Fn(f64) -> f64) -> Vec<usize> {
    slacks
        .iter()
        .enumerate()
        .filter(|(_, s)| is_zero(round(s.slack)))
        .map(|(index, _)| index)
        .collect()
}

/// The walk from Start to Finish through zero-slack vertices.
///
/// Successors are tried in edge discovery order and edges where the
/// successor starts exactly when the current vertex finishes are preferred,
/// so the result is deterministic. When early-start overrides leave no such
/// walk, the first walk through any zero-slack successors is returned.
/// Returns an empty path if no zero-slack walk reaches Finish.
pub fn critical_path(chart: &Chart, slacks: &[Slack], round: &dyn Fn(f64) -> f64) -> Vec<usize> {
    let by_src = chart.adjacency().by_src;
    let finish = chart.finish_index();
    let zero = |v: usize| is_zero(round(slacks[v].slack));

    let tight = |v: usize, s: usize| {
        zero(s) && is_zero(round(slacks[s].early.start - slacks[v].early.finish))
    };
    if let Some(path) = walk(&by_src, chart.start_index(), finish, &zero, &tight) {
        return path;
    }

    let loose = |_: usize, s: usize| zero(s);
    walk(&by_src, chart.start_index(), finish, &zero, &loose).unwrap_or_default()
}

/// Depth-first search for the first path from `start` to `finish` following
/// edges accepted by `follow`.
fn walk(
    by_src: &[Vec<usize>],
    start: usize,
    finish: usize,
    zero: &dyn Fn(usize) -> bool,
    follow: &dyn Fn(usize, usize) -> bool,
) -> Option<Vec<usize>> {
    if !zero(start) {
        return None;
    }

    // Vertices already known not to reach Finish.
    let mut dead = vec![false; by_src.len()];
    let mut path = vec![start];
    // Next successor position to try for each vertex on the path.
    let mut cursor = vec![0usize];

    while let Some(&v) = path.last() {
        if v == finish {
            return Some(path);
        }
        let depth = path.len() - 1;
        let next = by_src[v]
            .iter()
            .enumerate()
            .skip(cursor[depth])
            .find(|&(_, &s)| !dead[s] && follow(v, s));

        match next {
            Some((pos, &s)) => {
                cursor[depth] = pos + 1;
                path.push(s);
                cursor.push(0);
            }
            None => {
                dead[v] = true;
                path.pop();
                cursor.pop();
            }
        }
    }

    None
}

fn is_zero(value: f64) -> bool {
    value.abs() < f64::EPSILON
}
