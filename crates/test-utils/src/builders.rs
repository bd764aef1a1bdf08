#![allow(dead_code)]

use plandag::completion::TaskCompletion;
use plandag::ops::recipes;
use plandag::plan::Plan;
use plandag::types::{UNCERTAINTY_RESOURCE, Uncertainty};

/// Builder for `Plan` that goes through the same ops an editor would.
///
/// Tasks are referred to by name; `"Start"` and `"Finish"` name the
/// sentinels.
pub struct PlanBuilder {
    plan: Plan,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self { plan: Plan::new() }
    }

    /// Append a task just before Finish, connected to both sentinels.
    pub fn task(mut self, name: &str, duration: f64) -> Self {
        let after = self.plan.chart().len() as isize - 2;
        recipes::insert_new_empty_task_after(after, name.to_string(), duration)
            .apply_to(&mut self.plan)
            .expect("Failed to insert task from builder");
        self
    }

    /// Add `from -> to`, rationalizing around it.
    pub fn edge(mut self, from: &str, to: &str) -> Self {
        let i = self.index(from);
        let j = self.index(to);
        recipes::add_edge(i, j)
            .apply_to(&mut self.plan)
            .expect("Failed to add edge from builder");
        self
    }

    /// Add an edge between each consecutive pair of `names`.
    pub fn chain(mut self, names: &[&str]) -> Self {
        for pair in names.windows(2) {
            self = self.edge(pair[0], pair[1]);
        }
        self
    }

    pub fn completion(mut self, name: &str, completion: TaskCompletion) -> Self {
        let index = self.index(name);
        recipes::set_task_completion(index, completion)
            .apply_to(&mut self.plan)
            .expect("Failed to set completion from builder");
        self
    }

    pub fn uncertainty(mut self, name: &str, uncertainty: Uncertainty) -> Self {
        let index = self.index(name);
        recipes::set_resource_value(UNCERTAINTY_RESOURCE, uncertainty.as_str(), index)
            .apply_to(&mut self.plan)
            .expect("Failed to set uncertainty from builder");
        self
    }

    pub fn build(self) -> Plan {
        self.plan
    }

    fn index(&self, name: &str) -> isize {
        self.plan
            .chart()
            .vertices()
            .iter()
            .position(|t| t.name == name)
            .unwrap_or_else(|| panic!("no task named {name:?} in builder plan")) as isize
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the task called `name`.
pub fn index_of(plan: &Plan, name: &str) -> usize {
    plan.chart()
        .vertices()
        .iter()
        .position(|t| t.name == name)
        .unwrap_or_else(|| panic!("no task named {name:?}"))
}
