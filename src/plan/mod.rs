// src/plan/mod.rs

//! The plan: a chart plus everything known about progress on it.
//!
//! - [`metrics`] defines the metric/resource schemas and rounding.
//! - [`serialized`] holds the JSON shape and the load path.

pub mod metrics;
pub mod serialized;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use metrics::{MetricDefinition, MetricRange, Precision, ResourceDefinition};
pub use serialized::{ChartSerialized, PlanSerialized};

use crate::chart::{Chart, DURATION_METRIC, Task, TaskId};
use crate::completion::TaskCompletion;
use crate::errors::{PlanError, Result};
use crate::types::{UNCERTAINTY_RESOURCE, Uncertainty};

/// Whether work on the plan has begun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum PlanStatus {
    #[default]
    Unstarted,
    /// `start` is milliseconds since the Unix epoch.
    Started { start: i64 },
}

/// How long a task takes, in whole days.
fn duration_metric_definition() -> MetricDefinition {
    let mut duration = MetricDefinition::new(0.0, MetricRange::at_least(0.0), Precision::new(0));
    duration.is_static = true;
    duration
}

/// Built-in metric definitions present in every plan.
pub fn static_metric_definitions() -> BTreeMap<String, MetricDefinition> {
    BTreeMap::from([(DURATION_METRIC.to_string(), duration_metric_definition())])
}

/// Built-in resource definitions present in every plan.
pub fn static_resource_definitions() -> BTreeMap<String, ResourceDefinition> {
    let values = Uncertainty::ALL.iter().map(|u| u.as_str().to_string()).collect();
    let mut uncertainty = ResourceDefinition::new(values);
    uncertainty.is_static = true;
    BTreeMap::from([(UNCERTAINTY_RESOURCE.to_string(), uncertainty)])
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    chart: Chart,
    status: PlanStatus,
    task_completion: BTreeMap<TaskId, TaskCompletion>,
    metric_definitions: BTreeMap<String, MetricDefinition>,
    resource_definitions: BTreeMap<String, ResourceDefinition>,
}

impl Plan {
    /// An empty plan (`Start -> Finish`) with the static definitions applied.
    pub fn new() -> Self {
        let mut plan = Self {
            chart: Chart::new(),
            status: PlanStatus::Unstarted,
            task_completion: BTreeMap::new(),
            metric_definitions: static_metric_definitions(),
            resource_definitions: static_resource_definitions(),
        };
        plan.apply_metrics_and_resources_to_vertices();
        plan
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub(crate) fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: PlanStatus) -> PlanStatus {
        std::mem::replace(&mut self.status, status)
    }

    /// A new task seeded with the default of every metric and resource.
    pub fn new_task(&self) -> Task {
        let mut task = Task::new("");
        for (name, md) in &self.metric_definitions {
            task.set_metric(name, md.default);
        }
        for (name, rd) in &self.resource_definitions {
            if let Some(value) = rd.default_value() {
                task.set_resource(name, value);
            }
        }
        task
    }

    /// Fill in every missing metric/resource value with its default.
    pub fn apply_metrics_and_resources_to_vertices(&mut self) {
        let Self {
            chart,
            metric_definitions,
            resource_definitions,
            ..
        } = self;
        for index in 0..chart.len() {
            let Some(task) = chart.task_mut(index) else {
                continue;
            };
            for (name, md) in metric_definitions.iter() {
                if name != DURATION_METRIC && !task.metrics.contains_key(name) {
                    task.set_metric(name, md.default);
                }
            }
            for (name, rd) in resource_definitions.iter() {
                if task.resource(name).is_none() {
                    if let Some(value) = rd.default_value() {
                        task.set_resource(name, value);
                    }
                }
            }
        }
    }

    /// Completion record of the task at `index`; absent records are unstarted.
    pub fn get_task_completion(&self, index: usize) -> Result<TaskCompletion> {
        let task = self
            .chart
            .task(index)
            .ok_or_else(|| PlanError::InvalidTaskId(index.to_string()))?;
        Ok(self
            .task_completion
            .get(&task.id)
            .copied()
            .unwrap_or_default())
    }

    /// Store a completion record for the task at `index`.
    ///
    /// `Unstarted` removes the record so that absence and unstarted stay one
    /// state. Returns the previous value.
    pub fn set_task_completion(
        &mut self,
        index: usize,
        completion: TaskCompletion,
    ) -> Result<TaskCompletion> {
        completion.validate()?;
        let id = self
            .chart
            .task(index)
            .ok_or_else(|| PlanError::InvalidTaskId(index.to_string()))?
            .id;
        let previous = match completion {
            TaskCompletion::Unstarted => self.task_completion.remove(&id),
            other => self.task_completion.insert(id, other),
        };
        debug!(
            task_index = index,
            task_id = %id.short(),
            stage = completion.stage(),
            "set task completion"
        );
        Ok(previous.unwrap_or_default())
    }

    pub fn completion_by_id(&self, id: &TaskId) -> Option<&TaskCompletion> {
        self.task_completion.get(id)
    }

    pub fn task_completions(&self) -> &BTreeMap<TaskId, TaskCompletion> {
        &self.task_completion
    }

    pub(crate) fn take_completion_by_id(&mut self, id: &TaskId) -> Option<TaskCompletion> {
        self.task_completion.remove(id)
    }

    pub(crate) fn restore_completion_by_id(&mut self, id: TaskId, completion: Option<TaskCompletion>) {
        match completion {
            Some(c) if c != TaskCompletion::Unstarted => {
                self.task_completion.insert(id, c);
            }
            _ => {
                self.task_completion.remove(&id);
            }
        }
    }

    pub fn metric_definitions(&self) -> &BTreeMap<String, MetricDefinition> {
        &self.metric_definitions
    }

    pub fn get_metric_definition(&self, name: &str) -> Option<&MetricDefinition> {
        self.metric_definitions.get(name)
    }

    /// The definition of the task duration metric.
    pub fn duration_definition(&self) -> MetricDefinition {
        self.metric_definitions
            .get(DURATION_METRIC)
            .cloned()
            .unwrap_or_else(duration_metric_definition)
    }

    /// Add or replace a user metric definition and seed its default on every
    /// task that lacks a value.
    pub fn set_metric_definition(&mut self, name: &str, definition: MetricDefinition) -> Result<()> {
        if self.metric_definitions.get(name).is_some_and(|md| md.is_static) {
            return Err(PlanError::ConfigError(format!(
                "metric '{name}' is static and can not be redefined"
            )));
        }
        if definition.range.min > definition.range.max {
            return Err(PlanError::ConfigError(format!(
                "metric '{name}' has an empty range [{}, {}]",
                definition.range.min, definition.range.max
            )));
        }
        self.metric_definitions.insert(name.to_string(), definition);
        self.apply_metrics_and_resources_to_vertices();
        Ok(())
    }

    /// Remove a user metric definition and its values from every task.
    pub fn delete_metric_definition(&mut self, name: &str) -> Result<()> {
        match self.metric_definitions.get(name) {
            None => Err(PlanError::UnknownMetric(name.to_string())),
            Some(md) if md.is_static => Err(PlanError::ConfigError(format!(
                "metric '{name}' is static and can not be deleted"
            ))),
            Some(_) => {
                self.metric_definitions.remove(name);
                for index in 0..self.chart.len() {
                    if let Some(task) = self.chart.task_mut(index) {
                        task.metrics.remove(name);
                    }
                }
                Ok(())
            }
        }
    }

    pub fn resource_definitions(&self) -> &BTreeMap<String, ResourceDefinition> {
        &self.resource_definitions
    }

    pub fn get_resource_definition(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resource_definitions.get(name)
    }

    /// Add or replace a user resource definition and seed its default on
    /// every task that lacks a value.
    pub fn set_resource_definition(&mut self, name: &str, definition: ResourceDefinition) -> Result<()> {
        if self.resource_definitions.get(name).is_some_and(|rd| rd.is_static) {
            return Err(PlanError::ConfigError(format!(
                "resource '{name}' is static and can not be redefined"
            )));
        }
        if definition.values.is_empty() {
            return Err(PlanError::ConfigError(format!(
                "resource '{name}' needs at least one value"
            )));
        }
        self.resource_definitions.insert(name.to_string(), definition);
        self.apply_metrics_and_resources_to_vertices();
        Ok(())
    }

    /// Remove a user resource definition and its values from every task.
    pub fn delete_resource_definition(&mut self, name: &str) -> Result<()> {
        match self.resource_definitions.get(name) {
            None => Err(PlanError::UnknownResource(name.to_string())),
            Some(rd) if rd.is_static => Err(PlanError::ConfigError(format!(
                "resource '{name}' is static and can not be deleted"
            ))),
            Some(_) => {
                self.resource_definitions.remove(name);
                for index in 0..self.chart.len() {
                    if let Some(task) = self.chart.task_mut(index) {
                        task.resources.remove(name);
                    }
                }
                Ok(())
            }
        }
    }

    /// When work on the task actually began, if it has.
    ///
    /// Suitable as an early-start override for slack computation.
    pub fn actual_start(&self, id: &TaskId) -> Option<f64> {
        match self.task_completion.get(id)? {
            TaskCompletion::Unstarted => None,
            TaskCompletion::Started { start, .. } => Some(*start),
            TaskCompletion::Finished { span } => Some(span.start),
        }
    }

    /// Indices of tasks whose completion is `finished`.
    pub fn finished_task_indices(&self) -> std::collections::HashSet<usize> {
        self.chart
            .vertices()
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                matches!(
                    self.task_completion.get(&task.id),
                    Some(TaskCompletion::Finished { .. })
                )
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn from_parts(
        chart: Chart,
        status: PlanStatus,
        task_completion: BTreeMap<TaskId, TaskCompletion>,
        metric_definitions: BTreeMap<String, MetricDefinition>,
        resource_definitions: BTreeMap<String, ResourceDefinition>,
    ) -> Self {
        Self {
            chart,
            status,
            task_completion,
            metric_definitions,
            resource_definitions,
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}
