// src/plan/serialized.rs

//! JSON shape of a plan and the path from text back to a validated plan.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chart::{Chart, DirectedEdge, Task, TaskId, rationalize, validate_chart};
use crate::completion::TaskCompletion;
use crate::errors::{PlanError, Result};
use crate::plan::{
    MetricDefinition, Plan, PlanStatus, ResourceDefinition, static_metric_definitions,
    static_resource_definitions,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSerialized {
    pub vertices: Vec<Task>,
    pub edges: Vec<DirectedEdge>,
}

/// On-disk representation of a [`Plan`].
///
/// Static metric/resource definitions are implied and never written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSerialized {
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default)]
    pub task_completion: BTreeMap<TaskId, TaskCompletion>,
    pub chart: ChartSerialized,
    #[serde(default)]
    pub resource_definitions: BTreeMap<String, ResourceDefinition>,
    #[serde(default)]
    pub metric_definitions: BTreeMap<String, MetricDefinition>,
}

impl Plan {
    pub fn to_serialized(&self) -> PlanSerialized {
        PlanSerialized {
            status: self.status(),
            task_completion: self.task_completions().clone(),
            chart: ChartSerialized {
                vertices: self.chart().vertices().to_vec(),
                edges: self.chart().directed_edges(),
            },
            resource_definitions: self
                .resource_definitions()
                .iter()
                .filter(|(_, rd)| !rd.is_static)
                .map(|(k, rd)| (k.clone(), rd.clone()))
                .collect(),
            metric_definitions: self
                .metric_definitions()
                .iter()
                .filter(|(_, md)| !md.is_static)
                .map(|(k, md)| (k.clone(), md.clone()))
                .collect(),
        }
    }

    /// Rebuild a plan from its serialized shape without validating the DAG.
    pub fn from_serialized(serialized: PlanSerialized) -> Result<Self> {
        let chart = Chart::from_parts(serialized.chart.vertices, &serialized.chart.edges)?;

        let mut metric_definitions = static_metric_definitions();
        for (name, md) in serialized.metric_definitions {
            if metric_definitions.contains_key(&name) {
                warn!(metric = %name, "ignoring serialized override of a static metric");
                continue;
            }
            if md.range.min.is_nan() || md.range.max.is_nan() || md.range.min > md.range.max {
                return Err(PlanError::MalformedSerializedState(format!(
                    "metric '{name}' has an invalid range"
                )));
            }
            metric_definitions.insert(name, md);
        }

        let mut resource_definitions = static_resource_definitions();
        for (name, rd) in serialized.resource_definitions {
            if resource_definitions.contains_key(&name) {
                warn!(resource = %name, "ignoring serialized override of a static resource");
                continue;
            }
            if rd.values.is_empty() {
                return Err(PlanError::MalformedSerializedState(format!(
                    "resource '{name}' has no values"
                )));
            }
            resource_definitions.insert(name, rd);
        }

        let mut task_completion = BTreeMap::new();
        for (id, completion) in serialized.task_completion {
            if chart.index_of(&id).is_none() {
                warn!(task_id = %id, "dropping completion for a task not in the chart");
                continue;
            }
            if completion != TaskCompletion::Unstarted {
                task_completion.insert(id, completion);
            }
        }

        let mut plan = Plan::from_parts(
            chart,
            serialized.status,
            task_completion,
            metric_definitions,
            resource_definitions,
        );
        plan.apply_metrics_and_resources_to_vertices();
        Ok(plan)
    }

    /// Parse a plan from JSON, rationalize its edges and validate the chart.
    pub fn from_json_text(text: &str) -> Result<Self> {
        let serialized: PlanSerialized = serde_json::from_str(text)
            .map_err(|e| PlanError::MalformedSerializedState(e.to_string()))?;
        let mut plan = Plan::from_serialized(serialized)?;

        rationalize(plan.chart_mut());
        validate_chart(plan.chart())?;

        debug!(
            vertices = plan.chart().len(),
            edges = plan.chart().edges().len(),
            "loaded plan"
        );
        Ok(plan)
    }

    pub fn to_json_text(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_serialized()).map_err(|e| PlanError::Other(e.into()))
    }
}

/// Read and validate a plan file.
pub fn load_plan(path: impl AsRef<Path>) -> Result<Plan> {
    let contents = fs::read_to_string(path)?;
    Plan::from_json_text(&contents)
}
