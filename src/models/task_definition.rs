use aws_sdk_ecs::types::{
    ContainerDefinition as SdkContainerDefinition, LogConfiguration as SdkLogConfiguration,
    TaskDefinition as SdkTaskDefinition,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{date_cell, to_chrono, Tabular, Task};

const AWSLOGS_DRIVER: &str = "awslogs";

/// A registered task definition revision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDefinition {
    pub arn: String,
    pub family: String,
    pub revision: i32,
    pub status: String,
    pub network_mode: Option<String>,
    pub task_role_arn: Option<String>,
    pub execution_role_arn: Option<String>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub compatibilities: Vec<String>,
    pub registered_at: Option<DateTime<Utc>>,
    pub container_definitions: Vec<ContainerDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    pub essential: bool,
    pub cpu: i32,
    pub memory: Option<i32>,
    pub memory_reservation: Option<i32>,
    pub entrypoint: Vec<String>,
    pub command: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub log_configuration: Option<LogConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogConfiguration {
    pub log_driver: String,
    pub options: BTreeMap<String, String>,
}

/// Where a container's awslogs output lands.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogTarget {
    pub container: String,
    pub group: String,
    /// `None` when the stream name cannot be known yet.
    pub stream: Option<String>,
    /// `awslogs-region`, when the definition sets one.
    pub region: Option<String>,
}

impl From<&SdkTaskDefinition> for TaskDefinition {
    fn from(td: &SdkTaskDefinition) -> Self {
        Self {
            arn: td.task_definition_arn().unwrap_or_default().to_string(),
            family: td.family().unwrap_or_default().to_string(),
            revision: td.revision(),
            status: td
                .status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            network_mode: td.network_mode().map(|m| m.as_str().to_string()),
            task_role_arn: td.task_role_arn().map(str::to_string),
            execution_role_arn: td.execution_role_arn().map(str::to_string),
            cpu: td.cpu().map(str::to_string),
            memory: td.memory().map(str::to_string),
            compatibilities: td
                .compatibilities()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            registered_at: td.registered_at().and_then(to_chrono),
            container_definitions: td
                .container_definitions()
                .iter()
                .map(ContainerDefinition::from)
                .collect(),
        }
    }
}

impl From<&SdkContainerDefinition> for ContainerDefinition {
    fn from(cd: &SdkContainerDefinition) -> Self {
        Self {
            name: cd.name().unwrap_or("unknown").to_string(),
            image: cd.image().unwrap_or_default().to_string(),
            essential: cd.essential().unwrap_or(true),
            cpu: cd.cpu(),
            memory: cd.memory(),
            memory_reservation: cd.memory_reservation(),
            entrypoint: cd.entry_point().to_vec(),
            command: cd.command().to_vec(),
            environment: cd
                .environment()
                .iter()
                .filter_map(|kv| Some((kv.name()?.to_string(), kv.value().unwrap_or_default().to_string())))
                .collect(),
            log_configuration: cd.log_configuration().map(LogConfiguration::from),
        }
    }
}

impl From<&SdkLogConfiguration> for LogConfiguration {
    fn from(lc: &SdkLogConfiguration) -> Self {
        Self {
            log_driver: lc.log_driver().as_str().to_string(),
            options: lc
                .options()
                .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        }
    }
}

impl TaskDefinition {
    /// Family and revision, e.g. `web:42`.
    pub fn family_revision(&self) -> String {
        format!("{}:{}", self.family, self.revision)
    }

    /// Log group and stream of every awslogs container of `task`.
    ///
    /// With `awslogs-stream-prefix` set, streams are named
    /// `<prefix>/<container>/<task_id>`. Without it the awslogs driver names the
    /// stream after the container runtime id, which the task only reports once
    /// the container has started; until then `stream` is `None`.
    /// Containers with another log driver or without `awslogs-group` are
    /// skipped. `container` restricts the result to one container by name.
    pub fn log_targets(&self, task: &Task, container: Option<&str>) -> Vec<LogTarget> {
        self.container_definitions
            .iter()
            .filter(|cd| container.map_or(true, |name| cd.name == name))
            .filter_map(|cd| {
                let config = cd.log_configuration.as_ref()?;
                if config.log_driver != AWSLOGS_DRIVER {
                    return None;
                }
                let group = config.options.get("awslogs-group")?;
                let stream = match config.options.get("awslogs-stream-prefix") {
                    Some(prefix) => Some(format!("{prefix}/{}/{}", cd.name, task.id)),
                    None => task
                        .containers
                        .iter()
                        .find(|c| c.name == cd.name)
                        .and_then(|c| c.runtime_id.clone()),
                };
                Some(LogTarget {
                    container: cd.name.clone(),
                    group: group.clone(),
                    stream,
                    region: config.options.get("awslogs-region").cloned(),
                })
            })
            .collect()
    }
}

impl Tabular for TaskDefinition {
    const COLUMNS: &'static [&'static str] =
        &["arn", "family", "revision", "status", "network_mode", "registered_at"];

    fn row(&self) -> Vec<String> {
        vec![
            self.arn.clone(),
            self.family.clone(),
            self.revision.to_string(),
            self.status.clone(),
            self.network_mode.clone().unwrap_or_default(),
            date_cell(self.registered_at),
        ]
    }
}
