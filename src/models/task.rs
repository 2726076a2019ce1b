use aws_sdk_ecs::types::{Container as SdkContainer, Task as SdkTask};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{arn_id, cell, date_cell, to_chrono, Tabular};

/// A running or stopped ECS task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub arn: String,
    pub task_definition: String,
    pub task_definition_arn: String,
    pub cluster_arn: String,
    pub container_instance_id: Option<String>,
    pub container_instance_arn: Option<String>,
    pub availability_zone: Option<String>,
    pub connectivity: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
    pub desired_status: String,
    pub health: String,
    pub launch_type: Option<String>,
    pub enable_execute_command: bool,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub group: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub started_by: Option<String>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub stopped_reason: Option<String>,
    pub containers: Vec<Container>,
}

/// A container within a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub id: String,
    pub arn: String,
    pub task_id: String,
    pub task_arn: String,
    pub name: String,
    pub image: String,
    pub image_digest: Option<String>,
    pub runtime_id: Option<String>,
    pub status: String,
    pub exit_code: Option<i32>,
    pub reason: Option<String>,
    pub health: String,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub memory_reservation: Option<String>,
}

impl From<&SdkTask> for Task {
    fn from(t: &SdkTask) -> Self {
        let arn = t.task_arn().unwrap_or_default().to_string();
        let task_definition_arn = t.task_definition_arn().unwrap_or_default().to_string();
        let container_instance_arn = t.container_instance_arn().map(str::to_string);
        Self {
            id: arn_id(&arn).to_string(),
            task_definition: arn_id(&task_definition_arn).to_string(),
            cluster_arn: t.cluster_arn().unwrap_or_default().to_string(),
            container_instance_id: container_instance_arn.as_deref().map(|a| arn_id(a).to_string()),
            availability_zone: t.availability_zone().map(str::to_string),
            connectivity: t.connectivity().map(|c| c.as_str().to_string()),
            created_at: t.created_at().and_then(to_chrono),
            status: t.last_status().unwrap_or("unknown").to_string(),
            desired_status: t.desired_status().unwrap_or("unknown").to_string(),
            health: t
                .health_status()
                .map(|h| h.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            launch_type: t.launch_type().map(|lt| lt.as_str().to_string()),
            enable_execute_command: t.enable_execute_command(),
            cpu: t.cpu().map(str::to_string),
            memory: t.memory().map(str::to_string),
            group: t.group().map(str::to_string),
            started_at: t.started_at().and_then(to_chrono),
            started_by: t.started_by().map(str::to_string),
            stopped_at: t.stopped_at().and_then(to_chrono),
            stopped_reason: t.stopped_reason().map(str::to_string),
            containers: t.containers().iter().map(Container::from).collect(),
            arn,
            task_definition_arn,
            container_instance_arn,
        }
    }
}

impl From<&SdkContainer> for Container {
    fn from(c: &SdkContainer) -> Self {
        let arn = c.container_arn().unwrap_or_default().to_string();
        let task_arn = c.task_arn().unwrap_or_default().to_string();
        Self {
            id: arn_id(&arn).to_string(),
            task_id: arn_id(&task_arn).to_string(),
            name: c.name().unwrap_or("unknown").to_string(),
            image: c.image().unwrap_or_default().to_string(),
            image_digest: c.image_digest().map(str::to_string),
            runtime_id: c.runtime_id().map(str::to_string),
            status: c.last_status().unwrap_or("unknown").to_string(),
            exit_code: c.exit_code(),
            reason: c.reason().map(str::to_string),
            health: c
                .health_status()
                .map(|h| h.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            cpu: c.cpu().map(str::to_string),
            memory: c.memory().map(str::to_string),
            memory_reservation: c.memory_reservation().map(str::to_string),
            arn,
            task_arn,
        }
    }
}

impl Tabular for Task {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "task_definition",
        "status",
        "health",
        "container_instance_id",
        "started_at",
        "stopped_at",
        "stopped_reason",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.task_definition.clone(),
            self.status.clone(),
            self.health.clone(),
            cell(self.container_instance_id.as_deref()),
            date_cell(self.started_at),
            date_cell(self.stopped_at),
            cell(self.stopped_reason.as_deref()),
        ]
    }
}

impl Tabular for Container {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "image", "health", "status", "exit_code", "reason"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.image.clone(),
            self.health.clone(),
            self.status.clone(),
            cell(self.exit_code),
            cell(self.reason.as_deref()),
        ]
    }
}
