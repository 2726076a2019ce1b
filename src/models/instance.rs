use aws_sdk_ecs::types::ContainerInstance;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{arn_id, date_cell, to_chrono, Tabular};

/// An EC2 container instance registered to a cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub id: String,
    pub arn: String,
    pub ec2_instance_id: String,
    pub status: String,
    pub agent_connected: bool,
    pub running_tasks: i32,
    pub pending_tasks: i32,
    pub agent_update_status: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl From<&ContainerInstance> for Instance {
    fn from(ci: &ContainerInstance) -> Self {
        let arn = ci.container_instance_arn().unwrap_or_default().to_string();
        Self {
            id: arn_id(&arn).to_string(),
            ec2_instance_id: ci.ec2_instance_id().unwrap_or_default().to_string(),
            status: ci.status().unwrap_or("unknown").to_string(),
            agent_connected: ci.agent_connected(),
            running_tasks: ci.running_tasks_count(),
            pending_tasks: ci.pending_tasks_count(),
            agent_update_status: ci.agent_update_status().map(|s| s.as_str().to_string()),
            registered_at: ci.registered_at().and_then(to_chrono),
            arn,
        }
    }
}

impl Tabular for Instance {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "ec2_instance_id",
        "status",
        "running_tasks",
        "pending_tasks",
        "registered_at",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.ec2_instance_id.clone(),
            self.status.clone(),
            self.running_tasks.to_string(),
            self.pending_tasks.to_string(),
            date_cell(self.registered_at),
        ]
    }
}
