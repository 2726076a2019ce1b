use aws_sdk_ecs::types::{
    Deployment as SdkDeployment, Service as SdkService, ServiceEvent as SdkServiceEvent,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{arn_id, date_cell, to_chrono, Tabular};

/// An ECS service with its recent events and deployments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub arn: String,
    pub name: String,
    pub cluster_arn: String,
    pub status: String,
    pub desired: i32,
    pub running: i32,
    pub pending: i32,
    pub launch_type: String,
    pub task_definition: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub scheduling_strategy: Option<String>,
    pub enable_execute_command: bool,
    pub platform_version: Option<String>,
    pub events: Vec<ServiceEvent>,
    pub deployments: Vec<Deployment>,
}

/// A message from the ECS service scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceEvent {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub message: String,
}

/// One deployment of a service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deployment {
    pub id: String,
    pub status: String,
    pub task_definition: String,
    pub desired: i32,
    pub pending: i32,
    pub running: i32,
    pub failed: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub launch_type: Option<String>,
    pub rollout_state: Option<String>,
    pub rollout_state_reason: Option<String>,
}

impl From<&SdkService> for Service {
    fn from(s: &SdkService) -> Self {
        Self {
            arn: s.service_arn().unwrap_or_default().to_string(),
            name: s.service_name().unwrap_or("unknown").to_string(),
            cluster_arn: s.cluster_arn().unwrap_or_default().to_string(),
            status: s.status().unwrap_or("unknown").to_string(),
            desired: s.desired_count(),
            running: s.running_count(),
            pending: s.pending_count(),
            launch_type: s
                .launch_type()
                .map(|lt| lt.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            task_definition: s.task_definition().map(arn_id).unwrap_or_default().to_string(),
            created_at: s.created_at().and_then(to_chrono),
            created_by: s.created_by().map(str::to_string),
            scheduling_strategy: s.scheduling_strategy().map(|st| st.as_str().to_string()),
            enable_execute_command: s.enable_execute_command(),
            platform_version: s.platform_version().map(str::to_string),
            events: s.events().iter().map(ServiceEvent::from).collect(),
            deployments: s.deployments().iter().map(Deployment::from).collect(),
        }
    }
}

impl From<&SdkServiceEvent> for ServiceEvent {
    fn from(e: &SdkServiceEvent) -> Self {
        Self {
            id: e.id().unwrap_or_default().to_string(),
            created_at: e.created_at().and_then(to_chrono),
            message: e.message().unwrap_or_default().to_string(),
        }
    }
}

impl From<&SdkDeployment> for Deployment {
    fn from(d: &SdkDeployment) -> Self {
        Self {
            id: d.id().unwrap_or_default().to_string(),
            status: d.status().unwrap_or("unknown").to_string(),
            task_definition: d.task_definition().map(arn_id).unwrap_or_default().to_string(),
            desired: d.desired_count(),
            pending: d.pending_count(),
            running: d.running_count(),
            failed: d.failed_tasks(),
            created_at: d.created_at().and_then(to_chrono),
            updated_at: d.updated_at().and_then(to_chrono),
            launch_type: d.launch_type().map(|lt| lt.as_str().to_string()),
            rollout_state: d.rollout_state().map(|r| r.as_str().to_string()),
            rollout_state_reason: d.rollout_state_reason().map(str::to_string),
        }
    }
}

impl Tabular for Service {
    const COLUMNS: &'static [&'static str] =
        &["name", "status", "desired", "running", "pending", "launch_type"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.desired.to_string(),
            self.running.to_string(),
            self.pending.to_string(),
            self.launch_type.clone(),
        ]
    }
}

impl Tabular for ServiceEvent {
    const COLUMNS: &'static [&'static str] = &["id", "created_at", "message"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            date_cell(self.created_at),
            self.message.clone(),
        ]
    }
}

impl Tabular for Deployment {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "status",
        "desired",
        "pending",
        "running",
        "failed",
        "created_at",
        "rollout_state_reason",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.clone(),
            self.desired.to_string(),
            self.pending.to_string(),
            self.running.to_string(),
            self.failed.to_string(),
            date_cell(self.created_at),
            self.rollout_state_reason.clone().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecs::primitives::DateTime as SdkDateTime;
    use aws_sdk_ecs::types::LaunchType;

    #[test]
    fn test_service_from_sdk_with_events_and_deployments() {
        let sdk = SdkService::builder()
            .service_arn("arn:aws:ecs:us-east-1:123456789012:service/prod/web")
            .service_name("web")
            .status("ACTIVE")
            .desired_count(3)
            .running_count(2)
            .pending_count(1)
            .launch_type(LaunchType::Fargate)
            .task_definition("arn:aws:ecs:us-east-1:123456789012:task-definition/web:42")
            .enable_execute_command(true)
            .events(
                SdkServiceEvent::builder()
                    .id("evt-1")
                    .created_at(SdkDateTime::from_secs(1_704_067_200))
                    .message("(service web) has reached a steady state.")
                    .build(),
            )
            .deployments(
                SdkDeployment::builder()
                    .id("ecs-svc/123")
                    .status("PRIMARY")
                    .desired_count(3)
                    .running_count(2)
                    .pending_count(1)
                    .failed_tasks(0)
                    .build(),
            )
            .build();

        let service = Service::from(&sdk);

        assert_eq!(service.name, "web");
        assert_eq!(service.task_definition, "web:42");
        assert!(service.enable_execute_command);
        assert_eq!(service.row(), vec!["web", "ACTIVE", "3", "2", "1", "FARGATE"]);

        assert_eq!(service.events.len(), 1);
        assert_eq!(
            service.events[0].row(),
            vec!["evt-1", "2024/01/01 00:00:00", "(service web) has reached a steady state."]
        );

        assert_eq!(service.deployments[0].status, "PRIMARY");
        assert_eq!(service.deployments[0].row()[7], "");
    }

    #[test]
    fn test_service_missing_launch_type_is_unknown() {
        let service = Service::from(&SdkService::builder().service_name("daemon").build());
        assert_eq!(service.launch_type, "unknown");
        assert!(service.events.is_empty());
    }
}
