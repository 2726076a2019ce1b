use aws_sdk_ecs::types::Cluster as SdkCluster;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Tabular;

/// An ECS cluster and its headline counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub arn: String,
    pub name: String,
    pub status: String,
    pub instances: i32,
    pub services: i32,
    pub running_tasks: i32,
    pub pending_tasks: i32,
    pub capacity_providers: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

impl From<&SdkCluster> for Cluster {
    fn from(c: &SdkCluster) -> Self {
        Self {
            arn: c.cluster_arn().unwrap_or_default().to_string(),
            name: c.cluster_name().unwrap_or("unknown").to_string(),
            status: c.status().unwrap_or("unknown").to_string(),
            instances: c.registered_container_instances_count(),
            services: c.active_services_count(),
            running_tasks: c.running_tasks_count(),
            pending_tasks: c.pending_tasks_count(),
            capacity_providers: c.capacity_providers().to_vec(),
            tags: c
                .tags()
                .iter()
                .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
                .collect(),
        }
    }
}

impl Tabular for Cluster {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "status",
        "instances",
        "services",
        "running_tasks",
        "pending_tasks",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.instances.to_string(),
            self.services.to_string(),
            self.running_tasks.to_string(),
            self.pending_tasks.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecs::types::Tag;

    #[test]
    fn test_cluster_from_sdk() {
        let sdk = SdkCluster::builder()
            .cluster_arn("arn:aws:ecs:us-east-1:123456789012:cluster/prod")
            .cluster_name("prod")
            .status("ACTIVE")
            .registered_container_instances_count(3)
            .active_services_count(7)
            .running_tasks_count(12)
            .pending_tasks_count(1)
            .capacity_providers("FARGATE")
            .tags(Tag::builder().key("team").value("platform").build())
            .build();

        let cluster = Cluster::from(&sdk);

        assert_eq!(cluster.name, "prod");
        assert_eq!(cluster.instances, 3);
        assert_eq!(cluster.services, 7);
        assert_eq!(cluster.tags.get("team").map(String::as_str), Some("platform"));
        assert_eq!(
            cluster.row(),
            vec!["prod", "ACTIVE", "3", "7", "12", "1"]
        );
    }

    #[test]
    fn test_cluster_json_uses_field_names() {
        let cluster = Cluster::from(&SdkCluster::builder().cluster_name("dev").build());
        let json = serde_json::to_value(&cluster).unwrap();
        assert_eq!(json["name"], "dev");
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["running_tasks"], 0);
    }
}
