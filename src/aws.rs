//! AWS ECS client wrapper for ecsctl.
//!
//! Wraps the ECS, CloudWatch Logs and SSM SDK clients behind one [`EcsClient`]
//! built from a single shared SDK configuration. List calls follow
//! `next_token` until exhausted, and describe calls are split into batches
//! the API accepts.

use anyhow::{anyhow, bail, Context, Result};
use aws_sdk_cloudwatchlogs::Client as LogsClient;
use aws_sdk_ecs::types::{ClusterField, ContainerInstanceStatus, DesiredStatus};
use aws_sdk_ecs::Client;
use aws_sdk_ssm::types::InstanceInformationStringFilter;
use aws_sdk_ssm::Client as SsmClient;

use crate::models::{
    arn_id, Cluster, Container, Deployment, Instance, Service, ServiceEvent, Task, TaskDefinition,
};

/// Maximum ARNs per `DescribeTasks`, `DescribeContainerInstances` and `DescribeClusters` call.
pub const DESCRIBE_BATCH: usize = 100;
/// Maximum names per `DescribeServices` call.
pub const DESCRIBE_SERVICES_BATCH: usize = 10;

/// Status value meaning "every status" for tasks and instances.
pub const STATUS_ALL: &str = "ALL";

/// Wrapper around the AWS clients used by ecsctl.
#[derive(Clone)]
pub struct EcsClient {
    client: Client,
    logs_client: LogsClient,
    ssm_client: SsmClient,
    profile: Option<String>,
    region: String,
}

/// Selects which tasks [`EcsClient::get_tasks`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Task ids or ARNs; when set, the other fields are ignored
    pub names: Vec<String>,
    /// Container instance id or ARN
    pub instance: Option<String>,
    /// Service name
    pub service: Option<String>,
    /// `RUNNING`, `STOPPED`, `PENDING` or `ALL`
    pub status: Option<String>,
}

impl EcsClient {
    /// Creates a new client with optional profile and region configuration.
    ///
    /// # Arguments
    /// * `profile` - Optional AWS profile name from ~/.aws/credentials
    /// * `region` - Optional AWS region override (e.g., "us-east-1")
    ///
    /// # Returns
    /// Returns a new `EcsClient` whose ECS, Logs and SSM clients share one
    /// SDK configuration.
    ///
    /// # Errors
    /// This function will return an error if no region can be resolved from
    /// the arguments, the environment or the profile.
    pub async fn new(profile: Option<String>, region: Option<String>) -> Result<Self> {
        let mut config_loader = aws_config::from_env();

        // Set region if provided
        if let Some(region_str) = region {
            config_loader = config_loader.region(aws_config::Region::new(region_str));
        }

        // Set profile if provided
        if let Some(profile_name) = profile.clone() {
            config_loader = config_loader.profile_name(profile_name);
        }

        let config = config_loader.load().await;
        let region = config
            .region()
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("No AWS region configured. Use --region or set AWS_REGION"))?;
        tracing::debug!(region = %region, profile = ?profile, "AWS config loaded");

        Ok(Self {
            client: Client::new(&config),
            logs_client: LogsClient::new(&config),
            ssm_client: SsmClient::new(&config),
            profile,
            region,
        })
    }

    /// Profile the client was built with, if any.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Region the client resolved.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// A CloudWatch Logs client sharing this client's configuration.
    ///
    /// Each log stream request takes its own clone.
    pub fn logs_client(&self) -> LogsClient {
        self.logs_client.clone()
    }

    /// Describes clusters by name, or every cluster in the region when `names` is empty.
    ///
    /// # Errors
    /// Returns an error if the ListClusters or DescribeClusters calls fail.
    pub async fn get_clusters(&self, names: &[String]) -> Result<Vec<Cluster>> {
        let names = if names.is_empty() {
            self.list_cluster_arns().await?
        } else {
            names.to_vec()
        };

        let mut clusters = Vec::with_capacity(names.len());
        for chunk in names.chunks(DESCRIBE_BATCH) {
            let resp = self
                .client
                .describe_clusters()
                .set_clusters(Some(chunk.to_vec()))
                .include(ClusterField::Tags)
                .send()
                .await
                .context("Failed to describe clusters")?;
            clusters.extend(resp.clusters().iter().map(Cluster::from));
        }
        Ok(clusters)
    }

    async fn list_cluster_arns(&self) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token = None;
        loop {
            let resp = self
                .client
                .list_clusters()
                .set_next_token(next_token)
                .send()
                .await
                .context("Failed to list clusters")?;
            arns.extend(resp.cluster_arns().iter().cloned());
            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(arns);
            }
        }
    }

    /// Describes container instances of a cluster.
    ///
    /// # Arguments
    /// * `cluster` - The cluster name or ARN
    /// * `ids` - Instance ids or ARNs; all instances when empty
    /// * `status` - Instance status filter, [`STATUS_ALL`] includes inactive instances
    ///
    /// # Errors
    /// Returns an error for an unknown status or a failed API call.
    pub async fn get_instances(
        &self,
        cluster: &str,
        ids: &[String],
        status: Option<&str>,
    ) -> Result<Vec<Instance>> {
        let arns = if ids.is_empty() {
            let mut arns = Vec::new();
            for status in instance_statuses(status)? {
                arns.extend(self.list_instance_arns(cluster, status).await?);
            }
            arns
        } else {
            ids.to_vec()
        };

        let mut instances = Vec::with_capacity(arns.len());
        for chunk in arns.chunks(DESCRIBE_BATCH) {
            let resp = self
                .client
                .describe_container_instances()
                .cluster(cluster)
                .set_container_instances(Some(chunk.to_vec()))
                .send()
                .await
                .context("Failed to describe container instances")?;
            instances.extend(resp.container_instances().iter().map(Instance::from));
        }
        Ok(instances)
    }

    async fn list_instance_arns(
        &self,
        cluster: &str,
        status: Option<ContainerInstanceStatus>,
    ) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token = None;
        loop {
            let resp = self
                .client
                .list_container_instances()
                .cluster(cluster)
                .set_status(status.clone())
                .set_next_token(next_token)
                .send()
                .await
                .with_context(|| format!("Failed to list container instances in {cluster}"))?;
            arns.extend(resp.container_instance_arns().iter().cloned());
            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(arns);
            }
        }
    }

    /// Describes services of a cluster, all of them when `names` is empty.
    ///
    /// # Errors
    /// Returns an error if the ListServices or DescribeServices calls fail.
    pub async fn get_services(&self, cluster: &str, names: &[String]) -> Result<Vec<Service>> {
        let names = if names.is_empty() {
            self.list_service_arns(cluster).await?
        } else {
            names.to_vec()
        };

        let mut services = Vec::with_capacity(names.len());
        for chunk in names.chunks(DESCRIBE_SERVICES_BATCH) {
            let resp = self
                .client
                .describe_services()
                .cluster(cluster)
                .set_services(Some(chunk.to_vec()))
                .send()
                .await
                .context("Failed to describe services")?;
            services.extend(resp.services().iter().map(Service::from));
        }
        Ok(services)
    }

    async fn list_service_arns(&self, cluster: &str) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token = None;
        loop {
            let resp = self
                .client
                .list_services()
                .cluster(cluster)
                .set_next_token(next_token)
                .send()
                .await
                .with_context(|| format!("Failed to list services in {cluster}"))?;
            arns.extend(resp.service_arns().iter().cloned());
            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(arns);
            }
        }
    }

    async fn get_service(&self, cluster: &str, service: &str) -> Result<Service> {
        self.get_services(cluster, &[service.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Service '{service}' not found in cluster '{cluster}'"))
    }

    /// Recent events of one service, newest first as returned by ECS.
    ///
    /// # Errors
    /// Returns an error if the service does not exist or the call fails.
    pub async fn get_service_events(&self, cluster: &str, service: &str) -> Result<Vec<ServiceEvent>> {
        Ok(self.get_service(cluster, service).await?.events)
    }

    /// Deployments of one service.
    ///
    /// # Errors
    /// Returns an error if the service does not exist or the call fails.
    pub async fn get_deployments(&self, cluster: &str, service: &str) -> Result<Vec<Deployment>> {
        Ok(self.get_service(cluster, service).await?.deployments)
    }

    /// Describes tasks of a cluster selected by `filter`.
    ///
    /// With [`STATUS_ALL`] both running and stopped tasks are listed.
    ///
    /// # Errors
    /// Returns an error for an unknown status or a failed API call.
    pub async fn get_tasks(&self, cluster: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let arns = if filter.names.is_empty() {
            let mut arns = Vec::new();
            for status in desired_statuses(filter.status.as_deref())? {
                arns.extend(self.list_task_arns(cluster, filter, status).await?);
            }
            arns
        } else {
            filter.names.clone()
        };

        let mut tasks = Vec::with_capacity(arns.len());
        for chunk in arns.chunks(DESCRIBE_BATCH) {
            let resp = self
                .client
                .describe_tasks()
                .cluster(cluster)
                .set_tasks(Some(chunk.to_vec()))
                .send()
                .await
                .context("Failed to describe tasks")?;
            tasks.extend(resp.tasks().iter().map(Task::from));
        }
        Ok(tasks)
    }

    async fn list_task_arns(
        &self,
        cluster: &str,
        filter: &TaskFilter,
        status: DesiredStatus,
    ) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token = None;
        loop {
            let resp = self
                .client
                .list_tasks()
                .cluster(cluster)
                .set_service_name(filter.service.clone())
                .set_container_instance(filter.instance.clone())
                .desired_status(status.clone())
                .set_next_token(next_token)
                .send()
                .await
                .with_context(|| format!("Failed to list tasks in {cluster}"))?;
            arns.extend(resp.task_arns().iter().cloned());
            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(arns);
            }
        }
    }

    /// Describes a single task by id or ARN.
    ///
    /// # Errors
    /// Returns an error if the task does not exist or the call fails.
    pub async fn get_task(&self, cluster: &str, task: &str) -> Result<Task> {
        let filter = TaskFilter {
            names: vec![task.to_string()],
            ..TaskFilter::default()
        };
        self.get_tasks(cluster, &filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Task '{}' not found in cluster '{cluster}'", arn_id(task)))
    }

    /// Containers of a single task.
    ///
    /// # Errors
    /// Returns an error if the task does not exist or the call fails.
    pub async fn get_containers(&self, cluster: &str, task: &str) -> Result<Vec<Container>> {
        Ok(self.get_task(cluster, task).await?.containers)
    }

    /// Describes a task definition by `family`, `family:revision` or ARN.
    ///
    /// # Errors
    /// Returns an error if the definition does not exist or the call fails.
    pub async fn get_task_definition(&self, name: &str) -> Result<TaskDefinition> {
        let resp = self
            .client
            .describe_task_definition()
            .task_definition(name)
            .send()
            .await
            .with_context(|| format!("Failed to describe task definition {name}"))?;
        resp.task_definition()
            .map(TaskDefinition::from)
            .ok_or_else(|| anyhow!("Task definition '{name}' not found"))
    }

    /// Ensures an EC2 instance is registered with Systems Manager.
    ///
    /// # Errors
    /// Returns an error if the instance is not SSM managed or the call fails.
    pub async fn check_ssm_target(&self, instance_id: &str) -> Result<()> {
        tracing::debug!(instance_id, "Checking SSM availability");

        let response = self
            .ssm_client
            .describe_instance_information()
            .filters(
                InstanceInformationStringFilter::builder()
                    .key("InstanceIds")
                    .values(instance_id)
                    .build()?,
            )
            .send()
            .await
            .context("Failed to describe SSM instance information")?;

        if response.instance_information_list().is_empty() {
            bail!(
                "Instance {instance_id} is not available for SSM connection. \
                 Check that the SSM agent is running and the instance role allows Session Manager"
            );
        }
        Ok(())
    }
}

/// Maps a task status argument to the desired statuses to list.
///
/// Defaults to `RUNNING`.
pub fn desired_statuses(status: Option<&str>) -> Result<Vec<DesiredStatus>> {
    let status = status.unwrap_or("RUNNING").to_ascii_uppercase();
    match status.as_str() {
        STATUS_ALL => Ok(vec![DesiredStatus::Running, DesiredStatus::Stopped]),
        "RUNNING" => Ok(vec![DesiredStatus::Running]),
        "STOPPED" => Ok(vec![DesiredStatus::Stopped]),
        "PENDING" => Ok(vec![DesiredStatus::Pending]),
        other => bail!("Unknown task status '{other}'. Expected RUNNING, STOPPED, PENDING or ALL"),
    }
}

/// Maps an instance status argument to the status filters to list.
///
/// `None` means the API default, which covers every status except `INACTIVE`.
pub fn instance_statuses(status: Option<&str>) -> Result<Vec<Option<ContainerInstanceStatus>>> {
    let Some(status) = status else {
        return Ok(vec![None]);
    };
    let status = status.to_ascii_uppercase();
    if status == STATUS_ALL {
        return Ok(vec![None, Some(ContainerInstanceStatus::from("INACTIVE"))]);
    }
    if !ContainerInstanceStatus::values().contains(&status.as_str()) {
        bail!("Unknown instance status '{status}'");
    }
    Ok(vec![Some(ContainerInstanceStatus::from(status.as_str()))])
}
