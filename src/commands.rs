//! Command handlers.
//!
//! Each handler resolves its inputs from flags and the config file, calls
//! [`EcsClient`] and writes the result through a [`Console`].

use anyhow::{anyhow, bail, Result};
use futures::{Stream, StreamExt};
use std::collections::BTreeMap;
use std::future::Future;

use crate::aws::{EcsClient, TaskFilter};
use crate::cli::{Cli, ClusterArg, Command, ConfigAction, ExecArgs, GetResource, LogsArgs};
use crate::config::Config;
use crate::exec::{self, SessionTarget};
use crate::logs::{query_logs, CloudWatchLogQuery, LogEvent, LogsError};
use crate::models::{sort_by_column, LogTarget, Task};
use crate::output::{Console, OutputFormat};

/// Settings shared by every command of one invocation.
pub struct Context {
    pub config: Config,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Context {
    /// Flags win over the config file.
    pub fn new(config: Config, profile: Option<String>, region: Option<String>) -> Self {
        let profile = profile.or_else(|| config.aws.profile.clone());
        let region = region.or_else(|| config.aws.region.clone());
        Self {
            config,
            profile,
            region,
        }
    }

    /// Cluster from `--cluster` or the configured default.
    pub fn cluster(&self, arg: &ClusterArg) -> Result<String> {
        arg.cluster
            .clone()
            .or_else(|| self.config.defaults.cluster.clone())
            .ok_or_else(|| {
                anyhow!("No cluster given. Use --cluster or `ecsctl config set default_cluster <name>`")
            })
    }

    async fn client(&self) -> Result<EcsClient> {
        EcsClient::new(self.profile.clone(), self.region.clone()).await
    }
}

/// Runs the parsed command line.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut ctx = Context::new(config, cli.profile, cli.region);
    match cli.command {
        Command::Config { action } => run_config(&mut ctx, action),
        Command::Get { resource } => run_get(&ctx, resource).await,
        Command::Exec(args) => run_exec(&mut ctx, args).await,
        Command::Logs(args) => run_logs(&ctx, args).await,
    }
}

fn run_config(ctx: &mut Context, action: ConfigAction) -> Result<()> {
    let console = Console::default();
    match action {
        ConfigAction::View => {
            // serde_json maps keep keys sorted
            let value = serde_json::to_value(&ctx.config)?;
            console.json(&value)
        }
        ConfigAction::Set { property, value } => {
            ctx.config.set(&property, &value)?;
            ctx.config.save()?;
            tracing::debug!(property, value, "Config updated");
            Ok(())
        }
    }
}

async fn run_get(ctx: &Context, resource: GetResource) -> Result<()> {
    let client = ctx.client().await?;

    match resource {
        GetResource::Clusters { names, output } => {
            let mut clusters = client.get_clusters(&names).await?;
            clusters.sort_by(|a, b| a.name.cmp(&b.name));
            Console::new(output.output).show(&clusters)
        }
        GetResource::Instances {
            ids,
            cluster,
            status,
            sort_by,
            output,
        } => {
            let cluster = ctx.cluster(&cluster)?;
            let mut instances = client.get_instances(&cluster, &ids, status.as_deref()).await?;
            sort_by_column(&mut instances, &sort_by)?;
            Console::new(output.output).show(&instances)
        }
        GetResource::Services {
            names,
            cluster,
            sort_by,
            output,
        } => {
            let cluster = ctx.cluster(&cluster)?;
            let mut services = client.get_services(&cluster, &names).await?;
            sort_by_column(&mut services, &sort_by)?;
            Console::new(output.output).show(&services)
        }
        GetResource::Events {
            service,
            cluster,
            output,
        } => {
            let cluster = ctx.cluster(&cluster)?;
            let mut events = client.get_service_events(&cluster, &service).await?;
            events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let console = Console::new(output.output);
            if events.is_empty() && console.format() == OutputFormat::Table {
                return console.print(&format!("No events found for service '{service}'."));
            }
            console.show(&events)
        }
        GetResource::Deployments {
            service,
            cluster,
            output,
        } => {
            let cluster = ctx.cluster(&cluster)?;
            let mut deployments = client.get_deployments(&cluster, &service).await?;
            deployments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Console::new(output.output).show(&deployments)
        }
        GetResource::Tasks {
            names,
            cluster,
            service,
            instance,
            status,
            output,
        } => {
            let cluster = ctx.cluster(&cluster)?;
            let filter = TaskFilter {
                names,
                instance,
                service,
                status: Some(status),
            };
            let tasks = client.get_tasks(&cluster, &filter).await?;
            let console = Console::new(output.output);
            if tasks.is_empty() && console.format() == OutputFormat::Table {
                return console.print("No tasks found for the given search criteria.");
            }
            console.show(&tasks)
        }
        GetResource::Containers {
            task,
            cluster,
            output,
        } => {
            let cluster = ctx.cluster(&cluster)?;
            let containers = client.get_containers(&cluster, &task).await?;
            let console = Console::new(output.output);
            if containers.is_empty() && console.format() == OutputFormat::Table {
                return console.print("No containers found for the given search criteria.");
            }
            console.show(&containers)
        }
        GetResource::Definitions { name, output } => {
            let definition = client.get_task_definition(&name).await?;
            let console = Console::new(output.output);
            match console.format() {
                OutputFormat::Table => console.table(std::slice::from_ref(&definition)),
                OutputFormat::Json => console.json(&definition),
            }
        }
    }
}

async fn run_exec(ctx: &mut Context, args: ExecArgs) -> Result<()> {
    let console = Console::default();
    exec::ensure_prerequisites(&console, &mut ctx.config)?;

    let cluster = ctx.cluster(&args.cluster)?;
    let client = ctx.client().await?;
    let task = select_task(&console, &client, &cluster, &args).await?;

    let target = if args.ec2 {
        let instance_id = task
            .container_instance_arn
            .clone()
            .ok_or_else(|| anyhow!("Task {} does not run on an EC2 container instance", task.id))?;
        let instance = client
            .get_instances(&cluster, &[instance_id], None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Container instance of task {} not found", task.id))?;
        client.check_ssm_target(&instance.ec2_instance_id).await?;
        SessionTarget::Instance {
            ec2_instance_id: instance.ec2_instance_id,
        }
    } else {
        let container = match args.container {
            Some(container) => container,
            None => {
                let names: Vec<String> = task.containers.iter().map(|c| c.name.clone()).collect();
                let index = console.choose("Choose a container", &names)?;
                names[index].clone()
            }
        };
        SessionTarget::Container {
            cluster,
            task_arn: task.arn.clone(),
            container,
            command: args
                .command
                .unwrap_or_else(|| ctx.config.exec.default_command.clone()),
        }
    };

    let session = exec::session_args(client.profile(), Some(client.region()), &target);
    exec::run_session(&session).await
}

async fn select_task(
    console: &Console,
    client: &EcsClient,
    cluster: &str,
    args: &ExecArgs,
) -> Result<Task> {
    match (&args.task, &args.service) {
        (Some(task), _) => client.get_task(cluster, task).await,
        (None, Some(service)) => {
            let filter = TaskFilter {
                service: Some(service.clone()),
                ..TaskFilter::default()
            };
            let mut tasks = client.get_tasks(cluster, &filter).await?;
            if tasks.is_empty() {
                bail!("No running tasks found for service '{service}'");
            }
            let arns: Vec<String> = tasks.iter().map(|t| t.arn.clone()).collect();
            let index = console.choose("Choose a task", &arns)?;
            Ok(tasks.swap_remove(index))
        }
        (None, None) => bail!("A service or task must be specified"),
    }
}

async fn run_logs(ctx: &Context, args: LogsArgs) -> Result<()> {
    let cluster = ctx.cluster(&args.cluster)?;
    let client = ctx.client().await?;
    let console = Console::new(args.output.output);

    let task = client.get_task(&cluster, &args.task).await?;
    let definition = client.get_task_definition(&task.task_definition_arn).await?;
    let targets = definition.log_targets(&task, args.container.as_deref());
    if targets.is_empty() {
        bail!(
            "No awslogs log configuration found for task {} ({})",
            task.id,
            definition.family_revision()
        );
    }
    for warning in log_target_warnings(&targets, client.region()) {
        console.warn(&warning);
    }

    let groups = streams_by_group(&targets);
    if groups.is_empty() {
        bail!(
            "No log stream can be resolved for task {}. Set awslogs-stream-prefix in {} or wait for its containers to start",
            task.id,
            definition.family_revision()
        );
    }

    let options = ctx.config.logs.stream_options(args.follow);
    let mut streams = Vec::new();
    for (group, names) in groups {
        let query = CloudWatchLogQuery::new(client.logs_client());
        let stream = query_logs(
            query,
            &group,
            names,
            args.since.as_deref(),
            args.until.as_deref(),
            options.clone(),
        )?;
        streams.push(Box::pin(stream.into_stream()));
    }

    let merged = futures::stream::select_all(streams);
    print_log_events(&console, merged, tokio::signal::ctrl_c()).await
}

/// Prints events until the stream ends, fails, or `shutdown` completes.
///
/// `shutdown` is polled across every iteration, so a signal arriving while
/// an event is being printed is not lost.
pub async fn print_log_events<S, F>(console: &Console, mut events: S, shutdown: F) -> Result<()>
where
    S: Stream<Item = Result<LogEvent, LogsError>> + Unpin,
    F: Future,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            item = events.next() => match item {
                Some(Ok(event)) => console.log_event(&event)?,
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            },
            _ = &mut shutdown => {
                tracing::debug!("Log streaming interrupted");
                return Ok(());
            }
        }
    }
}

/// Notices about targets that cannot be read as configured.
///
/// Covers containers whose stream name is still unknown and log groups
/// living in a region other than the client's.
pub fn log_target_warnings(targets: &[LogTarget], client_region: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    for target in targets {
        if target.stream.is_none() {
            warnings.push(format!(
                "Container '{}' has no awslogs-stream-prefix and no runtime id yet, skipping its logs",
                target.container
            ));
        }
        if let Some(region) = target.region.as_deref().filter(|r| *r != client_region) {
            warnings.push(format!(
                "Container '{}' logs to {} in {region}, but ecsctl is querying {client_region}. Use --region {region}",
                target.container, target.group
            ));
        }
    }
    warnings
}

/// Stream names per log group, one entry per group.
///
/// Targets without a known stream are left out.
pub fn streams_by_group(targets: &[LogTarget]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for target in targets {
        let Some(stream) = &target.stream else {
            continue;
        };
        let streams = groups.entry(target.group.clone()).or_default();
        if !streams.contains(stream) {
            streams.push(stream.clone());
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(container: &str, group: &str) -> LogTarget {
        LogTarget {
            container: container.to_string(),
            group: group.to_string(),
            stream: Some(format!("ecs/{container}/abc123")),
            region: None,
        }
    }

    fn event(id: &str) -> LogEvent {
        LogEvent {
            log_stream_name: "ecs/web/abc123".to_string(),
            timestamp: 1_704_067_200_000,
            message: format!("line {id}"),
            ingestion_time: 1_704_067_200_000,
            event_id: id.to_string(),
        }
    }

    #[test]
    fn test_streams_by_group() {
        let targets = vec![
            target("web", "/ecs/app"),
            target("worker", "/ecs/app"),
            target("proxy", "/ecs/proxy"),
        ];

        let groups = streams_by_group(&targets);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["/ecs/app"], vec!["ecs/web/abc123", "ecs/worker/abc123"]);
        assert_eq!(groups["/ecs/proxy"], vec!["ecs/proxy/abc123"]);
    }

    #[test]
    fn test_streams_by_group_skips_unknown_streams() {
        let mut pending = target("sidecar", "/ecs/sidecar");
        pending.stream = None;

        let groups = streams_by_group(&[target("web", "/ecs/app"), pending]);

        assert_eq!(groups.len(), 1);
        assert!(!groups.contains_key("/ecs/sidecar"));
    }

    #[test]
    fn test_log_target_warnings() {
        let mut pending = target("sidecar", "/ecs/sidecar");
        pending.stream = None;
        let mut remote = target("web", "/ecs/app");
        remote.region = Some("eu-west-1".to_string());
        let mut local = target("worker", "/ecs/app");
        local.region = Some("us-east-1".to_string());

        let warnings = log_target_warnings(&[pending, remote, local], "us-east-1");

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("'sidecar'"));
        assert!(warnings[0].contains("awslogs-stream-prefix"));
        assert!(warnings[1].contains("eu-west-1"));
        assert!(warnings[1].contains("--region eu-west-1"));
    }

    #[tokio::test]
    async fn test_print_log_events_stops_on_shutdown() {
        let events = futures::stream::pending::<Result<LogEvent, LogsError>>();

        print_log_events(&Console::default(), events, std::future::ready(()))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_print_log_events_keeps_one_shutdown_across_events() {
        use std::time::Duration;

        let events = futures::stream::iter(vec![Ok(event("1")), Ok(event("2"))])
            .chain(futures::stream::pending());
        let shutdown = tokio::time::sleep(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        print_log_events(&Console::default(), Box::pin(events), shutdown)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_print_log_events_ends_with_stream_or_error() {
        let done = futures::stream::iter(vec![Ok(event("1"))]);
        print_log_events(&Console::default(), done, std::future::pending::<()>())
            .await
            .unwrap();

        let failing = futures::stream::iter(vec![Err(LogsError::Query("throttled".to_string()))]);
        let err = print_log_events(&Console::default(), failing, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("throttled"));
    }

    #[test]
    fn test_context_prefers_flags_over_config() {
        let mut config = Config::default();
        config.aws.profile = Some("from-config".to_string());
        config.aws.region = Some("eu-west-1".to_string());

        let ctx = Context::new(config, Some("from-flag".to_string()), None);

        assert_eq!(ctx.profile.as_deref(), Some("from-flag"));
        assert_eq!(ctx.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_cluster_falls_back_to_default() {
        let mut config = Config::default();
        let ctx = Context::new(config.clone(), None, None);
        assert!(ctx.cluster(&ClusterArg::default()).is_err());

        config.defaults.cluster = Some("prod".to_string());
        let ctx = Context::new(config, None, None);
        assert_eq!(ctx.cluster(&ClusterArg::default()).unwrap(), "prod");

        let arg = ClusterArg {
            cluster: Some("staging".to_string()),
        };
        assert_eq!(ctx.cluster(&arg).unwrap(), "staging");
    }
}
