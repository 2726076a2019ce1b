//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Inspect ECS clusters, exec into containers and stream their logs.
#[derive(Parser, Debug)]
#[command(name = "ecsctl", version, about, long_about = None)]
pub struct Cli {
    /// AWS profile from ~/.aws/config
    #[arg(short = 'p', long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// AWS region
    #[arg(short = 'r', long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// ecsctl configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Get ECS cluster resources
    Get {
        #[command(subcommand)]
        resource: GetResource,
    },

    /// Open an interactive shell in a container or on its EC2 host
    Exec(ExecArgs),

    /// Print the CloudWatch logs of a task
    Logs(LogsArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current configuration as JSON
    View,

    /// Set a configuration property
    Set {
        /// One of: profile, region, default_cluster, tail_interval, dedup_capacity
        property: String,
        value: String,
    },
}

/// Cluster selection shared by cluster-scoped commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterArg {
    /// Cluster name or ARN (defaults to the configured cluster)
    #[arg(short = 'c', long, env = "ECS_DEFAULT_CLUSTER")]
    pub cluster: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArg {
    /// Output format
    #[arg(short = 'o', long, env = "ECS_CTL_OUTPUT", value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum GetResource {
    /// List clusters
    #[command(alias = "cluster")]
    Clusters {
        names: Vec<String>,
        #[command(flatten)]
        output: OutputArg,
    },

    /// List container instances
    #[command(alias = "instance")]
    Instances {
        ids: Vec<String>,
        #[command(flatten)]
        cluster: ClusterArg,
        /// ACTIVE, DRAINING, INACTIVE, ... or ALL
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = "registered_at")]
        sort_by: String,
        #[command(flatten)]
        output: OutputArg,
    },

    /// List services
    #[command(alias = "service")]
    Services {
        names: Vec<String>,
        #[command(flatten)]
        cluster: ClusterArg,
        #[arg(long, default_value = "name")]
        sort_by: String,
        #[command(flatten)]
        output: OutputArg,
    },

    /// Show the recent events of a service
    #[command(alias = "event")]
    Events {
        service: String,
        #[command(flatten)]
        cluster: ClusterArg,
        #[command(flatten)]
        output: OutputArg,
    },

    /// Show the deployments of a service
    #[command(alias = "deployment")]
    Deployments {
        service: String,
        #[command(flatten)]
        cluster: ClusterArg,
        #[command(flatten)]
        output: OutputArg,
    },

    /// List tasks
    #[command(alias = "task")]
    Tasks {
        names: Vec<String>,
        #[command(flatten)]
        cluster: ClusterArg,
        #[arg(short = 's', long)]
        service: Option<String>,
        /// Container instance id or ARN
        #[arg(short = 'i', long)]
        instance: Option<String>,
        /// RUNNING, STOPPED, PENDING or ALL
        #[arg(long, default_value = "RUNNING")]
        status: String,
        #[command(flatten)]
        output: OutputArg,
    },

    /// List the containers of a task
    #[command(alias = "container")]
    Containers {
        task: String,
        #[command(flatten)]
        cluster: ClusterArg,
        #[command(flatten)]
        output: OutputArg,
    },

    /// Describe a task definition
    #[command(aliases = ["definition", "td"])]
    Definitions {
        /// family, family:revision or ARN
        name: String,
        #[command(flatten)]
        output: OutputArg,
    },
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub cluster: ClusterArg,

    /// Task id or ARN (chosen interactively when omitted)
    #[arg(short = 't', long)]
    pub task: Option<String>,

    /// Service to pick a task from
    #[arg(short = 's', long)]
    pub service: Option<String>,

    /// Container name (chosen interactively when omitted)
    #[arg(long)]
    pub container: Option<String>,

    /// Command to run (defaults to the configured command)
    #[arg(long)]
    pub command: Option<String>,

    /// Connect to the EC2 host running the task instead
    #[arg(long)]
    pub ec2: bool,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    #[command(flatten)]
    pub cluster: ClusterArg,

    /// Task id or ARN
    #[arg(short = 't', long)]
    pub task: String,

    /// Only this container's logs
    #[arg(long)]
    pub container: Option<String>,

    /// Start of the window, e.g. "15m ago" or "2024-01-01T10:00:00Z"
    #[arg(long)]
    pub since: Option<String>,

    /// End of the window
    #[arg(long)]
    pub until: Option<String>,

    /// Keep polling for new events
    #[arg(short = 'f', long)]
    pub follow: bool,

    #[command(flatten)]
    pub output: OutputArg,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_logs_command() {
        let cli = Cli::try_parse_from([
            "ecsctl", "-r", "us-east-1", "logs", "-t", "abc123", "--since", "10m ago", "-f",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("us-east-1"));
        let Command::Logs(args) = cli.command else {
            panic!("expected logs command");
        };
        assert_eq!(args.task, "abc123");
        assert_eq!(args.since.as_deref(), Some("10m ago"));
        assert!(args.until.is_none());
        assert!(args.follow);
    }

    #[test]
    fn test_get_aliases() {
        let cli = Cli::try_parse_from(["ecsctl", "get", "td", "web:3", "-o", "json"]).unwrap();
        let Command::Get {
            resource: GetResource::Definitions { name, output },
        } = cli.command
        else {
            panic!("expected definitions");
        };
        assert_eq!(name, "web:3");
        assert_eq!(output.output, OutputFormat::Json);

        let cli = Cli::try_parse_from(["ecsctl", "get", "task", "--status", "ALL"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Get {
                resource: GetResource::Tasks { ref status, .. }
            } if status == "ALL"
        ));
    }

    #[test]
    fn test_logs_requires_task() {
        assert!(Cli::try_parse_from(["ecsctl", "logs"]).is_err());
    }
}
