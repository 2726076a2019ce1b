//! Interactive sessions through the AWS CLI.
//!
//! ECS Exec and Session Manager both need the Session Manager plugin, which
//! only ships with the AWS CLI, so sessions run as an `aws` child process.

use anyhow::{bail, Context, Result};
use std::process::ExitStatus;
use tokio::process::Command;

use crate::config::Config;
use crate::output::Console;

/// Shown once before the first session; acknowledged answers are persisted.
pub const SSM_PREREQUISITES: &str = "\
ecsctl exec needs the following in place:
  - the AWS CLI and the Session Manager plugin installed locally
  - enableExecuteCommand turned on for the service or task
  - a task role allowing ssmmessages:CreateControlChannel, CreateDataChannel,
    OpenControlChannel and OpenDataChannel
  - for --ec2, an instance profile with AmazonSSMManagedInstanceCore";

/// What an interactive session connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTarget {
    /// A shell inside a running container via ECS Exec
    Container {
        cluster: String,
        task_arn: String,
        container: String,
        command: String,
    },
    /// A shell on the EC2 host via Session Manager
    Instance { ec2_instance_id: String },
}

/// Arguments passed to the `aws` executable for `target`.
pub fn session_args(profile: Option<&str>, region: Option<&str>, target: &SessionTarget) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(profile) = profile {
        args.extend(["--profile".to_string(), profile.to_string()]);
    }
    if let Some(region) = region {
        args.extend(["--region".to_string(), region.to_string()]);
    }

    match target {
        SessionTarget::Container {
            cluster,
            task_arn,
            container,
            command,
        } => {
            args.extend(
                [
                    "ecs",
                    "execute-command",
                    "--cluster",
                    cluster.as_str(),
                    "--task",
                    task_arn.as_str(),
                    "--container",
                    container.as_str(),
                    "--interactive",
                    "--command",
                    command.as_str(),
                ]
                .map(str::to_string),
            );
        }
        SessionTarget::Instance { ec2_instance_id } => {
            args.extend(["ssm", "start-session", "--target", ec2_instance_id.as_str()].map(str::to_string));
        }
    }
    args
}

/// Asks the user to confirm the prerequisites unless already confirmed.
///
/// A confirmation is saved to the config file so the question is asked once.
///
/// # Errors
/// Fails if the user declines or the config cannot be saved.
pub fn ensure_prerequisites(console: &Console, config: &mut Config) -> Result<()> {
    if config.exec.meets_ssm_prereqs {
        return Ok(());
    }

    eprintln!("{SSM_PREREQUISITES}");
    if !console.confirm("Are these prerequisites met?")? {
        bail!("Session Manager prerequisites are not met");
    }

    config.exec.meets_ssm_prereqs = true;
    config.save()?;
    Ok(())
}

/// Runs `aws <args>` attached to the terminal and waits for it to exit.
///
/// Ctrl-C reaches the child through the terminal; this process keeps waiting
/// instead of exiting.
///
/// # Errors
/// Fails if the CLI cannot be started or exits unsuccessfully.
pub async fn run_session(args: &[String]) -> Result<()> {
    tracing::debug!(?args, "Starting aws session");

    let mut child = Command::new("aws")
        .args(args)
        .spawn()
        .context("Failed to start the AWS CLI. Is `aws` installed and on PATH?")?;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status.context("Failed to wait for the AWS CLI")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::trace!("Interrupt left to the session");
            }
        }
    };

    check_status(status)
}

fn check_status(status: ExitStatus) -> Result<()> {
    if !status.success() {
        bail!("Session failed with exit code: {:?}", status.code());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_session_args() {
        let target = SessionTarget::Container {
            cluster: "prod".to_string(),
            task_arn: "arn:aws:ecs:us-east-1:123456789012:task/prod/abc123".to_string(),
            container: "web".to_string(),
            command: "/bin/sh".to_string(),
        };

        let args = session_args(Some("ops"), Some("us-east-1"), &target);

        assert_eq!(
            args,
            vec![
                "--profile",
                "ops",
                "--region",
                "us-east-1",
                "ecs",
                "execute-command",
                "--cluster",
                "prod",
                "--task",
                "arn:aws:ecs:us-east-1:123456789012:task/prod/abc123",
                "--container",
                "web",
                "--interactive",
                "--command",
                "/bin/sh",
            ]
        );
    }

    #[test]
    fn test_instance_session_args_without_profile() {
        let target = SessionTarget::Instance {
            ec2_instance_id: "i-0123456789abcdef0".to_string(),
        };

        let args = session_args(None, Some("eu-west-1"), &target);

        assert_eq!(
            args,
            vec!["--region", "eu-west-1", "ssm", "start-session", "--target", "i-0123456789abcdef0"]
        );
    }

    #[test]
    fn test_prerequisites_already_met_skip_prompt() {
        let mut config = Config::default();
        config.exec.meets_ssm_prereqs = true;
        ensure_prerequisites(&Console::default(), &mut config).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_check_status() {
        use std::os::unix::process::ExitStatusExt;

        assert!(check_status(ExitStatus::from_raw(0)).is_ok());
        let err = check_status(ExitStatus::from_raw(1 << 8)).unwrap_err();
        assert!(err.to_string().contains("Some(1)"));
    }
}
