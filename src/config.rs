//! Configuration management for ecsctl.
//!
//! This module handles loading and persisting configuration from a TOML file
//! located at `<config dir>/ecsctl/config.toml` (for example
//! `~/.config/ecsctl/config.toml` on Linux). A legacy `~/.ecsctl/config.toml`
//! is used instead when it exists. Configuration includes AWS settings,
//! the default cluster, exec prerequisites and log streaming tunables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logs::LogStreamOptions;

/// Main configuration structure for ecsctl.
///
/// All configuration options are optional and will fall back to sensible defaults
/// if not specified in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// AWS-specific configuration options
    #[serde(default)]
    pub aws: AwsConfig,

    /// Defaults applied when a flag is omitted
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// `exec` command configuration
    #[serde(default)]
    pub exec: ExecConfig,

    /// Log streaming configuration
    #[serde(default)]
    pub logs: LogsConfig,
}

/// AWS SDK configuration options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AwsConfig {
    /// AWS profile name to use from ~/.aws/credentials
    /// If not specified, will use the default profile
    pub profile: Option<String>,

    /// Default AWS region (e.g., "us-east-1")
    /// If not specified, will use AWS SDK's default resolution (env vars, profile, etc.)
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Cluster used when `--cluster` is not given
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Set once the user confirmed the Session Manager prerequisites
    #[serde(default)]
    pub meets_ssm_prereqs: bool,

    /// Command run in the container when `--command` is omitted
    #[serde(default = "default_command")]
    pub default_command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Seconds to wait between polls when following logs
    #[serde(default = "default_tail_interval")]
    pub tail_interval_secs: u64,

    /// Number of recent event ids remembered to suppress duplicates
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

fn default_command() -> String {
    "/bin/sh".to_string()
}

fn default_tail_interval() -> u64 {
    5
}

fn default_dedup_capacity() -> usize {
    10_000
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            meets_ssm_prereqs: false,
            default_command: default_command(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            tail_interval_secs: default_tail_interval(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

impl LogsConfig {
    /// Engine options for one log stream request.
    pub fn stream_options(&self, tail: bool) -> LogStreamOptions {
        LogStreamOptions {
            tail,
            tail_interval: Duration::from_secs(self.tail_interval_secs),
            dedup_capacity: self.dedup_capacity,
        }
    }
}

const DEFAULT_CONFIG_TOML: &str = r#"# ecsctl configuration file
# This file is automatically generated with default values.
# Edit it directly or use `ecsctl config set <property> <value>`.

[aws]
# AWS profile to use from ~/.aws/credentials (optional)
# profile = "default"

# AWS region (optional)
# If not specified, uses AWS SDK's default resolution (env vars, ~/.aws/config, etc.)
# region = "us-east-1"

[defaults]
# Cluster used when --cluster is omitted
# cluster = "default"

[exec]
# Set to true once the Session Manager plugin and task role are in place
meets_ssm_prereqs = false

# Command started in the container
default_command = "/bin/sh"

[logs]
# Seconds between polls with --follow
tail_interval_secs = 5

# Recent event ids remembered to suppress duplicates
dedup_capacity = 10000
"#;

impl Config {
    /// Returns the path to the configuration directory.
    ///
    /// Prefers a legacy `~/.ecsctl/` directory when one exists, otherwise the
    /// platform config directory joined with `ecsctl`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(home_dir) = dirs::home_dir() {
            let legacy = home_dir.join(".ecsctl");
            if legacy.join("config.toml").exists() {
                return Ok(legacy);
            }
        }
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("ecsctl"))
    }

    /// Returns the path to the configuration file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location, creating it if missing.
    ///
    /// # Errors
    /// This function will return an error if:
    /// - The config directory cannot be determined
    /// - File I/O operations fail
    /// - TOML parsing fails
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`.
    ///
    /// # Behavior
    /// 1. If the file exists, parse and return it
    /// 2. If it doesn't exist, write a commented default file and return defaults
    ///
    /// # Errors
    /// Returns an error if reading, parsing or writing the default file fails.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {path:?}"))?;

            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {path:?}"))?;

            tracing::debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            Self::create_default_config(path)?;
            Ok(Config::default())
        }
    }

    /// Writes the commented default configuration file to `path`.
    ///
    /// # Errors
    /// Returns an error if directory creation or the file write fails.
    pub fn create_default_config(path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        fs::write(path, DEFAULT_CONFIG_TOML)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;
        tracing::debug!(path = %path.display(), "Created default config");
        Ok(())
    }

    /// Saves the configuration to the default location.
    ///
    /// # Errors
    /// Returns an error if the path cannot be determined or the write fails.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Serializes the configuration to TOML and writes it to `path`.
    ///
    /// # Errors
    /// This function will return an error if:
    /// - Directory creation fails
    /// - TOML serialization fails
    /// - File write operations fail
    pub fn save_to(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;

        let toml_string =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        Ok(())
    }

    /// Updates one property from its command-line spelling.
    ///
    /// Accepted properties: `profile`, `region`, `default_cluster`,
    /// `tail_interval` (seconds) and `dedup_capacity`.
    ///
    /// # Errors
    /// Returns an error for an unknown property or a value that does not parse.
    pub fn set(&mut self, property: &str, value: &str) -> Result<()> {
        match property {
            "profile" => self.aws.profile = Some(value.to_string()),
            "region" => self.aws.region = Some(value.to_string()),
            "default_cluster" => self.defaults.cluster = Some(value.to_string()),
            "tail_interval" => {
                self.logs.tail_interval_secs = value
                    .parse()
                    .with_context(|| format!("Invalid tail interval: {value}"))?;
            }
            "dedup_capacity" => {
                let capacity: usize = value
                    .parse()
                    .with_context(|| format!("Invalid dedup capacity: {value}"))?;
                if capacity == 0 {
                    bail!("dedup_capacity must be at least 1");
                }
                self.logs.dedup_capacity = capacity;
            }
            other => bail!(
                "Unknown property '{other}'. Expected one of: profile, region, default_cluster, tail_interval, dedup_capacity"
            ),
        }
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {dir:?}"))?;
        }
    }
    Ok(())
}
