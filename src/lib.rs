//! ecsctl - a command-line client for AWS ECS.
//!
//! The binary is a thin shell around this library: [`cli`] parses arguments,
//! [`commands`] dispatches them against [`aws::EcsClient`], and [`logs`] holds
//! the log streaming engine used by `ecsctl logs`.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod exec;
pub mod logs;
pub mod models;
pub mod output;
