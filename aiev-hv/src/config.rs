//! Configuration resolution for aiev-hv
//!
//! Priority: command line → environment → TOML → compiled defaults.
//! Command line and environment are merged by clap (`env` fallbacks);
//! TOML and defaults come from [`aiev_common::config`].

use std::net::SocketAddr;
use std::path::PathBuf;

use aiev_common::config::{CompiledDefaults, TomlConfig};
use aiev_common::{Error, Result, SubmissionPolicy};
use clap::Parser;

/// Module name used for the config file (`<config_dir>/aiev/aiev-hv.toml`)
pub const MODULE_NAME: &str = "aiev-hv";

/// Command-line arguments for aiev-hv
#[derive(Parser, Debug, Clone)]
#[command(name = "aiev-hv")]
#[command(about = "Human Validation microservice for AI evaluation ratings")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "AIEV_PORT")]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(short, long = "bind", env = "AIEV_BIND")]
    pub bind_address: Option<String>,

    /// Config file (defaults to <config_dir>/aiev/aiev-hv.toml)
    #[arg(short, long, env = "AIEV_CONFIG")]
    pub config: Option<PathBuf>,

    /// tracing filter directive; RUST_LOG still wins when set
    #[arg(long, env = "AIEV_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Require feedback on every item before submission
    #[arg(long)]
    pub require_all_items: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    pub init_config: bool,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub event_capacity: usize,
    pub policy: SubmissionPolicy,
    pub agreement_threshold: f64,
}

impl ServiceConfig {
    /// Layer CLI/env arguments over the TOML file and compiled defaults
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::new();

        let policy = if args.require_all_items {
            SubmissionPolicy::Strict
        } else {
            toml.review.submission_policy()
        };

        Self {
            bind_address: args
                .bind_address
                .clone()
                .or_else(|| toml.bind_address.clone())
                .unwrap_or(defaults.bind_address),
            port: args.port.or(toml.port).unwrap_or(defaults.port),
            log_level: args
                .log_level
                .clone()
                .unwrap_or_else(|| toml.logging.level.clone()),
            event_capacity: toml.event_capacity.unwrap_or(defaults.event_capacity),
            policy,
            agreement_threshold: toml.review.agreement_threshold,
        }
    }

    /// Socket address to listen on
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "Invalid bind address {}:{}: {}",
                    self.bind_address, self.port, e
                ))
            })
    }

    /// TOML representation, as written by `--init-config`
    pub fn to_toml(&self) -> TomlConfig {
        let mut toml = TomlConfig {
            bind_address: Some(self.bind_address.clone()),
            port: Some(self.port),
            event_capacity: Some(self.event_capacity),
            ..Default::default()
        };
        toml.logging.level = self.log_level.clone();
        toml.review.require_all_items = self.policy == SubmissionPolicy::Strict;
        toml.review.agreement_threshold = self.agreement_threshold;
        toml
    }
}
