use anyhow::{anyhow, Result};
use clap::Parser;
use std::collections::HashMap;

use crate::types::{Config, OutputFormat, ResourceKind, Scope, Thresholds};

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Analyze Kubernetes resource usage patterns
#[derive(Debug, Parser)]
#[command(name = "kube-usage-analyzer")]
#[command(version, about = "Analyze Kubernetes resource usage patterns", long_about = None)]
pub struct Args {
    /// Type of resource to analyze
    #[arg(value_enum)]
    pub resource_type: ResourceKind,

    /// Kubernetes namespace for pod metrics
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Analyze pods across all namespaces
    #[arg(short = 'A', long, conflicts_with = "namespace")]
    pub all_namespaces: bool,

    /// CPU usage threshold percentage
    #[arg(long, default_value_t = 80)]
    pub threshold_cpu: u32,

    /// Memory usage threshold percentage
    #[arg(long, default_value_t = 85)]
    pub threshold_memory: u32,

    /// CPU percentage behind the table's HIGH CPU label (defaults to --threshold-cpu)
    #[arg(long)]
    pub status_cpu: Option<u32>,

    /// Memory percentage behind the table's HIGH MEM label (defaults to --threshold-memory)
    #[arg(long)]
    pub status_memory: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Metrics command line, e.g. "kubectl --context prod" (falls back to $KUBECTL)
    #[arg(long)]
    pub kubectl: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

pub fn load_config(args: Args) -> Result<Config> {
    load_config_with_env(args, &SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(args: Args, env: &E) -> Result<Config> {
    let scope = if args.all_namespaces {
        Scope::AllNamespaces
    } else {
        let ns = args.namespace.trim();
        if ns.is_empty() {
            return Err(anyhow!("--namespace must not be empty"));
        }
        Scope::Namespace(ns.to_string())
    };

    let command_line = args
        .kubectl
        .or_else(|| env.get_var("KUBECTL"))
        .unwrap_or_else(|| "kubectl".to_string());
    let metrics_command: Vec<String> = command_line
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if metrics_command.is_empty() {
        return Err(anyhow!("Metrics command (--kubectl / KUBECTL) must not be empty"));
    }

    let thresholds = Thresholds {
        cpu_percent: i64::from(args.threshold_cpu),
        memory_percent: i64::from(args.threshold_memory),
    };
    let status_thresholds = Thresholds {
        cpu_percent: args.status_cpu.map(i64::from).unwrap_or(thresholds.cpu_percent),
        memory_percent: args
            .status_memory
            .map(i64::from)
            .unwrap_or(thresholds.memory_percent),
    };

    let color = !args.no_color && env.get_var("NO_COLOR").map_or(true, |v| v.is_empty());

    Ok(Config {
        kind: args.resource_type,
        scope,
        thresholds,
        status_thresholds,
        format: args.format,
        metrics_command,
        color,
    })
}
