use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which kind of object a metrics query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pod,
    Node,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "pod",
            ResourceKind::Node => "node",
        }
    }

    /// Title-cased name used in warning messages.
    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::Node => "Node",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace selection for pod queries. Nodes are cluster-scoped and ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Namespace(String),
    AllNamespaces,
}

impl Scope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Scope::Namespace(ns) => Some(ns),
            Scope::AllNamespaces => None,
        }
    }
}

/// One row of `kubectl top` output, normalized.
///
/// CPU is in millicores and memory in MiB. Percentages are only reported
/// for nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub cpu: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<i64>,
    pub memory: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<i64>,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_resources: usize,
    pub total_cpu_millicores: i64,
    pub total_memory_mi: i64,
    pub average_cpu_millicores: i64,
    pub average_memory_mi: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: Summary,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Parsed metrics together with their analysis; the shape of the JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub metrics: Vec<MetricRecord>,
    pub analysis: Analysis,
}

impl UsageReport {
    pub fn new(metrics: Vec<MetricRecord>, analysis: Analysis) -> Self {
        Self { metrics, analysis }
    }
}

/// Percentages above which a node is considered under pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub cpu_percent: i64,
    pub memory_percent: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80,
            memory_percent: 85,
        }
    }
}

/// Output format for the rendered report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table (default)
    #[default]
    Table,
    /// JSON document with `metrics` and `analysis` keys
    Json,
    /// Comma-separated export of the metric records
    Csv,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub thresholds: Thresholds,
    pub status_thresholds: Thresholds,
    pub format: OutputFormat,
    /// Program followed by any leading arguments, e.g. `kubectl --context prod`.
    pub metrics_command: Vec<String>,
    pub color: bool,
}
