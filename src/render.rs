use std::fmt::Write as _;

use colored::Colorize;
use tabled::{builder::Builder, settings::Style};

use crate::error::Result;
use crate::types::{Config, MetricRecord, OutputFormat, ResourceKind, Scope, Thresholds, UsageReport};

/// How the report should be rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Thresholds behind the table's `HIGH CPU` / `HIGH MEM` labels.
    pub status_thresholds: Thresholds,
    pub show_namespace: bool,
}

impl RenderOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            format: cfg.format,
            status_thresholds: cfg.status_thresholds,
            show_namespace: cfg.kind == ResourceKind::Pod && cfg.scope == Scope::AllNamespaces,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            status_thresholds: Thresholds::default(),
            show_namespace: false,
        }
    }
}

pub fn render(report: &UsageReport, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Table => Ok(render_table(report, opts)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Csv => Ok(render_csv(&report.metrics)),
    }
}

/// Status label for a table row; CPU pressure takes precedence over memory.
pub fn status_label(metric: &MetricRecord, thresholds: &Thresholds) -> &'static str {
    if metric.cpu_percent.is_some_and(|p| p > thresholds.cpu_percent) {
        "HIGH CPU"
    } else if metric.memory_percent.is_some_and(|p| p > thresholds.memory_percent) {
        "HIGH MEM"
    } else {
        "OK"
    }
}

pub fn render_table(report: &UsageReport, opts: &RenderOptions) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", "=== RESOURCE METRICS ===".bold());
    if report.metrics.is_empty() {
        let _ = writeln!(out, "{}", "No resources found".yellow());
    } else {
        let mut builder = Builder::default();
        let mut header = Vec::new();
        if opts.show_namespace {
            header.push("Namespace".to_string());
        }
        header.extend(["Name", "CPU", "Memory", "Status"].map(String::from));
        builder.push_record(header);

        for m in &report.metrics {
            let mut row = Vec::new();
            if opts.show_namespace {
                row.push(m.namespace.clone().unwrap_or_else(|| "-".to_string()));
            }
            row.push(m.name.clone());
            row.push(format!("{}m", m.cpu));
            row.push(format!("{}Mi", m.memory));
            row.push(status_label(m, &opts.status_thresholds).to_string());
            builder.push_record(row);
        }

        let table = builder.build().with(Style::psql()).to_string();
        let _ = writeln!(out, "{}", table);
    }

    let summary = &report.analysis.summary;
    let _ = writeln!(out, "\n{}", "=== ANALYSIS SUMMARY ===".bold());
    let _ = writeln!(out, "Total Resources: {}", summary.total_resources);
    let _ = writeln!(out, "Total CPU: {}m", summary.total_cpu_millicores);
    let _ = writeln!(out, "Total Memory: {}Mi", summary.total_memory_mi);
    let _ = writeln!(out, "Average CPU: {}m", summary.average_cpu_millicores);
    let _ = writeln!(out, "Average Memory: {}Mi", summary.average_memory_mi);

    if !report.analysis.warnings.is_empty() {
        let _ = writeln!(out, "\n{}", "=== WARNINGS ===".bold());
        for warning in &report.analysis.warnings {
            let _ = writeln!(out, "{} {}", "⚠".yellow().bold(), warning);
        }
    }

    if !report.analysis.recommendations.is_empty() {
        let _ = writeln!(out, "\n{}", "=== RECOMMENDATIONS ===".bold());
        for rec in &report.analysis.recommendations {
            let _ = writeln!(out, "{} {}", "💡".blue().bold(), rec);
        }
    }

    out
}

pub fn render_json(report: &UsageReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_csv(metrics: &[MetricRecord]) -> String {
    let mut out = String::from(
        "resource,namespace,name,cpu_millicores,memory_mi,cpu_percent,memory_percent\n",
    );
    for m in metrics {
        let fields = [
            m.kind.as_str().to_string(),
            csv_field(m.namespace.as_deref().unwrap_or("-")),
            csv_field(&m.name),
            m.cpu.to_string(),
            m.memory.to_string(),
            m.cpu_percent.map(|p| p.to_string()).unwrap_or_default(),
            m.memory_percent.map(|p| p.to_string()).unwrap_or_default(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
