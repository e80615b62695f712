use crate::types::{Analysis, MetricRecord, Summary, Thresholds};

pub const SCALING_RECOMMENDATION: &str =
    "Consider scaling horizontally or vertically to handle the load";
pub const IMBALANCE_RECOMMENDATION: &str =
    "Significant CPU usage imbalance detected. Consider load balancing or pod distribution policies";

/// Max CPU must exceed this multiple of min CPU to count as imbalanced.
const IMBALANCE_RATIO: i64 = 3;

pub fn summarize(metrics: &[MetricRecord]) -> Summary {
    if metrics.is_empty() {
        return Summary::default();
    }
    let count = metrics.len() as i64;
    let total_cpu = metrics.iter().fold(0_i64, |acc, m| acc.saturating_add(m.cpu));
    let total_memory = metrics.iter().fold(0_i64, |acc, m| acc.saturating_add(m.memory));

    Summary {
        total_resources: metrics.len(),
        total_cpu_millicores: total_cpu,
        total_memory_mi: total_memory,
        average_cpu_millicores: total_cpu.div_euclid(count),
        average_memory_mi: total_memory.div_euclid(count),
    }
}

/// Warnings for every record whose reported percentages exceed the thresholds.
///
/// Pod rows from `kubectl top` carry no percentages, so only nodes can warn.
pub fn threshold_warnings(metrics: &[MetricRecord], thresholds: &Thresholds) -> Vec<String> {
    let mut warnings = Vec::new();
    for m in metrics {
        if let Some(pct) = m.cpu_percent.filter(|p| *p > thresholds.cpu_percent) {
            warnings.push(format!(
                "{} '{}' has high CPU usage: {}%",
                m.kind.title(),
                m.name,
                pct
            ));
        }
        if let Some(pct) = m.memory_percent.filter(|p| *p > thresholds.memory_percent) {
            warnings.push(format!(
                "{} '{}' has high memory usage: {}%",
                m.kind.title(),
                m.name,
                pct
            ));
        }
    }
    warnings
}

pub fn is_cpu_imbalanced(metrics: &[MetricRecord]) -> bool {
    if metrics.len() < 2 {
        return false;
    }
    let max = metrics.iter().map(|m| m.cpu).max().unwrap_or(0);
    let min = metrics.iter().map(|m| m.cpu).min().unwrap_or(0);
    max > min.saturating_mul(IMBALANCE_RATIO)
}

pub fn analyze(metrics: &[MetricRecord], thresholds: &Thresholds) -> Analysis {
    let summary = summarize(metrics);
    let warnings = threshold_warnings(metrics, thresholds);

    let mut recommendations = Vec::new();
    if !warnings.is_empty() {
        recommendations.push(SCALING_RECOMMENDATION.to_string());
    }
    if is_cpu_imbalanced(metrics) {
        recommendations.push(IMBALANCE_RECOMMENDATION.to_string());
    }

    Analysis {
        summary,
        warnings,
        recommendations,
    }
}
