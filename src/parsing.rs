use crate::error::ParseError;
use crate::types::{MetricRecord, ResourceKind, Scope};

/// Largest normalized quantity accepted (2^40 millicores or MiB).
///
/// Keeps the summary totals of any realistic table well inside `i64`.
pub const MAX_QUANTITY: i64 = 1 << 40;

/// Normalize a `kubectl top` quantity.
///
/// Memory comes back as `Mi` (or `Gi` on large nodes) and is returned in MiB;
/// CPU comes back as millicores (`m`). Anything else must be a bare integer.
/// Negative values and values above [`MAX_QUANTITY`] are rejected.
pub fn parse_quantity(q: &str) -> Result<i64, ParseError> {
    let (digits, scale) = if let Some(stripped) = q.strip_suffix("Mi") {
        (stripped, 1)
    } else if let Some(stripped) = q.strip_suffix("Gi") {
        (stripped, 1024)
    } else if let Some(stripped) = q.strip_suffix('m') {
        (stripped, 1)
    } else {
        (q, 1)
    };

    digits
        .parse::<i64>()
        .ok()
        .and_then(|v| v.checked_mul(scale))
        .filter(|v| (0..=MAX_QUANTITY).contains(v))
        .ok_or_else(|| ParseError::InvalidQuantity(q.to_string()))
}

pub fn parse_percent(q: &str) -> Result<i64, ParseError> {
    q.trim_end_matches('%')
        .parse::<i64>()
        .ok()
        .filter(|p| *p >= 0)
        .ok_or_else(|| ParseError::InvalidPercent(q.to_string()))
}

/// Number of whitespace-separated columns a data line must have.
pub fn expected_columns(kind: ResourceKind, scope: &Scope) -> usize {
    match (kind, scope) {
        (ResourceKind::Node, _) => 5,
        (ResourceKind::Pod, Scope::AllNamespaces) => 4,
        (ResourceKind::Pod, Scope::Namespace(_)) => 3,
    }
}

/// Parse the table printed by `kubectl top pod|node`.
///
/// The first line is always treated as the header. Blank lines are skipped,
/// extra trailing columns are ignored and records keep the source order.
pub fn parse_top_output(
    output: &str,
    kind: ResourceKind,
    scope: &Scope,
) -> Result<Vec<MetricRecord>, ParseError> {
    let expected = expected_columns(kind, scope);
    let mut metrics = Vec::new();

    // Line numbers count from the first line of the trimmed output, header included.
    for (idx, line) in output.trim().lines().enumerate().skip(1) {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < expected {
            return Err(ParseError::MissingColumns {
                line: line_no,
                kind,
                expected,
                found: fields.len(),
            });
        }

        let at = move |column: &'static str| {
            move |e: ParseError| ParseError::InvalidField {
                line: line_no,
                column,
                source: Box::new(e),
            }
        };

        let record = match (kind, scope) {
            (ResourceKind::Pod, Scope::Namespace(ns)) => MetricRecord {
                name: fields[0].to_string(),
                namespace: Some(ns.clone()),
                cpu: parse_quantity(fields[1]).map_err(at("cpu"))?,
                cpu_percent: None,
                memory: parse_quantity(fields[2]).map_err(at("memory"))?,
                memory_percent: None,
                kind,
            },
            (ResourceKind::Pod, Scope::AllNamespaces) => MetricRecord {
                name: fields[1].to_string(),
                namespace: Some(fields[0].to_string()),
                cpu: parse_quantity(fields[2]).map_err(at("cpu"))?,
                cpu_percent: None,
                memory: parse_quantity(fields[3]).map_err(at("memory"))?,
                memory_percent: None,
                kind,
            },
            (ResourceKind::Node, _) => MetricRecord {
                name: fields[0].to_string(),
                namespace: None,
                cpu: parse_quantity(fields[1]).map_err(at("cpu"))?,
                cpu_percent: Some(parse_percent(fields[2]).map_err(at("cpu%"))?),
                memory: parse_quantity(fields[3]).map_err(at("memory"))?,
                memory_percent: Some(parse_percent(fields[4]).map_err(at("memory%"))?),
                kind,
            },
        };
        metrics.push(record);
    }

    Ok(metrics)
}
