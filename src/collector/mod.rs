use std::process::Command;

use tracing::{debug, info};

use crate::error::{CollectionError, Result};
use crate::parsing::parse_top_output;
use crate::types::{Config, MetricRecord, ResourceKind, Scope};

/// Anything that can produce raw `kubectl top` style text for a query.
pub trait MetricsSource {
    fn fetch(&self, kind: ResourceKind, scope: &Scope) -> Result<String, CollectionError>;
}

/// Runs `kubectl top` (or a configured replacement) as a subprocess.
#[derive(Debug, Clone)]
pub struct KubectlTop {
    program: String,
    leading_args: Vec<String>,
}

impl KubectlTop {
    /// `command` is the program followed by any arguments to place before `top`.
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = command.into_iter().map(Into::into);
        let program = parts.next().unwrap_or_else(|| "kubectl".to_string());
        Self {
            program,
            leading_args: parts.collect(),
        }
    }

    pub fn top_args(kind: ResourceKind, scope: &Scope) -> Vec<String> {
        let mut args = vec!["top".to_string(), kind.as_str().to_string()];
        if kind == ResourceKind::Pod {
            match scope {
                Scope::Namespace(ns) => {
                    args.push("-n".to_string());
                    args.push(ns.clone());
                }
                Scope::AllNamespaces => args.push("--all-namespaces".to_string()),
            }
        }
        args
    }

    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(&self.program)
            .chain(self.leading_args.iter())
            .chain(args.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for KubectlTop {
    fn default() -> Self {
        Self::new(["kubectl"])
    }
}

impl MetricsSource for KubectlTop {
    fn fetch(&self, kind: ResourceKind, scope: &Scope) -> Result<String, CollectionError> {
        let args = Self::top_args(kind, scope);
        let command = self.command_line(&args);
        debug!("running {}", command);

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(&args)
            .output()
            .map_err(|source| CollectionError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = output.status.to_string();
            let message = if stderr.is_empty() { status.clone() } else { stderr };
            return Err(CollectionError::Failed {
                command,
                status,
                message,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Fetches and parses metrics for the configured query.
pub struct MetricsCollector<'a, S: MetricsSource> {
    source: &'a S,
    config: &'a Config,
}

impl<'a, S: MetricsSource> MetricsCollector<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        Self { source, config }
    }

    pub fn collect(&self) -> Result<Vec<MetricRecord>> {
        let kind = self.config.kind;
        let scope = &self.config.scope;
        match scope.namespace() {
            Some(ns) if kind == ResourceKind::Pod => info!("Collecting pod metrics for namespace: {}", ns),
            _ if kind == ResourceKind::Pod => info!("Collecting pod metrics for all namespaces"),
            _ => info!("Collecting node metrics"),
        }

        let raw = self.source.fetch(kind, scope)?;
        debug!("received {} bytes of {} metrics", raw.len(), kind);

        let metrics = parse_top_output(&raw, kind, scope)?;
        info!("Parsed {} {} records", metrics.len(), kind);
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ParseError};
    use crate::types::{OutputFormat, Thresholds};
    use std::cell::RefCell;

    /// Serves canned output and remembers what it was asked for.
    struct FixtureSource {
        output: Result<String, String>,
        requests: RefCell<Vec<(ResourceKind, Scope)>>,
    }

    impl FixtureSource {
        fn ok(output: &str) -> Self {
            Self {
                output: Ok(output.to_string()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                output: Err(message.to_string()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl MetricsSource for FixtureSource {
        fn fetch(&self, kind: ResourceKind, scope: &Scope) -> Result<String, CollectionError> {
            self.requests.borrow_mut().push((kind, scope.clone()));
            self.output.clone().map_err(|message| CollectionError::Failed {
                command: "kubectl top".to_string(),
                status: "exit status: 1".to_string(),
                message,
            })
        }
    }

    fn config(kind: ResourceKind, scope: Scope) -> Config {
        Config {
            kind,
            scope,
            thresholds: Thresholds::default(),
            status_thresholds: Thresholds::default(),
            format: OutputFormat::Table,
            metrics_command: vec!["kubectl".to_string()],
            color: false,
        }
    }

    #[test]
    fn test_top_args() {
        let ns = Scope::Namespace("payments".to_string());
        assert_eq!(KubectlTop::top_args(ResourceKind::Pod, &ns), vec!["top", "pod", "-n", "payments"]);
        assert_eq!(
            KubectlTop::top_args(ResourceKind::Pod, &Scope::AllNamespaces),
            vec!["top", "pod", "--all-namespaces"]
        );
        assert_eq!(KubectlTop::top_args(ResourceKind::Node, &ns), vec!["top", "node"]);
    }

    #[test]
    fn test_command_line_includes_leading_args() {
        let top = KubectlTop::new(["kubectl", "--context", "prod"]);
        let args = KubectlTop::top_args(ResourceKind::Node, &Scope::AllNamespaces);
        assert_eq!(top.command_line(&args), "kubectl --context prod top node");
    }

    #[test]
    fn test_collect_parses_source_output() {
        let source = FixtureSource::ok("NAME CPU(cores) MEMORY(bytes)\napi-0 12m 64Mi\n");
        let cfg = config(ResourceKind::Pod, Scope::Namespace("payments".to_string()));

        let metrics = MetricsCollector::new(&source, &cfg).collect().unwrap();

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "api-0");
        assert_eq!(metrics[0].namespace.as_deref(), Some("payments"));
        assert_eq!(
            source.requests.borrow().as_slice(),
            &[(ResourceKind::Pod, Scope::Namespace("payments".to_string()))]
        );
    }

    #[test]
    fn test_collect_surfaces_collection_error() {
        let source = FixtureSource::failing("error: Metrics API not available");
        let cfg = config(ResourceKind::Node, Scope::AllNamespaces);

        let err = MetricsCollector::new(&source, &cfg).collect().unwrap_err();

        assert!(matches!(err, Error::Collection(_)));
        assert!(err.to_string().contains("Metrics API not available"));
    }

    #[test]
    fn test_collect_surfaces_parse_error() {
        let source = FixtureSource::ok("NAME CPU(cores) MEMORY(bytes)\napi-0 12m\n");
        let cfg = config(ResourceKind::Pod, Scope::Namespace("default".to_string()));

        let err = MetricsCollector::new(&source, &cfg).collect().unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::MissingColumns { line: 2, .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_kubectl_top_passes_arguments() {
        // `sh -c SCRIPT NAME ARGS...` exposes the top arguments as $@.
        let top = KubectlTop::new(["sh", "-c", "echo NAME CPU MEMORY; echo \"$@\"", "kubectl"]);
        let out = top
            .fetch(ResourceKind::Pod, &Scope::Namespace("ops".to_string()))
            .unwrap();
        assert_eq!(out, "NAME CPU MEMORY\ntop pod -n ops\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_kubectl_top_failure_carries_stderr() {
        let top = KubectlTop::new(["sh", "-c", "echo 'error: metrics not available yet' >&2; exit 1", "kubectl"]);
        let err = top.fetch(ResourceKind::Node, &Scope::AllNamespaces).unwrap_err();

        match err {
            CollectionError::Failed { message, .. } => {
                assert_eq!(message, "error: metrics not available yet");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_kubectl_top_failure_without_stderr_reports_status() {
        let top = KubectlTop::new(["sh", "-c", "exit 3", "kubectl"]);
        let err = top.fetch(ResourceKind::Node, &Scope::AllNamespaces).unwrap_err();
        assert!(err.to_string().contains("exit status: 3"));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let top = KubectlTop::new(["kube-usage-analyzer-no-such-binary"]);
        let err = top.fetch(ResourceKind::Node, &Scope::AllNamespaces).unwrap_err();
        assert!(matches!(err, CollectionError::Spawn { .. }));
        assert!(err.to_string().contains("kube-usage-analyzer-no-such-binary top node"));
    }
}
