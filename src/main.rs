use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use kube_usage_analyzer::{
    analyze, load_config, render, Args, KubectlTop, MetricsCollector, RenderOptions, UsageReport,
};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = load_config(args)?;
    debug!("config = {:?}", cfg);
    if !cfg.color {
        colored::control::set_override(false);
    }

    let source = KubectlTop::new(cfg.metrics_command.iter().cloned());
    let metrics = MetricsCollector::new(&source, &cfg).collect()?;

    let analysis = analyze(&metrics, &cfg.thresholds);
    info!(
        "Analysis: {} warnings, {} recommendations",
        analysis.warnings.len(),
        analysis.recommendations.len()
    );

    let report = UsageReport::new(metrics, analysis);
    let mut output = render(&report, &RenderOptions::from_config(&cfg))?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    write_stdout(&output)?;

    Ok(())
}

/// Write the rendered report, treating a closed pipe (e.g. `| head`) as done.
fn write_stdout(output: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
