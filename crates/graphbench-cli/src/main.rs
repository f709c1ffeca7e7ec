//! Graphbench CLI - batch evaluation of query-generation models.
//!
//! # Usage
//!
//! ```bash
//! # Score a result file against a GraphDB repository
//! graphbench data/llama-results.json --endpoint http://localhost:7200/repositories/imkg
//!
//! # Answers-only result files need no endpoint
//! graphbench data/deepseek-results.json -o deepseek-metrics.csv
//!
//! # Print the report as JSON, keep only the first 100 cases
//! graphbench data/results.json --json --limit 100
//!
//! # Export every mismatched case of one question type for inspection
//! graphbench data/results.json --export-mismatches wrong.json \
//!     --category actor_to_movie_constraint_year
//! ```

mod config;
mod export;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use graphbench_core::config::DEFAULT_QUERY_TIMEOUT_SECS;
use graphbench_core::dataset::{load_test_cases, TestCase};
use graphbench_core::executor::{HttpSparqlExecutor, QueryExecutor};
use graphbench_core::report::{assemble_report, write_csv};
use graphbench_core::scoring::{CaseEvaluator, EvaluationRun};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Graphbench evaluation CLI.
///
/// Scores generated SPARQL queries (or generated answers) against gold
/// answers at query level and item level, aggregated per question type, and
/// writes the resulting metrics as a CSV report.
#[derive(Parser)]
#[command(name = "graphbench", version, about)]
struct Cli {
    /// Result dataset to score (.json array or .jsonl)
    dataset: PathBuf,

    /// SPARQL endpoint URL (falls back to $GRAPHBENCH_ENDPOINT); only
    /// required when the dataset contains generated queries
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-query timeout in seconds
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS)]
    timeout: u64,

    /// Path of the CSV report
    #[arg(short, long, default_value = "metrics.csv")]
    output: PathBuf,

    /// Print the report rows as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Score only the first N cases
    #[arg(long)]
    limit: Option<usize>,

    /// Export mismatched cases (query-level misses and failures) to a JSON
    /// file
    #[arg(long)]
    export_mismatches: Option<PathBuf>,

    /// Restrict the mismatch export to one question type
    #[arg(long)]
    category: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut cases = load_test_cases(&cli.dataset)
        .with_context(|| format!("failed to load dataset {}", cli.dataset.display()))?;
    if let Some(limit) = cli.limit {
        cases.truncate(limit);
    }
    tracing::info!(cases = cases.len(), "loaded dataset");

    // Connect only when some case actually executes queries; a failed
    // connectivity check aborts before any scoring starts.
    let executor = if cases.iter().any(TestCase::needs_execution) {
        let endpoint = config::resolve_endpoint(cli.endpoint.as_deref())?;
        let executor =
            HttpSparqlExecutor::with_timeout(&endpoint, Duration::from_secs(cli.timeout))
                .with_context(|| format!("invalid endpoint {}", endpoint))?;
        executor
            .check_connectivity()
            .await
            .with_context(|| format!("could not reach SPARQL endpoint {}", endpoint))?;
        Some(executor)
    } else {
        None
    };

    let evaluator = match &executor {
        Some(executor) => CaseEvaluator::new(executor as &dyn QueryExecutor),
        None => CaseEvaluator::without_executor(),
    };

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .expect("static progress template"),
    );
    progress.set_message("Scoring");

    let mut run = EvaluationRun::new();
    for (idx, case) in cases.iter().enumerate() {
        let outcome = evaluator.evaluate(case).await;
        run.record(idx, &case.category, &outcome);
        progress.inc(1);
    }
    progress.finish();

    let rows = assemble_report(run.accumulator());
    let file = std::fs::File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    write_csv(&rows, file)
        .with_context(|| format!("failed to write report {}", cli.output.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", output::format_summary(&run, &cli.output));
    }

    if let Some(path) = &cli.export_mismatches {
        let exported =
            export::write_mismatches(&cases, &run, cli.category.as_deref(), path)?;
        eprintln!(
            "Exported {} mismatched case{} to {}",
            exported,
            if exported == 1 { "" } else { "s" },
            path.display()
        );
    }

    Ok(())
}
