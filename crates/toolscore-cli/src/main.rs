//! Toolscore CLI
//!
//! The `toolscore` command scores LLM tool-call traces against a gold
//! standard.
//!
//! ## Commands
//!
//! - `eval`: Evaluate a trace, write reports, gate on score or baseline
//! - `detect`: Report the detected format of a trace file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use toolscore_core::{
    compare_to_baseline, detect_format, evaluate_files, load_baseline, loader, parse_trace,
    save_baseline, write_result_json, write_summary_md, Baseline, ComparisonResult, EvalConfig,
    EvaluationOptions, EvaluationResult, TraceFormat,
};

#[derive(Parser)]
#[command(name = "toolscore")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic tool-call evaluation for LLM agents", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a trace against a gold standard
    Eval(EvalArgs),

    /// Detect the format of a trace file
    Detect {
        /// Trace file (JSON)
        trace: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct EvalArgs {
    /// Gold standard file (JSON array of expected calls)
    gold: PathBuf,

    /// Trace file (JSON)
    trace: PathBuf,

    /// Trace format (auto, openai, anthropic, gemini, mcp, langchain, custom)
    #[arg(short, long)]
    format: Option<TraceFormat>,

    /// Evaluation config file (JSON)
    #[arg(short, long, env = "TOOLSCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Compare tool order position by position
    #[arg(long)]
    strict_order: bool,

    /// Write the full result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a markdown summary
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Fail when the composite score is below this value
    #[arg(long)]
    min_score: Option<f64>,

    /// Save the result as a new baseline
    #[arg(long)]
    save_baseline: Option<PathBuf>,

    /// Compare the result against a saved baseline
    #[arg(long, conflicts_with = "save_baseline")]
    baseline: Option<PathBuf>,

    /// Regression tolerance for baseline comparison
    #[arg(long)]
    threshold: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    toolscore_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Eval(args) => cmd_eval(&args),
        Commands::Detect { trace } => cmd_detect(&trace),
    }
}

/// Load the config file (if any) and overlay command-line flags on it.
fn resolve_config(args: &EvalArgs) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => EvalConfig::default(),
    };
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.strict_order {
        config.strict_order = true;
    }
    if let Some(min) = args.min_score {
        config.min_composite_score = Some(min);
    }
    if let Some(threshold) = args.threshold {
        config.regression_threshold = threshold;
    }
    Ok(config)
}

/// Evaluate a trace against a gold standard
fn cmd_eval(args: &EvalArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let options = EvaluationOptions::from_config(&config);

    let result = evaluate_files(&args.gold, &args.trace, &options)
        .with_context(|| format!("Failed to evaluate {:?} against {:?}", args.trace, args.gold))?;

    print_summary(&result);

    if let Some(path) = &args.output {
        write_result_json(path, &result)?;
        info!("Wrote result to {:?}", path);
    }
    if let Some(path) = &args.markdown {
        write_summary_md(path, &result)?;
        info!("Wrote markdown summary to {:?}", path);
    }

    let mut failures = Vec::new();
    let composite = &result.metrics.composite;
    if !composite.passed {
        failures.push(format!(
            "composite score {:.3} below minimum {:.3}",
            composite.score,
            composite.min_score.unwrap_or_default()
        ));
    }

    if let Some(path) = &args.save_baseline {
        let baseline = Baseline::from_result(&result, Some(args.gold.as_path()))?;
        save_baseline(&baseline, path)
            .with_context(|| format!("Failed to save baseline: {:?}", path))?;
        println!("Baseline saved to {:?}", path);
    }

    if let Some(path) = &args.baseline {
        let baseline =
            load_baseline(path).with_context(|| format!("Failed to load baseline: {:?}", path))?;
        if baseline.gold_file_matches(&args.gold)? == Some(false) {
            println!("⚠ Gold standard changed since the baseline was recorded");
        }
        let comparison = compare_to_baseline(&result, &baseline, config.regression_threshold);
        print_comparison(&comparison);
        if !comparison.passed {
            failures.push(comparison.summary.clone());
        }
    }

    if failures.is_empty() {
        println!("\n✓ Evaluation passed");
        Ok(())
    } else {
        for failure in &failures {
            println!("  - {}", failure);
        }
        anyhow::bail!("Evaluation failed")
    }
}

fn print_summary(result: &EvaluationResult) {
    let m = &result.metrics;
    let summary = result.summary();

    println!("Gold calls:  {}", summary.gold_calls_count);
    println!("Trace calls: {}", summary.trace_calls_count);
    println!();
    println!("  invocation accuracy:  {:.3}", m.invocation_accuracy);
    println!("  selection accuracy:   {:.3}", m.selection_accuracy);
    println!(
        "  tool correctness:     {:.3}",
        m.tool_correctness_metrics.tool_correctness
    );
    println!(
        "  sequence accuracy:    {:.3} (edit distance {})",
        m.sequence_metrics.sequence_accuracy, m.sequence_metrics.edit_distance
    );
    println!(
        "  argument f1:          {:.3} (p {:.3}, r {:.3})",
        m.argument_metrics.f1, m.argument_metrics.precision, m.argument_metrics.recall
    );
    println!(
        "  trajectory accuracy:  {:.3}",
        m.trajectory_metrics.trajectory_accuracy
    );
    println!(
        "  redundant call rate:  {:.3}",
        m.efficiency_metrics.redundant_rate
    );
    println!();
    println!(
        "Composite: {:.3} {}",
        summary.composite_score,
        if summary.passed { "✓" } else { "✗" }
    );
}

fn print_comparison(comparison: &ComparisonResult) {
    println!();
    println!("Baseline: {}", comparison.summary);
    for item in comparison.regressions().chain(comparison.improvements()) {
        println!(
            "  {} {}: {:.3} -> {:.3} ({:+.1}%)",
            if item.delta < 0.0 { "↓" } else { "↑" },
            item.metric_name,
            item.baseline_value,
            item.current_value,
            item.delta_percent
        );
    }
}

/// Detect the format of a trace file
fn cmd_detect(trace: &Path) -> Result<()> {
    let payload = loader::read_json(trace)
        .with_context(|| format!("Failed to read trace: {:?}", trace))?;
    let format = detect_format(&payload);
    let calls = parse_trace(format, &payload)
        .with_context(|| format!("Failed to parse trace as {}", format))?;

    println!("Format: {}", format);
    println!("Calls:  {}", calls.len());
    Ok(())
}
