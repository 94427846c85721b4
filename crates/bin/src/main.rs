//! Hobart CLI binary.
//!
//! Loads a CSV panel, computes and cleans the configured factors, evaluates
//! them against forward returns and writes the alpha table and the report.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use hobart::data::load_csv;
use hobart::factors::FactorRegistry;
use hobart::output::{ExportFormat, Exporter, ReportBuilder};
use hobart::{FactorOutcome, Pipeline, RunConfig, init_logging};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

#[derive(Parser)]
#[command(name = "hobart")]
#[command(about = "Hobart: factor mining over asset panels", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute, clean and evaluate factors over a panel
    Run {
        /// Panel CSV (asset, timestamp, close, optional OHLCV/turnover/sector)
        #[arg(long)]
        data: PathBuf,

        /// Run configuration JSON; the built-in factor list when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// Forward-return horizon in rows
        #[arg(long)]
        horizon: Option<usize>,

        /// Number of quantile buckets
        #[arg(long)]
        buckets: Option<usize>,

        /// Where to write the alpha table (CSV)
        #[arg(long)]
        alpha_out: Option<PathBuf>,

        /// Where to write the evaluation report
        #[arg(long)]
        report_out: Option<PathBuf>,

        /// Report format: csv, json or pretty-json (default: from the
        /// report extension, else csv)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Print the report as Markdown instead of a plain table
        #[arg(long)]
        markdown: bool,
    },

    /// List the registered factors
    Factors {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    match cli.command {
        Commands::Run {
            data,
            config,
            horizon,
            buckets,
            alpha_out,
            report_out,
            format,
            markdown,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_path(path)?,
                None => RunConfig::default(),
            };
            if let Some(horizon) = horizon {
                run_config = run_config.with_horizon(horizon);
            }
            if let Some(buckets) = buckets {
                run_config = run_config.with_buckets(buckets);
            }

            run_pipeline(
                data,
                run_config,
                alpha_out,
                report_out,
                format,
                markdown,
            )?;
        }
        Commands::Factors { json } => list_factors(json)?,
    }

    Ok(())
}

fn run_pipeline(
    data: PathBuf,
    config: RunConfig,
    alpha_out: Option<PathBuf>,
    report_out: Option<PathBuf>,
    format: Option<ExportFormat>,
    markdown: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let panel = load_csv(&data)?;
    println!(
        "Loaded {} rows, {} assets, {} timestamps from {}",
        panel.height(),
        panel.assets().len(),
        panel.timestamp_groups().len(),
        data.display()
    );

    let pipeline = Pipeline::new(config)?;

    let pb = ProgressBar::new(pipeline.config().factors.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    let (panel, outcomes) = pipeline.compute_factors_with(&panel, |outcome| {
        pb.set_message(outcome.spec().label());
        pb.inc(1);
    })?;
    pb.finish_with_message("factors computed");

    for outcome in &outcomes {
        if let FactorOutcome::Skipped { .. } = outcome {
            println!("  skipped {}", outcome);
        }
    }

    let output = pipeline.finish(panel, outcomes)?;

    if let Some(path) = alpha_out {
        output
            .alpha_table
            .export_to_file(&path, ExportFormat::Csv)?;
        info!(path = %path.display(), "wrote alpha table");
        println!("Alpha table saved to {}", path.display());
    }

    let report = ReportBuilder::new()
        .horizon(pipeline.config().evaluation.horizon)
        .rows(output.reports)
        .build()?;

    if markdown {
        println!("{}", report.to_markdown());
    } else {
        println!("{}", report.to_ascii_table());
    }

    if let Some(path) = report_out {
        if report.rows.is_empty() {
            println!("No factor could be evaluated; report not saved.");
        } else {
            let format = format
                .or_else(|| ExportFormat::from_path(&path))
                .unwrap_or_default();
            report.export_to_file(&path, format)?;
            info!(path = %path.display(), %format, "wrote report");
            println!("Report saved to {}", path.display());
        }
    }

    Ok(())
}

fn list_factors(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = FactorRegistry::with_defaults();
    let info = registry.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<12} {:<28} Description",
        "Factor", "Category", "Columns"
    );
    println!("{}", "-".repeat(100));
    for factor in &info {
        println!(
            "{:<24} {:<12} {:<28} {}",
            factor.name,
            factor.category.to_string(),
            factor.required_columns.join(","),
            factor.description
        );
    }
    println!("\n{} factors registered", registry.len());
    Ok(())
}
