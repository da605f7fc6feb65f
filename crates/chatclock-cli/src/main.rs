mod report;
mod settings;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chatclock_core::{analyze, read_export, CountingPolicy, DateOrder};
use clap::Parser;
use colored::Colorize;

use report::View;
use settings::Settings;

#[derive(Parser)]
#[command(name = "chatclock")]
#[command(author, version, about = "Time spent in chat conversations")]
struct Cli {
    /// Exported chat log (.txt)
    file: PathBuf,

    #[arg(
        short,
        long,
        allow_hyphen_values = true,
        help = "Inactivity gap in minutes that ends a session (default 5)"
    )]
    gap: Option<String>,

    #[arg(long, help = "Force date order instead of detecting it (mdy or dmy)")]
    date_order: Option<DateOrder>,

    #[arg(long, help = "How sessions count per period (start or presence)")]
    count_by: Option<CountingPolicy>,

    #[arg(short, long, help = "Write the report to a file instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Show only the daily table", conflicts_with = "monthly_only")]
    daily_only: bool,

    #[arg(long, help = "Show only the monthly table")]
    monthly_only: bool,

    #[arg(long, help = "Show processing time")]
    benchmark: bool,

    #[arg(long, help = "Log parsing details to stderr")]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let options = Settings::load().resolve(cli.gap.as_deref(), cli.date_order, cli.count_by);
    tracing::debug!(?options, "resolved analysis options");

    run_report(&cli, &options)
}

fn run_report(cli: &Cli, options: &chatclock_core::AnalysisOptions) -> Result<()> {
    let started = Instant::now();

    let lines = read_export(&cli.file)?;
    let report = analyze(&lines, options);
    let view = View::from_flags(cli.daily_only, cli.monthly_only);

    if cli.output.is_some() {
        colored::control::set_override(false);
    }

    let rendered = if cli.json {
        report::render_json(&report, view)?
    } else {
        report::render_text(&report, view)
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            colored::control::unset_override();
            eprintln!(
                "{}",
                format!("✓ Report written to {}", path.display()).green()
            );
        }
        None => println!("{}", rendered),
    }

    if cli.benchmark {
        eprintln!(
            "{}",
            format!(
                "  Processing time: {}ms (analysis {}ms)",
                started.elapsed().as_millis(),
                report.meta.processing_time_ms
            )
            .bright_black()
        );
    }

    Ok(())
}
