//! CLI entry point for the course progress dashboard.
//!
//! Provides subcommands for printing a one-off report, listing the course
//! table, and sampling the sheet on an interval into a snapshot CSV.

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use course_progress::{
    config::DashboardConfig,
    fetch::BasicClient,
    output::{append_record, print_pretty, render_text, to_json, write_course_table},
    pipeline::{self, Report},
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "course_progress")]
#[command(about = "Course and program progress from a published spreadsheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Sheet CSV URL or local file; overrides the config and environment
    #[arg(short, long, value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet and print the summary, charts data, and course table
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Optional: also write the course table to this CSV file
        #[arg(long)]
        courses_csv: Option<String>,
    },
    /// Fetch the sheet and write only the course table as CSV to stdout
    Courses {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Re-run the report on an interval and append a summary row per sample
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// CSV file to append summary snapshots to
        #[arg(short, long, default_value = "progress.csv")]
        output: String,

        /// Seconds between samples
        #[arg(short = 'r', long, default_value_t = 300)]
        interval: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,
    },
    /// Print the effective configuration as JSON
    ShowConfig {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            source,
            format,
            courses_csv,
        } => {
            let config = resolve_config(&source)?;
            let report = fetch_report(&config).await?;
            print_pretty(&report.summary);

            match format {
                Format::Text => println!("{}", render_text(&report)),
                Format::Json => println!("{}", to_json(&report)?),
            }

            if let Some(path) = courses_csv {
                write_course_table(&path, &report.records)?;
                info!(path = %path, "Course table written");
            }
        }
        Commands::Courses { source } => {
            let config = resolve_config(&source)?;
            let report = fetch_report(&config).await?;
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for record in &report.records {
                writer.serialize(course_progress::output::CourseRow::from(record))?;
            }
            writer.flush()?;
        }
        Commands::Watch {
            source,
            output,
            interval,
            num_samples,
        } => {
            let config = resolve_config(&source)?;
            watch(&config, &output, interval, num_samples).await?;
        }
        Commands::ShowConfig { source } => {
            let config = resolve_config(&source)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/course_progress.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("course_progress.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn resolve_config(args: &SourceArgs) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::resolve(args.config.as_deref())?;
    if let Some(source) = &args.source {
        config.source_url = source.clone();
    }
    Ok(config)
}

fn build_client(config: &DashboardConfig) -> Result<BasicClient> {
    Ok(match config.request_timeout_secs {
        Some(secs) => BasicClient::with_timeout(Duration::from_secs(secs))?,
        None => BasicClient::new(),
    })
}

/// Runs the pipeline once, logging blocking failures before returning them.
async fn fetch_report(config: &DashboardConfig) -> Result<Report> {
    let client = build_client(config)?;
    let today = Local::now().date_naive();
    match pipeline::run(&client, config, today).await {
        Ok(report) => {
            if report.is_degraded() {
                warn!(warnings = report.warnings.len(), "Report is incomplete");
            }
            Ok(report)
        }
        Err(e) => {
            error!(error = %e, blocking = e.is_blocking(), "Could not build report");
            Err(e.into())
        }
    }
}

/// Samples the sheet every `interval` seconds, appending one summary row
/// per successful sample. Failed samples are logged and skipped.
#[tracing::instrument(skip(config))]
async fn watch(
    config: &DashboardConfig,
    output: &str,
    interval: u64,
    num_samples: usize,
) -> Result<()> {
    if num_samples == 0 {
        info!(interval, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, interval, "Starting sample collection");
    }

    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        sample_count += 1;

        match fetch_report(config).await {
            Ok(report) => {
                if let Err(e) = append_record(output, &report.summary) {
                    error!(error = %e, "Failed to write summary snapshot");
                } else {
                    info!(
                        sample = sample_count,
                        program_day_pct = report.summary.program_day_pct,
                        "Summary snapshot written"
                    );
                }
            }
            Err(e) => {
                error!(sample = sample_count, error = %e, "Sample failed");
            }
        }

        if num_samples == 0 || sample_count < num_samples {
            info!(interval, "Waiting before next sample");
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    info!(output, "Finished sampling");
    Ok(())
}
