use std::error::Error;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use log::info;
use sales_report::aggregate::summarize;
use sales_report::config::ReportConfig;
use sales_report::loader::load;
use sales_report::mail::SmtpMailer;
use sales_report::pipeline::run_daily_report;
use sales_report::render::ReportRenderer;
use sales_report::schedule::Scheduler;
use sales_report::{source, ReportError};
use tracing_subscriber::EnvFilter;

/// Generates the daily sales report and mails it on a schedule.
///
/// Settings come from `sales_report.toml` (or `--config`) and `SALES_REPORT_*`
/// environment variables, e.g. `SALES_REPORT_SMTP__PASSWORD`.
#[derive(Parser)]
#[command(author, version, about = "Daily sales report generator")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "SALES_REPORT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline every day at the configured time (default).
    Schedule,

    /// Run the pipeline once now and mail the report.
    #[command(name = "run-once", aliases = ["run_once", "once"])]
    RunOnce,

    /// Write a synthetic sales data file for today.
    Generate {
        /// Target CSV path.
        path: PathBuf,
    },

    /// Print the summary of a sales data file.
    Summarize {
        /// CSV file to read.
        path: PathBuf,
    },

    /// Render a report from a sales data file without mailing it.
    Render {
        /// CSV file to read.
        data: PathBuf,
        /// Output PDF path.
        output: PathBuf,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> Result<(), ReportError> {
    let config = ReportConfig::load(cli.config.as_deref())?;
    let today = Local::now().date_naive();

    match cli.command.unwrap_or(Commands::Schedule) {
        Commands::Schedule => {
            config.validate()?;
            let mailer = SmtpMailer::new(config.smtp.clone());
            let mut scheduler = Scheduler::new(config.schedule()?);
            scheduler.run_forever(|date| run_daily_report(&config, &mailer, date).map(|_| ()))
        }
        Commands::RunOnce => {
            config.validate()?;
            let mailer = SmtpMailer::new(config.smtp.clone());
            let report = run_daily_report(&config, &mailer, today)?;
            info!("Report sent to {}", config.recipient);
            println!("Generated and sent {}", report.report_path.display());
        }
        Commands::Generate { path } => {
            let table = source::generate(&path, today)?;
            println!("Generated {} ({} records)", path.display(), table.len());
        }
        Commands::Summarize { path } => {
            let summary = summarize(&load(&path)?, today)?;
            for line in ReportRenderer::new(config.currency_symbol.as_str()).body_lines(&summary) {
                println!("{}", line);
            }
        }
        Commands::Render { data, output } => {
            let summary = summarize(&load(&data)?, today)?;
            ReportRenderer::new(config.currency_symbol.as_str()).render(&summary, &output)?;
            println!("Generated {}", output.display());
        }
    }

    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
