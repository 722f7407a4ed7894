//! Haushalt CLI
//!
//! Prints summaries of a budget snapshot stored as JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use haushalt_core::aggregation::{BudgetAggregator, SummaryService};
use haushalt_core::budget::{BudgetSnapshot, Month, parse_amount};
use haushalt_core::export::write_yearly_csv;
use haushalt_shared::{AppConfig, AppError};
use haushalt_shared::config::LogConfig;
use haushalt_shared::error::EXIT_SOFTWARE;
use haushalt_shared::types::CategoryId;

mod render;

#[derive(Parser, Debug)]
#[command(name = "haushalt", version, about = "Household budget planner")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Twelve-month table with yearly totals and planned vs. actual
    Year {
        /// Budget snapshot (JSON)
        snapshot: PathBuf,
    },

    /// Summary of a single month
    Month {
        /// Budget snapshot (JSON)
        snapshot: PathBuf,

        /// Month number 1-12 (default: current month)
        #[arg(long)]
        month: Option<u8>,
    },

    /// Planned vs. actual per month for one category
    Category {
        /// Budget snapshot (JSON)
        snapshot: PathBuf,

        /// Category ID
        #[arg(long)]
        id: CategoryId,
    },

    /// Payroll breakdown for a given gross salary
    NetSalary {
        /// Budget snapshot (JSON), for its deductions and tax rules
        snapshot: PathBuf,

        /// Gross monthly salary
        #[arg(long)]
        gross: String,
    },

    /// Check a snapshot for invalid records
    Validate {
        /// Budget snapshot (JSON)
        snapshot: PathBuf,
    },

    /// Export the yearly table as CSV
    Export {
        /// Budget snapshot (JSON)
        snapshot: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let err = AppError::from(err);
            eprintln!("error: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    init_tracing(&config.log);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let app_err = err.chain().find_map(|e| e.downcast_ref::<AppError>());
            let code = app_err.map_or("INTERNAL_ERROR", AppError::error_code);
            error!(code, error = %format!("{err:#}"), "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(app_err.map_or(EXIT_SOFTWARE, AppError::exit_code))
        }
    }
}

/// Logs go to stderr so stdout stays clean for tables, JSON and CSV.
fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}

fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    let service = SummaryService::from_config(&config.planner);
    let decimal_places = config.planner.display_decimal_places;

    match cli.command {
        Command::Year { snapshot } => {
            let snapshot = load_valid_snapshot(&snapshot)?;
            let summary = service.yearly_summary(&snapshot).map_err(AppError::from)?;
            if cli.json {
                print_json(&summary)?;
            } else {
                render::yearly(&summary, decimal_places);
            }
        }

        Command::Month { snapshot, month } => {
            let snapshot = load_valid_snapshot(&snapshot)?;
            let month = match month {
                Some(number) => Month::new(number).map_err(AppError::from)?,
                None => current_month()?,
            };
            let summary = service
                .monthly_summary(&snapshot, month)
                .map_err(AppError::from)?;
            if cli.json {
                print_json(&summary)?;
            } else {
                render::month(&summary, service.currency(&snapshot.budget), decimal_places);
            }
        }

        Command::Category { snapshot, id } => {
            let snapshot = load_valid_snapshot(&snapshot)?;
            let overview = service
                .category_overview(&snapshot, id)
                .map_err(AppError::from)?;
            if cli.json {
                print_json(&overview)?;
            } else {
                render::category(&overview, service.currency(&snapshot.budget), decimal_places);
            }
        }

        Command::NetSalary { snapshot, gross } => {
            let snapshot = load_valid_snapshot(&snapshot)?;
            let gross = parse_amount("gross", &gross).map_err(AppError::from)?;
            let payroll =
                BudgetAggregator::payroll_for_gross(&snapshot.tax_rules, &snapshot.deductions, gross)
                    .map_err(AppError::from)?;
            if cli.json {
                print_json(&payroll)?;
            } else {
                render::payroll(&payroll, service.currency(&snapshot.budget), decimal_places);
            }
        }

        Command::Validate { snapshot } => {
            let path = snapshot;
            let snapshot = load_snapshot(&path)?;
            snapshot
                .validate()
                .map_err(AppError::from)
                .with_context(|| format!("{} is not a valid snapshot", path.display()))?;
            info!(budget = %snapshot.budget.name, year = snapshot.year, "Snapshot is valid");
            if cli.json {
                print_json(&serde_json::json!({ "valid": true }))?;
            } else {
                println!("{}: OK", path.display());
            }
        }

        Command::Export { snapshot, out } => {
            let snapshot = load_valid_snapshot(&snapshot)?;
            let summary = service.yearly_summary(&snapshot).map_err(AppError::from)?;
            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_yearly_csv(&summary, decimal_places, BufWriter::new(file))?;
                    info!(path = %path.display(), lines = summary.lines.len(), "Exported yearly table");
                }
                None => write_yearly_csv(&summary, decimal_places, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<BudgetSnapshot> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let snapshot: BudgetSnapshot = serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    debug!(
        budget = %snapshot.budget.name,
        year = snapshot.year,
        categories = snapshot.categories.len(),
        entries = snapshot.entries.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

fn load_valid_snapshot(path: &Path) -> Result<BudgetSnapshot> {
    let snapshot = load_snapshot(path)?;
    snapshot
        .validate()
        .map_err(AppError::from)
        .with_context(|| format!("{} is not a valid snapshot", path.display()))?;
    Ok(snapshot)
}

fn current_month() -> Result<Month> {
    let number = u8::try_from(chrono::Local::now().month()).context("current month")?;
    Ok(Month::new(number).map_err(AppError::from)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
