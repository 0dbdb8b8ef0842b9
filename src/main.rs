use clap::Parser;
use expense_tracker::args::{AddSubcommand, Args, Command, ReportSubcommand};
use expense_tracker::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            if auth_args.verify() {
                commands::auth_verify(&config).await?.print()
            } else {
                commands::auth(&config).await?.print()
            }
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            match add_args.entry() {
                AddSubcommand::Expense(args) => {
                    commands::add_expense(&config, args).await?.print()
                }
                AddSubcommand::Income(args) => commands::add_income(&config, args).await?.print(),
            }
        }

        Command::Dashboard(dashboard_args) => {
            let config = Config::load(home).await?;
            commands::dashboard(&config, dashboard_args).await?.print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            match report_args.report() {
                ReportSubcommand::Breakdown(args) => {
                    commands::report_breakdown(&config, args).await?.print()
                }
                ReportSubcommand::Trend(args) => {
                    commands::report_trend(&config, args).await?.print()
                }
                ReportSubcommand::Totals => commands::report_totals(&config).await?.print(),
            }
        }

        Command::Chart(chart_args) => {
            let config = Config::load(home).await?;
            commands::chart(&config, chart_args).await?.print()
        }

        Command::Categories => commands::categories().print(),

        Command::Mcp(_mcp_args) => commands::mcp(Config::load(home).await?).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => {
            // Without RUST_LOG only the library and the binary log, at the requested level.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
