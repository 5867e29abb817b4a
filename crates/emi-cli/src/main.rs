mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::eligibility::EligibilityArgs;
use commands::lenders::LendersArgs;
use commands::loan::{AffordabilityArgs, AnalyzeArgs, EmiArgs, RiskArgs, ScheduleArgs};
use commands::prepayment::PrepaymentArgs;
use commands::sample::SampleArgs;
use commands::whatif::WhatIfArgs;
use config::AppConfig;

/// Loan EMI, amortization and prepayment planning
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan EMI, amortization and prepayment planning",
    long_about = "Calculate EMIs and amortization schedules with decimal precision, \
                  score affordability and risk, compare prepayment strategies and \
                  what-if scenarios, match lenders, and check eligibility against a \
                  remote classifier with a local fallback."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the monthly installment and total interest
    Emi(EmiArgs),
    /// Generate the amortization schedule
    Schedule(ScheduleArgs),
    /// Full affordability analysis of a loan for a borrower
    Analyze(AnalyzeArgs),
    /// Classify EMI burden as Low, Medium or High risk
    Risk(RiskArgs),
    /// Score affordability on a 0-100 scale
    Affordability(AffordabilityArgs),
    /// Compare prepayment strategies against investing the lump sum
    Prepayment(PrepaymentArgs),
    /// Compare a current loan with a proposed change
    WhatIf(WhatIfArgs),
    /// Check eligibility via the remote classifier, falling back locally
    Eligibility(EligibilityArgs),
    /// Rank lenders for a borrower and loan
    Lenders(LendersArgs),
    /// Show built-in sample borrowers
    Sample(SampleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let app_config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    if let Err(e) = telemetry::init(&app_config.log_level) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result: commands::CmdResult = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Analyze(args) => commands::loan::run_analyze(args),
        Commands::Risk(args) => commands::loan::run_risk(args),
        Commands::Affordability(args) => commands::loan::run_affordability(args),
        Commands::Prepayment(args) => commands::prepayment::run_prepayment(args),
        Commands::WhatIf(args) => commands::whatif::run_what_if(args),
        Commands::Eligibility(args) => {
            commands::eligibility::run_eligibility(args, app_config.classifier)
        }
        Commands::Lenders(args) => commands::lenders::run_lenders(args),
        Commands::Sample(args) => commands::sample::run_sample(args),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
