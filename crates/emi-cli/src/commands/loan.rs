use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use emi_core::emi::{compute_emi, LoanTerms};
use emi_core::metrics::{
    analyze_loan, compute_affordability_score, compute_risk_level_with, emi_to_income_ratio,
    LoanAnalysisInput, RiskThresholds,
};
use emi_core::schedule::generate_schedule;

use super::{CmdResult, LoanArgs, ProfileArgs};
use crate::input;

/// Arguments for the EMI calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EmiArgs {
    /// Path to JSON loan terms (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON loan terms
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Only emit the first N installments
    #[arg(long)]
    pub rows: Option<u32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Emit the per-year summary instead of monthly rows
    #[arg(long)]
    pub yearly: bool,
}

/// Arguments for the full loan analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input with `loan` and `profile`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Number of schedule rows to include
    #[arg(long)]
    pub rows: Option<u32>,

    /// Treat up to 50% of income as medium risk
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the risk tier
#[derive(Args)]
pub struct RiskArgs {
    /// Monthly EMI
    #[arg(long)]
    pub emi: Decimal,

    /// Monthly income
    #[arg(long)]
    pub income: Decimal,

    /// Treat up to 50% of income as medium risk
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the affordability score
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON input with `emi` and `profile`
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly EMI
    #[arg(long)]
    pub emi: Option<Decimal>,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Deserialize)]
struct AffordabilityRequest {
    emi: Decimal,
    profile: emi_core::profile::BorrowerProfile,
}

fn loan_terms(path: Option<&str>, flags: &LoanArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    match input::load(path)? {
        Some(terms) => Ok(terms),
        None => flags.terms(),
    }
}

fn risk_thresholds(lenient: bool) -> RiskThresholds {
    if lenient {
        RiskThresholds::lenient()
    } else {
        RiskThresholds::default()
    }
}

pub fn run_emi(args: EmiArgs) -> CmdResult {
    let terms = loan_terms(args.input.as_deref(), &args.loan)?;
    let result = compute_emi(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> CmdResult {
    let terms = loan_terms(args.input.as_deref(), &args.loan)?;
    // Surface invalid terms as an error rather than an empty table
    terms.validate()?;

    let mut schedule = generate_schedule(&terms, args.rows);
    if let Some(date) = args.start_date {
        schedule = schedule.with_start_date(date);
    }

    if args.yearly {
        return Ok(serde_json::to_value(schedule.annual_summary())?);
    }
    Ok(serde_json::to_value(&schedule)?)
}

pub fn run_analyze(args: AnalyzeArgs) -> CmdResult {
    let analysis_input: LoanAnalysisInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanAnalysisInput {
            loan: args.loan.terms()?,
            profile: args.profile.profile()?,
            schedule_rows: args.rows,
            thresholds: args.lenient.then(RiskThresholds::lenient),
        },
    };
    let result = analyze_loan(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_risk(args: RiskArgs) -> CmdResult {
    let thresholds = risk_thresholds(args.lenient);
    let ratio = emi_to_income_ratio(args.emi, args.income)?;
    let level = compute_risk_level_with(args.emi, args.income, &thresholds)?;
    Ok(json!({
        "risk_level": level,
        "emi_to_income_ratio": ratio.round_dp(2),
        "thresholds": thresholds,
    }))
}

pub fn run_affordability(args: AffordabilityArgs) -> CmdResult {
    let request = match input::load::<AffordabilityRequest>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => AffordabilityRequest {
            emi: args.emi.ok_or("--emi is required (or provide --input)")?,
            profile: args.profile.profile()?,
        },
    };
    let income = request.profile.monthly_income;
    let score = compute_affordability_score(request.emi, income, &request.profile)?;
    Ok(json!({
        "affordability_score": score.round_dp(2),
        "emi_to_income_ratio": emi_to_income_ratio(request.emi, income)?.round_dp(2),
    }))
}
