use clap::Args;

use emi_core::lenders::{match_lenders, LenderMatchInput};
use emi_core::profile::LoanType;

use super::{parse_loan_type, CmdResult, LoanArgs, ProfileArgs};
use crate::input;

/// Arguments for lender matching
#[derive(Args)]
pub struct LendersArgs {
    /// Path to JSON input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// home, car, personal, education or business
    #[arg(long, value_parser = parse_loan_type)]
    pub loan_type: Option<LoanType>,

    /// Maximum number of lenders to return
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run_lenders(args: LendersArgs) -> CmdResult {
    let request: LenderMatchInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LenderMatchInput {
            profile: args.profile.profile()?,
            loan: args.loan.terms()?,
            loan_type: args.loan_type.unwrap_or_default(),
            catalogue: None,
            limit: args.limit,
        },
    };

    let result = match_lenders(&request)?;
    Ok(serde_json::to_value(result)?)
}
