use clap::Args;
use rust_decimal::Decimal;

use emi_core::prepayment::{compare_scenarios, PrepaymentContext, PrepaymentInput};
use emi_core::profile::LoanType;

use super::{parse_loan_type, CmdResult, LoanArgs, ProfileArgs};
use crate::input;

/// Arguments for the prepayment scenario comparison
#[derive(Args)]
pub struct PrepaymentArgs {
    /// Path to JSON input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding loan: principal, rate and remaining term
    #[command(flatten)]
    pub loan: LoanArgs,

    /// EMI currently paid (defaults to the formula EMI)
    #[arg(long)]
    pub current_emi: Option<Decimal>,

    /// Lump sum available for prepayment
    #[arg(long, alias = "amount-prepaid")]
    pub prepayment: Option<Decimal>,

    /// Expected annual return on the lump sum if invested, in percent
    #[arg(long, default_value = "8")]
    pub returns: Decimal,

    /// Savings on hand before the prepayment
    #[arg(long)]
    pub liquid_savings: Option<Decimal>,

    /// Marginal tax rate in percent
    #[arg(long)]
    pub tax_bracket: Option<Decimal>,

    /// home, car, personal, education or business
    #[arg(long, value_parser = parse_loan_type)]
    pub loan_type: Option<LoanType>,

    /// Include a borrower profile in the advisory
    #[arg(long)]
    pub with_profile: bool,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

pub fn run_prepayment(args: PrepaymentArgs) -> CmdResult {
    let request: PrepaymentInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PrepaymentInput {
            loan: args.loan.terms()?,
            current_emi: args.current_emi,
            prepayment_amount: args
                .prepayment
                .ok_or("--prepayment is required (or provide --input)")?,
            investment_return_pct: args.returns,
            profile: if args.with_profile {
                Some(args.profile.profile()?)
            } else {
                None
            },
            context: args.liquid_savings.map(|liquid_savings| PrepaymentContext {
                liquid_savings,
                tax_bracket_pct: args.tax_bracket.unwrap_or_default(),
                loan_type: args.loan_type.unwrap_or_default(),
            }),
        },
    };

    let result = compare_scenarios(&request)?;
    Ok(serde_json::to_value(result)?)
}
