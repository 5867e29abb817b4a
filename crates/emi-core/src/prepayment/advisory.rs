//! Advisory output that accompanies a prepayment comparison: cash-flow
//! relief, home-loan tax benefit, prepayment risks and planning notes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::scenarios::{OpportunityCost, PrepaymentInput, ScenarioResult, Strategy};
use crate::metrics::RiskLevel;
use crate::profile::{EmploymentType, LoanType};
use crate::types::{Money, Percent};

/// Annual cap on principal repayment deduction
const PRINCIPAL_DEDUCTION_CAP: Money = dec!(150_000);
/// Annual cap on interest deduction
const INTEREST_DEDUCTION_CAP: Money = dec!(200_000);
/// Assumed share of a year's EMIs that repays principal
const PRINCIPAL_SHARE_OF_EMI: Decimal = dec!(0.7);

const EMERGENCY_FUND_MONTHS: Decimal = dec!(6);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Borrower circumstances beyond the loan itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentContext {
    /// Savings available before the prepayment is made
    pub liquid_savings: Money,
    /// Marginal income tax rate in percent
    #[serde(default)]
    pub tax_bracket_pct: Percent,
    #[serde(default)]
    pub loan_type: LoanType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowImpact {
    pub strategy: Strategy,
    pub monthly_relief: Money,
    pub annual_relief: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBenefit {
    pub principal_benefit: Money,
    pub interest_benefit: Money,
    pub total_tax_benefit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentRisk {
    pub level: RiskLevel,
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryNote {
    pub priority: NotePriority,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepaymentAdvisory {
    pub cash_flow: Vec<CashFlowImpact>,
    /// Present only for home loans with a known tax bracket
    pub tax_benefit: Option<TaxBenefit>,
    pub risks: Vec<PrepaymentRisk>,
    pub notes: Vec<AdvisoryNote>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Assemble the advisory sections that the available inputs support.
///
/// Sections needing the borrower profile or the savings context are left
/// empty when those are absent.
pub fn build_advisory(
    input: &PrepaymentInput,
    scenarios: &[ScenarioResult],
    opportunity: &OpportunityCost,
) -> PrepaymentAdvisory {
    PrepaymentAdvisory {
        cash_flow: cash_flow_impact(scenarios),
        tax_benefit: tax_benefit(input, scenarios),
        risks: assess_risks(input, opportunity),
        notes: advisory_notes(input),
    }
}

fn cash_flow_impact(scenarios: &[ScenarioResult]) -> Vec<CashFlowImpact> {
    scenarios
        .iter()
        .filter(|s| s.strategy != Strategy::NoAction)
        .map(|s| {
            let monthly_relief = s.emi_reduction.unwrap_or_default();
            CashFlowImpact {
                strategy: s.strategy,
                monthly_relief,
                annual_relief: monthly_relief * dec!(12),
            }
        })
        .collect()
}

fn tax_benefit(input: &PrepaymentInput, scenarios: &[ScenarioResult]) -> Option<TaxBenefit> {
    let context = input.context.as_ref()?;
    if context.loan_type != LoanType::Home {
        return None;
    }

    let baseline = scenarios.iter().find(|s| s.strategy == Strategy::NoAction)?;
    let remaining_years = Decimal::from(input.loan.term_months) / dec!(12);
    if remaining_years.is_zero() {
        return None;
    }

    let principal_benefit =
        (baseline.emi * dec!(12) * PRINCIPAL_SHARE_OF_EMI).min(PRINCIPAL_DEDUCTION_CAP);
    let interest_benefit = (baseline.total_interest / remaining_years)
        .max(Decimal::ZERO)
        .min(INTEREST_DEDUCTION_CAP);

    Some(TaxBenefit {
        principal_benefit,
        interest_benefit,
        total_tax_benefit: (principal_benefit + interest_benefit) * context.tax_bracket_pct
            / dec!(100),
    })
}

fn assess_risks(input: &PrepaymentInput, opportunity: &OpportunityCost) -> Vec<PrepaymentRisk> {
    let mut risks = Vec::new();

    if let (Some(context), Some(profile)) = (&input.context, &input.profile) {
        if profile.monthly_income > Decimal::ZERO {
            let months_left =
                (context.liquid_savings - input.prepayment_amount) / profile.monthly_income;
            if months_left < EMERGENCY_FUND_MONTHS {
                risks.push(PrepaymentRisk {
                    level: RiskLevel::High,
                    kind: "Liquidity Risk".into(),
                    description: format!(
                        "Emergency fund will reduce to {} months after prepayment",
                        months_left.round_dp(1)
                    ),
                });
            }
        }
    }

    if input.investment_return_pct > input.loan.annual_rate_pct + dec!(2) {
        risks.push(PrepaymentRisk {
            level: RiskLevel::Medium,
            kind: "Opportunity Cost".into(),
            description: format!(
                "Potential gain of {} forgone by not investing at {}%",
                opportunity.opportunity_cost.round_dp(0),
                input.investment_return_pct
            ),
        });
    }

    if let Some(profile) = &input.profile {
        if profile.age > 55 && profile.employment_type == EmploymentType::Private {
            risks.push(PrepaymentRisk {
                level: RiskLevel::Medium,
                kind: "Income Stability".into(),
                description: "Consider job security near retirement age before large prepayments"
                    .into(),
            });
        }
    }

    risks
}

fn note(priority: NotePriority, title: &str, text: String) -> AdvisoryNote {
    AdvisoryNote {
        priority,
        title: title.into(),
        text,
    }
}

fn advisory_notes(input: &PrepaymentInput) -> Vec<AdvisoryNote> {
    let mut notes = Vec::new();
    let rate = input.loan.annual_rate_pct;
    let returns = input.investment_return_pct;

    if let Some(profile) = &input.profile {
        if profile.age < 35 {
            notes.push(note(
                NotePriority::High,
                "Young Professional Strategy",
                format!(
                    "At {}, a long investment horizon favours investing surplus funds over aggressive prepayment",
                    profile.age
                ),
            ));
        } else if profile.age > 50 {
            notes.push(note(
                NotePriority::High,
                "Pre-Retirement Strategy",
                format!(
                    "At {}, reducing debt before retirement takes priority; prepayment is recommended",
                    profile.age
                ),
            ));
        }
    }

    let arbitrage = returns - rate;
    if arbitrage > dec!(3) {
        notes.push(note(
            NotePriority::Medium,
            "Investment Arbitrage",
            format!(
                "Expected returns ({returns}%) significantly exceed the loan rate ({rate}%); consider investing instead"
            ),
        ));
    } else if arbitrage < dec!(-1) {
        notes.push(note(
            NotePriority::High,
            "Guaranteed Savings",
            format!(
                "Loan rate ({rate}%) exceeds expected returns ({returns}%); prepayment is a guaranteed saving"
            ),
        ));
    }

    if let (Some(context), Some(profile)) = (&input.context, &input.profile) {
        let six_months_income = profile.monthly_income * EMERGENCY_FUND_MONTHS;
        if six_months_income > Decimal::ZERO {
            let cover = context.liquid_savings / six_months_income;
            if cover < Decimal::ONE {
                notes.push(note(
                    NotePriority::High,
                    "Liquidity Warning",
                    format!(
                        "Build a 6-month emergency fund before prepaying; savings cover only {} months",
                        (cover * EMERGENCY_FUND_MONTHS).round_dp(1)
                    ),
                ));
            } else if cover > dec!(2) {
                notes.push(note(
                    NotePriority::Medium,
                    "Strong Liquidity",
                    "Emergency fund coverage is ample; prepayment can be considered safely".into(),
                ));
            }
        }
    }

    if let Some(context) = &input.context {
        if context.loan_type == LoanType::Home && context.tax_bracket_pct >= dec!(30) {
            notes.push(note(
                NotePriority::Medium,
                "Tax Optimization",
                "Home loan principal and interest deductions reduce the effective cost of the loan; include them in the decision".into(),
            ));
        }
    }

    if let Some(profile) = &input.profile {
        if profile.employment_type == EmploymentType::SelfEmployed {
            notes.push(note(
                NotePriority::Medium,
                "Self-Employed Consideration",
                "Income volatility calls for higher liquidity; a partial prepayment balances debt reduction with cash flow".into(),
            ));
        }
    }

    notes
}
