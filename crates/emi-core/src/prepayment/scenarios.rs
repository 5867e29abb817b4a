//! Prepayment scenario comparison.
//!
//! Given an outstanding loan and a lump sum, computes four outcomes against
//! the same no-action baseline:
//! 1. **No action** -- keep paying the current EMI for the remaining term.
//! 2. **Reduce tenure** -- apply the lump sum, keep the EMI, solve for the
//!    shorter term in closed form.
//! 3. **Reduce EMI** -- apply the lump sum, keep the term, recompute the EMI.
//! 4. **Partial prepayment** -- apply half the lump sum, keep the term.
//!
//! The lump sum's opportunity cost (compounded at the investment return for
//! the remaining term) decides between prepaying and investing.

use std::fmt;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::advisory::{build_advisory, PrepaymentAdvisory, PrepaymentContext};
use crate::emi::{compute_emi, payment_for, solve_tenure, LoanTerms};
use crate::error::EngineError;
use crate::profile::BorrowerProfile;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Scoring normalisers
// ---------------------------------------------------------------------------

const SAVINGS_NORMALISER: Decimal = dec!(100_000);
const EMI_RELIEF_NORMALISER: Decimal = dec!(5_000);
const TENURE_YEARS_NORMALISER: Decimal = dec!(5);

const SAVINGS_WEIGHT: Decimal = dec!(0.30);
const EMI_RELIEF_WEIGHT: Decimal = dec!(0.25);
const TENURE_WEIGHT: Decimal = dec!(0.20);
const OPPORTUNITY_WEIGHT: Decimal = dec!(0.25);

/// Share of the lump sum applied in the partial scenario
const PARTIAL_SHARE: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NoAction,
    ReduceTenure,
    ReduceEmi,
    PartialPrepayment,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::NoAction => "Continue Current EMI",
            Strategy::ReduceTenure => "Reduce Tenure",
            Strategy::ReduceEmi => "Reduce EMI",
            Strategy::PartialPrepayment => "Partial Prepayment",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    /// Outstanding principal, annual rate and remaining months
    pub loan: LoanTerms,
    /// EMI currently being paid; defaults to the formula EMI for `loan`
    #[serde(default)]
    pub current_emi: Option<Money>,
    pub prepayment_amount: Money,
    /// Expected annual return if the lump sum were invested instead
    pub investment_return_pct: Percent,
    #[serde(default)]
    pub profile: Option<BorrowerProfile>,
    #[serde(default)]
    pub context: Option<PrepaymentContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub strategy: Strategy,
    pub label: String,
    pub emi: Money,
    /// Fractional for the reduce-tenure scenario
    pub tenure_months: Decimal,
    pub total_payment: Money,
    pub total_interest: Money,
    pub interest_saved: Money,
    pub emi_reduction: Option<Money>,
    pub tenure_reduction_months: Option<Decimal>,
    pub prepayment_used: Money,
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityCost {
    pub horizon_years: Decimal,
    pub future_value: Money,
    pub opportunity_cost: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Prepay,
    Invest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Always four entries: no-action, reduce-tenure, reduce-EMI, partial
    pub scenarios: Vec<ScenarioResult>,
    pub optimal: Strategy,
    pub opportunity_cost: OpportunityCost,
    pub recommendation: Recommendation,
    /// Amount by which the recommended choice beats the other
    pub recommendation_margin: Money,
    pub advisory: PrepaymentAdvisory,
}

impl ScenarioComparison {
    pub fn scenario(&self, strategy: Strategy) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.strategy == strategy)
    }

    pub fn optimal_scenario(&self) -> Option<&ScenarioResult> {
        self.scenario(self.optimal)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the four prepayment strategies for an outstanding loan.
pub fn compare_scenarios(
    input: &PrepaymentInput,
) -> EngineResult<ComputationOutput<ScenarioComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let loan = &input.loan;
    let rate = loan.monthly_rate();
    let months = Decimal::from(loan.term_months);
    let formula_emi = compute_emi(loan)?.monthly_payment;
    let current_emi = input.current_emi.unwrap_or(formula_emi);

    if input.current_emi.is_some() && (current_emi - formula_emi).abs() > formula_emi * dec!(0.01)
    {
        warnings.push(format!(
            "Current EMI {} differs from the formula EMI {} for the remaining term",
            current_emi.round_dp(2),
            formula_emi.round_dp(2)
        ));
    }

    let baseline_total = emi_over(current_emi, months)?;
    let baseline_interest = baseline_total - loan.principal;
    if baseline_interest < Decimal::ZERO {
        warnings.push("Current EMI over the remaining term does not cover the principal".into());
    }

    let no_action = ScenarioResult {
        strategy: Strategy::NoAction,
        label: Strategy::NoAction.label().into(),
        emi: current_emi,
        tenure_months: months,
        total_payment: baseline_total,
        total_interest: baseline_interest,
        interest_saved: Decimal::ZERO,
        emi_reduction: None,
        tenure_reduction_months: None,
        prepayment_used: Decimal::ZERO,
        score: None,
    };

    let prepay = input.prepayment_amount;
    let reduced_principal = loan.principal - prepay;

    // Reduce tenure: same EMI on the smaller balance
    let new_months = solve_tenure(reduced_principal, rate, current_emi)?;
    let rt_total = prepay + emi_over(current_emi, new_months)?;
    let rt_interest = rt_total - loan.principal;
    let reduce_tenure = ScenarioResult {
        strategy: Strategy::ReduceTenure,
        label: Strategy::ReduceTenure.label().into(),
        emi: current_emi,
        tenure_months: new_months,
        total_payment: rt_total,
        total_interest: rt_interest,
        interest_saved: baseline_interest - rt_interest,
        emi_reduction: None,
        tenure_reduction_months: Some(months - new_months),
        prepayment_used: prepay,
        score: None,
    };

    let reduce_emi = fixed_term_scenario(
        Strategy::ReduceEmi,
        loan,
        prepay,
        current_emi,
        baseline_interest,
    )?;
    let partial = fixed_term_scenario(
        Strategy::PartialPrepayment,
        loan,
        prepay * PARTIAL_SHARE,
        current_emi,
        baseline_interest,
    )?;

    let opportunity_cost =
        opportunity_cost(prepay, input.investment_return_pct, loan.term_months)?;

    let mut scenarios = vec![no_action, reduce_tenure, reduce_emi, partial];
    for scenario in scenarios.iter_mut().skip(1) {
        scenario.score = Some(score_scenario(scenario, &opportunity_cost));
    }

    let optimal = pick_optimal(&scenarios);
    let optimal_saved = scenarios
        .iter()
        .find(|s| s.strategy == optimal)
        .map(|s| s.interest_saved)
        .unwrap_or_default();

    let recommendation = if opportunity_cost.opportunity_cost > optimal_saved {
        Recommendation::Invest
    } else {
        Recommendation::Prepay
    };

    tracing::debug!(
        optimal = %optimal,
        ?recommendation,
        interest_saved = %optimal_saved.round_dp(2),
        "prepayment scenarios compared"
    );

    let advisory = build_advisory(input, &scenarios, &opportunity_cost);

    let output = ScenarioComparison {
        recommendation_margin: (opportunity_cost.opportunity_cost - optimal_saved).abs(),
        scenarios,
        optimal,
        opportunity_cost,
        recommendation,
        advisory,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment scenario comparison (closed-form tenure solve, weighted scoring)",
        &serde_json::json!({
            "baseline": "current EMI over remaining term",
            "partial_share": PARTIAL_SHARE.to_string(),
            "weights": {
                "interest_saved": SAVINGS_WEIGHT.to_string(),
                "emi_reduction": EMI_RELIEF_WEIGHT.to_string(),
                "tenure_reduction": TENURE_WEIGHT.to_string(),
                "opportunity_cost": OPPORTUNITY_WEIGHT.to_string(),
            },
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &PrepaymentInput) -> EngineResult<()> {
    input.loan.validate()?;

    if input.prepayment_amount < Decimal::ZERO {
        return Err(EngineError::invalid(
            "prepayment_amount",
            "Prepayment amount cannot be negative",
        ));
    }
    if input.prepayment_amount >= input.loan.principal {
        return Err(EngineError::invalid(
            "prepayment_amount",
            "Prepayment must be less than the outstanding principal",
        ));
    }
    if let Some(emi) = input.current_emi {
        if emi <= Decimal::ZERO {
            return Err(EngineError::invalid("current_emi", "Current EMI must be positive"));
        }
    }
    if input.investment_return_pct < Decimal::ZERO {
        return Err(EngineError::invalid(
            "investment_return_pct",
            "Investment return cannot be negative",
        ));
    }
    Ok(())
}

/// Apply `amount` and re-amortise over the unchanged remaining term.
fn fixed_term_scenario(
    strategy: Strategy,
    loan: &LoanTerms,
    amount: Money,
    current_emi: Money,
    baseline_interest: Money,
) -> EngineResult<ScenarioResult> {
    let months = Decimal::from(loan.term_months);
    let new_emi = payment_for(loan.principal - amount, loan.monthly_rate(), loan.term_months)?;
    let total_payment = amount + emi_over(new_emi, months)?;
    let total_interest = total_payment - loan.principal;

    Ok(ScenarioResult {
        strategy,
        label: strategy.label().into(),
        emi: new_emi,
        tenure_months: months,
        total_payment,
        total_interest,
        interest_saved: baseline_interest - total_interest,
        emi_reduction: Some(current_emi - new_emi),
        tenure_reduction_months: None,
        prepayment_used: amount,
        score: None,
    })
}

/// Growth forgone by not investing `amount` for the remaining term.
fn opportunity_cost(
    amount: Money,
    return_pct: Percent,
    term_months: u32,
) -> EngineResult<OpportunityCost> {
    let growth = Decimal::ONE + return_pct / dec!(100);
    let horizon_years = Decimal::from(term_months) / dec!(12);

    let factor = if term_months.is_multiple_of(12) {
        growth.checked_powu(u64::from(term_months / 12))
    } else {
        growth.checked_powd(horizon_years)
    };
    let future_value = factor
        .and_then(|f| amount.checked_mul(f))
        .ok_or_else(|| {
            EngineError::invalid(
                "investment_return_pct",
                "Compounded investment value exceeds the representable numeric range",
            )
        })?;

    Ok(OpportunityCost {
        horizon_years,
        future_value,
        opportunity_cost: future_value - amount,
    })
}

fn emi_over(emi: Money, months: Decimal) -> EngineResult<Money> {
    emi.checked_mul(months).ok_or_else(|| {
        EngineError::invalid("current_emi", "EMI over the term exceeds the representable numeric range")
    })
}

fn score_scenario(scenario: &ScenarioResult, opportunity: &OpportunityCost) -> Decimal {
    let mut score = scenario.interest_saved / SAVINGS_NORMALISER * SAVINGS_WEIGHT;

    if let Some(relief) = scenario.emi_reduction.filter(|r| !r.is_zero()) {
        score += relief / EMI_RELIEF_NORMALISER * EMI_RELIEF_WEIGHT;
    }
    if let Some(months) = scenario.tenure_reduction_months.filter(|m| !m.is_zero()) {
        score += months / dec!(12) / TENURE_YEARS_NORMALISER * TENURE_WEIGHT;
    }

    let loss = opportunity.opportunity_cost - scenario.interest_saved;
    if loss > Decimal::ZERO {
        score -= loss / SAVINGS_NORMALISER * OPPORTUNITY_WEIGHT;
    } else {
        score += OPPORTUNITY_WEIGHT;
    }

    score
}

/// Highest scoring strategy; the first listed wins a tie.
fn pick_optimal(scenarios: &[ScenarioResult]) -> Strategy {
    let mut best: Option<(Strategy, Decimal)> = None;
    for scenario in scenarios {
        let Some(score) = scenario.score else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((scenario.strategy, score)),
        }
    }
    best.map_or(Strategy::NoAction, |(strategy, _)| strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(prepay: Decimal, returns: Decimal) -> PrepaymentInput {
        PrepaymentInput {
            loan: LoanTerms::new(dec!(1_800_000), dec!(8.5), 180),
            current_emi: None,
            prepayment_amount: prepay,
            investment_return_pct: returns,
            profile: None,
            context: None,
        }
    }

    fn find(out: &ScenarioComparison, strategy: Strategy) -> &ScenarioResult {
        out.scenario(strategy).unwrap()
    }

    #[test]
    fn test_four_scenarios_in_order() {
        let out = compare_scenarios(&input(dec!(200_000), dec!(7))).unwrap().result;
        let order: Vec<_> = out.scenarios.iter().map(|s| s.strategy).collect();
        assert_eq!(
            order,
            vec![
                Strategy::NoAction,
                Strategy::ReduceTenure,
                Strategy::ReduceEmi,
                Strategy::PartialPrepayment
            ]
        );
        let baseline = find(&out, Strategy::NoAction);
        assert_eq!(baseline.interest_saved, Decimal::ZERO);
        assert!(baseline.score.is_none());
    }

    #[test]
    fn test_reduce_tenure_shortens_term() {
        let out = compare_scenarios(&input(dec!(200_000), dec!(7))).unwrap().result;
        let rt = find(&out, Strategy::ReduceTenure);
        assert!(rt.tenure_months < dec!(180));
        assert_eq!(rt.total_payment, dec!(200_000) + rt.emi * rt.tenure_months);
        assert_eq!(rt.tenure_reduction_months, Some(dec!(180) - rt.tenure_months));
    }

    #[test]
    fn test_savings_ordering() {
        let out = compare_scenarios(&input(dec!(200_000), dec!(7))).unwrap().result;
        let rt = find(&out, Strategy::ReduceTenure).interest_saved;
        let re = find(&out, Strategy::ReduceEmi).interest_saved;
        let partial = find(&out, Strategy::PartialPrepayment);
        assert!(rt > re);
        assert!(re > partial.interest_saved);
        assert!(partial.interest_saved > Decimal::ZERO);
        assert_eq!(partial.prepayment_used, dec!(100_000));
    }

    #[test]
    fn test_reduce_emi_uses_shared_formula() {
        let out = compare_scenarios(&input(dec!(200_000), dec!(7))).unwrap().result;
        let re = find(&out, Strategy::ReduceEmi);
        let expected = payment_for(dec!(1_600_000), dec!(8.5) / dec!(1200), 180).unwrap();
        assert_eq!(re.emi, expected);
        assert!(re.emi_reduction.unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_opportunity_cost_compounds_annually() {
        let oc = opportunity_cost(dec!(100_000), dec!(10), 120).unwrap();
        assert!((oc.opportunity_cost - dec!(159_374.246)).abs() < dec!(0.01));
        assert_eq!(oc.horizon_years, dec!(10));
    }

    #[test]
    fn test_runaway_investment_return_is_rejected() {
        let mut long = input(dec!(200_000), dec!(300));
        long.loan.term_months = 600;
        match compare_scenarios(&long).unwrap_err() {
            EngineError::InvalidInput { field, .. } => assert_eq!(field, "investment_return_pct"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        // Fractional horizon takes the powd path
        long.loan.term_months = 601;
        assert!(compare_scenarios(&long).is_err());
    }

    #[test]
    fn test_high_returns_recommend_investing() {
        let out = compare_scenarios(&input(dec!(200_000), dec!(15))).unwrap().result;
        assert_eq!(out.recommendation, Recommendation::Invest);

        let out = compare_scenarios(&input(dec!(200_000), dec!(2))).unwrap().result;
        assert_eq!(out.recommendation, Recommendation::Prepay);
    }

    #[test]
    fn test_optimal_is_deterministic() {
        let a = compare_scenarios(&input(dec!(300_000), dec!(9))).unwrap().result;
        let b = compare_scenarios(&input(dec!(300_000), dec!(9))).unwrap().result;
        assert_eq!(a.optimal, b.optimal);
        assert_ne!(a.optimal, Strategy::NoAction);
    }

    #[test]
    fn test_tie_goes_to_first_listed() {
        let mut scenarios = compare_scenarios(&input(dec!(200_000), dec!(7)))
            .unwrap()
            .result
            .scenarios;
        for s in scenarios.iter_mut().skip(1) {
            s.score = Some(dec!(1));
        }
        assert_eq!(pick_optimal(&scenarios), Strategy::ReduceTenure);
    }

    #[test]
    fn test_non_amortizing_emi_rejected() {
        let bad = PrepaymentInput {
            loan: LoanTerms::new(dec!(1_000_000), dec!(12), 240),
            current_emi: Some(dec!(9_000)),
            prepayment_amount: Decimal::ZERO,
            investment_return_pct: dec!(8),
            profile: None,
            context: None,
        };
        assert!(matches!(
            compare_scenarios(&bad),
            Err(EngineError::NonAmortizingLoan { .. })
        ));
    }

    #[test]
    fn test_prepayment_bounds() {
        assert!(compare_scenarios(&input(dec!(-1), dec!(7))).is_err());
        assert!(compare_scenarios(&input(dec!(1_800_000), dec!(7))).is_err());
    }

    #[test]
    fn test_zero_rate_tenure() {
        let zero = PrepaymentInput {
            loan: LoanTerms::new(dec!(120_000), Decimal::ZERO, 12),
            current_emi: None,
            prepayment_amount: dec!(60_000),
            investment_return_pct: dec!(5),
            profile: None,
            context: None,
        };
        let out = compare_scenarios(&zero).unwrap().result;
        let rt = find(&out, Strategy::ReduceTenure);
        assert_eq!(rt.tenure_months, dec!(6));
        assert_eq!(rt.interest_saved, Decimal::ZERO);
    }
}
