//! Side-by-side comparison of a current loan and a proposed change
//! (different amount, rate, tenure, income or credit score).

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::eligibility::{assess_eligibility_locally, EligibilityAssessment, EligibilityStatus};
use crate::emi::{compute_emi, EmiResult, LoanTerms};
use crate::error::EngineError;
use crate::metrics::{compute_affordability_score, emi_to_income_ratio, RiskLevel, RiskThresholds};
use crate::profile::{BorrowerProfile, EmploymentType};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EngineResult;

const TREND_BAND: Decimal = dec!(0.05);
const PROBABILITY_SHIFT: Decimal = dec!(0.1);
const SIGNIFICANT_EMI_CHANGE: Money = dec!(5_000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One side of the comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfCase {
    pub loan: LoanTerms,
    pub monthly_income: Money,
    pub credit_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfInput {
    pub current: WhatIfCase,
    pub proposed: WhatIfCase,
    /// Remaining borrower attributes shared by both cases
    #[serde(default)]
    pub profile: Option<BorrowerProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub emi: EmiResult,
    pub emi_to_income_ratio: Percent,
    pub risk_level: RiskLevel,
    pub affordability_score: Decimal,
    pub eligibility: EligibilityAssessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityTrend {
    Better,
    Worse,
    Same,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfRecommendation {
    pub kind: RecommendationKind,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfComparison {
    pub current: CaseOutcome,
    pub proposed: CaseOutcome,
    pub emi_change: Money,
    pub emi_change_pct: Percent,
    /// Current total interest minus proposed total interest
    pub interest_savings: Money,
    pub probability_change: Decimal,
    pub eligibility_trend: EligibilityTrend,
    pub recommendations: Vec<WhatIfRecommendation>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn compare_what_if(input: &WhatIfInput) -> EngineResult<ComputationOutput<WhatIfComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (name, case) in [("current", &input.current), ("proposed", &input.proposed)] {
        if case.monthly_income <= Decimal::ZERO {
            return Err(EngineError::invalid(
                &format!("{name}.monthly_income"),
                "Monthly income must be positive",
            ));
        }
    }

    let thresholds = RiskThresholds::default();
    let current_profile = case_profile(input.profile.as_ref(), &input.current);
    let proposed_profile = case_profile(input.profile.as_ref(), &input.proposed);

    let current = evaluate_case(&input.current, &current_profile, &thresholds)?;
    let mut proposed = evaluate_case(&input.proposed, &proposed_profile, &thresholds)?;

    adjust_proposed_probability(&input.current, &input.proposed, &mut proposed.eligibility);

    let emi_change = proposed.emi.monthly_payment - current.emi.monthly_payment;
    let emi_change_pct = emi_change / current.emi.monthly_payment * dec!(100);
    let interest_savings = current.emi.total_interest - proposed.emi.total_interest;
    let probability_change = proposed.eligibility.probability - current.eligibility.probability;

    let eligibility_trend = if probability_change > TREND_BAND {
        EligibilityTrend::Better
    } else if probability_change < -TREND_BAND {
        EligibilityTrend::Worse
    } else {
        EligibilityTrend::Same
    };

    if proposed.risk_level == RiskLevel::High {
        warnings.push(format!(
            "Proposed EMI is {}% of income",
            proposed.emi_to_income_ratio.round_dp(1)
        ));
    }

    let recommendations = build_recommendations(input, emi_change, probability_change, &proposed);

    let output = WhatIfComparison {
        current,
        proposed,
        emi_change,
        emi_change_pct,
        interest_savings,
        probability_change,
        eligibility_trend,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "What-if comparison of two loan configurations",
        &serde_json::json!({
            "trend_band": TREND_BAND.to_string(),
            "eligibility": "local heuristic with income/credit/amount adjustments",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Built-in comparison presets: `income_increase`, `rate_decrease`,
/// `tenure_extend`.
pub const TEMPLATE_NAMES: [&str; 3] = ["income_increase", "rate_decrease", "tenure_extend"];

pub fn what_if_template(name: &str) -> Option<WhatIfInput> {
    let current = WhatIfCase {
        loan: LoanTerms::new(dec!(2_000_000), dec!(8.5), 240),
        monthly_income: dec!(50_000),
        credit_score: 750,
    };
    let mut proposed = current.clone();

    match name {
        "income_increase" => proposed.monthly_income = dec!(60_000),
        "rate_decrease" => proposed.loan.annual_rate_pct = dec!(7.5),
        "tenure_extend" => proposed.loan.term_months = 25 * 12,
        _ => return None,
    }

    Some(WhatIfInput {
        current,
        proposed,
        profile: None,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn case_profile(shared: Option<&BorrowerProfile>, case: &WhatIfCase) -> BorrowerProfile {
    let mut profile = shared.cloned().unwrap_or_else(|| {
        BorrowerProfile::new(
            30,
            case.monthly_income,
            case.credit_score,
            EmploymentType::Private,
        )
    });
    profile.monthly_income = case.monthly_income;
    profile.credit_score = case.credit_score;
    profile
}

fn evaluate_case(
    case: &WhatIfCase,
    profile: &BorrowerProfile,
    thresholds: &RiskThresholds,
) -> EngineResult<CaseOutcome> {
    let emi = compute_emi(&case.loan)?;
    let ratio = emi_to_income_ratio(emi.monthly_payment, case.monthly_income)?;
    Ok(CaseOutcome {
        risk_level: thresholds.classify(ratio),
        affordability_score: compute_affordability_score(
            emi.monthly_payment,
            case.monthly_income,
            profile,
        )?,
        eligibility: assess_eligibility_locally(profile, ratio),
        emi_to_income_ratio: ratio,
        emi,
    })
}

/// Income growth above 10% or a credit gain above 20 points lifts the
/// proposed probability by 0.1 (to at most 0.95); loan growth above 20%
/// trims it by 0.05 (to no less than 0.1). Neither adjustment moves the
/// probability in the opposite direction.
fn adjust_proposed_probability(
    current: &WhatIfCase,
    proposed: &WhatIfCase,
    eligibility: &mut EligibilityAssessment,
) {
    let mut p = eligibility.probability;

    let income_up = proposed.monthly_income > current.monthly_income * dec!(1.1);
    let credit_up = proposed.credit_score > current.credit_score + 20;
    if income_up || credit_up {
        p = p.max((p + PROBABILITY_SHIFT).min(dec!(0.95)));
    }

    if proposed.loan.principal > current.loan.principal * dec!(1.2) {
        p = p.min((p - dec!(0.05)).max(dec!(0.1)));
    }

    eligibility.probability = p;
    eligibility.status = EligibilityStatus::from_probability(p);
}

fn build_recommendations(
    input: &WhatIfInput,
    emi_change: Money,
    probability_change: Decimal,
    proposed: &CaseOutcome,
) -> Vec<WhatIfRecommendation> {
    let mut recs = Vec::new();
    let mut push = |kind, text: String| recs.push(WhatIfRecommendation { kind, text });

    if emi_change < -SIGNIFICANT_EMI_CHANGE {
        push(
            RecommendationKind::Success,
            format!("New scenario reduces EMI by {} per month", (-emi_change).round_dp(0)),
        );
    } else if emi_change > SIGNIFICANT_EMI_CHANGE {
        push(
            RecommendationKind::Warning,
            format!(
                "EMI increases by {}; consider a longer tenure or a smaller loan",
                emi_change.round_dp(0)
            ),
        );
    }

    if probability_change > PROBABILITY_SHIFT {
        push(
            RecommendationKind::Success,
            format!(
                "Eligibility probability improves by {} percentage points",
                (probability_change * dec!(100)).round_dp(1)
            ),
        );
    } else if probability_change < -PROBABILITY_SHIFT {
        push(
            RecommendationKind::Warning,
            "Eligibility probability drops; improve the credit score or reduce the loan amount"
                .into(),
        );
    }

    match proposed.risk_level {
        RiskLevel::High => push(
            RecommendationKind::Warning,
            "High EMI burden; raise income or reduce the loan amount for better approval chances"
                .into(),
        ),
        RiskLevel::Low => push(
            RecommendationKind::Success,
            "Low risk profile; premium lenders may offer better rates".into(),
        ),
        RiskLevel::Medium => {}
    }

    let income_change = input.proposed.monthly_income - input.current.monthly_income;
    if income_change > dec!(10_000) {
        push(
            RecommendationKind::Success,
            format!(
                "Income increase of {} strengthens the loan profile",
                income_change.round_dp(0)
            ),
        );
    }

    let credit_change = i64::from(input.proposed.credit_score) - i64::from(input.current.credit_score);
    if credit_change > 20 {
        push(
            RecommendationKind::Info,
            format!("Credit score gain of {credit_change} points helps negotiate better rates"),
        );
    }

    if recs.is_empty() {
        recs.push(WhatIfRecommendation {
            kind: RecommendationKind::Info,
            text: "Scenarios differ only slightly; try a larger adjustment for a clearer comparison"
                .into(),
        });
    }

    recs
}
