//! Affordability metrics derived from an EMI and the borrower's income.
//!
//! Covers the EMI-to-income ratio, the Low/Medium/High risk tier, the
//! 0-100 affordability score, and `analyze_loan`, which assembles all of
//! them with the schedule and local eligibility for a single loan.

use std::fmt;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::eligibility::{assess_eligibility_locally, EligibilityAssessment};
use crate::emi::{compute_emi, EmiResult, LoanTerms};
use crate::error::EngineError;
use crate::profile::{validate_profile, BorrowerProfile, EmploymentType, HouseType};
use crate::schedule::{generate_schedule, AmortizationRow, AnnualSummary};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EngineResult;

/// Ratio at which the base affordability score reaches zero.
const AFFORDABILITY_CEILING: Decimal = dec!(50);

const DEFAULT_SCHEDULE_ROWS: u32 = 12;

// ---------------------------------------------------------------------------
// Ratio and risk tier
// ---------------------------------------------------------------------------

/// EMI as a percentage of monthly income.
pub fn emi_to_income_ratio(emi: Money, monthly_income: Money) -> EngineResult<Percent> {
    if monthly_income <= Decimal::ZERO {
        return Err(EngineError::invalid(
            "monthly_income",
            "Monthly income must be positive",
        ));
    }
    Ok(emi / monthly_income * dec!(100))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// Upper bounds (inclusive, percent of income) for the Low and Medium tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low_max: Percent,
    pub medium_max: Percent,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_max: dec!(30),
            medium_max: dec!(40),
        }
    }
}

impl RiskThresholds {
    /// Medium tier extended to 50% of income.
    pub fn lenient() -> Self {
        Self {
            medium_max: dec!(50),
            ..Self::default()
        }
    }

    pub fn classify(&self, ratio: Percent) -> RiskLevel {
        if ratio <= self.low_max {
            RiskLevel::Low
        } else if ratio <= self.medium_max {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Risk tier with the default thresholds (30% / 40%).
pub fn compute_risk_level(emi: Money, monthly_income: Money) -> EngineResult<RiskLevel> {
    compute_risk_level_with(emi, monthly_income, &RiskThresholds::default())
}

pub fn compute_risk_level_with(
    emi: Money,
    monthly_income: Money,
    thresholds: &RiskThresholds,
) -> EngineResult<RiskLevel> {
    let ratio = emi_to_income_ratio(emi, monthly_income)?;
    Ok(thresholds.classify(ratio))
}

// ---------------------------------------------------------------------------
// Affordability score
// ---------------------------------------------------------------------------

/// Affordability on a 0-100 scale.
///
/// The base falls linearly from 1 at a 0% ratio to 0 at 50%, then the
/// profile adjusts it: +0.10 for credit >= 750, -0.20 below 650, +0.10 for
/// government employment, +0.05 for no other loans or an owned house.
pub fn compute_affordability_score(
    emi: Money,
    monthly_income: Money,
    profile: &BorrowerProfile,
) -> EngineResult<Decimal> {
    let ratio = emi_to_income_ratio(emi, monthly_income)?;

    let mut score =
        ((AFFORDABILITY_CEILING - ratio) / AFFORDABILITY_CEILING).max(Decimal::ZERO);

    if profile.credit_score >= 750 {
        score += dec!(0.1);
    } else if profile.credit_score < 650 {
        score -= dec!(0.2);
    }

    if profile.employment_type == EmploymentType::Government {
        score += dec!(0.1);
    }

    if !profile.existing_loans || profile.house_type == HouseType::Owned {
        score += dec!(0.05);
    }

    Ok(score.clamp(Decimal::ZERO, Decimal::ONE) * dec!(100))
}

// ---------------------------------------------------------------------------
// Composite analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisInput {
    pub loan: LoanTerms,
    pub profile: BorrowerProfile,
    /// Number of schedule rows to include (default 12)
    #[serde(default)]
    pub schedule_rows: Option<u32>,
    #[serde(default)]
    pub thresholds: Option<RiskThresholds>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub emi: EmiResult,
    pub emi_to_income_ratio: Percent,
    /// Existing EMIs plus the new EMI, as a percentage of income
    pub total_obligation_ratio: Percent,
    pub risk_level: RiskLevel,
    pub affordability_score: Decimal,
    pub eligibility: EligibilityAssessment,
    pub schedule: Vec<AmortizationRow>,
    pub annual_summary: Vec<AnnualSummary>,
}

/// EMI, ratios, risk tier, affordability, schedule and local eligibility for
/// one loan and borrower.
pub fn analyze_loan(input: &LoanAnalysisInput) -> EngineResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    let mut warnings = validate_profile(&input.profile, input.loan.principal);

    let emi = compute_emi(&input.loan)?;
    let income = input.profile.monthly_income;

    let ratio = emi_to_income_ratio(emi.monthly_payment, income)?;
    let total_obligation_ratio =
        emi_to_income_ratio(emi.monthly_payment + input.profile.existing_emi, income)?;
    let thresholds = input.thresholds.unwrap_or_default();
    let risk_level = thresholds.classify(ratio);
    let affordability_score =
        compute_affordability_score(emi.monthly_payment, income, &input.profile)?;
    let eligibility = assess_eligibility_locally(&input.profile, ratio);

    if total_obligation_ratio > thresholds.medium_max {
        warnings.push(format!(
            "Total EMI obligations are {}% of income",
            total_obligation_ratio.round_dp(1)
        ));
    }

    let schedule = generate_schedule(
        &input.loan,
        Some(input.schedule_rows.unwrap_or(DEFAULT_SCHEDULE_ROWS)),
    );

    let output = LoanAnalysis {
        emi,
        emi_to_income_ratio: ratio,
        total_obligation_ratio,
        risk_level,
        affordability_score,
        eligibility,
        schedule: schedule.to_vec(),
        annual_summary: schedule.annual_summary(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance EMI with income-ratio affordability",
        &serde_json::json!({
            "risk_low_max_pct": thresholds.low_max.to_string(),
            "risk_medium_max_pct": thresholds.medium_max.to_string(),
            "affordability_zero_at_ratio_pct": AFFORDABILITY_CEILING.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borrower(credit: u32, employment: EmploymentType) -> BorrowerProfile {
        BorrowerProfile::new(35, dec!(80_000), credit, employment)
    }

    #[test]
    fn test_ratio_and_low_risk() {
        assert_eq!(
            emi_to_income_ratio(dec!(20_000), dec!(80_000)).unwrap(),
            dec!(25)
        );
        assert_eq!(
            compute_risk_level(dec!(20_000), dec!(80_000)).unwrap(),
            RiskLevel::Low
        );
    }

    #[test]
    fn test_risk_boundaries_inclusive() {
        assert_eq!(compute_risk_level(dec!(30), dec!(100)).unwrap(), RiskLevel::Low);
        assert_eq!(compute_risk_level(dec!(40), dec!(100)).unwrap(), RiskLevel::Medium);
        assert_eq!(compute_risk_level(dec!(41), dec!(100)).unwrap(), RiskLevel::High);
        assert_eq!(
            compute_risk_level_with(dec!(45), dec!(100), &RiskThresholds::lenient()).unwrap(),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_zero_income_rejected() {
        assert!(emi_to_income_ratio(dec!(1000), Decimal::ZERO).is_err());
        assert!(compute_risk_level(dec!(1000), dec!(-5)).is_err());
    }

    #[test]
    fn test_affordability_score_adjustments() {
        // 25% ratio -> base 0.5; +0.1 credit, +0.1 government, +0.05 no loans
        let score = compute_affordability_score(
            dec!(20_000),
            dec!(80_000),
            &borrower(780, EmploymentType::Government),
        )
        .unwrap();
        assert_eq!(score, dec!(75));

        // base 0.5 - 0.2 + 0.05
        let score = compute_affordability_score(
            dec!(20_000),
            dec!(80_000),
            &borrower(600, EmploymentType::Private),
        )
        .unwrap();
        assert_eq!(score, dec!(35));
    }

    #[test]
    fn test_affordability_score_clamped() {
        let mut p = borrower(600, EmploymentType::Other);
        p.existing_loans = true;
        let score = compute_affordability_score(dec!(60_000), dec!(80_000), &p).unwrap();
        assert_eq!(score, Decimal::ZERO);

        let score = compute_affordability_score(
            Decimal::ZERO,
            dec!(80_000),
            &borrower(800, EmploymentType::Government),
        )
        .unwrap();
        assert_eq!(score, dec!(100));
    }

    #[test]
    fn test_analyze_loan_composite() {
        let mut profile = borrower(750, EmploymentType::Private);
        profile.existing_emi = dec!(15_000);
        let input = LoanAnalysisInput {
            loan: LoanTerms::new(dec!(2_500_000), dec!(8.5), 240),
            profile,
            schedule_rows: Some(6),
            thresholds: None,
        };
        let out = analyze_loan(&input).unwrap();
        let analysis = &out.result;
        assert_eq!(analysis.schedule.len(), 6);
        assert_eq!(analysis.annual_summary.len(), 20);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        // (21,695.58 + 15,000) / 80,000 ~ 45.9% exceeds the 40% medium bound
        assert!(out.warnings.iter().any(|w| w.starts_with("Total EMI")));
    }
}
