//! Rule-based eligibility scoring used when the remote classifier is not
//! available.
//!
//! The score is additive over four bands (credit, income, employment, age)
//! and tops out at 100, so `probability = score / 100` always lies in
//! `[0, 1]`.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::profile::{BorrowerProfile, EmploymentType};
use crate::types::Percent;

const ELIGIBLE_ABOVE: Decimal = dec!(0.7);
const CONDITIONAL_ABOVE: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EligibilityStatus {
    Eligible,
    NotEligible,
    Conditional,
}

impl EligibilityStatus {
    /// Status tier for an approval probability in `[0, 1]`.
    pub fn from_probability(probability: Decimal) -> Self {
        if probability > ELIGIBLE_ABOVE {
            EligibilityStatus::Eligible
        } else if probability > CONDITIONAL_ABOVE {
            EligibilityStatus::Conditional
        } else {
            EligibilityStatus::NotEligible
        }
    }

    /// Map a free-form classifier label onto a status.
    ///
    /// Underscores are read as spaces and case is ignored, so `Not_Eligible`,
    /// `not eligible` and `REJECTED` all land on `NotEligible`.
    pub fn from_label(label: &str) -> Self {
        let normalised = label.replace('_', " ").trim().to_lowercase();
        match normalised.as_str() {
            "eligible" | "approved" | "yes" => EligibilityStatus::Eligible,
            "conditional" | "review" => EligibilityStatus::Conditional,
            _ => EligibilityStatus::NotEligible,
        }
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EligibilityStatus::Eligible => "Eligible",
            EligibilityStatus::NotEligible => "Not Eligible",
            EligibilityStatus::Conditional => "Conditional",
        };
        f.write_str(label)
    }
}

/// Where an assessment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilitySource {
    Remote,
    LocalFallback,
}

/// Points awarded per band by the local heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFactors {
    pub credit_points: u32,
    pub income_points: u32,
    pub employment_points: u32,
    pub age_points: u32,
    pub total_score: u32,
    /// EMI-to-income ratio supplied by the caller, informational only
    pub emi_ratio: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    pub status: EligibilityStatus,
    pub probability: Decimal,
    pub source: EligibilitySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<EligibilityFactors>,
}

// ---------------------------------------------------------------------------
// Scoring bands
// ---------------------------------------------------------------------------

fn credit_points(score: u32) -> u32 {
    match score {
        s if s >= 750 => 40,
        s if s >= 700 => 30,
        s if s >= 650 => 20,
        _ => 10,
    }
}

fn income_points(income: Decimal) -> u32 {
    if income >= dec!(100_000) {
        30
    } else if income >= dec!(75_000) {
        25
    } else if income >= dec!(50_000) {
        20
    } else {
        10
    }
}

fn employment_points(employment: EmploymentType) -> u32 {
    match employment {
        EmploymentType::Government => 20,
        EmploymentType::Private => 15,
        _ => 10,
    }
}

fn age_points(age: u32) -> u32 {
    if (25..=50).contains(&age) {
        10
    } else if (21..=60).contains(&age) {
        8
    } else {
        5
    }
}

/// Score a profile with the local heuristic. Never fails.
pub fn assess_eligibility_locally(
    profile: &BorrowerProfile,
    emi_ratio: Percent,
) -> EligibilityAssessment {
    let factors = EligibilityFactors {
        credit_points: credit_points(profile.credit_score),
        income_points: income_points(profile.monthly_income),
        employment_points: employment_points(profile.employment_type),
        age_points: age_points(profile.age),
        total_score: 0,
        emi_ratio,
    };
    let total = factors.credit_points
        + factors.income_points
        + factors.employment_points
        + factors.age_points;

    let probability = (Decimal::from(total) / dec!(100)).clamp(Decimal::ZERO, Decimal::ONE);

    EligibilityAssessment {
        status: EligibilityStatus::from_probability(probability),
        probability,
        source: EligibilitySource::LocalFallback,
        factors: Some(EligibilityFactors {
            total_score: total,
            ..factors
        }),
    }
}
