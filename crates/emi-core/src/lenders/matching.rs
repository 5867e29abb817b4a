//! Lender matching: scores each lender offering the requested loan type
//! against the borrower and prices the loan at a profile-adjusted rate.

use std::cmp::Reverse;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::catalogue::{default_catalogue, Lender, LenderKind};
use crate::emi::{payment_for, LoanTerms};
use crate::error::EngineError;
use crate::profile::{BorrowerProfile, EmploymentType, LoanType};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EngineResult;

const DEFAULT_LIMIT: usize = 6;

const CREDIT_WEIGHT: Decimal = dec!(0.25);
const AFFORDABILITY_WEIGHT: Decimal = dec!(0.20);
const EMPLOYMENT_WEIGHT: Decimal = dec!(0.15);
const AGE_WEIGHT: Decimal = dec!(0.10);
const AMOUNT_WEIGHT: Decimal = dec!(0.15);
const QUALITY_WEIGHT: Decimal = dec!(0.15);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderMatchInput {
    pub profile: BorrowerProfile,
    pub loan: LoanTerms,
    #[serde(default)]
    pub loan_type: LoanType,
    /// Lenders to consider; the built-in catalogue when absent
    #[serde(default)]
    pub catalogue: Option<Vec<Lender>>,
    /// Maximum number of matches returned (default 6)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderMatch {
    pub lender_id: String,
    pub lender_name: String,
    pub kind: LenderKind,
    pub match_score: Decimal,
    pub customised_rate_pct: Percent,
    pub emi: Money,
    pub total_interest: Money,
    pub processing_fee: Money,
    pub approval_probability: Decimal,
    pub perks: Vec<String>,
    pub risks: Vec<String>,
}

pub fn match_lenders(input: &LenderMatchInput) -> EngineResult<ComputationOutput<Vec<LenderMatch>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.loan.validate()?;
    if input.profile.monthly_income <= Decimal::ZERO {
        return Err(EngineError::invalid(
            "profile.monthly_income",
            "Monthly income must be positive",
        ));
    }

    let default_lenders;
    let lenders: &[Lender] = match &input.catalogue {
        Some(custom) => custom,
        None => {
            default_lenders = default_catalogue();
            &default_lenders
        }
    };

    let mut matches = Vec::new();
    for lender in lenders.iter().filter(|l| l.loan_types.contains(&input.loan_type)) {
        matches.push(evaluate_lender(lender, &input.profile, &input.loan)?);
    }

    if matches.is_empty() {
        warnings.push(format!("No lender offers {} loans", input.loan_type));
    }

    // Stable sort keeps catalogue order among equal scores
    matches.sort_by_key(|m| Reverse(m.match_score));
    matches.truncate(input.limit.unwrap_or(DEFAULT_LIMIT));

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted lender match with profile-adjusted pricing",
        &serde_json::json!({
            "loan_type": input.loan_type,
            "weights": {
                "credit": CREDIT_WEIGHT.to_string(),
                "affordability": AFFORDABILITY_WEIGHT.to_string(),
                "employment": EMPLOYMENT_WEIGHT.to_string(),
                "age": AGE_WEIGHT.to_string(),
                "amount": AMOUNT_WEIGHT.to_string(),
                "lender_quality": QUALITY_WEIGHT.to_string(),
            },
        }),
        warnings,
        elapsed,
        matches,
    ))
}

fn evaluate_lender(
    lender: &Lender,
    profile: &BorrowerProfile,
    loan: &LoanTerms,
) -> EngineResult<LenderMatch> {
    let months = Decimal::from(loan.term_months);
    let base_emi = payment_for(
        loan.principal,
        lender.base_rate_pct / dec!(1200),
        loan.term_months,
    )?;

    let rate = customised_rate(lender, profile);
    let emi = payment_for(loan.principal, rate / dec!(1200), loan.term_months)?;

    Ok(LenderMatch {
        lender_id: lender.id.clone(),
        lender_name: lender.name.clone(),
        kind: lender.kind,
        match_score: match_score(lender, profile, loan, base_emi),
        customised_rate_pct: rate,
        emi,
        total_interest: emi * months - loan.principal,
        processing_fee: loan.principal * lender.processing_fee_pct / dec!(100),
        approval_probability: approval_probability(lender, profile, base_emi),
        perks: perks(lender, profile),
        risks: risks(lender, profile),
    })
}

/// Weighted fit in [0, 1]; `base_emi` is the EMI at the lender's base rate.
pub fn match_score(
    lender: &Lender,
    profile: &BorrowerProfile,
    loan: &LoanTerms,
    base_emi: Money,
) -> Decimal {
    let criteria = &lender.criteria;

    let credit = if profile.credit_score >= lender.min_credit_score {
        (Decimal::from(profile.credit_score - lender.min_credit_score + 100) / dec!(200))
            .min(Decimal::ONE)
    } else {
        Decimal::ZERO
    };

    let max_emi = profile.monthly_income * criteria.max_emi_ratio / dec!(100);
    let affordability = if max_emi >= base_emi || base_emi.is_zero() {
        Decimal::ONE
    } else {
        max_emi / base_emi
    };

    let employment = if criteria.employment_types.contains(&profile.employment_type) {
        Decimal::ONE
    } else {
        dec!(0.5)
    };

    let age = if (criteria.min_age..=criteria.max_age).contains(&profile.age) {
        Decimal::ONE
    } else {
        Decimal::ZERO
    };

    let amount = if loan.principal <= lender.max_loan_amount {
        Decimal::ONE
    } else {
        dec!(0.7)
    };

    let score = credit * CREDIT_WEIGHT
        + affordability * AFFORDABILITY_WEIGHT
        + employment * EMPLOYMENT_WEIGHT
        + age * AGE_WEIGHT
        + amount * AMOUNT_WEIGHT
        + lender.quality_score * QUALITY_WEIGHT;

    score.min(Decimal::ONE)
}

/// Base rate moved by credit, income, employment and existing EMI burden,
/// held within `[base - 1, base + 2]`.
pub fn customised_rate(lender: &Lender, profile: &BorrowerProfile) -> Percent {
    let base = lender.base_rate_pct;
    let mut rate = base;

    rate += match profile.credit_score {
        s if s >= 800 => dec!(-0.5),
        s if s >= 750 => dec!(-0.25),
        s if s < 650 => dec!(0.75),
        s if s < 700 => dec!(0.25),
        _ => Decimal::ZERO,
    };

    if profile.monthly_income >= dec!(100_000) {
        rate -= dec!(0.25);
    } else if profile.monthly_income < dec!(30_000) {
        rate += dec!(0.5);
    }

    match profile.employment_type {
        EmploymentType::Government => rate -= dec!(0.25),
        EmploymentType::SelfEmployed => rate += dec!(0.5),
        _ => {}
    }

    if profile.monthly_income > Decimal::ZERO
        && profile.existing_emi / profile.monthly_income * dec!(100) > dec!(30)
    {
        rate += dec!(0.25);
    }

    rate.clamp(base - Decimal::ONE, base + dec!(2))
}

pub fn approval_probability(lender: &Lender, profile: &BorrowerProfile, base_emi: Money) -> Decimal {
    let mut p = dec!(0.5);
    let min = lender.min_credit_score;

    p += match profile.credit_score {
        s if s >= min + 100 => dec!(0.3),
        s if s >= min + 50 => dec!(0.2),
        s if s >= min => dec!(0.1),
        _ => dec!(-0.4),
    };

    match profile.employment_type {
        EmploymentType::Government => p += dec!(0.2),
        EmploymentType::Private => p += dec!(0.1),
        _ => {}
    }

    if profile.monthly_income > Decimal::ZERO {
        let burden = (profile.existing_emi + base_emi) / profile.monthly_income * dec!(100);
        if burden <= dec!(40) {
            p += dec!(0.1);
        } else if burden > dec!(60) {
            p -= dec!(0.2);
        }
    }

    p.clamp(dec!(0.1), dec!(0.95))
}

fn perks(lender: &Lender, profile: &BorrowerProfile) -> Vec<String> {
    let mut perks = lender.features.clone();
    if profile.credit_score >= 750 {
        perks.push("Premium customer benefits".into());
    }
    if profile.monthly_income >= dec!(100_000) {
        perks.push("High-value customer perks".into());
    }
    if profile.employment_type == EmploymentType::Government {
        perks.push("Government employee special rates".into());
    }
    perks
}

fn risks(lender: &Lender, profile: &BorrowerProfile) -> Vec<String> {
    let mut risks = Vec::new();
    if lender.kind == LenderKind::Nbfc {
        risks.push("Higher interest rates but faster processing".into());
    }
    if lender.processing_fee_pct > Decimal::ONE {
        risks.push("Higher processing fees".into());
    }
    if lender.min_credit_score > profile.credit_score {
        risks.push("Credit score requirement not met".into());
    }
    if profile.monthly_income < lender.criteria.min_income {
        risks.push("Income below lender minimum".into());
    }
    risks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lender(id: &str) -> Lender {
        default_catalogue().into_iter().find(|l| l.id == id).unwrap()
    }

    fn borrower() -> BorrowerProfile {
        BorrowerProfile::new(35, dec!(85_000), 750, EmploymentType::Private)
    }

    #[test]
    fn test_customised_rate_adjustments() {
        // 750 credit -0.25 on HDFC's 8.75
        assert_eq!(customised_rate(&lender("hdfc_premium"), &borrower()), dec!(8.50));

        let mut p = borrower();
        p.credit_score = 620;
        p.monthly_income = dec!(25_000);
        p.employment_type = EmploymentType::SelfEmployed;
        p.existing_emi = dec!(10_000);
        // +0.75 +0.5 +0.5 +0.25 = +2.0, at the ceiling
        assert_eq!(customised_rate(&lender("hdfc_premium"), &p), dec!(10.75));
    }

    #[test]
    fn test_rate_floor() {
        let mut p = borrower();
        p.credit_score = 820;
        p.monthly_income = dec!(200_000);
        p.employment_type = EmploymentType::Government;
        // -0.5 -0.25 -0.25 = -1.0, exactly the floor
        assert_eq!(customised_rate(&lender("sbi_home"), &p), dec!(7.5));
    }

    #[test]
    fn test_approval_probability_bounds() {
        let l = lender("kotak_prime");
        let mut p = borrower();
        p.credit_score = 600;
        p.employment_type = EmploymentType::Contract;
        // 0.5 - 0.4 - 0.2 floors at 0.1
        assert_eq!(approval_probability(&l, &p, dec!(60_000)), dec!(0.1));

        p.credit_score = 850;
        p.employment_type = EmploymentType::Government;
        assert_eq!(approval_probability(&l, &p, dec!(10_000)), dec!(0.95));
    }

    #[test]
    fn test_home_loan_matches_sorted() {
        let input = LenderMatchInput {
            profile: borrower(),
            loan: LoanTerms::new(dec!(2_500_000), dec!(8.5), 240),
            loan_type: LoanType::Home,
            catalogue: None,
            limit: None,
        };
        let out = match_lenders(&input).unwrap().result;
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|m| m.lender_id != "bajaj_finserv"));
        for pair in out.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
        assert!(out.iter().all(|m| m.match_score <= Decimal::ONE));
    }

    #[test]
    fn test_limit_and_empty_catalogue() {
        let mut input = LenderMatchInput {
            profile: borrower(),
            loan: LoanTerms::new(dec!(500_000), dec!(10), 60),
            loan_type: LoanType::Personal,
            catalogue: None,
            limit: Some(2),
        };
        assert_eq!(match_lenders(&input).unwrap().result.len(), 2);

        input.catalogue = Some(Vec::new());
        let out = match_lenders(&input).unwrap();
        assert!(out.result.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_nbfc_risks() {
        let mut p = borrower();
        p.credit_score = 580;
        let r = risks(&lender("bajaj_finserv"), &p);
        assert_eq!(
            r,
            vec![
                "Higher interest rates but faster processing".to_string(),
                "Higher processing fees".to_string(),
                "Credit score requirement not met".to_string(),
            ]
        );
    }
}
