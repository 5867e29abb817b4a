#![cfg(feature = "whatif")]

use emi_core::eligibility::EligibilityStatus;
use emi_core::metrics::RiskLevel;
use emi_core::whatif::{
    compare_what_if, what_if_template, EligibilityTrend, RecommendationKind, TEMPLATE_NAMES,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Templates
// ===========================================================================

#[test]
fn test_every_template_compares() {
    for name in TEMPLATE_NAMES {
        let input = what_if_template(name).unwrap();
        let out = compare_what_if(&input).unwrap();
        assert!(!out.result.recommendations.is_empty(), "{name}");
    }
    assert!(what_if_template("double_everything").is_none());
}

#[test]
fn test_income_increase_improves_outlook() {
    let out = compare_what_if(&what_if_template("income_increase").unwrap())
        .unwrap()
        .result;

    assert_eq!(out.emi_change, Decimal::ZERO);
    assert_eq!(out.current.risk_level, RiskLevel::Medium);
    assert_eq!(out.proposed.risk_level, RiskLevel::Low);
    // 0.85 locally, lifted by 0.1 for the income rise
    assert_eq!(out.proposed.eligibility.probability, dec!(0.95));
    assert_eq!(out.proposed.eligibility.status, EligibilityStatus::Eligible);
    assert_eq!(out.eligibility_trend, EligibilityTrend::Better);
}

#[test]
fn test_rate_decrease_saves_interest() {
    let out = compare_what_if(&what_if_template("rate_decrease").unwrap())
        .unwrap()
        .result;
    assert!(out.emi_change < Decimal::ZERO);
    assert!(out.emi_change_pct < Decimal::ZERO);
    assert!(out.interest_savings > Decimal::ZERO);
}

#[test]
fn test_tenure_extension_costs_interest() {
    let out = compare_what_if(&what_if_template("tenure_extend").unwrap())
        .unwrap()
        .result;
    assert!(out.emi_change < Decimal::ZERO);
    assert!(out.interest_savings < Decimal::ZERO);
}

#[test]
fn test_much_larger_loan_warns() {
    let mut input = what_if_template("income_increase").unwrap();
    input.proposed.monthly_income = input.current.monthly_income;
    input.proposed.loan.principal = dec!(3_500_000);

    let out = compare_what_if(&input).unwrap();
    let result = &out.result;
    assert_eq!(result.proposed.risk_level, RiskLevel::High);
    assert!(result.emi_change > dec!(5_000));
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.kind == RecommendationKind::Warning));
    assert!(out.warnings.iter().any(|w| w.starts_with("Proposed EMI")));
}

#[test]
fn test_non_positive_income_rejected() {
    let mut input = what_if_template("rate_decrease").unwrap();
    input.proposed.monthly_income = Decimal::ZERO;
    assert!(compare_what_if(&input).is_err());
}
