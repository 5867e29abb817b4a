use emi_core::emi::{compute_emi, LoanTerms};
use emi_core::metrics::{
    analyze_loan, compute_affordability_score, compute_risk_level, LoanAnalysisInput, RiskLevel,
};
use emi_core::profile::{BorrowerProfile, EmploymentType, HouseType};
use emi_core::schedule::generate_schedule;
use emi_core::EngineError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// EMI formula
// ===========================================================================

fn loan_grid() -> Vec<LoanTerms> {
    let mut terms = Vec::new();
    for principal in [dec!(50_000), dec!(750_000), dec!(2_500_000), dec!(49_000_000)] {
        for rate in [dec!(0), dec!(0.5), dec!(7.25), dec!(8.5), dec!(18)] {
            for months in [1, 12, 60, 240, 360] {
                terms.push(LoanTerms::new(principal, rate, months));
            }
        }
    }
    terms
}

#[test]
fn test_payment_identity_holds() {
    for terms in loan_grid() {
        let r = compute_emi(&terms).unwrap();
        assert_eq!(
            r.total_payment,
            r.monthly_payment * Decimal::from(terms.term_months)
        );
        assert_eq!(r.total_interest, r.total_payment - terms.principal);
        assert!(r.total_interest >= dec!(-0.000001), "{terms:?}");
    }
}

#[test]
fn test_zero_rate_exact() {
    let r = compute_emi(&LoanTerms::new(dec!(1_200_000), Decimal::ZERO, 24)).unwrap();
    assert_eq!(r.monthly_payment, dec!(50_000));
    assert_eq!(r.total_interest, Decimal::ZERO);
}

#[test]
fn test_single_month_loan_repays_with_one_month_interest() {
    let r = compute_emi(&LoanTerms::new(dec!(100_000), dec!(12), 1)).unwrap();
    assert!((r.monthly_payment - dec!(101_000)).abs() < dec!(0.0001));
}

#[test]
fn test_out_of_range_term_is_rejected_not_panicking() {
    let terms = LoanTerms::new(dec!(2_500_000), dec!(8.5), 12_000);
    match compute_emi(&terms).unwrap_err() {
        EngineError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(generate_schedule(&terms, Some(1)).is_empty());

    let input = LoanAnalysisInput {
        loan: terms,
        profile: BorrowerProfile::new(35, dec!(150_000), 760, EmploymentType::Private),
        schedule_rows: None,
        thresholds: None,
    };
    assert!(analyze_loan(&input).is_err());
}

#[test]
fn test_invalid_terms_are_distinct_errors() {
    let err = compute_emi(&LoanTerms::new(dec!(-5), dec!(8), 12)).unwrap_err();
    match err {
        EngineError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn test_schedule_sum_law_and_monotonicity() {
    for terms in loan_grid() {
        let schedule = generate_schedule(&terms, None);
        assert_eq!(schedule.len(), terms.term_months as usize);

        let principal: Decimal = schedule.iter().map(|r| r.principal_component).sum();
        assert!((principal - terms.principal).abs() <= Decimal::ONE, "{terms:?}");

        let mut previous = terms.principal;
        for row in &schedule {
            assert!(row.remaining_balance <= previous);
            assert!(row.remaining_balance >= Decimal::ZERO);
            previous = row.remaining_balance;
        }
        assert!(previous < dec!(0.01), "{terms:?} left {previous}");
    }
}

#[test]
fn test_schedule_rows_numbered_from_one() {
    let schedule = generate_schedule(&LoanTerms::new(dec!(300_000), dec!(10), 36), Some(5));
    let periods: Vec<u32> = schedule.iter().map(|r| r.period).collect();
    assert_eq!(periods, vec![1, 2, 3, 4, 5]);
}

// ===========================================================================
// Metrics
// ===========================================================================

#[test]
fn test_risk_tier_example() {
    assert_eq!(
        compute_risk_level(dec!(20_000), dec!(80_000)).unwrap(),
        RiskLevel::Low
    );
    assert_eq!(
        compute_risk_level(dec!(35_000), dec!(80_000)).unwrap(),
        RiskLevel::High
    );
}

#[test]
fn test_affordability_owned_house_bonus() {
    let mut profile = BorrowerProfile::new(40, dec!(100_000), 700, EmploymentType::Private);
    profile.existing_loans = true;
    let without = compute_affordability_score(dec!(25_000), dec!(100_000), &profile).unwrap();

    profile.house_type = HouseType::Owned;
    let with = compute_affordability_score(dec!(25_000), dec!(100_000), &profile).unwrap();

    assert_eq!(without, dec!(50));
    assert_eq!(with, dec!(55));
}

#[test]
fn test_analyze_loan_reports_validation_issues() {
    let input = LoanAnalysisInput {
        loan: LoanTerms::new(dec!(1_000_000), dec!(9), 120),
        profile: BorrowerProfile::new(72, dec!(60_000), 710, EmploymentType::Private),
        schedule_rows: None,
        thresholds: None,
    };
    let out = analyze_loan(&input).unwrap();
    assert!(out.warnings.iter().any(|w| w.starts_with("Age must be")));
    assert_eq!(out.result.schedule.len(), 12);
    assert_eq!(out.result.annual_summary.len(), 10);
}
