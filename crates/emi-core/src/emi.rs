use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{Money, Percent, Rate};
use crate::EngineResult;

/// Annual percentage to monthly decimal rate: 12 months x 100.
const ANNUAL_PCT_TO_MONTHLY: Decimal = dec!(1200);

/// Principal, annual rate and term of a fixed-payment loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual interest rate in percent (8.5 = 8.5% p.a.)
    pub annual_rate_pct: Percent,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_pct: Percent, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_pct,
            term_months,
        }
    }

    /// Build terms from a tenure expressed in whole years.
    pub fn from_years(principal: Money, annual_rate_pct: Percent, years: u32) -> EngineResult<Self> {
        let term_months = years.checked_mul(12).ok_or_else(|| {
            EngineError::invalid("term_months", "Tenure in years is too long to express in months")
        })?;
        Ok(Self::new(principal, annual_rate_pct, term_months))
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EngineError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.term_months == 0 {
            return Err(EngineError::invalid(
                "term_months",
                "Term must be at least 1 month",
            ));
        }
        if self.annual_rate_pct < Decimal::ZERO {
            return Err(EngineError::invalid(
                "annual_rate_pct",
                "Interest rate cannot be negative",
            ));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_pct)
    }
}

/// Fixed monthly installment and the totals it implies over the term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiResult {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub monthly_rate: Rate,
}

/// Convert an annual percentage rate to the monthly decimal rate.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / ANNUAL_PCT_TO_MONTHLY
}

/// Level payment that amortises `principal` over `months` at `rate` per month.
///
/// A zero rate is handled as straight-line repayment so the annuity
/// denominator never reaches zero.
pub fn payment_for(principal: Money, rate: Rate, months: u32) -> EngineResult<Money> {
    if months == 0 {
        return Err(EngineError::invalid(
            "term_months",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(u64::from(months))
        .ok_or_else(|| annuity_overflow("term_months"))?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero {
            context: "EMI annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_mul(factor / denominator))
        .ok_or_else(|| annuity_overflow("principal"))
}

fn annuity_overflow(field: &str) -> EngineError {
    EngineError::invalid(field, "Loan terms exceed the representable numeric range")
}

/// Equated monthly installment for the given terms.
pub fn compute_emi(terms: &LoanTerms) -> EngineResult<EmiResult> {
    terms.validate()?;

    let rate = terms.monthly_rate();
    let monthly_payment = payment_for(terms.principal, rate, terms.term_months)?;
    let total_payment = monthly_payment
        .checked_mul(Decimal::from(terms.term_months))
        .ok_or_else(|| annuity_overflow("term_months"))?;

    Ok(EmiResult {
        monthly_payment,
        total_payment,
        total_interest: total_payment - terms.principal,
        monthly_rate: rate,
    })
}

/// Number of monthly payments of `emi` needed to clear `principal`.
///
/// Closed form of the annuity equation solved for n:
/// `n = ln(emi / (emi - principal * rate)) / ln(1 + rate)`.
/// The result is fractional; the last payment is a partial one.
pub fn solve_tenure(principal: Money, rate: Rate, emi: Money) -> EngineResult<Decimal> {
    if emi <= Decimal::ZERO {
        return Err(EngineError::invalid("emi", "EMI must be positive"));
    }
    if rate < Decimal::ZERO {
        return Err(EngineError::invalid(
            "monthly_rate",
            "Interest rate cannot be negative",
        ));
    }
    if principal <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    if rate.is_zero() {
        return Ok(principal / emi);
    }

    let interest = principal
        .checked_mul(rate)
        .ok_or_else(|| annuity_overflow("principal"))?;
    if emi <= interest {
        return Err(EngineError::NonAmortizingLoan { emi, interest });
    }

    let growth = (Decimal::ONE + rate).ln();
    if growth.is_zero() {
        return Err(EngineError::DivisionByZero {
            context: "tenure solve growth factor".into(),
        });
    }

    Ok((emi / (emi - interest)).ln() / growth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_home_loan_emi() {
        let terms = LoanTerms::new(dec!(2_500_000), dec!(8.5), 240);
        let result = compute_emi(&terms).unwrap();
        // 2.5M at 8.5% over 20 years ~ 21,695.58 per month
        assert!((result.monthly_payment - dec!(21695.58)).abs() < dec!(1));
        assert!((result.total_interest - dec!(2706939.40)).abs() < dec!(100));
        assert_eq!(
            result.total_payment,
            result.monthly_payment * Decimal::from(240)
        );
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let terms = LoanTerms::new(dec!(1_200_000), Decimal::ZERO, 24);
        let result = compute_emi(&terms).unwrap();
        assert_eq!(result.monthly_payment, dec!(50_000));
        assert_eq!(result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_terms_rejected() {
        assert!(compute_emi(&LoanTerms::new(Decimal::ZERO, dec!(8), 12)).is_err());
        assert!(compute_emi(&LoanTerms::new(dec!(1000), dec!(8), 0)).is_err());
        assert!(compute_emi(&LoanTerms::new(dec!(1000), dec!(-1), 12)).is_err());
    }

    #[test]
    fn test_from_years() {
        let terms = LoanTerms::from_years(dec!(100_000), dec!(10), 5).unwrap();
        assert_eq!(terms.term_months, 60);
    }

    #[test]
    fn test_from_years_rejects_month_overflow() {
        let err = LoanTerms::from_years(dec!(100_000), dec!(10), u32::MAX / 6).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "term_months"));
    }

    #[test]
    fn test_annuity_overflow_is_an_error() {
        // (1 + 8.5%/12)^12000 is far outside the Decimal range
        let terms = LoanTerms::new(dec!(2_500_000), dec!(8.5), 12_000);
        let err = compute_emi(&terms).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "term_months"));
    }

    #[test]
    fn test_long_zero_rate_term_still_computes() {
        let terms = LoanTerms::new(dec!(1_200_000), Decimal::ZERO, 12_000);
        assert_eq!(compute_emi(&terms).unwrap().monthly_payment, dec!(100));
    }

    #[test]
    fn test_solve_tenure_inverts_payment() {
        let rate = monthly_rate(dec!(9));
        let emi = payment_for(dec!(500_000), rate, 120).unwrap();
        let months = solve_tenure(dec!(500_000), rate, emi).unwrap();
        assert!((months - dec!(120)).abs() < dec!(0.001));
    }

    #[test]
    fn test_solve_tenure_zero_rate() {
        let months = solve_tenure(dec!(120_000), Decimal::ZERO, dec!(10_000)).unwrap();
        assert_eq!(months, dec!(12));
    }

    #[test]
    fn test_non_amortizing_emi_detected() {
        // Monthly interest on 1M at 12% is 10,000; an EMI of 9,000 never repays
        let err = solve_tenure(dec!(1_000_000), monthly_rate(dec!(12)), dec!(9_000)).unwrap_err();
        match err {
            EngineError::NonAmortizingLoan { interest, .. } => {
                assert_eq!(interest, dec!(10_000));
            }
            other => panic!("expected NonAmortizingLoan, got {other:?}"),
        }
    }

    #[test]
    fn test_emi_equal_to_interest_is_non_amortizing() {
        let result = solve_tenure(dec!(1_000_000), monthly_rate(dec!(12)), dec!(10_000));
        assert!(matches!(result, Err(EngineError::NonAmortizingLoan { .. })));
    }
}
