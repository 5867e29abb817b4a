use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::emi::{payment_for, LoanTerms};
use crate::types::{Money, Rate};

/// Decimal places carried by each row's interest component
const INTEREST_DP: u32 = 12;

/// A single period in the amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_balance: Money,
}

/// Principal and interest paid in one loan year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub closing_balance: Money,
}

/// Fixed-payment amortization schedule.
///
/// Rows are produced on demand. Each call to [`AmortizationSchedule::iter`]
/// starts again from period 1, so the same schedule can be walked any
/// number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmortizationSchedule {
    terms: LoanTerms,
    payment: Money,
    rate: Rate,
    rows: u32,
    start_date: Option<NaiveDate>,
}

impl AmortizationSchedule {
    fn empty(terms: LoanTerms) -> Self {
        Self {
            terms,
            payment: Decimal::ZERO,
            rate: Decimal::ZERO,
            rows: 0,
            start_date: None,
        }
    }

    /// Attach a due date to every row, starting at `date` for period 1.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn payment(&self) -> Money {
        self.payment
    }

    pub fn len(&self) -> usize {
        self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn iter(&self) -> ScheduleIter<'_> {
        ScheduleIter {
            schedule: self,
            next_period: 1,
            balance: self.terms.principal,
        }
    }

    pub fn to_vec(&self) -> Vec<AmortizationRow> {
        self.iter().collect()
    }

    /// Year-by-year totals over the whole term, independent of any row limit.
    pub fn annual_summary(&self) -> Vec<AnnualSummary> {
        if self.is_empty() {
            return Vec::new();
        }

        let full = Self {
            rows: self.terms.term_months,
            ..self.clone()
        };

        let mut years: Vec<AnnualSummary> = Vec::new();
        for row in full.iter() {
            let year = (row.period - 1) / 12 + 1;
            match years.last_mut() {
                Some(summary) if summary.year == year => {
                    summary.principal_paid += row.principal_component;
                    summary.interest_paid += row.interest_component;
                    summary.closing_balance = row.remaining_balance;
                }
                _ => years.push(AnnualSummary {
                    year,
                    principal_paid: row.principal_component,
                    interest_paid: row.interest_component,
                    closing_balance: row.remaining_balance,
                }),
            }
        }
        years
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = AmortizationRow;
    type IntoIter = ScheduleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for AmortizationSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Iterator over the rows of an [`AmortizationSchedule`].
#[derive(Debug, Clone)]
pub struct ScheduleIter<'a> {
    schedule: &'a AmortizationSchedule,
    next_period: u32,
    balance: Money,
}

impl Iterator for ScheduleIter<'_> {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<Self::Item> {
        let schedule = self.schedule;
        if self.next_period > schedule.rows {
            return None;
        }

        let period = self.next_period;
        self.next_period += 1;

        // Bounded scale keeps `principal + interest == payment` exact
        let interest = (self.balance * schedule.rate).round_dp(INTEREST_DP);
        let principal = schedule.payment - interest;
        self.balance -= principal;

        // Absorb rounding drift on the last installment
        if period == schedule.terms.term_months && self.balance < Decimal::ZERO {
            self.balance = Decimal::ZERO;
        }

        let due_date = schedule
            .start_date
            .and_then(|start| start.checked_add_months(Months::new(period - 1)));

        Some(AmortizationRow {
            period,
            due_date,
            payment: schedule.payment,
            principal_component: principal,
            interest_component: interest,
            remaining_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.schedule.rows + 1).saturating_sub(self.next_period) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScheduleIter<'_> {}

/// Build the amortization schedule for `terms`, limited to `max_rows` rows.
///
/// Invalid terms yield an empty schedule rather than an error; the schedule
/// is a display aid and the EMI calculation reports the validation failure.
pub fn generate_schedule(terms: &LoanTerms, max_rows: Option<u32>) -> AmortizationSchedule {
    if !terms.is_valid() {
        return AmortizationSchedule::empty(*terms);
    }

    let rate = terms.monthly_rate();
    let payment = match payment_for(terms.principal, rate, terms.term_months) {
        Ok(p) => p,
        Err(_) => return AmortizationSchedule::empty(*terms),
    };

    let rows = max_rows.map_or(terms.term_months, |max| max.min(terms.term_months));

    AmortizationSchedule {
        terms: *terms,
        payment,
        rate,
        rows,
        start_date: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn car_loan() -> LoanTerms {
        LoanTerms::new(dec!(800_000), dec!(9.5), 60)
    }

    #[test]
    fn test_principal_sums_to_loan_amount() {
        let schedule = generate_schedule(&car_loan(), None);
        assert_eq!(schedule.len(), 60);

        let principal: Decimal = schedule.iter().map(|r| r.principal_component).sum();
        assert!((principal - dec!(800_000)).abs() < dec!(1));
    }

    #[test]
    fn test_components_add_up_to_payment() {
        let schedule = generate_schedule(&car_loan(), None);
        for row in &schedule {
            assert_eq!(row.principal_component + row.interest_component, row.payment);
        }
    }

    #[test]
    fn test_balance_runs_down_to_zero() {
        let rows = generate_schedule(&car_loan(), None).to_vec();
        for pair in rows.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
        let last = rows.last().unwrap();
        assert!(last.remaining_balance >= Decimal::ZERO);
        assert!(last.remaining_balance < dec!(0.01));
    }

    #[test]
    fn test_max_rows_truncates() {
        let schedule = generate_schedule(&car_loan(), Some(12));
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule.iter().len(), 12);
        assert_eq!(schedule.iter().last().unwrap().period, 12);

        let longer = generate_schedule(&car_loan(), Some(500));
        assert_eq!(longer.len(), 60);
    }

    #[test]
    fn test_schedule_is_restartable() {
        let schedule = generate_schedule(&car_loan(), Some(24));
        let first: Vec<_> = schedule.iter().collect();
        let second: Vec<_> = schedule.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_terms_give_empty_schedule() {
        let schedule = generate_schedule(&LoanTerms::new(Decimal::ZERO, dec!(8), 12), None);
        assert!(schedule.is_empty());
        assert_eq!(schedule.iter().next(), None);

        let schedule = generate_schedule(&LoanTerms::new(dec!(1000), dec!(8), 0), None);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_components_add_up_on_long_high_rate_loan() {
        let schedule = generate_schedule(&LoanTerms::new(dec!(2_500_000), dec!(8.5), 240), None);
        for row in &schedule {
            assert_eq!(row.principal_component + row.interest_component, row.payment);
        }
    }

    #[test]
    fn test_overflowing_terms_give_empty_schedule() {
        let schedule = generate_schedule(&LoanTerms::new(dec!(2_500_000), dec!(8.5), 12_000), Some(1));
        assert!(schedule.is_empty());
        assert!(schedule.annual_summary().is_empty());
    }

    #[test]
    fn test_zero_rate_schedule() {
        let schedule = generate_schedule(&LoanTerms::new(dec!(1_200), Decimal::ZERO, 12), None);
        for row in &schedule {
            assert_eq!(row.interest_component, Decimal::ZERO);
            assert_eq!(row.principal_component, dec!(100));
        }
        assert_eq!(schedule.iter().last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_due_dates_follow_start() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let schedule = generate_schedule(&car_loan(), Some(3)).with_start_date(start);
        let dates: Vec<_> = schedule.iter().map(|r| r.due_date.unwrap()).collect();
        assert_eq!(dates[0], start);
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_annual_summary_covers_full_term() {
        let schedule = generate_schedule(&car_loan(), Some(6));
        let years = schedule.annual_summary();
        assert_eq!(years.len(), 5);
        let principal: Decimal = years.iter().map(|y| y.principal_paid).sum();
        assert!((principal - dec!(800_000)).abs() < dec!(1));
        assert!(years[4].closing_balance < dec!(0.01));
    }

    #[test]
    fn test_serializes_as_row_array() {
        let schedule = generate_schedule(&car_loan(), Some(2));
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }
}
