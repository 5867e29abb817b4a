pub mod eligibility;
pub mod lenders;
pub mod loan;
pub mod prepayment;
pub mod sample;
pub mod whatif;

use std::error::Error;

use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use emi_core::emi::LoanTerms;
use emi_core::profile::{BorrowerProfile, EmploymentType, HouseType, LoanType};

pub type CmdResult = Result<serde_json::Value, Box<dyn Error>>;

/// Parse an enum flag by its JSON name, e.g. `Self_Employed` or `home`.
fn parse_named<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unrecognised value '{raw}'"))
}

pub fn parse_employment(raw: &str) -> Result<EmploymentType, String> {
    parse_named(raw)
}

pub fn parse_house(raw: &str) -> Result<HouseType, String> {
    parse_named(raw)
}

pub fn parse_loan_type(raw: &str) -> Result<LoanType, String> {
    parse_named(&raw.to_ascii_lowercase())
}

/// Loan terms given as flags.
#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, conflicts_with = "years")]
    pub months: Option<u32>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,
}

impl LoanArgs {
    pub fn terms(&self) -> Result<LoanTerms, Box<dyn Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        match (self.months, self.years) {
            (Some(months), _) => Ok(LoanTerms::new(principal, rate, months)),
            (None, Some(years)) => Ok(LoanTerms::from_years(principal, rate, years)?),
            (None, None) => Err("--months or --years is required (or provide --input)".into()),
        }
    }
}

/// Borrower attributes given as flags.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long)]
    pub age: Option<u32>,

    /// Monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Government, Private, Self_Employed, Contract or Other
    #[arg(long, value_parser = parse_employment)]
    pub employment: Option<EmploymentType>,

    /// EMIs already paid on other loans
    #[arg(long)]
    pub existing_emi: Option<Decimal>,

    #[arg(long)]
    pub dependents: Option<u32>,

    /// Owned, Rented, Family or Other
    #[arg(long, value_parser = parse_house)]
    pub house: Option<HouseType>,

    #[arg(long)]
    pub bank_balance: Option<Decimal>,
}

impl ProfileArgs {
    pub fn profile(&self) -> Result<BorrowerProfile, Box<dyn Error>> {
        let mut profile = BorrowerProfile::new(
            self.age.ok_or("--age is required (or provide --input)")?,
            self.income.ok_or("--income is required (or provide --input)")?,
            self.credit_score
                .ok_or("--credit-score is required (or provide --input)")?,
            self.employment.unwrap_or_default(),
        );
        if let Some(emi) = self.existing_emi {
            profile.existing_emi = emi;
            profile.existing_loans = emi > Decimal::ZERO;
        }
        profile.dependents = self.dependents.unwrap_or_default();
        profile.house_type = self.house.unwrap_or_default();
        profile.bank_balance = self.bank_balance.unwrap_or_default();
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_flags_use_json_names() {
        assert_eq!(parse_employment("Self_Employed"), Ok(EmploymentType::SelfEmployed));
        assert_eq!(parse_loan_type("Education"), Ok(LoanType::Education));
        assert!(parse_house("castle").is_err());
    }

    #[test]
    fn years_convert_to_months() {
        let args = LoanArgs {
            principal: Some(Decimal::from(500_000)),
            rate: Some(Decimal::from(9)),
            months: None,
            years: Some(5),
        };
        assert_eq!(args.terms().unwrap().term_months, 60);
    }

    #[test]
    fn oversized_years_are_rejected() {
        let args = LoanArgs {
            principal: Some(Decimal::from(500_000)),
            rate: Some(Decimal::from(9)),
            months: None,
            years: Some(u32::MAX),
        };
        let err = args.terms().unwrap_err();
        assert!(err.to_string().contains("term_months"));
    }
}
