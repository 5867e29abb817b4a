//! Borrower profile shared by the metrics, eligibility, what-if and lender
//! modules, together with the input bounds the calculator forms enforce.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::emi::LoanTerms;
use crate::types::Money;

pub const MIN_CREDIT_SCORE: u32 = 300;
pub const MAX_CREDIT_SCORE: u32 = 850;
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 70;
pub const MIN_MONTHLY_INCOME: Money = dec!(10_000);
pub const MAX_LOAN_AMOUNT: Money = dec!(50_000_000);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EmploymentType {
    Government,
    #[default]
    Private,
    #[serde(rename = "Self_Employed", alias = "SelfEmployed")]
    SelfEmployed,
    Contract,
    Other,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::Government => "Government",
            EmploymentType::Private => "Private",
            EmploymentType::SelfEmployed => "Self_Employed",
            EmploymentType::Contract => "Contract",
            EmploymentType::Other => "Other",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HouseType {
    Owned,
    Rented,
    Family,
    #[default]
    Other,
}

impl fmt::Display for HouseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HouseType::Owned => "Owned",
            HouseType::Rented => "Rented",
            HouseType::Family => "Family",
            HouseType::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Purpose of the loan; drives tax treatment and lender product filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    #[default]
    Home,
    Car,
    Personal,
    Education,
    Business,
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanType::Home => "home",
            LoanType::Car => "car",
            LoanType::Personal => "personal",
            LoanType::Education => "education",
            LoanType::Business => "business",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Descriptive fields that only the remote classifier consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_employment: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_fees: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_fees: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_expenses: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groceries_utilities: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_monthly_expenses: Option<Money>,
}

impl ProfileDetails {
    /// Sum of the recorded monthly expense lines, missing lines count as zero.
    pub fn total_monthly_expenses(&self) -> Money {
        [
            self.monthly_rent,
            self.school_fees,
            self.college_fees,
            self.travel_expenses,
            self.groceries_utilities,
            self.other_monthly_expenses,
        ]
        .iter()
        .flatten()
        .sum()
    }
}

/// Applicant data used across the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerProfile {
    pub age: u32,
    pub monthly_income: Money,
    pub credit_score: u32,
    #[serde(default)]
    pub employment_type: EmploymentType,
    /// EMIs already being paid on other loans
    #[serde(default)]
    pub existing_emi: Money,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub existing_loans: bool,
    #[serde(default)]
    pub house_type: HouseType,
    #[serde(default)]
    pub bank_balance: Money,
    #[serde(default)]
    pub emergency_fund: Money,
    #[serde(default, flatten)]
    pub details: ProfileDetails,
}

impl BorrowerProfile {
    pub fn new(
        age: u32,
        monthly_income: Money,
        credit_score: u32,
        employment_type: EmploymentType,
    ) -> Self {
        Self {
            age,
            monthly_income,
            credit_score,
            employment_type,
            existing_emi: Decimal::ZERO,
            dependents: 0,
            existing_loans: false,
            house_type: HouseType::default(),
            bank_balance: Decimal::ZERO,
            emergency_fund: Decimal::ZERO,
            details: ProfileDetails::default(),
        }
    }

    /// Bank balance plus emergency fund
    pub fn liquid_assets(&self) -> Money {
        self.bank_balance + self.emergency_fund
    }
}

/// Check a profile and requested amount against the accepted input ranges.
///
/// Returns one message per violated bound; an empty list means the
/// profile is acceptable. Out-of-range values are reported, never clamped.
pub fn validate_profile(profile: &BorrowerProfile, loan_amount: Money) -> Vec<String> {
    let mut errors = Vec::new();

    if profile.credit_score < MIN_CREDIT_SCORE || profile.credit_score > MAX_CREDIT_SCORE {
        errors.push(format!(
            "Credit score must be between {MIN_CREDIT_SCORE} and {MAX_CREDIT_SCORE}"
        ));
    }
    if profile.age < MIN_AGE || profile.age > MAX_AGE {
        errors.push(format!("Age must be between {MIN_AGE} and {MAX_AGE}"));
    }
    if profile.monthly_income < MIN_MONTHLY_INCOME {
        errors.push(format!(
            "Monthly income must be at least {MIN_MONTHLY_INCOME}"
        ));
    }
    if loan_amount > MAX_LOAN_AMOUNT {
        errors.push(format!("Loan amount cannot exceed {MAX_LOAN_AMOUNT}"));
    }

    errors
}

// ---------------------------------------------------------------------------
// Sample profiles
// ---------------------------------------------------------------------------

/// A named borrower with the loan they are applying for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleProfile {
    pub key: String,
    pub profile: BorrowerProfile,
    pub loan: LoanTerms,
}

#[allow(clippy::too_many_arguments)]
fn sample(
    key: &str,
    age: u32,
    income: Money,
    credit_score: u32,
    employment_type: EmploymentType,
    existing_emi: Money,
    dependents: u32,
    bank_balance: Money,
    loan: LoanTerms,
) -> SampleProfile {
    let mut profile = BorrowerProfile::new(age, income, credit_score, employment_type);
    profile.existing_emi = existing_emi;
    profile.existing_loans = existing_emi > Decimal::ZERO;
    profile.dependents = dependents;
    profile.bank_balance = bank_balance;
    SampleProfile {
        key: key.to_string(),
        profile,
        loan,
    }
}

/// Built-in demonstration borrowers.
pub fn sample_profiles() -> Vec<SampleProfile> {
    vec![
        sample(
            "young_professional",
            28,
            dec!(75_000),
            720,
            EmploymentType::Private,
            dec!(5_000),
            0,
            dec!(150_000),
            LoanTerms::new(dec!(2_500_000), dec!(8.5), 240),
        ),
        sample(
            "experienced_executive",
            42,
            dec!(150_000),
            780,
            EmploymentType::Private,
            dec!(12_000),
            2,
            dec!(500_000),
            LoanTerms::new(dec!(4_500_000), dec!(8.2), 300),
        ),
        sample(
            "government_employee",
            35,
            dec!(85_000),
            750,
            EmploymentType::Government,
            dec!(8_000),
            1,
            dec!(250_000),
            LoanTerms::new(dec!(3_000_000), dec!(7.8), 360),
        ),
        sample(
            "self_employed",
            38,
            dec!(120_000),
            690,
            EmploymentType::SelfEmployed,
            dec!(15_000),
            3,
            dec!(180_000),
            LoanTerms::new(dec!(3_500_000), dec!(9.5), 216),
        ),
        sample(
            "first_time_buyer",
            26,
            dec!(55_000),
            680,
            EmploymentType::Private,
            dec!(2_000),
            0,
            dec!(80_000),
            LoanTerms::new(dec!(1_800_000), dec!(8.8), 300),
        ),
    ]
}

pub fn sample_profile(key: &str) -> Option<SampleProfile> {
    sample_profiles().into_iter().find(|s| s.key == key)
}
