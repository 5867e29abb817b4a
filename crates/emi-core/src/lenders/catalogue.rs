use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::profile::{EmploymentType, LoanType};
use crate::types::{Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LenderKind {
    #[serde(rename = "Government Bank")]
    GovernmentBank,
    #[serde(rename = "Private Bank")]
    PrivateBank,
    #[serde(rename = "NBFC")]
    Nbfc,
}

impl fmt::Display for LenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LenderKind::GovernmentBank => "Government Bank",
            LenderKind::PrivateBank => "Private Bank",
            LenderKind::Nbfc => "NBFC",
        };
        f.write_str(label)
    }
}

/// Borrower requirements published by a lender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderCriteria {
    pub min_age: u32,
    pub max_age: u32,
    pub min_income: Money,
    /// Largest EMI the lender accepts, in percent of monthly income
    pub max_emi_ratio: Percent,
    pub employment_types: Vec<EmploymentType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lender {
    pub id: String,
    pub name: String,
    pub kind: LenderKind,
    pub loan_types: Vec<LoanType>,
    pub base_rate_pct: Percent,
    /// Processing fee in percent of the loan amount
    pub processing_fee_pct: Percent,
    pub min_credit_score: u32,
    pub max_loan_amount: Money,
    /// Lender quality rating in [0, 1]
    pub quality_score: Decimal,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub approval_time: Option<String>,
    pub criteria: LenderCriteria,
}

struct Spec<'a> {
    id: &'a str,
    name: &'a str,
    kind: LenderKind,
    loan_types: &'a [LoanType],
    base_rate_pct: Decimal,
    processing_fee_pct: Decimal,
    min_credit_score: u32,
    max_loan_amount: Decimal,
    quality_score: Decimal,
    features: &'a [&'a str],
    approval_time: &'a str,
    ages: (u32, u32),
    min_income: Decimal,
    max_emi_ratio: Decimal,
    employment_types: &'a [EmploymentType],
}

impl From<Spec<'_>> for Lender {
    fn from(s: Spec<'_>) -> Self {
        Lender {
            id: s.id.into(),
            name: s.name.into(),
            kind: s.kind,
            loan_types: s.loan_types.to_vec(),
            base_rate_pct: s.base_rate_pct,
            processing_fee_pct: s.processing_fee_pct,
            min_credit_score: s.min_credit_score,
            max_loan_amount: s.max_loan_amount,
            quality_score: s.quality_score,
            features: s.features.iter().map(|f| f.to_string()).collect(),
            approval_time: Some(s.approval_time.into()),
            criteria: LenderCriteria {
                min_age: s.ages.0,
                max_age: s.ages.1,
                min_income: s.min_income,
                max_emi_ratio: s.max_emi_ratio,
                employment_types: s.employment_types.to_vec(),
            },
        }
    }
}

/// Built-in lender catalogue used when the caller supplies none.
pub fn default_catalogue() -> Vec<Lender> {
    use EmploymentType::{Government, Private, SelfEmployed};
    use LoanType::{Business, Car, Education, Home, Personal};

    vec![
        Spec {
            id: "sbi_home",
            name: "State Bank of India",
            kind: LenderKind::GovernmentBank,
            loan_types: &[Home, Personal, Education],
            base_rate_pct: dec!(8.5),
            processing_fee_pct: dec!(0.5),
            min_credit_score: 650,
            max_loan_amount: dec!(10_000_000),
            quality_score: dec!(0.85),
            features: &["Flexible EMI", "No prepayment charges after 1 year", "Online processing"],
            approval_time: "15-20 days",
            ages: (21, 65),
            min_income: dec!(25_000),
            max_emi_ratio: dec!(50),
            employment_types: &[Government, Private, SelfEmployed],
        }
        .into(),
        Spec {
            id: "hdfc_premium",
            name: "HDFC Bank",
            kind: LenderKind::PrivateBank,
            loan_types: &[Home, Car, Personal, Business],
            base_rate_pct: dec!(8.75),
            processing_fee_pct: dec!(0.5),
            min_credit_score: 700,
            max_loan_amount: dec!(15_000_000),
            quality_score: dec!(0.92),
            features: &["Quick approval", "Digital processing", "Relationship benefits"],
            approval_time: "7-10 days",
            ages: (21, 70),
            min_income: dec!(50_000),
            max_emi_ratio: dec!(60),
            employment_types: &[Private, SelfEmployed],
        }
        .into(),
        Spec {
            id: "icici_smart",
            name: "ICICI Bank",
            kind: LenderKind::PrivateBank,
            loan_types: &[Home, Car, Personal, Education],
            base_rate_pct: dec!(9.0),
            processing_fee_pct: dec!(0.75),
            min_credit_score: 680,
            max_loan_amount: dec!(12_000_000),
            quality_score: dec!(0.88),
            features: &["Online application", "Instant approval", "Flexible tenure"],
            approval_time: "5-7 days",
            ages: (23, 65),
            min_income: dec!(40_000),
            max_emi_ratio: dec!(55),
            employment_types: &[Private, SelfEmployed],
        }
        .into(),
        Spec {
            id: "axis_advantage",
            name: "Axis Bank",
            kind: LenderKind::PrivateBank,
            loan_types: &[Home, Car, Personal, Business],
            base_rate_pct: dec!(8.9),
            processing_fee_pct: dec!(1.0),
            min_credit_score: 720,
            max_loan_amount: dec!(10_000_000),
            quality_score: dec!(0.86),
            features: &["Customized rates", "Business banking", "Fast track processing"],
            approval_time: "10-12 days",
            ages: (25, 60),
            min_income: dec!(60_000),
            max_emi_ratio: dec!(50),
            employment_types: &[Private, SelfEmployed],
        }
        .into(),
        Spec {
            id: "kotak_prime",
            name: "Kotak Mahindra Bank",
            kind: LenderKind::PrivateBank,
            loan_types: &[Home, Car, Personal],
            base_rate_pct: dec!(9.25),
            processing_fee_pct: dec!(0.5),
            min_credit_score: 750,
            max_loan_amount: dec!(8_000_000),
            quality_score: dec!(0.89),
            features: &["Premium rates", "Dedicated RM", "Priority processing"],
            approval_time: "8-10 days",
            ages: (21, 65),
            min_income: dec!(75_000),
            max_emi_ratio: dec!(45),
            employment_types: &[Private],
        }
        .into(),
        Spec {
            id: "bajaj_finserv",
            name: "Bajaj Finserv",
            kind: LenderKind::Nbfc,
            loan_types: &[Personal, Business, Education],
            base_rate_pct: dec!(10.5),
            processing_fee_pct: dec!(2.0),
            min_credit_score: 600,
            max_loan_amount: dec!(5_000_000),
            quality_score: dec!(0.75),
            features: &["Instant approval", "Flexi EMI", "No collateral"],
            approval_time: "1-2 days",
            ages: (23, 58),
            min_income: dec!(25_000),
            max_emi_ratio: dec!(65),
            employment_types: &[Private, SelfEmployed],
        }
        .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue_shape() {
        let lenders = default_catalogue();
        assert_eq!(lenders.len(), 6);
        assert!(lenders.iter().all(|l| l.quality_score <= Decimal::ONE));
        let nbfc = lenders.iter().find(|l| l.id == "bajaj_finserv").unwrap();
        assert_eq!(nbfc.kind, LenderKind::Nbfc);
        assert!(!nbfc.loan_types.contains(&LoanType::Home));
    }

    #[test]
    fn test_lender_kind_serde() {
        let json = serde_json::to_string(&LenderKind::GovernmentBank).unwrap();
        assert_eq!(json, "\"Government Bank\"");
    }
}
