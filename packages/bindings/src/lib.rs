use std::sync::OnceLock;

use napi::Result as NapiResult;
use napi_derive::napi;

use emi_core::remote::{ClassifierConfig, EligibilityService, HttpClassifier};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// EMI and schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let input: emi_core::emi::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi_core::emi::compute_emi(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct ScheduleBindingInput {
    #[serde(flatten)]
    loan: emi_core::emi::LoanTerms,
    #[serde(default)]
    max_rows: Option<u32>,
    #[serde(default)]
    start_date: Option<chrono::NaiveDate>,
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let binding_input: ScheduleBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    binding_input.loan.validate().map_err(to_napi_error)?;

    let mut schedule =
        emi_core::schedule::generate_schedule(&binding_input.loan, binding_input.max_rows);
    if let Some(date) = binding_input.start_date {
        schedule = schedule.with_start_date(date);
    }
    let output = serde_json::json!({
        "rows": schedule,
        "annual_summary": schedule.annual_summary(),
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: emi_core::metrics::LoanAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi_core::metrics::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct RiskBindingInput {
    emi: rust_decimal::Decimal,
    monthly_income: rust_decimal::Decimal,
    #[serde(default)]
    thresholds: Option<emi_core::metrics::RiskThresholds>,
}

#[napi]
pub fn risk_level(input_json: String) -> NapiResult<String> {
    let binding_input: RiskBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let level = emi_core::metrics::compute_risk_level_with(
        binding_input.emi,
        binding_input.monthly_income,
        &binding_input.thresholds.unwrap_or_default(),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&level).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct AffordabilityBindingInput {
    emi: rust_decimal::Decimal,
    profile: emi_core::profile::BorrowerProfile,
}

#[napi]
pub fn affordability_score(input_json: String) -> NapiResult<String> {
    let binding_input: AffordabilityBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let score = emi_core::metrics::compute_affordability_score(
        binding_input.emi,
        binding_input.profile.monthly_income,
        &binding_input.profile,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&score).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_prepayment(input_json: String) -> NapiResult<String> {
    let input: emi_core::prepayment::PrepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi_core::prepayment::compare_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_what_if(input_json: String) -> NapiResult<String> {
    let input: emi_core::whatif::WhatIfInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi_core::whatif::compare_what_if(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn what_if_template(name: String) -> NapiResult<String> {
    let input = emi_core::whatif::what_if_template(&name)
        .ok_or_else(|| to_napi_error(format!("Unknown what-if template '{name}'")))?;
    serde_json::to_string(&input).map_err(to_napi_error)
}

#[napi]
pub fn match_lenders(input_json: String) -> NapiResult<String> {
    let input: emi_core::lenders::LenderMatchInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi_core::lenders::match_lenders(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Profiles and eligibility
// ---------------------------------------------------------------------------

#[napi]
pub fn sample_profiles() -> NapiResult<String> {
    serde_json::to_string(&emi_core::profile::sample_profiles()).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct EligibilityBindingInput {
    profile: emi_core::profile::BorrowerProfile,
    loan: emi_core::emi::LoanTerms,
}

#[napi]
pub fn validate_profile(input_json: String) -> NapiResult<String> {
    let binding_input: EligibilityBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let errors =
        emi_core::profile::validate_profile(&binding_input.profile, binding_input.loan.principal);
    serde_json::to_string(&errors).map_err(to_napi_error)
}

#[napi]
pub fn local_eligibility(input_json: String) -> NapiResult<String> {
    let binding_input: EligibilityBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let emi = emi_core::emi::compute_emi(&binding_input.loan).map_err(to_napi_error)?;
    let ratio = emi_core::metrics::emi_to_income_ratio(
        emi.monthly_payment,
        binding_input.profile.monthly_income,
    )
    .map_err(to_napi_error)?;
    let output = emi_core::eligibility::assess_eligibility_locally(&binding_input.profile, ratio);
    serde_json::to_string(&output).map_err(to_napi_error)
}

static ELIGIBILITY: OnceLock<EligibilityService<HttpClassifier>> = OnceLock::new();

/// Shared service so the answer cache survives across calls.
fn eligibility_service() -> NapiResult<&'static EligibilityService<HttpClassifier>> {
    if let Some(service) = ELIGIBILITY.get() {
        return Ok(service);
    }
    let service = EligibilityService::http(ClassifierConfig::default()).map_err(to_napi_error)?;
    Ok(ELIGIBILITY.get_or_init(|| service))
}

/// Remote classifier with retries; resolves locally when it is unreachable.
#[napi]
pub async fn check_eligibility(input_json: String) -> NapiResult<String> {
    let binding_input: EligibilityBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    binding_input.loan.validate().map_err(to_napi_error)?;

    let service = eligibility_service()?;
    let output = service
        .assess(&binding_input.profile, &binding_input.loan)
        .await;
    serde_json::to_string(&output).map_err(to_napi_error)
}
