use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::eligibility::{EligibilityAssessment, EligibilitySource, EligibilityStatus};
use crate::emi::LoanTerms;
use crate::error::EngineError;
use crate::profile::BorrowerProfile;
use crate::types::Money;
use crate::EngineResult;

/// Settings for the remote eligibility path.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first failed attempt (default: 3)
    pub max_retries: u32,
    /// Backoff before retry `n` is `backoff_base * n` (default: 1s)
    pub backoff_base: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    /// Skip the remote call and answer from the local heuristic
    pub offline: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/api/predict_eligibility".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 100,
            offline: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

fn num(value: Money) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn opt_num(value: Option<Money>) -> f64 {
    value.map(num).unwrap_or_default()
}

/// Flattened profile and loan terms, as posted to the classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierRequest {
    pub age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    pub monthly_salary: f64,
    pub employment_type: String,
    pub years_of_employment: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    pub house_type: String,
    pub monthly_rent: f64,
    pub family_size: u32,
    pub dependents: u32,
    pub school_fees: f64,
    pub college_fees: f64,
    pub travel_expenses: f64,
    pub groceries_utilities: f64,
    pub other_monthly_expenses: f64,
    /// "Yes" or "No"
    pub existing_loans: String,
    pub current_emi_amount: f64,
    pub credit_score: u32,
    pub bank_balance: f64,
    pub emergency_fund: f64,
    pub requested_amount: f64,
    pub requested_tenure: u32,
}

impl ClassifierRequest {
    pub fn new(profile: &BorrowerProfile, loan: &LoanTerms) -> Self {
        let d = &profile.details;
        Self {
            age: profile.age,
            gender: d.gender.clone(),
            marital_status: d.marital_status.clone(),
            education: d.education.clone(),
            monthly_salary: num(profile.monthly_income),
            employment_type: profile.employment_type.to_string(),
            years_of_employment: d.years_of_employment.unwrap_or_default(),
            company_type: d.company_type.clone(),
            house_type: profile.house_type.to_string(),
            monthly_rent: opt_num(d.monthly_rent),
            family_size: d.family_size.unwrap_or(profile.dependents + 1),
            dependents: profile.dependents,
            school_fees: opt_num(d.school_fees),
            college_fees: opt_num(d.college_fees),
            travel_expenses: opt_num(d.travel_expenses),
            groceries_utilities: opt_num(d.groceries_utilities),
            other_monthly_expenses: opt_num(d.other_monthly_expenses),
            existing_loans: if profile.existing_loans { "Yes" } else { "No" }.to_string(),
            current_emi_amount: num(profile.existing_emi),
            credit_score: profile.credit_score,
            bank_balance: num(profile.bank_balance),
            emergency_fund: num(profile.emergency_fund),
            requested_amount: num(loan.principal),
            requested_tenure: loan.term_months,
        }
    }
}

/// Classifier reply: a prediction with confidence, or an error message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassifierResponse {
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub probabilities: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub prediction_time: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ClassifierResponse {
    pub fn prediction(label: &str, confidence: f64) -> Self {
        Self {
            prediction: Some(label.to_string()),
            confidence: Some(confidence),
            ..Self::default()
        }
    }

    /// Normalise the reply into an assessment.
    ///
    /// A reply carrying `error`, or lacking a prediction or any confidence
    /// figure, is a failure. Confidence above 1 is read as a percentage.
    pub fn into_assessment(self) -> EngineResult<EligibilityAssessment> {
        if let Some(err) = self.error {
            return Err(EngineError::RemoteUnavailable(err));
        }
        let label = self
            .prediction
            .ok_or_else(|| EngineError::RemoteUnavailable("response has no prediction".into()))?;

        let raw = self
            .confidence
            .or_else(|| {
                self.probabilities
                    .as_ref()
                    .and_then(|p| p.values().copied().reduce(f64::max))
            })
            .ok_or_else(|| EngineError::RemoteUnavailable("response has no confidence".into()))?;

        let mut probability = Decimal::from_f64(raw).ok_or_else(|| {
            EngineError::RemoteUnavailable(format!("confidence {raw} is not a number"))
        })?;
        if probability > Decimal::ONE {
            probability /= Decimal::ONE_HUNDRED;
        }

        Ok(EligibilityAssessment {
            status: EligibilityStatus::from_label(&label),
            probability: probability.clamp(Decimal::ZERO, Decimal::ONE),
            source: EligibilitySource::Remote,
            factors: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Classifier seam
// ---------------------------------------------------------------------------

/// Anything that can answer an eligibility request.
pub trait EligibilityClassifier {
    fn classify(
        &self,
        request: &ClassifierRequest,
    ) -> impl Future<Output = EngineResult<ClassifierResponse>> + Send;
}

/// Classifier reached over HTTP POST with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> EngineResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl EligibilityClassifier for HttpClassifier {
    async fn classify(&self, request: &ClassifierRequest) -> EngineResult<ClassifierResponse> {
        tracing::debug!(endpoint = %self.endpoint, "posting eligibility request");

        let res = self.http.post(&self.endpoint).json(request).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(EngineError::RemoteUnavailable(format!(
                "classifier returned HTTP {status}"
            )));
        }

        Ok(res.json::<ClassifierResponse>().await?)
    }
}
