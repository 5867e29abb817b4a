use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::cache::{CacheKey, EligibilityCache};
use super::classifier::{
    ClassifierConfig, ClassifierRequest, EligibilityClassifier, HttpClassifier,
};
use crate::eligibility::{assess_eligibility_locally, EligibilityAssessment};
use crate::emi::{compute_emi, LoanTerms};
use crate::metrics::emi_to_income_ratio;
use crate::profile::BorrowerProfile;
use crate::EngineResult;

/// Eligibility lookup that always produces an answer.
///
/// Order of resolution: offline mode, cache, remote classifier with
/// retries, local heuristic. Remote failures are logged and absorbed.
#[derive(Debug)]
pub struct EligibilityService<C> {
    classifier: C,
    cache: EligibilityCache,
    config: ClassifierConfig,
}

impl EligibilityService<HttpClassifier> {
    pub fn http(config: ClassifierConfig) -> EngineResult<Self> {
        let classifier = HttpClassifier::new(&config)?;
        Ok(Self::new(classifier, config))
    }
}

impl<C: EligibilityClassifier> EligibilityService<C> {
    pub fn new(classifier: C, config: ClassifierConfig) -> Self {
        Self {
            cache: EligibilityCache::new(config.cache_ttl, config.cache_capacity),
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn cache(&self) -> &EligibilityCache {
        &self.cache
    }

    pub async fn assess(
        &self,
        profile: &BorrowerProfile,
        loan: &LoanTerms,
    ) -> EligibilityAssessment {
        if self.config.offline {
            debug!("offline mode, using local eligibility heuristic");
            return self.local(profile, loan);
        }

        let key = CacheKey::new(profile, loan);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(credit_score = profile.credit_score, "eligibility cache hit");
            return hit;
        }

        let request = ClassifierRequest::new(profile, loan);
        let attempts = self.config.max_retries + 1;

        for attempt in 1..=attempts {
            let result = self
                .classifier
                .classify(&request)
                .await
                .and_then(|res| res.into_assessment());

            match result {
                Ok(assessment) => {
                    debug!(attempt, status = %assessment.status, "classifier answered");
                    self.cache.insert(key, assessment.clone()).await;
                    return assessment;
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "eligibility classifier call failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.config.backoff_base * attempt).await;
                    }
                }
            }
        }

        info!(attempts, "classifier unavailable, falling back to local heuristic");
        self.local(profile, loan)
    }

    fn local(&self, profile: &BorrowerProfile, loan: &LoanTerms) -> EligibilityAssessment {
        let ratio = compute_emi(loan)
            .and_then(|emi| emi_to_income_ratio(emi.monthly_payment, profile.monthly_income))
            .unwrap_or(Decimal::ZERO);
        assess_eligibility_locally(profile, ratio)
    }
}
