#![cfg(feature = "remote")]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use emi_core::eligibility::{EligibilitySource, EligibilityStatus};
use emi_core::emi::LoanTerms;
use emi_core::profile::{BorrowerProfile, EmploymentType};
use emi_core::remote::{
    ClassifierConfig, ClassifierRequest, ClassifierResponse, EligibilityClassifier,
    EligibilityService,
};
use emi_core::{EngineError, EngineResult};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tokio::time::Instant;

// ===========================================================================
// Scripted classifier
// ===========================================================================

/// Replays queued replies in order; an exhausted script keeps failing.
#[derive(Clone, Default)]
struct ScriptedClassifier {
    script: Arc<Mutex<VecDeque<EngineResult<ClassifierResponse>>>>,
    calls: Arc<AtomicU32>,
}

impl ScriptedClassifier {
    fn with(replies: Vec<EngineResult<ClassifierResponse>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(replies.into())),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EligibilityClassifier for ScriptedClassifier {
    async fn classify(&self, _request: &ClassifierRequest) -> EngineResult<ClassifierResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(EngineError::RemoteUnavailable("connection refused".into())))
    }
}

fn down() -> EngineResult<ClassifierResponse> {
    Err(EngineError::RemoteUnavailable("connection refused".into()))
}

fn approved() -> EngineResult<ClassifierResponse> {
    Ok(ClassifierResponse::prediction("Eligible", 0.82))
}

fn borrower() -> BorrowerProfile {
    BorrowerProfile::new(35, dec!(85_000), 750, EmploymentType::Government)
}

fn loan() -> LoanTerms {
    LoanTerms::new(dec!(3_000_000), dec!(7.8), 360)
}

fn service(classifier: &ScriptedClassifier) -> EligibilityService<ScriptedClassifier> {
    EligibilityService::new(classifier.clone(), ClassifierConfig::default())
}

// ===========================================================================
// Resolution order
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn test_remote_answer_is_cached() {
    let classifier = ScriptedClassifier::with(vec![approved()]);
    let svc = service(&classifier);

    let first = svc.assess(&borrower(), &loan()).await;
    assert_eq!(first.source, EligibilitySource::Remote);
    assert_eq!(first.status, EligibilityStatus::Eligible);
    assert_eq!(first.probability, dec!(0.82));

    let second = svc.assess(&borrower(), &loan()).await;
    assert_eq!(second, first);
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_failure_falls_back_after_retries() {
    let classifier = ScriptedClassifier::default();
    let svc = service(&classifier);

    let started = Instant::now();
    let result = svc.assess(&borrower(), &loan()).await;
    let waited = started.elapsed();

    assert_eq!(classifier.calls(), 4);
    assert_eq!(result.source, EligibilitySource::LocalFallback);
    assert!(result.factors.is_some());
    // 1s + 2s + 3s of backoff
    assert!(waited >= Duration::from_secs(6) && waited < Duration::from_secs(7));
    assert!(svc.cache().is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_on_third_attempt() {
    let classifier = ScriptedClassifier::with(vec![down(), down(), approved()]);
    let svc = service(&classifier);

    let result = svc.assess(&borrower(), &loan()).await;
    assert_eq!(result.source, EligibilitySource::Remote);
    assert_eq!(classifier.calls(), 3);
    assert_eq!(svc.cache().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_error_reply_counts_as_failure() {
    let error_reply = ClassifierResponse {
        error: Some("model not loaded".into()),
        ..ClassifierResponse::default()
    };
    let classifier = ScriptedClassifier::with(vec![Ok(error_reply), approved()]);
    let svc = service(&classifier);

    let result = svc.assess(&borrower(), &loan()).await;
    assert_eq!(result.source, EligibilitySource::Remote);
    assert_eq!(classifier.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_offline_never_calls_out() {
    let classifier = ScriptedClassifier::with(vec![approved()]);
    let config = ClassifierConfig {
        offline: true,
        ..ClassifierConfig::default()
    };
    let svc = EligibilityService::new(classifier.clone(), config);

    let result = svc.assess(&borrower(), &loan()).await;
    assert_eq!(result.source, EligibilitySource::LocalFallback);
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_triggers_new_call() {
    let classifier = ScriptedClassifier::with(vec![
        approved(),
        Ok(ClassifierResponse::prediction("Not_Eligible", 0.64)),
    ]);
    let svc = service(&classifier);

    svc.assess(&borrower(), &loan()).await;
    tokio::time::advance(Duration::from_secs(301)).await;

    let refreshed = svc.assess(&borrower(), &loan()).await;
    assert_eq!(classifier.calls(), 2);
    assert_eq!(refreshed.status, EligibilityStatus::NotEligible);
}

#[tokio::test(start_paused = true)]
async fn test_different_borrowers_are_cached_separately() {
    let classifier = ScriptedClassifier::with(vec![approved(), approved()]);
    let svc = service(&classifier);

    svc.assess(&borrower(), &loan()).await;
    let mut other = borrower();
    other.credit_score = 700;
    svc.assess(&other, &loan()).await;

    assert_eq!(classifier.calls(), 2);
    assert_eq!(svc.cache().len().await, 2);
}
