use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::eligibility::EligibilityAssessment;
use crate::emi::LoanTerms;
use crate::profile::{BorrowerProfile, EmploymentType};

/// The profile fields a cached answer is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    loan_amount: Decimal,
    monthly_income: Decimal,
    credit_score: u32,
    age: u32,
    employment_type: EmploymentType,
}

impl CacheKey {
    pub fn new(profile: &BorrowerProfile, loan: &LoanTerms) -> Self {
        Self {
            loan_amount: loan.principal.normalize(),
            monthly_income: profile.monthly_income.normalize(),
            credit_score: profile.credit_score,
            age: profile.age,
            employment_type: profile.employment_type,
        }
    }
}

struct CacheEntry {
    assessment: EligibilityAssessment,
    inserted_at: Instant,
}

/// Bounded TTL cache of classifier answers.
///
/// Stale entries are dropped when read. Inserting into a full cache evicts
/// the oldest entry.
pub struct EligibilityCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl EligibilityCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<EligibilityAssessment> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.assessment.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Stale: re-check under the write lock, a fresh insert may have raced in
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.assessment.clone());
            }
            entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: CacheKey, assessment: EligibilityAssessment) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                assessment,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl std::fmt::Debug for EligibilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EligibilityCache")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish()
    }
}
