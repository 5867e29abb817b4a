//! Remote eligibility classifier with caching, retry and local fallback.

pub mod cache;
pub mod classifier;
pub mod service;

pub use cache::{CacheKey, EligibilityCache};
pub use classifier::{
    ClassifierConfig, ClassifierRequest, ClassifierResponse, EligibilityClassifier,
    HttpClassifier,
};
pub use service::EligibilityService;
