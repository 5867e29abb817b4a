pub mod eligibility;
pub mod emi;
pub mod error;
pub mod metrics;
pub mod profile;
pub mod schedule;
pub mod types;

#[cfg(feature = "prepayment")]
pub mod prepayment;

#[cfg(feature = "whatif")]
pub mod whatif;

#[cfg(feature = "lenders")]
pub mod lenders;

#[cfg(feature = "remote")]
pub mod remote;

pub use error::EngineError;
pub use types::*;

/// Standard result type for all engine operations
pub type EngineResult<T> = Result<T, EngineError>;
