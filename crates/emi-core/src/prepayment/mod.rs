pub mod advisory;
pub mod scenarios;

pub use advisory::{
    build_advisory, AdvisoryNote, CashFlowImpact, NotePriority, PrepaymentAdvisory,
    PrepaymentContext, PrepaymentRisk, TaxBenefit,
};
pub use scenarios::{
    compare_scenarios, OpportunityCost, PrepaymentInput, Recommendation, ScenarioComparison,
    ScenarioResult, Strategy,
};
