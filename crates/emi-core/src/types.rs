use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amounts in the loan currency (principal, EMI, income, balances).
pub type Money = Decimal;

/// Per-period rate as a fraction: 8.5% a year is 0.0070833.. a month.
pub type Rate = Decimal;

/// Percent units (8.5 = 8.5%): annual rates, income ratios, tax brackets.
pub type Percent = Decimal;

/// Envelope for composite results: the payload plus how it was computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
