use clap::Args;

use emi_core::profile::{sample_profile, sample_profiles};

use super::CmdResult;

/// Arguments for the built-in sample borrowers
#[derive(Args)]
pub struct SampleArgs {
    /// Sample key, e.g. young_professional; lists all samples when omitted
    pub key: Option<String>,
}

pub fn run_sample(args: SampleArgs) -> CmdResult {
    match args.key.as_deref() {
        Some(key) => {
            let sample = sample_profile(key).ok_or_else(|| {
                let known: Vec<_> = sample_profiles().into_iter().map(|s| s.key).collect();
                format!("Unknown sample '{key}' (expected one of: {})", known.join(", "))
            })?;
            Ok(serde_json::to_value(sample)?)
        }
        None => Ok(serde_json::to_value(sample_profiles())?),
    }
}
