use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use serde_json::json;

use emi_core::emi::LoanTerms;
use emi_core::profile::BorrowerProfile;
use emi_core::remote::{ClassifierConfig, EligibilityService};

use super::{CmdResult, LoanArgs, ProfileArgs};
use crate::input;

/// Arguments for the eligibility check
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON input with `profile` and `loan`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Skip the classifier and use the local heuristic
    #[arg(long)]
    pub offline: bool,

    /// Classifier endpoint (overrides EMI_CLASSIFIER_URL)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries after the first failed call
    #[arg(long)]
    pub retries: Option<u32>,
}

#[derive(Deserialize)]
struct EligibilityRequest {
    profile: BorrowerProfile,
    loan: LoanTerms,
}

pub fn run_eligibility(args: EligibilityArgs, mut config: ClassifierConfig) -> CmdResult {
    let request = match input::load::<EligibilityRequest>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => EligibilityRequest {
            profile: args.profile.profile()?,
            loan: args.loan.terms()?,
        },
    };
    request.loan.validate()?;

    config.offline |= args.offline;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let service = EligibilityService::http(config)?;
    let assessment =
        runtime.block_on(async { service.assess(&request.profile, &request.loan).await });

    tracing::debug!(source = ?assessment.source, "eligibility resolved");
    Ok(json!({
        "status": assessment.status.to_string(),
        "probability": assessment.probability.round_dp(4),
        "source": assessment.source,
        "factors": assessment.factors,
    }))
}
