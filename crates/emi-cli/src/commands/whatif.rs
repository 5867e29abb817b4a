use clap::Args;

use emi_core::whatif::{compare_what_if, what_if_template, WhatIfInput, TEMPLATE_NAMES};

use super::CmdResult;
use crate::input;

/// Arguments for the what-if comparison
#[derive(Args)]
pub struct WhatIfArgs {
    /// Path to JSON input with `current` and `proposed` cases
    #[arg(long)]
    pub input: Option<String>,

    /// Built-in preset: income_increase, rate_decrease or tenure_extend
    #[arg(long, conflicts_with = "input")]
    pub template: Option<String>,
}

pub fn run_what_if(args: WhatIfArgs) -> CmdResult {
    let request: WhatIfInput = if let Some(name) = args.template.as_deref() {
        what_if_template(name).ok_or_else(|| {
            format!(
                "Unknown template '{name}' (expected one of: {})",
                TEMPLATE_NAMES.join(", ")
            )
        })?
    } else {
        input::load(args.input.as_deref())?
            .ok_or("--input or --template is required for a what-if comparison")?
    };

    let result = compare_what_if(&request)?;
    Ok(serde_json::to_value(result)?)
}
