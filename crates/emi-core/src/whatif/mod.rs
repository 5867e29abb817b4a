pub mod comparison;

pub use comparison::{
    compare_what_if, what_if_template, CaseOutcome, EligibilityTrend, RecommendationKind,
    WhatIfCase, WhatIfComparison, WhatIfInput, WhatIfRecommendation, TEMPLATE_NAMES,
};
