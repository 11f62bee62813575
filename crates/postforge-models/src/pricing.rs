//! Static per-model price table for cost estimation.
//!
//! Prices are USD per 1M tokens (input, output). Estimates are for
//! observability only and never drive control decisions.

use postforge_abstraction::ModelUsage;

/// Input/output pricing for a model, USD per 1M tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Cost per 1M prompt tokens.
    pub input_per_million: f64,
    /// Cost per 1M completion tokens.
    pub output_per_million: f64,
}

/// Looks up pricing for a model ID.
///
/// Exact matches first, then coarse family buckets, then a conservative
/// default row for unknown models.
pub fn pricing_for(model_id: &str) -> ModelPricing {
    let lower = model_id.to_lowercase();

    match lower.as_str() {
        "gpt-4o-mini" => return ModelPricing { input_per_million: 0.15, output_per_million: 0.60 },
        "gpt-4o" => return ModelPricing { input_per_million: 2.50, output_per_million: 10.00 },
        "gpt-4.1" => return ModelPricing { input_per_million: 2.00, output_per_million: 8.00 },
        "gpt-4.1-mini" => {
            return ModelPricing { input_per_million: 0.40, output_per_million: 1.60 }
        }
        "gpt-4.1-nano" => {
            return ModelPricing { input_per_million: 0.10, output_per_million: 0.40 }
        }
        "command-r7b-12-2024" => {
            return ModelPricing { input_per_million: 0.0375, output_per_million: 0.15 }
        }
        _ => {}
    }

    // Family buckets for versioned / dated model IDs.
    if lower.contains("mini") || lower.contains("nano") || lower.contains("r7b") {
        return ModelPricing { input_per_million: 0.25, output_per_million: 1.25 };
    }
    if lower.starts_with("command") {
        // Command A / R+ class evaluator models.
        return ModelPricing { input_per_million: 2.50, output_per_million: 10.00 };
    }

    ModelPricing { input_per_million: 1.0, output_per_million: 2.0 }
}

/// Estimates the cost of one call in USD from reported token usage.
pub fn estimate_cost(model_id: &str, usage: &ModelUsage) -> f64 {
    let pricing = pricing_for(model_id);
    (f64::from(usage.prompt_tokens) / 1_000_000.0) * pricing.input_per_million
        + (f64::from(usage.completion_tokens) / 1_000_000.0) * pricing.output_per_million
}
