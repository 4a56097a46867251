//! Per-model token pricing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Flat USD rate per token applied to models with no table entry.
pub const DEFAULT_FALLBACK_PER_TOKEN_USD: f64 = 0.00001;

/// Price of one model, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl ModelPrice {
    pub fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }

    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64) * self.input_per_mtok / 1_000_000.0
            + (output_tokens as f64) * self.output_per_mtok / 1_000_000.0
    }
}

/// Source of prices for the cost ledger.
pub trait PriceLookup: Send + Sync {
    /// USD cost of a completion. Never negative.
    fn cost(&self, model_id: &str, input_tokens: u64, output_tokens: u64) -> f64;
}

/// Model table with a flat per-token fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    models: HashMap<String, ModelPrice>,
    fallback_per_token: f64,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_PER_TOKEN_USD)
    }
}

impl PriceTable {
    pub fn new(fallback_per_token: f64) -> Self {
        Self {
            models: HashMap::new(),
            fallback_per_token: sanitize_rate(fallback_per_token),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>, price: ModelPrice) -> Self {
        self.insert(model_id, price);
        self
    }

    pub fn insert(&mut self, model_id: impl Into<String>, price: ModelPrice) {
        let price = ModelPrice::new(
            sanitize_rate(price.input_per_mtok),
            sanitize_rate(price.output_per_mtok),
        );
        self.models.insert(model_id.into(), price);
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelPrice> {
        self.models.get(model_id)
    }

    pub fn fallback_per_token(&self) -> f64 {
        self.fallback_per_token
    }
}

impl PriceLookup for PriceTable {
    fn cost(&self, model_id: &str, input_tokens: u64, output_tokens: u64) -> f64 {
        match self.models.get(model_id) {
            Some(price) => price.cost(input_tokens, output_tokens),
            None => (input_tokens + output_tokens) as f64 * self.fallback_per_token,
        }
    }
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() { rate.max(0.0) } else { 0.0 }
}

/// Format a cost value as a USD string, e.g. `"$0.0042"`.
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        format!("${cost:.4}")
    } else {
        format!("${cost:.2}")
    }
}
