//! Model pricing from TOML (`[pricing]` section)
//!
//! ```toml
//! [pricing]
//! fallback_per_token_usd = 0.00001
//!
//! [pricing.models."gpt-4o"]
//! input_per_mtok = 2.5
//! output_per_mtok = 10.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use warden_domain::{ModelPrice, PriceTable, observability::DEFAULT_FALLBACK_PER_TOKEN_USD};

use crate::config::validation::{ConfigIssue, ConfigValidationError};

/// USD per million tokens for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileModelPrice {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePricingConfig {
    /// Per-token rate for models missing from `models`
    pub fallback_per_token_usd: f64,
    pub models: BTreeMap<String, FileModelPrice>,
}

impl Default for FilePricingConfig {
    fn default() -> Self {
        Self {
            fallback_per_token_usd: DEFAULT_FALLBACK_PER_TOKEN_USD,
            models: BTreeMap::new(),
        }
    }
}

impl FilePricingConfig {
    pub fn sanitize(&mut self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !self.fallback_per_token_usd.is_finite() || self.fallback_per_token_usd < 0.0 {
            issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
                field: "pricing.fallback_per_token_usd",
                min: 0.0,
                value: self.fallback_per_token_usd,
            }));
            self.fallback_per_token_usd = DEFAULT_FALLBACK_PER_TOKEN_USD;
        }

        let before = self.models.len();
        self.models.retain(|_, price| {
            price.input_per_mtok.is_finite()
                && price.output_per_mtok.is_finite()
                && price.input_per_mtok >= 0.0
                && price.output_per_mtok >= 0.0
        });
        let dropped = before - self.models.len();
        if dropped > 0 {
            issues.push(ConfigIssue::warning(ConfigValidationError::Suspicious {
                field: "pricing.models",
                value: format!("{} entries with negative rates", dropped),
                consequence: "those models are priced with the fallback rate",
            }));
        }

        issues
    }

    pub fn to_price_table(&self) -> PriceTable {
        self.models.iter().fold(
            PriceTable::new(self.fallback_per_token_usd),
            |table, (model, price)| {
                table.with_model(
                    model,
                    ModelPrice::new(price.input_per_mtok, price.output_per_mtok),
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::PriceLookup;

    #[test]
    fn test_to_price_table() {
        let config: FilePricingConfig = toml::from_str(
            r#"
fallback_per_token_usd = 0.0001

[models."gpt-4o"]
input_per_mtok = 2.0
output_per_mtok = 10.0
"#,
        )
        .unwrap();
        let table = config.to_price_table();

        let known = table.cost("gpt-4o", 1_000_000, 100_000);
        assert!((known - 3.0).abs() < 1e-9);

        let unknown = table.cost("mystery", 10, 10);
        assert!((unknown - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_sanitize_negative_rates() {
        let mut config = FilePricingConfig {
            fallback_per_token_usd: -1.0,
            ..Default::default()
        };
        config.models.insert(
            "bad".to_string(),
            FileModelPrice {
                input_per_mtok: -2.0,
                output_per_mtok: 1.0,
            },
        );
        let issues = config.sanitize();
        assert_eq!(issues.len(), 2);
        assert_eq!(
            config.fallback_per_token_usd,
            DEFAULT_FALLBACK_PER_TOKEN_USD
        );
        assert!(config.models.is_empty());
    }
}
