//! Token and cost accounting.
//!
//! A [`CostLedger`] brackets one query at a time with
//! [`start_query`](CostLedger::start_query) / [`end_query`](CostLedger::end_query)
//! and prices every completion in between. Closed queries are kept in order
//! for the cost breakdown.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::pricing::{PriceLookup, PriceTable};
use crate::session::response::TokenUsage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostLedgerError {
    #[error("cost ledger misuse: query '{open}' is still open")]
    Misuse { open: String },

    #[error("cost ledger misuse: no open query to log step {step_number} against")]
    NoOpenQuery { step_number: usize },
}

/// Cost of one completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCost {
    pub step_number: usize,
    pub model_id: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub is_tool_call: bool,
}

/// Accumulated cost of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCost {
    pub query: String,
    pub steps: Vec<StepCost>,
    pub total_cost_usd: f64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
}

impl QueryCost {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            steps: Vec::new(),
            total_cost_usd: 0.0,
            total_input_tokens: 0,
            total_output_tokens: 0,
        }
    }

    pub fn add_step(&mut self, step: StepCost) {
        self.total_cost_usd += step.cost_usd;
        self.total_input_tokens += step.input_tokens;
        self.total_output_tokens += step.output_tokens;
        self.steps.push(step);
    }
}

pub struct CostLedger {
    prices: Arc<dyn PriceLookup>,
    current: Option<QueryCost>,
    queries: Vec<QueryCost>,
}

impl std::fmt::Debug for CostLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostLedger")
            .field("current", &self.current)
            .field("queries", &self.queries.len())
            .finish()
    }
}

impl Default for CostLedger {
    fn default() -> Self {
        Self::new(Arc::new(PriceTable::default()))
    }
}

impl CostLedger {
    pub fn new(prices: Arc<dyn PriceLookup>) -> Self {
        Self {
            prices,
            current: None,
            queries: Vec::new(),
        }
    }

    /// Open a query. Fails if another query is still open.
    pub fn start_query(&mut self, query: impl Into<String>) -> Result<(), CostLedgerError> {
        if let Some(open) = &self.current {
            return Err(CostLedgerError::Misuse {
                open: open.query.clone(),
            });
        }
        self.current = Some(QueryCost::new(query));
        Ok(())
    }

    /// Price one completion and add it to the open query.
    ///
    /// Missing usage counts as zero tokens.
    pub fn log_completion(
        &mut self,
        step_number: usize,
        model_id: &str,
        usage: Option<TokenUsage>,
        is_tool_call: bool,
    ) -> Result<StepCost, CostLedgerError> {
        let Some(current) = self.current.as_mut() else {
            warn!(step_number, "No open query to log completion for");
            return Err(CostLedgerError::NoOpenQuery { step_number });
        };

        let usage = usage.unwrap_or_default();
        let cost_usd = self
            .prices
            .cost(model_id, usage.prompt_tokens, usage.completion_tokens)
            .max(0.0);

        let step = StepCost {
            step_number,
            model_id: model_id.to_string(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            cost_usd,
            is_tool_call,
        };
        current.add_step(step.clone());
        Ok(step)
    }

    /// Close the open query and return a copy of it. No-op when none is open.
    pub fn end_query(&mut self) -> Option<QueryCost> {
        let closed = self.current.take()?;
        self.queries.push(closed.clone());
        Some(closed)
    }

    pub fn current(&self) -> Option<&QueryCost> {
        self.current.as_ref()
    }

    /// Closed queries, oldest first.
    pub fn queries(&self) -> &[QueryCost] {
        &self.queries
    }

    pub fn total_cost_usd(&self) -> f64 {
        self.queries.iter().map(|q| q.total_cost_usd).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::pricing::ModelPrice;

    #[test]
    fn test_step_sum_equals_total() {
        let mut ledger = CostLedger::default();
        ledger.start_query("q").unwrap();
        ledger
            .log_completion(1, "m", Some(TokenUsage::new(100, 20)), true)
            .unwrap();
        ledger
            .log_completion(2, "m", Some(TokenUsage::new(150, 40)), false)
            .unwrap();
        let query = ledger.end_query().unwrap();

        let summed: f64 = query.steps.iter().map(|s| s.cost_usd).sum();
        assert!((summed - query.total_cost_usd).abs() < 1e-12);
        assert_eq!(query.total_input_tokens, 250);
        assert_eq!(query.total_output_tokens, 60);
        assert!((query.total_cost_usd - 310.0 * 0.00001).abs() < 1e-12);
    }

    #[test]
    fn test_missing_usage_is_zero() {
        let mut ledger = CostLedger::default();
        ledger.start_query("q").unwrap();
        let step = ledger.log_completion(1, "m", None, false).unwrap();
        assert_eq!(step.input_tokens, 0);
        assert_eq!(step.cost_usd, 0.0);
    }

    #[test]
    fn test_start_while_open_is_misuse() {
        let mut ledger = CostLedger::default();
        ledger.start_query("first").unwrap();
        let err = ledger.start_query("second").unwrap_err();
        assert_eq!(
            err,
            CostLedgerError::Misuse {
                open: "first".to_string()
            }
        );
        assert_eq!(ledger.current().unwrap().query, "first");
    }

    #[test]
    fn test_log_without_query_fails() {
        let mut ledger = CostLedger::default();
        let err = ledger.log_completion(1, "m", None, false).unwrap_err();
        assert_eq!(err, CostLedgerError::NoOpenQuery { step_number: 1 });
    }

    #[test]
    fn test_closed_queries_retained_in_order() {
        let mut ledger = CostLedger::default();
        for q in ["a", "b"] {
            ledger.start_query(q).unwrap();
            ledger
                .log_completion(1, "m", Some(TokenUsage::new(10, 0)), false)
                .unwrap();
            ledger.end_query();
        }
        let names: Vec<&str> = ledger.queries().iter().map(|q| q.query.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(ledger.end_query().is_none());
        assert!((ledger.total_cost_usd() - 20.0 * 0.00001).abs() < 1e-12);
    }

    #[test]
    fn test_table_prices_are_used() {
        let table = PriceTable::default().with_model("gpt-4o", ModelPrice::new(2.5, 10.0));
        let mut ledger = CostLedger::new(Arc::new(table));
        ledger.start_query("q").unwrap();
        let step = ledger
            .log_completion(1, "gpt-4o", Some(TokenUsage::new(1_000_000, 0)), false)
            .unwrap();
        assert!((step.cost_usd - 2.5).abs() < 1e-9);
    }
}
