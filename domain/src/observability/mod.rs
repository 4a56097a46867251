//! Observability domain: cost accounting and execution traces.

pub mod cost;
pub mod pricing;
pub mod tracer;

pub use cost::{CostLedger, CostLedgerError, QueryCost, StepCost};
pub use pricing::{DEFAULT_FALLBACK_PER_TOKEN_USD, ModelPrice, PriceLookup, PriceTable, format_cost};
pub use tracer::{ExecutionTracer, Trace, TraceId, TraceOutcome, TraceStatus};
