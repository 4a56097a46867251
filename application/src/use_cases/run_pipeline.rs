//! Run Pipeline use case
//!
//! Sequential hand-off between specialist agents: each stage's answer is
//! the next stage's query. All stages share the transport, tool registry,
//! tracer and trace sink; each has its own cost ledger and loop detector.
//! A stage that ends in `Terminated(Error)` stops the pipeline.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};
use warden_domain::{ExecutionTracer, PriceLookup, PriceTable, Termination};

use crate::config::{AgentConfig, SpecialistProfile, default_pipeline};
use crate::ports::completion::CompletionTransport;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::trace_sink::{NoTraceSink, TraceSink};
use crate::use_cases::run_agent::{AgentLoop, RunAgentOutput};

/// Output of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunPipelineOutput {
    /// One entry per stage that ran, in order.
    pub stages: Vec<RunAgentOutput>,
    pub final_answer: String,
    pub total_duration_ms: u64,
}

impl RunPipelineOutput {
    pub fn total_cost_usd(&self) -> f64 {
        self.stages
            .iter()
            .filter_map(|s| s.cost.as_ref())
            .map(|c| c.total_cost_usd)
            .sum()
    }

    /// Whether every configured stage ran to an answer.
    pub fn completed(&self, stage_count: usize) -> bool {
        self.stages.len() == stage_count
            && self
                .stages
                .iter()
                .all(|s| s.termination != Termination::Error)
    }
}

pub struct RunPipelineUseCase<T: CompletionTransport + 'static, E: ToolExecutorPort + 'static> {
    transport: Arc<T>,
    tools: Arc<E>,
    tracer: Arc<ExecutionTracer>,
    trace_sink: Arc<dyn TraceSink>,
    prices: Arc<dyn PriceLookup>,
    base: AgentConfig,
    profiles: Vec<SpecialistProfile>,
}

impl<T: CompletionTransport + 'static, E: ToolExecutorPort + 'static> RunPipelineUseCase<T, E> {
    /// Researcher, analyst and writer, derived from `base`.
    pub fn new(
        transport: Arc<T>,
        tools: Arc<E>,
        tracer: Arc<ExecutionTracer>,
        base: AgentConfig,
    ) -> Self {
        Self {
            transport,
            tools,
            tracer,
            trace_sink: Arc::new(NoTraceSink),
            prices: Arc::new(PriceTable::default()),
            base,
            profiles: default_pipeline(),
        }
    }

    pub fn with_profiles(mut self, profiles: Vec<SpecialistProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_prices(mut self, prices: Arc<dyn PriceLookup>) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = sink;
        self
    }

    pub fn profiles(&self) -> &[SpecialistProfile] {
        &self.profiles
    }

    pub async fn execute(&self, query: &str) -> RunPipelineOutput {
        let started = Instant::now();
        let mut stages = Vec::with_capacity(self.profiles.len());
        let mut input = query.to_string();

        for profile in &self.profiles {
            info!(stage = profile.name, "Pipeline stage started");

            let mut agent = AgentLoop::new(
                self.transport.clone(),
                self.tools.clone(),
                self.tracer.clone(),
                profile.agent_config(&self.base),
            )
            .with_prices(self.prices.clone())
            .with_trace_sink(self.trace_sink.clone());

            let output = agent.run(&input).await;
            let failed = output.termination == Termination::Error;
            input = output.answer.clone();
            stages.push(output);

            if failed {
                warn!(stage = profile.name, "Pipeline stopped after failed stage");
                break;
            }
        }

        RunPipelineOutput {
            stages,
            final_answer: input,
            total_duration_ms: u64::try_from(started.elapsed().as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ANALYST, RESEARCHER, WRITER};
    use crate::ports::completion::{CompletionRequest, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use warden_domain::{CompletionResponse, ToolArguments, ToolResult, ToolSchema};

    /// Echoes the last user message back, prefixed with the system prompt's
    /// first word, so hand-off order is observable.
    #[derive(Default)]
    struct EchoTransport {
        requests: Mutex<Vec<CompletionRequest>>,
        fail_on_call: Option<usize>,
    }

    #[async_trait]
    impl CompletionTransport for EchoTransport {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, TransportError> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            if self.fail_on_call == Some(requests.len()) {
                return Err(TransportError::Timeout { attempts: 3 });
            }

            let role = request.messages[0]
                .content_str()
                .split_whitespace()
                .nth(3)
                .unwrap_or("")
                .to_string();
            let query = request.messages[1].content_str();
            Ok(
                CompletionResponse::from_text(format!("{query} > {role}")).with_usage(5, 5),
            )
        }
    }

    struct NoTools;

    #[async_trait]
    impl ToolExecutorPort for NoTools {
        fn schemas(&self) -> Vec<ToolSchema> {
            Vec::new()
        }

        fn schemas_for_categories(&self, _categories: &[String]) -> Vec<ToolSchema> {
            Vec::new()
        }

        fn has_tool(&self, _name: &str) -> bool {
            false
        }

        async fn execute(&self, name: &str, _args: &ToolArguments) -> ToolResult {
            ToolResult::success(json!(name))
        }

        async fn execute_secure(
            &self,
            name: &str,
            _args: &ToolArguments,
            _granted: &[String],
        ) -> ToolResult {
            ToolResult::success(json!(name))
        }
    }

    #[tokio::test]
    async fn test_answers_are_handed_off_in_order() {
        let transport = Arc::new(EchoTransport::default());
        let tracer = Arc::new(ExecutionTracer::new());
        let pipeline = RunPipelineUseCase::new(
            transport.clone(),
            Arc::new(NoTools),
            tracer.clone(),
            AgentConfig::default(),
        );

        let output = pipeline.execute("topic").await;

        assert_eq!(output.stages.len(), 3);
        assert_eq!(
            output.final_answer,
            "topic > world-class > skilled > talented"
        );
        assert!(output.completed(3));
        assert!((output.total_cost_usd() - 30.0 * 0.00001).abs() < 1e-12);

        let names: Vec<String> = tracer.traces().into_iter().map(|t| t.agent_name).collect();
        assert_eq!(names, vec!["Researcher", "Analyst", "Writer"]);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[1].messages[1].content_str(), "topic > world-class");
    }

    #[tokio::test]
    async fn test_failed_stage_stops_pipeline() {
        let transport = Arc::new(EchoTransport {
            fail_on_call: Some(2),
            ..Default::default()
        });
        let pipeline = RunPipelineUseCase::new(
            transport,
            Arc::new(NoTools),
            Arc::new(ExecutionTracer::new()),
            AgentConfig::default(),
        );

        let output = pipeline.execute("topic").await;

        assert_eq!(output.stages.len(), 2);
        assert_eq!(output.stages[1].termination, Termination::Error);
        assert!(output.final_answer.starts_with("Agent failed: "));
        assert!(!output.completed(3));
    }

    #[tokio::test]
    async fn test_custom_profiles() {
        let pipeline = RunPipelineUseCase::new(
            Arc::new(EchoTransport::default()),
            Arc::new(NoTools),
            Arc::new(ExecutionTracer::new()),
            AgentConfig::default(),
        )
        .with_profiles(vec![WRITER, RESEARCHER]);

        assert_eq!(pipeline.profiles()[0], WRITER);
        assert_ne!(pipeline.profiles()[1], ANALYST);

        let output = pipeline.execute("x").await;
        assert_eq!(output.final_answer, "x > talented > world-class");
    }
}
