//! Run Agent use case
//!
//! Drives one agent through the reasoning/acting state machine:
//!
//! ```text
//! Idle ─▶ Reasoning ─┬─▶ Terminated(Answer)      text, no tool calls
//!            ▲       │
//!            │       ▼
//!            └── ToolDispatch ─▶ Terminated(Answer)   loop detected
//!
//! step == max_steps without answer ─▶ Terminated(MaxSteps)
//! transport or ledger fault        ─▶ Terminated(Error)
//! ```
//!
//! Every tool call goes through the loop detector, then the executor's
//! permission and rate-limit gate. Every completion is priced in the cost
//! ledger and every step is appended to the shared tracer.

mod types;

pub use types::{MAX_STEPS_MESSAGE, RunAgentError, RunAgentOutput};

use types::{Finish, RunProgress};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, warn};
use warden_domain::{
    AgentPhase, AgentStep, CostLedger, ExecutionTracer, LoopDetector, Message, PriceLookup,
    Termination, ToolCall, ToolCallRecord, ToolError, ToolResult, ToolSchema, TraceId,
    TraceOutcome, session::Conversation,
};

use crate::config::AgentConfig;
use crate::ports::completion::{CompletionRequest, CompletionTransport};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::trace_sink::{NoTraceSink, TraceEvent, TraceSink};

/// One agent: its config, cost ledger and loop detector, plus shared
/// handles to the transport, tools, tracer and trace sink.
pub struct AgentLoop<T: CompletionTransport + 'static, E: ToolExecutorPort + 'static> {
    transport: Arc<T>,
    tools: Arc<E>,
    tracer: Arc<ExecutionTracer>,
    trace_sink: Arc<dyn TraceSink>,
    config: AgentConfig,
    ledger: CostLedger,
    detector: LoopDetector,
    phase: AgentPhase,
}

impl<T: CompletionTransport + 'static, E: ToolExecutorPort + 'static> AgentLoop<T, E> {
    pub fn new(
        transport: Arc<T>,
        tools: Arc<E>,
        tracer: Arc<ExecutionTracer>,
        config: AgentConfig,
    ) -> Self {
        let detector = LoopDetector::new(config.loop_detection.clone());
        Self {
            transport,
            tools,
            tracer,
            trace_sink: Arc::new(NoTraceSink),
            config,
            ledger: CostLedger::default(),
            detector,
            phase: AgentPhase::Idle,
        }
    }

    /// Price completions with `prices` instead of the flat fallback rate.
    pub fn with_prices(mut self, prices: Arc<dyn PriceLookup>) -> Self {
        self.ledger = CostLedger::new(prices);
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = sink;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// Cost records of every run so far.
    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    /// Run the agent on `query` until it terminates.
    ///
    /// Never fails: faults are reported through
    /// [`RunAgentOutput::termination`] and [`RunAgentOutput::error`].
    pub async fn run(&mut self, query: &str) -> RunAgentOutput {
        let started = Instant::now();
        self.phase = AgentPhase::Idle;
        self.detector.reset();

        let trace_id = self
            .tracer
            .start_trace(&self.config.agent_name, query, &self.config.model);
        self.trace_sink.record(TraceEvent::new(
            "trace_started",
            json!({
                "trace_id": trace_id,
                "agent": self.config.agent_name,
                "query": query,
                "model": self.config.model,
            }),
        ));
        info!(
            agent = %self.config.agent_name,
            trace_id = %trace_id,
            max_steps = self.config.max_steps,
            "Agent run started"
        );

        let mut progress = RunProgress::default();
        let (result, query_opened) = match self.ledger.start_query(query) {
            Ok(()) => (self.drive(query, &trace_id, &mut progress).await, true),
            Err(e) => (Err(RunAgentError::from(e)), false),
        };

        let (answer, termination, error) = match result {
            Ok(Finish::Answer(answer)) => (answer, Termination::Answer, None),
            Ok(Finish::MaxSteps) => (MAX_STEPS_MESSAGE.to_string(), Termination::MaxSteps, None),
            Err(e) => {
                warn!(agent = %self.config.agent_name, error = %e, "Agent run failed");
                (format!("Agent failed: {e}"), Termination::Error, Some(e.to_string()))
            }
        };
        self.transition(AgentPhase::Terminated(termination));

        let outcome = match &error {
            None => TraceOutcome::Completed {
                output: answer.clone(),
            },
            Some(error) => TraceOutcome::Error {
                output: answer.clone(),
                error: error.clone(),
            },
        };
        let status = outcome.status();
        self.tracer.end_trace(&trace_id, outcome);

        let cost = if query_opened {
            self.ledger.end_query()
        } else {
            None
        };

        self.trace_sink.record(TraceEvent::new(
            "trace_ended",
            json!({
                "trace_id": trace_id,
                "agent": self.config.agent_name,
                "status": status.as_str(),
                "termination": termination.as_str(),
                "steps": progress.steps,
                "loop_detected": progress.loop_detected,
                "answer": answer,
                "error": error,
                "cost_usd": cost.as_ref().map(|c| c.total_cost_usd),
            }),
        ));
        info!(
            agent = %self.config.agent_name,
            trace_id = %trace_id,
            termination = termination.as_str(),
            steps = progress.steps,
            "Agent run finished"
        );

        RunAgentOutput {
            agent_name: self.config.agent_name.clone(),
            query: query.to_string(),
            answer,
            termination,
            steps: progress.steps,
            trace_id,
            loop_detected: progress.loop_detected,
            error,
            cost,
            duration_ms: elapsed_ms(started),
        }
    }

    async fn drive(
        &mut self,
        query: &str,
        trace_id: &TraceId,
        progress: &mut RunProgress,
    ) -> Result<Finish, RunAgentError> {
        let mut conversation = Conversation::new(self.config.system_prompt.as_deref(), query);
        let schemas = self.offered_schemas();
        let offered: Option<HashSet<String>> = self
            .config
            .tool_categories
            .as_ref()
            .map(|_| schemas.iter().map(|s| s.name.clone()).collect());

        for step_number in 1..=self.config.max_steps {
            progress.steps = step_number;
            self.transition(AgentPhase::Reasoning);
            let step_started = Instant::now();

            let request =
                CompletionRequest::new(&self.config.model, conversation.messages().to_vec())
                    .with_tools(schemas.clone())
                    .with_max_tokens(self.config.max_tokens);
            let response = self.transport.complete(request).await?;

            let model_id = if response.model.is_empty() {
                self.config.model.as_str()
            } else {
                response.model.as_str()
            };
            self.ledger.log_completion(
                step_number,
                model_id,
                response.usage,
                response.has_tool_calls(),
            )?;

            if !response.has_tool_calls() {
                let check = self.detector.check_output_stagnation(&response.text);
                let answer = match check.message {
                    Some(message) if check.is_looping => {
                        warn!(
                            agent = %self.config.agent_name,
                            step = step_number,
                            "Output stagnation detected"
                        );
                        progress.loop_detected = true;
                        message
                    }
                    _ => response.text.clone(),
                };

                let step = AgentStep::new(step_number, response.text)
                    .with_duration_ms(elapsed_ms(step_started));
                self.record_step(trace_id, step);
                return Ok(Finish::Answer(answer));
            }

            self.transition(AgentPhase::ToolDispatch);
            self.detector.record_output(&response.text);
            conversation.push(Message::assistant_with_tool_calls(
                response.text.clone(),
                response.tool_calls.clone(),
            ));

            let mut step = AgentStep::new(step_number, response.text.clone());
            let mut final_answer = None;

            for call in &response.tool_calls {
                let check = self.detector.check_tool_call(&call.name, &call.arguments);
                if check.is_looping {
                    warn!(
                        agent = %self.config.agent_name,
                        step = step_number,
                        tool = %call.name,
                        "Tool call loop detected"
                    );
                    progress.loop_detected = true;
                    final_answer = check.message;
                    break;
                }

                let record = self.dispatch(call, offered.as_ref()).await;
                conversation.push(Message::tool(&call.id, &call.name, &record.output));
                step = step.with_tool_call(record);
            }

            let step = step.with_duration_ms(elapsed_ms(step_started));
            self.record_step(trace_id, step);

            if let Some(answer) = final_answer {
                return Ok(Finish::Answer(answer));
            }
        }

        Ok(Finish::MaxSteps)
    }

    /// Execute one tool call and turn the result into an observation.
    async fn dispatch(&self, call: &ToolCall, offered: Option<&HashSet<String>>) -> ToolCallRecord {
        let started = Instant::now();

        let result = if offered.is_some_and(|names| !names.contains(&call.name)) {
            ToolResult::failure(&ToolError::not_found(&call.name))
        } else {
            match call.parse_arguments() {
                Ok(args) => {
                    self.tools
                        .execute_secure(&call.name, &args, &self.config.granted_permissions)
                        .await
                }
                Err(e) => ToolResult::failure(&e),
            }
        };

        debug!(
            tool = %call.name,
            call_id = %call.id,
            success = result.success,
            "Tool call dispatched"
        );

        ToolCallRecord {
            tool_name: call.name.clone(),
            call_id: call.id.clone(),
            arguments: ToolCallRecord::arguments_from_raw(&call.arguments),
            output: result.to_observation(),
            success: result.success,
            duration_ms: elapsed_ms(started),
        }
    }

    fn offered_schemas(&self) -> Vec<ToolSchema> {
        match &self.config.tool_categories {
            Some(categories) => self.tools.schemas_for_categories(categories),
            None => self.tools.schemas(),
        }
    }

    fn record_step(&self, trace_id: &TraceId, step: AgentStep) {
        debug!(
            agent = %self.config.agent_name,
            step = step.step_number,
            tool_calls = step.tool_calls.len(),
            duration_ms = step.duration_ms,
            "Step completed"
        );
        let payload = json!({ "trace_id": trace_id, "step": step });
        if self.tracer.log_step(trace_id, step) {
            self.trace_sink.record(TraceEvent::new("step_logged", payload));
        }
    }

    fn transition(&mut self, next: AgentPhase) {
        if !self.phase.can_transition_to(&next) {
            warn!(from = self.phase.as_str(), to = next.as_str(), "Unexpected phase transition");
        }
        self.phase = next;
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
