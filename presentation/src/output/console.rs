//! Console output formatter for agent runs

use colored::Colorize;
use warden_application::{RunAgentOutput, RunPipelineOutput};
use warden_domain::{QueryCost, Termination, Trace, TraceStatus, format_cost};

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Answer, cost breakdown and trace summary of one run
    pub fn format(output: &RunAgentOutput, trace: Option<&Trace>) -> String {
        let mut out = String::new();

        out.push_str(&Self::header(&format!("Agent: {}", output.agent_name)));
        out.push('\n');
        out.push_str(&format!("{} {}\n", "Query:".cyan().bold(), output.query));

        out.push_str(&Self::section_header("Answer"));
        out.push_str(&Self::answer(output));
        out.push('\n');

        if let Some(cost) = &output.cost {
            out.push_str(&Self::section_header("Cost"));
            out.push_str(&Self::format_cost_breakdown(cost));
        }

        if let Some(trace) = trace {
            out.push_str(&Self::section_header("Trace"));
            out.push_str(&Self::format_trace_summary(trace));
        }

        out.push_str(&Self::footer());
        out
    }

    /// Every stage of a pipeline run, then the final answer and total cost
    pub fn format_pipeline(output: &RunPipelineOutput, traces: &[Trace]) -> String {
        let mut out = String::new();

        for (i, stage) in output.stages.iter().enumerate() {
            let trace = traces.iter().find(|t| t.id == stage.trace_id);
            out.push_str(&format!(
                "{}\n",
                format!("Stage {}/{}", i + 1, output.stages.len())
                    .dimmed()
            ));
            out.push_str(&Self::format(stage, trace));
            out.push('\n');
        }

        out.push_str(&Self::header("Pipeline Result"));
        out.push('\n');
        out.push_str(&output.final_answer);
        out.push_str("\n\n");
        out.push_str(&format!(
            "{} {}   {} {}ms\n",
            "Total cost:".cyan().bold(),
            format_cost(output.total_cost_usd()),
            "Total time:".cyan().bold(),
            output.total_duration_ms
        ));

        out
    }

    /// Answer text only (for `--quiet`)
    pub fn format_answer_only(output: &RunAgentOutput) -> String {
        format!("{}\n", output.answer)
    }

    /// Format as JSON
    pub fn format_json(output: &RunAgentOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_pipeline_json(output: &RunPipelineOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line per step, then the query total
    pub fn format_cost_breakdown(cost: &QueryCost) -> String {
        let mut out = String::new();

        for step in &cost.steps {
            let marker = if step.is_tool_call {
                " [tool call]".yellow().to_string()
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  step {:>2}  {}  in {:>6}  out {:>6}  {}{}\n",
                step.step_number,
                step.model_id,
                step.input_tokens,
                step.output_tokens,
                format_cost(step.cost_usd),
                marker
            ));
        }

        out.push_str(&format!(
            "  {} {} ({} in / {} out tokens)\n",
            "Total:".bold(),
            format_cost(cost.total_cost_usd),
            cost.total_input_tokens,
            cost.total_output_tokens
        ));
        out
    }

    pub fn format_trace_summary(trace: &Trace) -> String {
        let status = match trace.status {
            TraceStatus::Completed => trace.status.as_str().green(),
            TraceStatus::Error => trace.status.as_str().red(),
            TraceStatus::Running => trace.status.as_str().yellow(),
        };
        let duration = trace
            .duration_ms()
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());

        let mut out = format!(
            "  {} {}\n  {} {} ({} tool calls)\n  {} {}\n  {} {}\n",
            "Status:".bold(),
            status,
            "Steps:".bold(),
            trace.steps.len(),
            trace.tool_call_count(),
            "Duration:".bold(),
            duration,
            "Trace id:".bold(),
            trace.id
        );
        if let Some(error) = &trace.error {
            out.push_str(&format!("  {} {}\n", "Error:".red().bold(), error));
        }
        out
    }

    fn answer(output: &RunAgentOutput) -> String {
        match output.termination {
            Termination::Answer if output.loop_detected => output.answer.yellow().to_string(),
            Termination::Answer => output.answer.clone(),
            Termination::MaxSteps => output.answer.yellow().to_string(),
            Termination::Error => format!(
                "{}\n{}",
                output.answer,
                output.error.as_deref().unwrap_or("unknown error").red()
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
