//! Specialist agent profiles.
//!
//! A specialist is a pre-configured agent: a system prompt, a tool category
//! and a step ceiling. The pipeline runs them in the order returned by
//! [`default_pipeline`].

/// Static description of one specialist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistProfile {
    pub name: &'static str,
    pub max_steps: usize,
    pub category: &'static str,
    pub system_prompt: &'static str,
}

pub const RESEARCHER: SpecialistProfile = SpecialistProfile {
    name: "Researcher",
    max_steps: 15,
    category: "research",
    system_prompt: "You are a world-class researcher. Your task is to find and extract relevant \
                    information to answer the user's query. Use the available tools to search, \
                    retrieve, and analyze data. Always provide clear reasoning for your actions.",
};

pub const ANALYST: SpecialistProfile = SpecialistProfile {
    name: "Analyst",
    max_steps: 20,
    category: "analysis",
    system_prompt: "You are a skilled analyst. Your task is to evaluate information, \
                    cross-reference sources, and identify patterns to provide insights. Use the \
                    available tools to analyze data and support your conclusions with clear \
                    reasoning.",
};

pub const WRITER: SpecialistProfile = SpecialistProfile {
    name: "Writer",
    max_steps: 4,
    category: "writing",
    system_prompt: "You are a talented writer. Your task is to synthesize information and \
                    analysis into polished, readable output. Use the available tools to enhance \
                    your writing and ensure clarity and coherence in your final response.",
};

/// Researcher, then analyst, then writer.
pub fn default_pipeline() -> Vec<SpecialistProfile> {
    vec![RESEARCHER, ANALYST, WRITER]
}

impl SpecialistProfile {
    /// Derive an agent config from `base`, overriding name, prompt, step
    /// ceiling and tool category. Model, token limit, permissions and loop
    /// thresholds are inherited.
    pub fn agent_config(&self, base: &super::AgentConfig) -> super::AgentConfig {
        base.clone()
            .with_agent_name(self.name)
            .with_system_prompt(self.system_prompt)
            .with_max_steps(self.max_steps)
            .with_tool_categories([self.category])
    }
}
