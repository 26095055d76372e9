pub mod prompt;
pub mod rule_flow;

pub use prompt::{build_checklist_prompt, build_rule_prompt, PromptLimits};
pub use rule_flow::RuleFlow;
