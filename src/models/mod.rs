pub mod outcome;
pub mod page_context;
pub mod rule;

pub use outcome::{ChecklistOutcome, MergedOutput, OutcomeStatus, RuleOutcome, NO_EVALUATION_PRODUCED};
pub use page_context::{PageContext, VisualSnapshot};
pub use rule::{Rule, RuleSet, RuleSummary, REFERENCE_RULES};
