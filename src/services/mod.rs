pub mod llm_service;
pub mod oracle;
pub mod rule_highlighter;
pub mod snapshot_service;
pub mod test_writer;

pub use llm_service::LlmService;
pub use oracle::{Oracle, OracleRequest};
pub use rule_highlighter::RuleHighlighter;
pub use snapshot_service::SnapshotService;
pub use test_writer::TestWriter;
