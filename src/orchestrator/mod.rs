//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `evaluation` - 规则评估编排器
//! - 每条规则一次调用，并发发出
//! - 按输入顺序汇总结果
//! - 交给报告合并器
//!
//! ### `app` - 应用主流程
//! - 管理浏览器资源（Browser、JsExecutor）
//! - 高亮、快照、评估
//! - 输出统计信息
//!
//! ## 层次关系
//!
//! ```text
//! app (浏览器 + 快照)
//!     ↓
//! evaluation::RuleEvaluator (Vec<Rule>，并发)
//!     ↓
//! workflow::RuleFlow (单条 Rule)
//!     ↓
//! services (能力层：oracle / snapshot / highlighter)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```

pub mod app;
pub mod evaluation;

pub use app::{App, Target};
pub use evaluation::{EvaluationOptions, EvaluationRun, RuleEvaluator};
