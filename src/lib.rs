//! # A11y Checklist
//!
//! 用 LLM 按无障碍检查清单逐条评估网页，并生成一份报告和一个 Playwright 回归测试脚本
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 连接已打开的浏览器或启动新浏览器
//! - `infrastructure/` - `JsExecutor`，唯一的 page owner，提供 eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `Oracle` / `LlmService` - 推理服务（一次请求 → 一段文本）
//! - `SnapshotService` - 页面快照（HTML、无障碍树、截图）
//! - `RuleHighlighter` - 规则高亮（调试辅助）
//! - `TestWriter` - 写测试脚本
//!
//! ### ③ 流程层（Workflow / Report）
//! - `workflow::RuleFlow` - 单条规则的评估流程
//! - `workflow::prompt` - 提示词构建
//! - `report` - 章节提取和报告/测试合并（纯函数）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::RuleEvaluator` - 并发分发、按顺序汇总
//! - `orchestrator::App` - 浏览器 → 快照 → 评估

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, EvaluationMode, FailurePolicy};
pub use error::{AppError, AppResult, ConfigError, OracleError};
pub use infrastructure::JsExecutor;
pub use models::{MergedOutput, PageContext, Rule, RuleOutcome, RuleSet, VisualSnapshot};
pub use orchestrator::{App, EvaluationOptions, EvaluationRun, RuleEvaluator, Target};
pub use services::{LlmService, Oracle, OracleRequest};
pub use workflow::RuleFlow;
