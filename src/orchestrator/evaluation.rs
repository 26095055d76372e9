//! 规则评估编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发分发**：每条规则一次调用，同时发出（可选 Semaphore 限流）
//! 2. **按位置汇总**：`outcomes[i]` 永远对应 `rules[i]`，与完成顺序无关
//! 3. **合并输出**：把有序结果交给 `report::merge`
//!
//! 页面上下文只读地借给所有调用，不需要锁。

use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::{Config, EvaluationMode, FailurePolicy};
use crate::error::OracleError;
use crate::models::{MergedOutput, OutcomeStatus, PageContext, Rule, RuleOutcome};
use crate::report;
use crate::services::oracle::Oracle;
use crate::workflow::{PromptLimits, RuleFlow};

/// 评估选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub model: String,
    pub mode: EvaluationMode,
    pub failure_policy: FailurePolicy,
    pub limits: PromptLimits,
    /// 同时进行的调用数，0 表示不限制
    pub max_concurrent_rules: usize,
    /// 每次调用（含重试）的总时限
    pub invocation_timeout: Duration,
}

impl EvaluationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm_model_name.clone(),
            mode: config.evaluation_mode,
            failure_policy: config.failure_policy,
            limits: PromptLimits {
                html_max_chars: config.html_max_chars,
                aria_max_chars: config.aria_max_chars,
            },
            max_concurrent_rules: config.max_concurrent_rules,
            invocation_timeout: config.invocation_timeout(),
        }
    }
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 一次评估的结果
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    pub merged: MergedOutput,
    /// 模型正常返回的规则数（合并模式下为 0 或 1）
    pub answered: usize,
    /// 请求数
    pub requests: usize,
    /// 每个报告章节的标题和状态，按输出顺序
    pub statuses: Vec<(String, OutcomeStatus)>,
}

/// 规则评估编排器
pub struct RuleEvaluator<O: Oracle> {
    flow: RuleFlow<O>,
    mode: EvaluationMode,
    max_concurrent_rules: usize,
}

impl<O: Oracle> RuleEvaluator<O> {
    /// 创建编排器，推理服务作为显式依赖传入
    pub fn new(oracle: O, options: EvaluationOptions) -> Self {
        Self {
            flow: RuleFlow::new(oracle, options.model, options.limits, options.failure_policy)
                .with_timeout(options.invocation_timeout),
            mode: options.mode,
            max_concurrent_rules: options.max_concurrent_rules,
        }
    }

    pub fn oracle(&self) -> &O {
        self.flow.oracle()
    }

    /// 并发评估所有规则，结果按输入顺序返回
    ///
    /// 失败策略为 `FailBatch` 时，任一规则失败即整批失败，其余调用被放弃。
    pub async fn run_all(
        &self,
        rules: &[Rule],
        ctx: &PageContext,
    ) -> Result<Vec<RuleOutcome>, OracleError> {
        info!("📤 并发评估 {} 条规则", rules.len());

        let semaphore = (self.max_concurrent_rules > 0)
            .then(|| Semaphore::new(self.max_concurrent_rules));

        let evaluations = rules.iter().map(|rule| {
            let semaphore = semaphore.as_ref();
            async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };
                debug!("{} 开始评估", rule);
                self.flow.run(rule, ctx).await
            }
        });

        try_join_all(evaluations).await
    }

    /// 评估并合并为报告和测试脚本
    pub async fn evaluate(
        &self,
        rules: &[Rule],
        ctx: &PageContext,
    ) -> Result<EvaluationRun, OracleError> {
        match self.mode {
            EvaluationMode::PerRule => {
                let outcomes = self.run_all(rules, ctx).await?;
                let answered = outcomes.iter().filter(|o| o.is_answered()).count();
                Ok(EvaluationRun {
                    merged: report::merge(&ctx.url, &outcomes),
                    answered,
                    requests: outcomes.len(),
                    statuses: outcomes
                        .into_iter()
                        .map(|o| (o.rule.heading(), o.status))
                        .collect(),
                })
            }
            EvaluationMode::Combined => {
                info!("📤 合并模式：一次请求评估 {} 条规则", rules.len());
                let outcome = self.flow.run_checklist(rules, ctx).await?;
                Ok(EvaluationRun {
                    merged: report::merge_checklist(&ctx.url, &outcome),
                    answered: usize::from(outcome.status == OutcomeStatus::Answered),
                    requests: 1,
                    statuses: vec![(outcome.heading(), outcome.status)],
                })
            }
        }
    }
}
