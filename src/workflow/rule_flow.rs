//! 规则评估流程 - 流程层
//!
//! 核心职责：定义"一条规则"的完整评估流程
//!
//! 流程顺序：
//! 1. 构建提示词（只含这一条规则的条款）
//! 2. 调用推理服务（附带截图）
//! 3. 空响应 → 占位；调用失败或超时 → 按失败策略处理

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::FailurePolicy;
use crate::error::OracleError;
use crate::models::{ChecklistOutcome, OutcomeStatus, PageContext, Rule, RuleOutcome};
use crate::services::oracle::{Oracle, OracleRequest};
use crate::workflow::prompt::{build_checklist_prompt, build_rule_prompt, PromptLimits};

/// 规则评估流程
///
/// - 每次调用都是独立的，不修改任何共享状态
/// - 不决定规则的执行顺序和并发方式
pub struct RuleFlow<O: Oracle> {
    oracle: O,
    model: String,
    limits: PromptLimits,
    failure_policy: FailurePolicy,
    /// 单次调用的总时限
    timeout: Duration,
}

/// 未设置时限时使用的默认值
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(300);

impl<O: Oracle> RuleFlow<O> {
    /// 创建新的评估流程
    pub fn new(
        oracle: O,
        model: impl Into<String>,
        limits: PromptLimits,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            oracle,
            model: model.into(),
            limits,
            failure_policy,
            timeout: DEFAULT_INVOCATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// 评估一条规则
    ///
    /// 在 `FailurePolicy::Placeholder` 下永远返回 `Ok`。
    pub async fn run(&self, rule: &Rule, ctx: &PageContext) -> Result<RuleOutcome, OracleError> {
        debug!("{} 构建提示词", rule);
        let request = self.request(build_rule_prompt(rule, ctx, self.limits), ctx);

        match self.invoke(request).await {
            Ok(Some(text)) => {
                info!("{} ✓ 模型已返回 ({} 字符)", rule, text.len());
                Ok(RuleOutcome::answered(*rule, text))
            }
            Ok(None) => {
                warn!("{} ⚠️ 模型没有返回内容，使用占位结果", rule);
                Ok(RuleOutcome::empty(*rule))
            }
            Err(e) => match self.failure_policy {
                FailurePolicy::Placeholder => {
                    error!("{} ❌ 评估失败，使用占位结果: {}", rule, e);
                    Ok(RuleOutcome::failed(*rule, e.to_string()))
                }
                FailurePolicy::FailBatch => {
                    error!("{} ❌ 评估失败: {}", rule, e);
                    Err(OracleError::RuleFailed {
                        rule_id: rule.id,
                        source: Box::new(e),
                    })
                }
            },
        }
    }

    /// 合并模式：一次请求评估整份清单
    pub async fn run_checklist(
        &self,
        rules: &[Rule],
        ctx: &PageContext,
    ) -> Result<ChecklistOutcome, OracleError> {
        let request = self.request(build_checklist_prompt(rules, ctx, self.limits), ctx);
        let rules = rules.to_vec();

        match self.invoke(request).await {
            Ok(Some(response)) => Ok(ChecklistOutcome {
                rules,
                response,
                status: OutcomeStatus::Answered,
            }),
            Ok(None) => {
                warn!("⚠️ 模型没有返回内容，使用占位结果");
                Ok(ChecklistOutcome {
                    rules,
                    response: crate::models::NO_EVALUATION_PRODUCED.to_string(),
                    status: OutcomeStatus::Empty,
                })
            }
            Err(e) if self.failure_policy == FailurePolicy::Placeholder => {
                error!("❌ 清单评估失败，使用占位结果: {}", e);
                Ok(ChecklistOutcome {
                    rules,
                    response: crate::models::NO_EVALUATION_PRODUCED.to_string(),
                    status: OutcomeStatus::Failed(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// 超过时限的调用视为失败
    async fn invoke(&self, request: OracleRequest) -> Result<Option<String>, OracleError> {
        match timeout(self.timeout, self.oracle.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    fn request(&self, prompt: String, ctx: &PageContext) -> OracleRequest {
        OracleRequest {
            model: self.model.clone(),
            prompt,
            image: ctx.visual_snapshot.clone(),
        }
    }
}
