//! 单条规则的评估结果和合并后的输出

use crate::models::rule::Rule;

/// 模型没有返回文本时使用的占位响应
pub const NO_EVALUATION_PRODUCED: &str = "No evaluation produced.";

/// 评估状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// 模型返回了文本
    Answered,
    /// 模型返回为空，使用占位响应
    Empty,
    /// 调用失败，已转为占位响应
    Failed(String),
}

/// 一条规则的评估结果，按位置与规则一一对应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: Rule,
    pub response: String,
    pub status: OutcomeStatus,
}

impl RuleOutcome {
    /// 模型正常返回
    pub fn answered(rule: Rule, response: impl Into<String>) -> Self {
        Self {
            rule,
            response: response.into(),
            status: OutcomeStatus::Answered,
        }
    }

    /// 模型没有返回文本
    pub fn empty(rule: Rule) -> Self {
        Self {
            rule,
            response: NO_EVALUATION_PRODUCED.to_string(),
            status: OutcomeStatus::Empty,
        }
    }

    /// 调用失败
    pub fn failed(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            rule,
            response: NO_EVALUATION_PRODUCED.to_string(),
            status: OutcomeStatus::Failed(reason.into()),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.status == OutcomeStatus::Answered
    }
}

/// 合并模式下整份清单的评估结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistOutcome {
    pub rules: Vec<Rule>,
    pub response: String,
    pub status: OutcomeStatus,
}

impl ChecklistOutcome {
    /// 报告和测试脚本中使用的标题
    pub fn heading(&self) -> String {
        let ids = self
            .rules
            .iter()
            .map(|rule| rule.id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("Rules {}: Combined checklist", ids)
    }
}

/// 合并后的报告和测试脚本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedOutput {
    pub combined_report: String,
    pub combined_test_script: String,
    /// 提取到测试代码的规则数量
    pub tests_extracted: usize,
}

impl MergedOutput {
    /// 是否至少有一条规则生成了测试代码
    pub fn has_tests(&self) -> bool {
        self.tests_extracted > 0
    }

    /// 渲染为完整的 Markdown 文档（报告 + 测试脚本代码块）
    pub fn to_markdown(&self) -> String {
        format!(
            "{}\n\n## Playwright Test\n```typescript\n{}\n```",
            self.combined_report, self.combined_test_script
        )
    }
}
