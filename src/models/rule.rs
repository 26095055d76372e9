//! 无障碍检查规则
//!
//! 每条规则都是一条不可变的记录：稳定的 ID、描述、元素选择器以及交给模型的检查条款。
//! 所有规则共用同一套调用流程（见 `workflow::RuleFlow`），规则本身不携带行为。

use std::fmt::Display;

use crate::error::ConfigError;

/// 单条检查规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// 稳定 ID（合并时作为关联键）
    pub id: u32,
    /// 简短描述
    pub description: &'static str,
    /// 元素选择器，只用于高亮，本 crate 不解析
    pub selector: &'static str,
    /// 原样交给模型的检查条款
    pub instruction: &'static str,
}

/// `Rule::describe` 的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSummary {
    pub id: u32,
    pub description: &'static str,
    pub selector: &'static str,
}

impl Rule {
    /// 规则的元信息（纯函数，无副作用）
    pub fn describe(&self) -> RuleSummary {
        RuleSummary {
            id: self.id,
            description: self.description,
            selector: self.selector,
        }
    }

    /// 报告和测试脚本中使用的标题
    pub fn heading(&self) -> String {
        format!("Rule {}: {}", self.id, self.description)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[规则 #{} {}]", self.id, self.description)
    }
}

/// 参考检查清单（Deque 无障碍清单的八个类别）
pub static REFERENCE_RULES: [Rule; 8] = [
    Rule {
        id: 1,
        description: "Images missing alt attributes",
        selector: "img",
        instruction: "1. Images: All `<img>` elements must have an `alt` attribute. Decorative images should have empty `alt=\"\"`.",
    },
    Rule {
        id: 2,
        description: "Logical heading structure",
        selector: "h1, h2, h3, h4, h5, h6",
        instruction: "2. Headings: The page must have a logical heading structure (H1 -> H2 -> H3) without skipping levels.",
    },
    Rule {
        id: 3,
        description: "Form labels",
        selector: "input, textarea, select",
        instruction: "3. Forms: Every form input must have an associated `<label>` or `aria-label`/`aria-labelledby`.",
    },
    Rule {
        id: 4,
        description: "Links and Buttons",
        selector: "a, button, [role=\"button\"], [role=\"link\"]",
        instruction: "4. Links and Buttons: Must be focusable, operable via Keyboard (Enter/Space), and have discernible text.",
    },
    Rule {
        id: 5,
        description: "ARIA roles and attributes",
        selector: "[aria-hidden], [role]",
        instruction: "5. ARIA: ARIA attributes must be valid, elements with ARIA roles must have required children/parents, and ARIA should only be used when native HTML elements fall short.",
    },
    Rule {
        id: 6,
        description: "Color Contrast",
        selector: "body, p, span, div",
        instruction: "6. Color Contrast: Text must have sufficient contrast (at least 4.5:1 for normal text). *Note: Approximate this based on your knowledge if exact computed styles are not fully provided, but point it out.*",
    },
    Rule {
        id: 7,
        description: "Page Title & Language",
        selector: "html, title",
        instruction: "7. Page Title & Language: The document must have a descriptive `<title>` and a valid `<html lang=\"en\">` attribute.",
    },
    Rule {
        id: 8,
        description: "Keyboard Navigation focus traps",
        selector: "a, button, input, select, textarea, [tabindex=\"0\"]",
        instruction: "8. Keyboard Navigation: Interactive elements must not trap focus and should have a visible focus indicator.",
    },
];

/// 有序的规则集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// 用任意规则创建规则集（保持传入顺序）
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// 参考检查清单
    pub fn reference() -> Self {
        Self::new(REFERENCE_RULES.to_vec())
    }

    /// 选择全部规则
    pub fn select_all(&self) -> RuleSet {
        self.clone()
    }

    /// 按 ID 查找规则
    ///
    /// 找不到时返回 `ConfigError::RuleNotFound`，调用方应在任何模型调用之前失败。
    pub fn select_by_id(&self, id: u32) -> Result<Rule, ConfigError> {
        self.rules
            .iter()
            .find(|rule| rule.id == id)
            .copied()
            .ok_or(ConfigError::RuleNotFound { id })
    }

    /// CLI 用的选择入口：`None` 表示全部规则，`Some(id)` 表示只运行一条
    pub fn select(&self, id: Option<u32>) -> Result<RuleSet, ConfigError> {
        match id {
            None => Ok(self.select_all()),
            Some(id) => Ok(RuleSet::new(vec![self.select_by_id(id)?])),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.rules.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::reference()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
