//! 提示词构建
//!
//! 每次请求只包含一条规则的检查条款（或在合并模式下包含整份清单），
//! 页面内容按字符数截断，响应必须包含两个固定章节。

use crate::models::{PageContext, Rule};
use crate::report::markers::{CODE_FENCE_LANG, REPORT_MARKER, TEST_MARKER};
use crate::utils::truncate_chars;

/// 页面内容长度上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub html_max_chars: usize,
    pub aria_max_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            html_max_chars: 150_000,
            aria_max_chars: 100_000,
        }
    }
}

const SYSTEM_CONTEXT: &str = "System Context: You are an expert accessibility evaluator using the Deque Accessibility Checklists as your primary reference.";

/// 单条规则的提示词
pub fn build_rule_prompt(rule: &Rule, ctx: &PageContext, limits: PromptLimits) -> String {
    format!(
        "\n{}\nEvaluate the provided web page representation against the following rule:\n\n{}\n\n{}{}",
        SYSTEM_CONTEXT,
        rule.instruction,
        page_section(ctx, limits),
        response_contract("this specific rule"),
    )
}

/// 合并模式：所有规则放进一份清单
pub fn build_checklist_prompt(rules: &[Rule], ctx: &PageContext, limits: PromptLimits) -> String {
    let checklist = rules
        .iter()
        .map(|rule| rule.instruction)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n{}\nEvaluate the provided web page representation against the following key Deque checklist categories:\n\n{}\n\n{}{}",
        SYSTEM_CONTEXT,
        checklist,
        page_section(ctx, limits),
        response_contract("these rules"),
    )
}

fn page_section(ctx: &PageContext, limits: PromptLimits) -> String {
    let screenshot_note = if ctx.visual_snapshot.is_some() {
        "A screenshot of the rendered page is attached.\n\n"
    } else {
        ""
    };

    format!(
        "Page URL: {}\n\n{}Page HTML Snapshot:\n```html\n{}\n```\n\nAccessibility Tree (JSON):\n```json\n{}\n```\n\n",
        ctx.url,
        screenshot_note,
        truncate_chars(&ctx.structural_snapshot, limits.html_max_chars),
        truncate_chars(&ctx.accessibility_representation, limits.aria_max_chars),
    )
}

fn response_contract(scope: &str) -> String {
    format!(
        r#"Provide two sections in your response:
1. "{report}": A markdown summary of any accessibility violations found related to {scope}, referencing specific elements or roles. Also note what passes if it's prominently accessible. If no elements match, state that clearly.
2. "{test}": One or more valid Playwright `test('...', async ({{ page }}) => {{ ... }})` blocks that cover regressions for the elements mentioned.

CRITICAL TEST REQUIREMENTS:
- DO NOT include `import` statements, `test.describe`, or `test.beforeEach` blocks. Only provide the `test(...)` blocks themselves.
- DO NOT generate generic assertions. Your locators (e.g. `page.locator('...')`) MUST specifically target the exact elements, IDs, classes, or text contents you found in the provided HTML snapshot and Accessibility Tree that relate to {scope}.
- If an element violates a rule, write an assertion that EXPECTS it to meet the rule (e.g. if an img lacks an alt, write `await expect(page.locator('img.logo')).toHaveAttribute('alt', /.+/)` so the test will accurately fail until the user fixes their code).
- Wrap the TypeScript code in a single ```{lang} block.

Start your response now.
"#,
        report = REPORT_MARKER,
        test = TEST_MARKER,
        lang = CODE_FENCE_LANG,
        scope = scope,
    )
}
