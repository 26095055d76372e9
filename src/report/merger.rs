//! 报告/测试合并器
//!
//! 把按规则顺序排列的评估结果合并为一份报告和一个测试脚本。
//! 输出只取决于输入的结果和规则元信息，与完成顺序、耗时无关。

use tracing::warn;

use crate::models::{ChecklistOutcome, MergedOutput, RuleOutcome};
use crate::report::extract::{extract_report, extract_test_code};

/// 报告标题
pub const REPORT_TITLE: &str = "## Integrated Accessibility Evaluation Report";

/// 没有提取到评估说明时的占位文本
pub const NO_REPORT_PLACEHOLDER: &str = "No specific report generated for this rule.";

/// 测试套件名称
pub const SUITE_NAME: &str = "Accessibility Requirements";

/// 测试代码缩进单位
const INDENT: &str = "  ";

/// 合并每条规则的评估结果
///
/// `outcomes` 的顺序即输出顺序，每条规则恰好一个报告标题。
pub fn merge(url: &str, outcomes: &[RuleOutcome]) -> MergedOutput {
    let sections: Vec<(String, &str)> = outcomes
        .iter()
        .map(|outcome| (outcome.rule.heading(), outcome.response.as_str()))
        .collect();
    merge_sections(url, &sections)
}

/// 合并模式：整份清单只有一个章节
pub fn merge_checklist(url: &str, outcome: &ChecklistOutcome) -> MergedOutput {
    merge_sections(url, &[(outcome.heading(), outcome.response.as_str())])
}

fn merge_sections(url: &str, sections: &[(String, &str)]) -> MergedOutput {
    let mut report = format!("{}\n\n", REPORT_TITLE);
    let mut body = String::new();
    let mut tests_extracted = 0;

    for (heading, response) in sections {
        report.push_str(&format!("### {}\n", heading));
        match extract_report(response) {
            Some(section) => {
                report.push_str(&section);
                report.push_str("\n\n");
            }
            None => {
                warn!("⚠️ {} 没有找到评估说明，使用占位文本", heading);
                report.push_str(NO_REPORT_PLACEHOLDER);
                report.push_str("\n\n");
            }
        }

        match extract_test_code(response) {
            Some(code) => {
                tests_extracted += 1;
                body.push_str(&format!("{}// Test cases for {}\n", INDENT, heading));
                body.push_str(&indent_block(&code));
                body.push_str("\n\n");
            }
            None => {
                warn!("⚠️ {} 没有找到测试代码", heading);
                body.push_str(&format!("{}// No test generated for {}\n\n", INDENT, heading));
            }
        }
    }

    MergedOutput {
        combined_report: report,
        combined_test_script: wrap_suite(url, &body),
        tests_extracted,
    }
}

/// 每行缩进一个单位，空行保持为空
fn indent_block(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 套件外壳：导入语句 + describe + 唯一的 beforeEach 导航
fn wrap_suite(url: &str, body: &str) -> String {
    let quoted_url = serde_json::to_string(url).unwrap_or_else(|_| format!("\"{}\"", url));

    let mut script = String::from("import { test, expect } from '@playwright/test';\n\n");
    script.push_str(&format!("test.describe('{}', () => {{\n", SUITE_NAME));
    script.push_str(&format!("{}test.beforeEach(async ({{ page }}) => {{\n", INDENT));
    script.push_str(&format!("{}{}await page.goto({});\n", INDENT, INDENT, quoted_url));
    script.push_str(&format!("{}}});\n\n", INDENT));
    script.push_str(body);
    script.push_str("});\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rule, REFERENCE_RULES};

    fn response(report: &str, test_name: &str) -> String {
        format!(
            "## Evaluation Report\n{}\n\n## Playwright Test\n```typescript\ntest('{}', async ({{ page }}) => {{\n  await expect(page).toHaveTitle(/.+/);\n}});\n```\n",
            report, test_name
        )
    }

    fn outcome(rule: Rule, text: String) -> RuleOutcome {
        RuleOutcome::answered(rule, text)
    }

    #[test]
    fn test_merge_well_formed() {
        let outcomes = vec![
            outcome(REFERENCE_RULES[0], response("Images ok.", "images")),
            outcome(REFERENCE_RULES[1], response("Headings ok.", "headings")),
        ];
        let merged = merge("https://example.com/", &outcomes);

        assert!(merged.combined_report.starts_with(REPORT_TITLE));
        assert!(merged
            .combined_report
            .contains("### Rule 1: Images missing alt attributes\nImages ok.\n\n"));
        assert!(merged
            .combined_report
            .contains("### Rule 2: Logical heading structure\nHeadings ok.\n\n"));

        let script = &merged.combined_test_script;
        assert!(script.starts_with("import { test, expect } from '@playwright/test';"));
        assert_eq!(script.matches("test.beforeEach").count(), 1);
        assert!(script.contains("    await page.goto(\"https://example.com/\");"));
        assert!(script.contains("  // Test cases for Rule 1: Images missing alt attributes\n  test('images'"));
        assert!(script.contains("    await expect(page).toHaveTitle(/.+/);"));
        assert!(script.ends_with("});\n"));
        assert_eq!(merged.tests_extracted, 2);
    }

    #[test]
    fn test_report_placeholder_when_marker_missing() {
        let outcomes = vec![outcome(REFERENCE_RULES[2], "I could not evaluate it.".to_string())];
        let merged = merge("https://example.com/", &outcomes);

        assert!(merged.combined_report.contains(&format!(
            "### Rule 3: Form labels\n{}\n\n",
            NO_REPORT_PLACEHOLDER
        )));
        assert!(merged
            .combined_test_script
            .contains("  // No test generated for Rule 3: Form labels\n"));
        assert!(!merged.combined_test_script.contains("Test cases for"));
        assert!(!merged.has_tests());
    }

    #[test]
    fn test_failed_outcome_keeps_heading() {
        let outcomes = vec![RuleOutcome::failed(REFERENCE_RULES[4], "timeout")];
        let merged = merge("https://example.com/", &outcomes);
        assert!(merged.combined_report.contains("### Rule 5: ARIA roles and attributes\n"));
        assert!(merged.combined_report.contains(NO_REPORT_PLACEHOLDER));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let outcomes = vec![
            outcome(REFERENCE_RULES[0], response("a", "a")),
            RuleOutcome::empty(REFERENCE_RULES[1]),
        ];
        assert_eq!(
            merge("https://example.com/", &outcomes),
            merge("https://example.com/", &outcomes)
        );
    }

    #[test]
    fn test_url_is_escaped() {
        let merged = merge("https://example.com/?q=\"x\"", &[]);
        assert!(merged
            .combined_test_script
            .contains(r#"await page.goto("https://example.com/?q=\"x\"");"#));
    }

    #[test]
    fn test_indent_block_keeps_blank_lines_empty() {
        assert_eq!(indent_block("a\n\n  b"), "  a\n\n    b");
    }

    #[test]
    fn test_merge_checklist_single_section() {
        let outcome = ChecklistOutcome {
            rules: REFERENCE_RULES[..3].to_vec(),
            response: response("All good.", "checklist"),
            status: crate::models::OutcomeStatus::Answered,
        };
        let merged = merge_checklist("https://example.com/", &outcome);
        assert!(merged
            .combined_report
            .contains("### Rules 1, 2, 3: Combined checklist\nAll good."));
        assert_eq!(merged.tests_extracted, 1);
    }

    #[test]
    fn test_markdown_rendering() {
        let merged = merge("https://example.com/", &[]);
        let markdown = merged.to_markdown();
        assert!(markdown.contains("\n\n## Playwright Test\n```typescript\nimport"));
        assert!(markdown.ends_with("\n```"));
    }
}
