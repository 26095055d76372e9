//! 从模型响应中提取章节
//!
//! 提取永远不会失败：找不到标记时返回 `None`，由调用方写入占位内容。

use std::sync::LazyLock;

use regex::Regex;

use crate::report::markers::{CODE_FENCE_LANG, REPORT_MARKER, TEST_MARKER};

static REPORT_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){}[ \t]*\r?\n", regex::escape(REPORT_MARKER)))
        .expect("report marker pattern is valid")
});

static TEST_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){}", regex::escape(TEST_MARKER))).expect("test marker pattern is valid")
});

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s)```{}[ \t]*\r?\n(.*?)```",
        regex::escape(CODE_FENCE_LANG)
    ))
    .expect("code fence pattern is valid")
});

/// 提取评估说明：从报告标记到测试标记（或文本末尾）之间的内容
pub fn extract_report(response: &str) -> Option<String> {
    let start = REPORT_START.find(response)?.end();
    let rest = &response[start..];
    let end = TEST_START.find(rest).map(|m| m.start()).unwrap_or(rest.len());

    let report = rest[..end].trim();
    (!report.is_empty()).then(|| report.to_string())
}

/// 提取测试代码块
///
/// 优先取测试标记之后的第一个代码块，没有测试标记时在全文中查找。
pub fn extract_test_code(response: &str) -> Option<String> {
    let after_marker = TEST_START
        .find(response)
        .and_then(|m| first_code_block(&response[m.end()..]));

    after_marker.or_else(|| first_code_block(response))
}

fn first_code_block(text: &str) -> Option<String> {
    let code = CODE_FENCE.captures(text)?.get(1)?.as_str().trim();
    (!code.is_empty()).then(|| code.to_string())
}
