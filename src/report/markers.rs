//! 模型响应格式约定
//!
//! 提示词要求的章节标记和提取用的正则都从这里取，两边不能分开修改。

/// 评估说明章节的标题
pub const REPORT_MARKER: &str = "## Evaluation Report";

/// 测试代码章节的标题
pub const TEST_MARKER: &str = "## Playwright Test";

/// 测试代码块的语言标记
pub const CODE_FENCE_LANG: &str = "typescript";
