//! 报告层：响应格式约定、章节提取、报告/测试合并

pub mod extract;
pub mod markers;
pub mod merger;

pub use extract::{extract_report, extract_test_code};
pub use merger::{merge, merge_checklist, NO_REPORT_PLACEHOLDER};
