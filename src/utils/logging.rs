/// 日志工具模块
///
/// 提供日志初始化、运行日志文件和输出辅助函数
use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::OutcomeStatus;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 `debug` 或 `info`
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `url`: 被评估的页面
pub fn init_log_file(log_file_path: &str, url: &str) -> Result<()> {
    let log_header = format!(
        "{}\n无障碍评估日志 - {}\n页面: {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        url,
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 把每个章节的评估状态追加到运行日志
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `statuses`: 章节标题和状态，按报告顺序
pub fn append_outcomes(log_file_path: &str, statuses: &[(String, OutcomeStatus)]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    writeln!(
        file,
        "评估结果 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    for (heading, status) in statuses {
        let line = match status {
            OutcomeStatus::Answered => "已返回".to_string(),
            OutcomeStatus::Empty => "无内容（占位）".to_string(),
            OutcomeStatus::Failed(reason) => format!("失败（占位）: {}", reason),
        };
        writeln!(file, "{} | {}", heading, line)?;
    }
    writeln!(file, "{}", "-".repeat(60))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(rule_count: usize, model: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 无障碍清单评估");
    info!("📋 规则数量: {}", rule_count);
    info!("🤖 模型: {}", model);
    if max_concurrent == 0 {
        info!("📊 最大并发数: 不限制");
    } else {
        info!("📊 最大并发数: {}", max_concurrent);
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `answered`: 模型正常返回的规则数
/// - `tests`: 提取到测试代码的规则数
/// - `total`: 规则总数
pub fn print_final_stats(answered: usize, tests: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评估完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 模型返回: {}/{}", answered, total);
    info!("🧪 生成测试: {}/{}", tests, total);
    info!("{}", "=".repeat(60));
}

/// 按字符数截断文本（不追加省略号），用于限制发送给模型的内容
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
