//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 1. **启动前校验**：凭证、规则 ID 在打开浏览器和调用模型之前检查
//! 2. **资源管理**：连接或启动浏览器，持有 Browser 和 JsExecutor
//! 3. **调试辅助**：按需逐条高亮规则
//! 4. **快照**：采集一次页面上下文，供所有规则共享
//! 5. **评估**：委托 `RuleEvaluator` 并发评估并合并
//!
//! 不负责打印报告和写测试脚本，这些由命令行入口完成。

use std::time::Duration;

use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::JsExecutor;
use crate::models::RuleSet;
use crate::orchestrator::evaluation::{EvaluationOptions, EvaluationRun, RuleEvaluator};
use crate::services::{LlmService, Oracle, RuleHighlighter, SnapshotService};
use crate::utils::logging::{append_outcomes, init_log_file, log_startup, print_final_stats};

/// 评估目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 附加到已打开的浏览器
    Attach { debugger_url: String },
    /// 启动浏览器并打开 URL
    Launch { url: String },
}

impl Target {
    /// 报告和日志中使用的页面标识
    pub fn label(&self) -> &str {
        match self {
            Target::Attach { debugger_url } => debugger_url,
            Target::Launch { url } => url,
        }
    }
}

/// 应用主结构
pub struct App<O: Oracle> {
    config: Config,
    rules: RuleSet,
    target: Target,
    visual: bool,
    evaluator: RuleEvaluator<O>,
}

impl App<LlmService> {
    /// 使用配置中的 LLM 创建应用
    pub fn with_llm(
        config: Config,
        rule_id: Option<u32>,
        target: Target,
        visual: bool,
    ) -> AppResult<Self> {
        let oracle = LlmService::new(&config)?;
        Self::new(config, oracle, rule_id, target, visual)
    }
}

impl<O: Oracle> App<O> {
    /// 创建应用
    ///
    /// 配置和规则 ID 在这里校验，失败时不会打开浏览器，也不会调用推理服务
    pub fn new(
        config: Config,
        oracle: O,
        rule_id: Option<u32>,
        target: Target,
        visual: bool,
    ) -> AppResult<Self> {
        config.validate()?;
        let rules = RuleSet::reference().select(rule_id)?;
        let evaluator = RuleEvaluator::new(oracle, EvaluationOptions::from_config(&config));

        Ok(Self {
            config,
            rules,
            target,
            visual,
            evaluator,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn oracle(&self) -> &O {
        self.evaluator.oracle()
    }

    /// 运行评估
    pub async fn run(&self) -> AppResult<EvaluationRun> {
        if let Err(e) = init_log_file(&self.config.output_log_file, self.target.label()) {
            warn!("⚠️ 无法初始化日志文件 {}: {}", self.config.output_log_file, e);
        }
        log_startup(
            self.rules.len(),
            &self.config.llm_model_name,
            self.config.max_concurrent_rules,
        );

        let (mut browser, executor) = self.open_page().await?;

        let result = self.evaluate_page(&executor).await;

        self.close(&mut browser).await;

        let run = result?;
        if let Err(e) = append_outcomes(&self.config.output_log_file, &run.statuses) {
            warn!("⚠️ 无法写入日志文件 {}: {}", self.config.output_log_file, e);
        }
        print_final_stats(run.answered, run.merged.tests_extracted, run.requests);
        Ok(run)
    }

    async fn evaluate_page(&self, executor: &JsExecutor) -> AppResult<EvaluationRun> {
        if self.visual {
            info!("正在逐条高亮规则...");
            let highlighter =
                RuleHighlighter::new(Duration::from_millis(self.config.highlight_dwell_ms));
            if let Err(e) = highlighter.visualize(executor, self.rules.rules()).await {
                warn!("⚠️ 高亮清理失败: {}", e);
            }
        }

        let fallback_url = match &self.target {
            Target::Launch { url } => url.as_str(),
            Target::Attach { .. } => "",
        };
        let ctx = SnapshotService::new(self.config.capture_screenshot)
            .capture(executor, fallback_url)
            .await;

        info!(
            "正在发送快照给 {} 进行评估 ({} 条规则)...",
            self.config.llm_model_name,
            self.rules.len()
        );
        Ok(self.evaluator.evaluate(self.rules.rules(), &ctx).await?)
    }

    async fn open_page(&self) -> AppResult<(Browser, JsExecutor)> {
        let (browser, page) = match &self.target {
            Target::Attach { debugger_url } => {
                info!("正在附加到已打开的浏览器 {}...", debugger_url);
                browser::connect_to_debugger(debugger_url).await?
            }
            Target::Launch { url } => {
                info!(
                    "正在启动{}浏览器并打开 {}...",
                    if self.visual { "有界面" } else { "无头" },
                    url
                );
                browser::launch_browser(
                    Some(url),
                    self.visual,
                    self.config.chrome_executable.as_deref(),
                )
                .await?
            }
        };
        Ok((browser, JsExecutor::new(page)))
    }

    /// 关闭自己启动的浏览器；附加的浏览器只断开连接
    async fn close(&self, browser: &mut Browser) {
        match self.target {
            Target::Launch { .. } => {
                if let Err(e) = browser.close().await {
                    warn!("⚠️ 关闭浏览器失败: {}", e);
                }
            }
            Target::Attach { .. } => info!("评估结束，断开 CDP 连接"),
        }
    }
}
