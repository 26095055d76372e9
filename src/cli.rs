//! 命令行参数

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, EvaluationMode};
use crate::error::ConfigError;
use crate::orchestrator::app::Target;

#[derive(Parser, Debug)]
#[command(
    name = "a11y-checklist",
    version,
    about = "Evaluate a web page against accessibility checklist rules with an LLM and generate a Playwright test."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an accessibility check on a URL or an attached browser
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// URL of the page to evaluate
    #[arg(short, long)]
    pub url: Option<String>,

    /// URL of an open Chrome CDP interface (e.g. http://localhost:9222)
    #[arg(short, long)]
    pub debugger_url: Option<String>,

    /// Where to save the generated Playwright test script
    #[arg(short, long)]
    pub output_test: Option<String>,

    /// Visually highlight elements matching each rule in the browser
    #[arg(short, long)]
    pub visual: bool,

    /// Run only the rule with this ID
    #[arg(short, long)]
    pub rule: Option<u32>,

    /// Send every rule in one prompt instead of one prompt per rule
    #[arg(long)]
    pub combined: bool,

    /// Do not attach a screenshot to the requests
    #[arg(long)]
    pub no_screenshot: bool,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// 调试地址优先，其次是 URL
    pub fn target(&self) -> Result<Target, ConfigError> {
        match (&self.debugger_url, &self.url) {
            (Some(debugger_url), _) => Ok(Target::Attach {
                debugger_url: debugger_url.clone(),
            }),
            (None, Some(url)) => Ok(Target::Launch { url: url.clone() }),
            (None, None) => Err(ConfigError::MissingTarget),
        }
    }

    /// 命令行参数覆盖配置
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.output_test {
            config.output_test_file = path.clone();
        }
        if self.combined {
            config.evaluation_mode = EvaluationMode::Combined;
        }
        if self.no_screenshot {
            config.capture_screenshot = false;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}
