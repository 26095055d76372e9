//! 程序配置
//!
//! 优先级：默认值 < TOML 配置文件 < 环境变量 < 命令行参数

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, ConfigError, FileError};
use crate::services::llm_service::RETRY_DELAY;

/// 提示词模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// 每条规则单独一次请求
    #[default]
    PerRule,
    /// 所有规则放进一次请求
    Combined,
}

/// 单条规则调用失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 转为占位结果，不影响其他规则
    #[default]
    Placeholder,
    /// 整批失败
    FailBatch,
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次调用失败后的重试次数
    pub llm_max_retries: usize,
    /// 单次调用的超时时间（秒）
    pub llm_timeout_secs: u64,
    /// 同时进行的模型请求数，0 表示不限制
    pub max_concurrent_rules: usize,
    pub evaluation_mode: EvaluationMode,
    pub failure_policy: FailurePolicy,
    /// HTML 快照最大字符数
    pub html_max_chars: usize,
    /// 无障碍树最大字符数
    pub aria_max_chars: usize,
    // --- 浏览器配置 ---
    /// 浏览器可执行文件路径（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<String>,
    /// 是否截图并发送给模型
    pub capture_screenshot: bool,
    /// 高亮每条规则的停留时间（毫秒）
    pub highlight_dwell_ms: u64,
    // --- 输出 ---
    /// 生成的测试脚本路径
    pub output_test_file: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            llm_max_retries: 2,
            llm_timeout_secs: 120,
            max_concurrent_rules: 0,
            evaluation_mode: EvaluationMode::PerRule,
            failure_policy: FailurePolicy::Placeholder,
            html_max_chars: 150_000,
            aria_max_chars: 100_000,
            chrome_executable: None,
            capture_screenshot: true,
            highlight_dwell_ms: 2000,
            output_test_file: "generated-a11y.spec.ts".to_string(),
            output_log_file: "a11y-check.log".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    llm_max_retries: Option<usize>,
    llm_timeout_secs: Option<u64>,
    max_concurrent_rules: Option<usize>,
    evaluation_mode: Option<EvaluationMode>,
    failure_policy: Option<FailurePolicy>,
    html_max_chars: Option<usize>,
    aria_max_chars: Option<usize>,
    chrome_executable: Option<String>,
    capture_screenshot: Option<bool>,
    highlight_dwell_ms: Option<u64>,
    output_test_file: Option<String>,
    output_log_file: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 从环境变量加载（基于默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// 加载 TOML 配置文件，再叠加环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(path) = path {
            let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
            config = config.merge_toml(&content, &path.display().to_string())?;
        }
        Ok(config.apply_env()?)
    }

    /// 叠加 TOML 内容
    pub fn merge_toml(mut self, content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::FileParse {
            path: origin.to_string(),
            source,
        })?;

        if file.llm_api_key.is_some() {
            self.llm_api_key = file.llm_api_key;
        }
        if let Some(v) = file.llm_api_base_url {
            self.llm_api_base_url = v;
        }
        if let Some(v) = file.llm_model_name {
            self.llm_model_name = v;
        }
        if let Some(v) = file.llm_max_retries {
            self.llm_max_retries = v;
        }
        if let Some(v) = file.llm_timeout_secs {
            self.llm_timeout_secs = v;
        }
        if let Some(v) = file.max_concurrent_rules {
            self.max_concurrent_rules = v;
        }
        if let Some(v) = file.evaluation_mode {
            self.evaluation_mode = v;
        }
        if let Some(v) = file.failure_policy {
            self.failure_policy = v;
        }
        if let Some(v) = file.html_max_chars {
            self.html_max_chars = v;
        }
        if let Some(v) = file.aria_max_chars {
            self.aria_max_chars = v;
        }
        if file.chrome_executable.is_some() {
            self.chrome_executable = file.chrome_executable;
        }
        if let Some(v) = file.capture_screenshot {
            self.capture_screenshot = v;
        }
        if let Some(v) = file.highlight_dwell_ms {
            self.highlight_dwell_ms = v;
        }
        if let Some(v) = file.output_test_file {
            self.output_test_file = v;
        }
        if let Some(v) = file.output_log_file {
            self.output_log_file = v;
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 叠加环境变量
    fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Some(key) = env_string("LLM_API_KEY").or_else(|| env_string("GEMINI_API_KEY")) {
            self.llm_api_key = Some(key);
        }
        if let Some(v) = env_string("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = env_string("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = env_parse("LLM_MAX_RETRIES", "usize")? {
            self.llm_max_retries = v;
        }
        if let Some(v) = env_parse("LLM_TIMEOUT_SECS", "u64")? {
            self.llm_timeout_secs = v;
        }
        if let Some(v) = env_parse("MAX_CONCURRENT_RULES", "usize")? {
            self.max_concurrent_rules = v;
        }
        if let Some(v) = env_parse("HTML_MAX_CHARS", "usize")? {
            self.html_max_chars = v;
        }
        if let Some(v) = env_parse("ARIA_MAX_CHARS", "usize")? {
            self.aria_max_chars = v;
        }
        if let Some(v) = env_parse("HIGHLIGHT_DWELL_MS", "u64")? {
            self.highlight_dwell_ms = v;
        }
        if let Some(v) = env_string("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = env_string("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = env_parse("VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 校验配置，必须在任何模型调用之前执行
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm_timeout_secs",
                reason: "必须大于 0",
            });
        }
        match self.llm_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// 一次规则调用（含全部重试）的总时限
    pub fn invocation_timeout(&self) -> Duration {
        let retries = self.llm_max_retries as u32;
        Duration::from_secs(self.llm_timeout_secs) * (retries + 1) + RETRY_DELAY * retries
    }

    /// 已校验的 API Key
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.validate()?;
        Ok(self.llm_api_key.as_deref().unwrap_or_default())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(
    name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type,
            }),
    }
}
