//! 错误类型
//!
//! 配置错误在调用模型之前就失败；快照错误在服务层就地降级，不会出现在这里。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（缺少凭证、未知规则等）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 推理服务（LLM）错误
    #[error("LLM错误: {0}")]
    Oracle(#[from] OracleError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 没有提供 API Key
    #[error("缺少 LLM API Key，请设置 LLM_API_KEY 或 GEMINI_API_KEY 环境变量")]
    MissingApiKey,
    /// 规则 ID 不存在
    #[error("规则 {id} 不存在")]
    RuleNotFound { id: u32 },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    /// 既没有 URL 也没有调试地址
    #[error("必须提供 --url 或 --debugger-url 之一")]
    MissingTarget,
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 ({url}): {source}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 创建页面失败
    #[error("创建页面失败: {0}")]
    PageCreationFailed(#[source] chromiumoxide::error::CdpError),
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    ScriptExecutionFailed(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值无法反序列化
    #[error("脚本返回值解析失败: {0}")]
    ResultDecodeFailed(#[from] serde_json::Error),
}

/// 推理服务错误
#[derive(Debug, Error)]
pub enum OracleError {
    /// 构建请求失败
    #[error("构建请求失败: {0}")]
    RequestBuild(String),
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 调用超时
    #[error("LLM调用超时 ({seconds} 秒内没有返回)")]
    Timeout { seconds: u64 },
    /// 某条规则的调用失败（批量失败策略下向上传播）
    #[error("规则 {rule_id} 评估失败: {source}")]
    RuleFailed {
        rule_id: u32,
        #[source]
        source: Box<OracleError>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
