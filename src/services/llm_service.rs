//! LLM 服务 - 业务能力层
//!
//! 只负责"把一次请求发给模型"的能力，不关心规则和流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, OracleError};
use crate::services::oracle::{Oracle, OracleRequest};

/// 两次重试之间的默认等待时间
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// LLM 服务
///
/// 职责：
/// - 调用 OpenAI 兼容 API
/// - 文本和截图组成一条用户消息
/// - 不出现 Rule / RuleSet
/// - 不关心评估顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    max_retries: usize,
    retry_delay: Duration,
    /// 单次尝试的超时
    request_timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    ///
    /// 没有 API Key 时返回 `ConfigError::MissingApiKey`
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key()?)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            max_retries: config.llm_max_retries,
            retry_delay: RETRY_DELAY,
            request_timeout: Duration::from_secs(config.llm_timeout_secs),
        })
    }

    /// 自定义重试间隔
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// 构建聊天请求
    ///
    /// 有截图时用户消息由两部分组成：文本 + 图片（data URL）；否则只有文本。
    pub fn build_request(
        &self,
        request: &OracleRequest,
    ) -> Result<CreateChatCompletionRequest, OracleError> {
        let user_msg = match &request.image {
            Some(image) => {
                let content_parts = vec![
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText {
                            text: request.prompt.clone(),
                        },
                    ),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: image.data_url(),
                                detail: Some(ImageDetail::Auto),
                            },
                        },
                    ),
                ];

                debug!("使用 Vision API，附带截图 ({})", image.media_type);

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(
                        content_parts,
                    ))
                    .build()
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build(),
        }
        .map_err(|e| OracleError::RequestBuild(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.2)
            .build()
            .map_err(|e| OracleError::RequestBuild(e.to_string()))
    }

    /// 发送请求，失败或超时时按配置重试
    ///
    /// # 返回
    /// 模型返回的文本；服务正常返回但没有内容时为 `None`
    pub async fn send_to_llm(&self, request: &OracleRequest) -> Result<Option<String>, OracleError> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!("提示词长度: {} 字符", request.prompt.len());

        let chat_request = self.build_request(request)?;

        let mut attempt = 0;
        loop {
            let result = match timeout(
                self.request_timeout,
                self.client.chat().create(chat_request.clone()),
            )
            .await
            {
                Ok(Ok(response)) => {
                    debug!("LLM API 调用成功");
                    let content = response
                        .choices
                        .first()
                        .and_then(|choice| choice.message.content.clone())
                        .filter(|text| !text.trim().is_empty());
                    return Ok(content);
                }
                Ok(Err(e)) => OracleError::ApiCallFailed {
                    model: request.model.clone(),
                    message: e.to_string(),
                },
                Err(_) => OracleError::Timeout {
                    seconds: self.request_timeout.as_secs(),
                },
            };

            if attempt >= self.max_retries {
                warn!("LLM API 调用失败: {}", result);
                return Err(result);
            }
            attempt += 1;
            warn!(
                "LLM API 调用失败 (尝试 {}/{}): {}, 等待 {} 毫秒后重试...",
                attempt,
                self.max_retries + 1,
                result,
                self.retry_delay.as_millis()
            );
            sleep(self.retry_delay).await;
        }
    }
}

impl Oracle for LlmService {
    async fn complete(&self, request: OracleRequest) -> Result<Option<String>, OracleError> {
        self.send_to_llm(&request).await
    }
}
