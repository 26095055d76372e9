//! 推理服务接口
//!
//! 评估流程只依赖这里的窄接口：`{模型, 文本提示词, 可选图片}` → `{文本 | 无}`。
//! 真实实现见 `LlmService`，测试中可以替换为脚本化的假实现。

use std::future::Future;
use std::sync::Arc;

use crate::error::OracleError;
use crate::models::VisualSnapshot;

/// 发往推理服务的一次请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    /// 模型名称
    pub model: String,
    /// 完整的文本提示词
    pub prompt: String,
    /// 作为第二个内容块发送的截图
    pub image: Option<VisualSnapshot>,
}

/// 推理服务
///
/// 实现必须可以被并发调用（`&self`），不能依赖可变共享状态。
pub trait Oracle: Send + Sync {
    /// 发送请求；`Ok(None)` 表示服务正常返回但没有文本
    fn complete(
        &self,
        request: OracleRequest,
    ) -> impl Future<Output = Result<Option<String>, OracleError>> + Send;
}

impl<O: Oracle> Oracle for Arc<O> {
    fn complete(
        &self,
        request: OracleRequest,
    ) -> impl Future<Output = Result<Option<String>, OracleError>> + Send {
        self.as_ref().complete(request)
    }
}
