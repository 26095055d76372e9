//! 页面执行器 - 基础设施层
//!
//! 唯一持有 Page。上层只能通过这里执行脚本或发出少量只读 CDP 查询，
//! 不直接接触 chromiumoxide 的类型。

use chromiumoxide::cdp::browser_protocol::accessibility::{AxNode, GetFullAxTreeParams};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::BrowserError;

/// 页面执行器
///
/// 不认识 Rule / PageContext，不处理评估流程。
#[derive(Clone)]
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 当前页面 URL，页面尚未导航时为 `None`
    pub async fn url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.page.url().await?)
    }

    /// 执行脚本，返回 JSON 结果
    pub async fn eval(&self, script: impl Into<String>) -> Result<JsonValue, BrowserError> {
        let value = self.page.evaluate(script.into()).await?.into_value()?;
        Ok(value)
    }

    /// 执行脚本并反序列化结果
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        script: impl Into<String>,
    ) -> Result<T, BrowserError> {
        Ok(serde_json::from_value(self.eval(script).await?)?)
    }

    /// 只关心副作用的脚本（高亮、清理），丢弃返回值
    pub async fn run(&self, script: impl Into<String>) -> Result<(), BrowserError> {
        self.page.evaluate(script.into()).await?;
        Ok(())
    }

    /// 整页无障碍树（CDP `Accessibility.getFullAXTree`）
    pub async fn accessibility_nodes(&self) -> Result<Vec<AxNode>, BrowserError> {
        let response = self.page.execute(GetFullAxTreeParams::default()).await?;
        Ok(response.result.nodes)
    }

    /// 视口 PNG 截图，返回 base64 文本
    pub async fn screenshot_png_base64(&self) -> Result<String, BrowserError> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let response = self.page.execute(params).await?;
        let data: String = response.result.data.into();
        debug!("截图大小: {} 字节 (base64)", data.len());
        Ok(data)
    }
}
