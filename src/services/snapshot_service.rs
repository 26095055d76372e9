//! 页面快照服务 - 业务能力层
//!
//! 只负责"采集页面快照"能力：HTML 结构、无障碍树、截图。
//! 任何一项采集失败都降级为默认值并记录警告，不会中断评估。

use tracing::{debug, info, warn};

use crate::error::BrowserError;
use crate::infrastructure::JsExecutor;
use crate::models::{PageContext, VisualSnapshot};

/// HTML 采集失败时的默认值
pub const EMPTY_BODY: &str = "<body></body>";

/// 无障碍树采集失败时的默认值
pub const EMPTY_ACCESSIBILITY_TREE: &str = "{}";

/// 复制 body 结构，去掉脚本和样式，给可见元素加上位置和样式提示
const STRUCTURE_SCRIPT: &str = r#"
(() => {
    function processNode(node) {
        if (node.nodeType === Node.TEXT_NODE) {
            const text = node.textContent && node.textContent.trim();
            if (!text) return null;
            return document.createTextNode(text);
        }

        if (node.nodeType !== Node.ELEMENT_NODE) return null;

        const el = node;
        const tagName = el.tagName.toLowerCase();

        if (['script', 'style', 'svg', 'noscript', 'meta', 'link', 'head'].includes(tagName)) {
            return null;
        }

        const clone = document.createElement(tagName);
        for (const attr of Array.from(el.attributes)) {
            clone.setAttribute(attr.name, attr.value);
        }

        const style = window.getComputedStyle(el);
        const rect = el.getBoundingClientRect();

        if (rect.width > 0 && rect.height > 0 && style.display !== 'none' && style.visibility !== 'hidden') {
            clone.setAttribute('data-rect', `${~~rect.top},${~~rect.left},${~~rect.width},${~~rect.height}`);

            if (style.backgroundImage && style.backgroundImage !== 'none') {
                clone.setAttribute('data-bg-image', style.backgroundImage);
            }
            if (style.fontSize) {
                clone.setAttribute('data-font-size', style.fontSize);
            }
            if (style.fontWeight && style.fontWeight !== '400') {
                clone.setAttribute('data-font-weight', style.fontWeight);
            }
            if (style.color) {
                clone.setAttribute('data-color', style.color);
            }
        }

        for (const child of Array.from(el.childNodes)) {
            const processedChild = processNode(child);
            if (processedChild) {
                clone.appendChild(processedChild);
            }
        }

        return clone;
    }

    const processedBody = document.body ? processNode(document.body) : null;
    return processedBody ? processedBody.outerHTML : '<body></body>';
})()
"#;

/// 页面快照服务
///
/// 职责：
/// - 通过 JsExecutor 采集页面
/// - 不解析 HTML 或无障碍树
/// - 不认识 Rule
pub struct SnapshotService {
    capture_screenshot: bool,
}

impl SnapshotService {
    /// 创建快照服务
    pub fn new(capture_screenshot: bool) -> Self {
        Self { capture_screenshot }
    }

    /// 采集页面上下文
    ///
    /// # 参数
    /// - `executor`: JS 执行器
    /// - `fallback_url`: 无法读取页面 URL 时使用
    pub async fn capture(&self, executor: &JsExecutor, fallback_url: &str) -> PageContext {
        info!("📸 正在采集页面结构和无障碍树...");

        let url = match executor.url().await {
            Ok(Some(url)) => url,
            Ok(None) => fallback_url.to_string(),
            Err(e) => {
                warn!("⚠️ 无法读取页面 URL: {}", e);
                fallback_url.to_string()
            }
        };

        let structural_snapshot = self.structure(executor).await.unwrap_or_else(|e| {
            warn!("⚠️ 无法采集页面 HTML: {}", e);
            EMPTY_BODY.to_string()
        });

        let accessibility_representation =
            self.accessibility_tree(executor).await.unwrap_or_else(|e| {
                warn!("⚠️ 无法获取 CDP 无障碍树: {}", e);
                EMPTY_ACCESSIBILITY_TREE.to_string()
            });

        let visual_snapshot = if self.capture_screenshot {
            match self.screenshot(executor).await {
                Ok(shot) => Some(shot),
                Err(e) => {
                    warn!("⚠️ 截图失败，将只发送文本: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let ctx = PageContext::new(url, structural_snapshot, accessibility_representation)
            .with_visual_snapshot(visual_snapshot);
        info!("✓ 快照完成 {}", ctx);
        ctx
    }

    /// 带样式提示的 HTML 结构
    async fn structure(&self, executor: &JsExecutor) -> Result<String, BrowserError> {
        let html: String = executor.eval_as(STRUCTURE_SCRIPT).await?;
        debug!("HTML 快照长度: {} 字符", html.len());
        Ok(html)
    }

    /// CDP 完整无障碍树（JSON）
    async fn accessibility_tree(&self, executor: &JsExecutor) -> Result<String, BrowserError> {
        let nodes = executor.accessibility_nodes().await?;
        debug!("无障碍树节点数: {}", nodes.len());
        Ok(serde_json::to_string_pretty(&nodes)?)
    }

    /// 视口截图（PNG，base64）
    async fn screenshot(&self, executor: &JsExecutor) -> Result<VisualSnapshot, BrowserError> {
        Ok(VisualSnapshot::png(executor.screenshot_png_base64().await?))
    }
}
