//! 页面上下文
//!
//! 由快照服务每次运行生成一次，之后只读地共享给所有规则的评估。

use std::fmt::Display;

/// 截图（base64 编码）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualSnapshot {
    /// 媒体类型，例如 `image/png`
    pub media_type: String,
    /// base64 编码的图片数据
    pub base64_data: String,
}

impl VisualSnapshot {
    /// 创建 PNG 截图
    pub fn png(base64_data: impl Into<String>) -> Self {
        Self {
            media_type: "image/png".to_string(),
            base64_data: base64_data.into(),
        }
    }

    /// 转为 data URL，用于 Vision 请求
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64_data)
    }
}

/// 被评估页面的快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// 页面 URL
    pub url: String,
    /// 页面结构（HTML 序列化）
    pub structural_snapshot: String,
    /// 无障碍树（JSON 序列化）
    pub accessibility_representation: String,
    /// 截图（可选）
    pub visual_snapshot: Option<VisualSnapshot>,
}

impl PageContext {
    /// 创建不带截图的上下文
    pub fn new(
        url: impl Into<String>,
        structural_snapshot: impl Into<String>,
        accessibility_representation: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            structural_snapshot: structural_snapshot.into(),
            accessibility_representation: accessibility_representation.into(),
            visual_snapshot: None,
        }
    }

    /// 附加截图
    pub fn with_visual_snapshot(mut self, snapshot: Option<VisualSnapshot>) -> Self {
        self.visual_snapshot = snapshot;
        self
    }
}

impl Display for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[页面 {} | HTML {} 字符 | 无障碍树 {} 字符 | 截图: {}]",
            self.url,
            self.structural_snapshot.chars().count(),
            self.accessibility_representation.chars().count(),
            if self.visual_snapshot.is_some() { "有" } else { "无" }
        )
    }
}
