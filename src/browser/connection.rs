use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::BrowserError;

/// 扩展程序的后台页面不作为评估目标
const EXTENSION_SCHEME: &str = "chrome-extension://";

/// 连接到已打开的浏览器（CDP 调试地址）并选择要评估的页面
///
/// `debugger_url` 可以是 `http://localhost:9222` 或 `ws://` 地址。
/// 页面选择顺序：第一个非扩展页面 → 第一个页面 → 新建空白页面。
pub async fn connect_to_debugger(debugger_url: &str) -> Result<(Browser, Page), BrowserError> {
    info!("正在连接到浏览器: {}", debugger_url);

    let (browser, mut handler) = Browser::connect(debugger_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::ConnectionFailed {
            url: debugger_url.to_string(),
            source: e,
        }
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    let mut first_page = None;
    for p in pages.iter() {
        let url = p.url().await.ok().flatten().unwrap_or_default();
        debug!("检查页面: {}", url);
        if !url.starts_with(EXTENSION_SCHEME) {
            info!("✓ 使用已打开的页面: {}", url);
            return Ok((browser, p.clone()));
        }
        if first_page.is_none() {
            first_page = Some(p.clone());
        }
    }

    if let Some(page) = first_page {
        info!("只找到扩展页面，使用第一个页面");
        return Ok((browser, page));
    }

    debug!("没有可用页面，创建空白页面");
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(BrowserError::PageCreationFailed)?;

    Ok((browser, page))
}
