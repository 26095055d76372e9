use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::BrowserError;

/// 启动浏览器并（可选）导航到指定 URL
///
/// # 参数
/// - `url`: 目标页面，为 `None` 时停留在空白页
/// - `headed`: 是否显示浏览器窗口（高亮规则时需要）
/// - `chrome_executable`: 浏览器可执行文件路径（可选）
pub async fn launch_browser(
    url: Option<&str>,
    headed: bool,
    chrome_executable: Option<&str>,
) -> Result<(Browser, Page), BrowserError> {
    info!(
        "🚀 启动{}浏览器...",
        if headed { "有界面" } else { "无头" }
    );

    let mut builder = BrowserConfig::builder();
    builder = if headed {
        builder.with_head()
    } else {
        builder.new_headless_mode()
    };
    if let Some(path) = chrome_executable {
        debug!("使用浏览器: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder
        .args(vec![
            "--disable-gpu",           // 无头模式下禁用 GPU
            "--no-sandbox",            // 容器中运行时需要
            "--disable-dev-shm-usage", // 防止共享内存不足
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            BrowserError::LaunchFailed(e)
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("浏览器启动成功");

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

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(BrowserError::PageCreationFailed)?;

    if let Some(url) = url {
        page.goto(url)
            .await
            .map_err(|source| BrowserError::NavigationFailed {
                url: url.to_string(),
                source,
            })?;
        page.wait_for_navigation()
            .await
            .map_err(|source| BrowserError::NavigationFailed {
                url: url.to_string(),
                source,
            })?;
        info!("✅ 已导航到: {}", url);
    }

    Ok((browser, page))
}
