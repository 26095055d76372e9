//! 规则高亮服务 - 业务能力层
//!
//! 调试辅助：在页面上逐条显示正在检查的规则，并描边匹配选择器的元素。
//! 选择器原样交给浏览器，本服务不解析。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::BrowserError;
use crate::infrastructure::JsExecutor;
use crate::models::Rule;

const BANNER_ID: &str = "a11y-checklist-visual-banner";
const HIGHLIGHT_CLASS: &str = "a11y-checklist-highlight";

/// 规则高亮服务
pub struct RuleHighlighter {
    dwell: Duration,
}

impl RuleHighlighter {
    /// # 参数
    /// - `dwell`: 每条规则的停留时间
    pub fn new(dwell: Duration) -> Self {
        Self { dwell }
    }

    /// 逐条高亮规则，结束后清理页面
    ///
    /// 单条规则高亮失败（例如选择器无效）只记录警告。
    pub async fn visualize(&self, executor: &JsExecutor, rules: &[Rule]) -> Result<(), BrowserError> {
        info!("👀 开始高亮 {} 条规则", rules.len());

        for rule in rules {
            let script = highlight_script(rule)?;
            match executor.eval(script).await {
                Ok(count) => info!("{} 匹配元素: {}", rule, count),
                Err(e) => warn!("{} ⚠️ 高亮失败: {}", rule, e),
            }
            sleep(self.dwell).await;
        }

        executor.run(cleanup_script()).await?;
        Ok(())
    }
}

/// 显示横幅并描边匹配元素，返回匹配数量
fn highlight_script(rule: &Rule) -> Result<String, BrowserError> {
    let banner_text = serde_json::to_string(&format!("Checking for rule: {}", rule.description))?;
    let selector = serde_json::to_string(rule.selector)?;

    Ok(format!(
        r#"
        (() => {{
            {cleanup}
            const banner = document.createElement('div');
            banner.id = '{banner_id}';
            Object.assign(banner.style, {{
                position: 'fixed', top: '0', left: '0', width: '100%',
                backgroundColor: 'rgba(0, 0, 0, 0.8)', color: '#fff', padding: '15px',
                fontSize: '24px', fontWeight: 'bold', textAlign: 'center',
                zIndex: '999999', pointerEvents: 'none'
            }});
            banner.innerText = {banner_text};
            document.body.appendChild(banner);

            const matches = document.querySelectorAll({selector});
            matches.forEach(el => {{
                el.classList.add('{class}');
                el.style.outline = '4px solid #ff00ff';
                el.style.outlineOffset = '2px';
                el.style.boxShadow = '0 0 10px #ff00ff';
            }});
            return matches.length;
        }})()
        "#,
        cleanup = cleanup_body(),
        banner_id = BANNER_ID,
        banner_text = banner_text,
        selector = selector,
        class = HIGHLIGHT_CLASS,
    ))
}

fn cleanup_script() -> String {
    format!("(() => {{ {} return true; }})()", cleanup_body())
}

fn cleanup_body() -> String {
    format!(
        r#"
            const existingBanner = document.getElementById('{banner_id}');
            if (existingBanner) existingBanner.remove();
            document.querySelectorAll('.{class}').forEach(el => {{
                el.classList.remove('{class}');
                el.style.outline = '';
                el.style.outlineOffset = '';
                el.style.boxShadow = '';
            }});
        "#,
        banner_id = BANNER_ID,
        class = HIGHLIGHT_CLASS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::REFERENCE_RULES;

    #[test]
    fn test_selector_is_json_encoded() {
        // 规则 4 的选择器包含双引号
        let script = highlight_script(&REFERENCE_RULES[3]).unwrap();
        assert!(script.contains(r#"document.querySelectorAll("a, button, [role=\"button\"], [role=\"link\"]")"#));
        assert!(script.contains(r#"banner.innerText = "Checking for rule: Links and Buttons";"#));
    }

    #[test]
    fn test_cleanup_removes_banner_and_highlights() {
        let script = cleanup_script();
        assert!(script.contains(BANNER_ID));
        assert!(script.contains(&format!(".{}", HIGHLIGHT_CLASS)));
    }
}
