//! 测试脚本写入服务 - 业务能力层
//!
//! 只负责"把生成的测试脚本写到磁盘"的能力

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::FileError;

/// 测试脚本写入服务
pub struct TestWriter {
    output_path: PathBuf,
}

impl TestWriter {
    /// 创建写入服务，相对路径基于当前目录
    pub fn new(output_path: impl AsRef<Path>) -> Self {
        let output_path = output_path.as_ref();
        let output_path = if output_path.is_absolute() {
            output_path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|dir| dir.join(output_path))
                .unwrap_or_else(|_| output_path.to_path_buf())
        };
        Self { output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// 写入测试脚本（覆盖已有文件）
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn write(&self, script: &str) -> Result<&Path, FileError> {
        debug!(
            "写入测试脚本: {} ({} 字节)",
            self.output_path.display(),
            script.len()
        );

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| FileError::WriteFailed {
                        path: parent.display().to_string(),
                        source,
                    })?;
            }
        }

        fs::write(&self.output_path, script)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: self.output_path.display().to_string(),
                source,
            })?;

        Ok(&self.output_path)
    }
}
