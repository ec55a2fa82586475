//! 错误类型
//!
//! 扫描开始之前的错误（配置、字典、解析器初始化）都是致命的，
//! 直接返回给调用者；单个候选域名的解析失败不属于这里，
//! 由工作者在本地丢弃。

use std::path::PathBuf;
use thiserror::Error;

/// 扫描过程中可能返回的错误
#[derive(Error, Debug)]
pub enum ScanError {
    /// 配置错误（缺少目标域名、工作者数量为0等）
    #[error("配置错误: {0}")]
    Config(String),

    /// 字典文件无法读取
    #[error("无法读取字典文件 '{path}': {source}")]
    Wordlist {
        /// 字典路径
        path: PathBuf,
        /// 底层IO错误
        #[source]
        source: std::io::Error,
    },

    /// DNS解析器初始化失败
    #[error("DNS解析器初始化失败: {0}")]
    Resolver(String),

    /// 工作者任务异常退出
    #[error("工作者 {id} 异常退出: {reason}")]
    Worker {
        /// 工作者编号
        id: usize,
        /// 失败原因
        reason: String,
    },
}

/// 本crate使用的Result类型
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::Config("必须指定目标域名".to_string());
        assert_eq!(err.to_string(), "配置错误: 必须指定目标域名");

        let err = ScanError::Wordlist {
            path: PathBuf::from("missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
