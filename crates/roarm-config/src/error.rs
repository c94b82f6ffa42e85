//! 配置错误

use std::path::PathBuf;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 文件读写失败
    #[error("Failed to access config file {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置内容无效
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// 创建无效配置错误
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

impl From<roarm_control::ControlError> for ConfigError {
    fn from(err: roarm_control::ControlError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ConfigError>;
