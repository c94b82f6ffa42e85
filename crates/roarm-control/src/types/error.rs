//! 错误类型体系
//!
//! 区分两类错误：
//!
//! - **瞬时错误**（`ReadFailure` / `WriteFailure`）：单个 tick 内部消化，
//!   控制循环记录日志后继续运行，不会传播给调用方。
//! - **前置条件错误**（`NotConnected` / `InvalidTransition` / `InvalidConfig`）：
//!   只会从 `start()` / `stop()` 以及构造函数返回。
//!
//! 越界命令不是错误：SafetyGate 总是钳位而不是拒绝，因此没有 `OutOfRange` 变体。

use std::fmt;
use thiserror::Error;

/// 设备在控制链路中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// 数据源（主臂 / 遥操作器）
    Source,
    /// 执行端（从臂 / 机器人）
    Sink,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => write!(f, "source"),
            Role::Sink => write!(f, "sink"),
        }
    }
}

/// 设备适配器错误
///
/// 适配器边界上的失败都以值的形式返回，不会 panic。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// 设备未连接
    #[error("device is disconnected")]
    Disconnected,

    /// 读取失败
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// 写入失败
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// 超时（适配器自身的有界超时）
    #[error("device timeout after {timeout_ms}ms")]
    Timeout {
        /// 超时时间（毫秒）
        timeout_ms: u64,
    },
}

/// 控制层错误
#[derive(Debug, Error)]
pub enum ControlError {
    /// 启动时设备未连接
    #[error("{role} device is not connected")]
    NotConnected {
        /// 未连接的一端
        role: Role,
    },

    /// 连接或断开失败
    #[error("{role} connection failed: {source}")]
    ConnectionFailure {
        /// 出错的一端
        role: Role,
        /// 底层错误
        #[source]
        source: AdapterError,
    },

    /// 读取失败（瞬时）
    #[error("{role} read failed: {source}")]
    ReadFailure {
        /// 读取的一端
        role: Role,
        /// 底层错误
        #[source]
        source: AdapterError,
    },

    /// 写入失败（瞬时）
    #[error("{role} write failed: {source}")]
    WriteFailure {
        /// 写入的一端
        role: Role,
        /// 底层错误
        #[source]
        source: AdapterError,
    },

    /// 无效的状态转换
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// 起始状态
        from: String,
        /// 目标状态
        to: String,
    },

    /// 配置错误
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// 控制线程错误（创建失败或 panic）
    #[error("Control loop thread error: {0}")]
    LoopThread(String),
}

impl ControlError {
    /// 是否为瞬时错误（单个 tick 内可恢复）
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ReadFailure { .. } | Self::WriteFailure { .. })
    }

    /// 是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// 创建配置错误
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// 创建连接错误
    pub fn connection(role: Role, source: AdapterError) -> Self {
        Self::ConnectionFailure { role, source }
    }

    /// 创建读取错误
    pub fn read(role: Role, source: AdapterError) -> Self {
        Self::ReadFailure { role, source }
    }

    /// 创建写入错误
    pub fn write(role: Role, source: AdapterError) -> Self {
        Self::WriteFailure { role, source }
    }

    /// 创建无效状态转换错误
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ControlError>;
