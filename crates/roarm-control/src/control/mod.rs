//! 控制模块
//!
//! - `ControlLoop` - 主从镜像控制循环（独立线程，固定频率）
//! - `RateScheduler` - 固定频率调度（ControlLoop 与轨迹下发共用）
//! - `TrajectoryPlanner` / `stream_trajectory` - 笛卡尔轨迹脚本

pub mod loop_runner;
pub mod rate;
pub mod trajectory;

// 重新导出常用类型
pub use loop_runner::{
    ControlLoop, LoopConfig, LoopMetrics, LoopMetricsSnapshot, LoopPhase, LoopState, StopHandle,
    TickOutcome,
};
pub use rate::{RateScheduler, rate_period, validate_rate};
pub use trajectory::{Axis, StreamReport, Trajectory, TrajectoryPlanner, stream_trajectory};
