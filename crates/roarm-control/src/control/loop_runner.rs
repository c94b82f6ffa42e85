//! ControlLoop - 主从镜像控制循环
//!
//! 在独立线程中以固定频率运行：读取主臂 → 百分比 → 从臂原生角度 → 速度限制
//! → SafetyGate 钳位 → 写入从臂。
//!
//! # 状态机
//!
//! ```text
//! Idle --start()--> Running --stop()--> Stopping --join--> Idle
//! ```
//!
//! # 失败策略
//!
//! - 主臂读取失败：记录日志，整个 tick 跳过（不写从臂，不修改 [`LoopState`]）
//! - 从臂写入失败：记录日志，直接进入下一个 tick（不在 tick 内重试）
//! - 只有 `start()` / `stop()` 的前置条件错误会返回给调用方
//!
//! # 停止延迟
//!
//! 运行标志只在 tick 边界检查，`stop()` 最多等待一个周期加上当前 tick 的耗时。
//! 适配器调用没有独立的取消路径：适配器阻塞时循环也会阻塞。
//!
//! # 示例
//!
//! ```rust
//! use roarm_control::control::{ControlLoop, LoopConfig, LoopPhase};
//! use roarm_control::robot::{ArmFollower, ArmLeader};
//! use roarm_control::sim::SimulatedArm;
//! use roarm_control::types::JointSet;
//! use std::sync::Arc;
//!
//! let leader = ArmLeader::new(Arc::new(SimulatedArm::new("leader", 5)), JointSet::roarm_m3());
//! let follower = ArmFollower::new(Arc::new(SimulatedArm::new("follower", 5)), JointSet::roarm_m3());
//! leader.connect().unwrap();
//! follower.connect().unwrap();
//!
//! let config = LoopConfig { rate_hz: 100.0, max_ticks: Some(5) };
//! let mut control = ControlLoop::new(Arc::new(leader), Arc::new(follower), config);
//! control.start().unwrap();
//! control.wait().unwrap();
//! assert_eq!(control.state(), LoopPhase::Idle);
//! assert_eq!(control.metrics().ticks, 5);
//! ```

use super::rate::{RateScheduler, rate_period, validate_rate};
use crate::convert::UnitConverter;
use crate::limiter::VelocityLimiter;
use crate::robot::{ArmFollower, ArmLeader, JointReading};
use crate::safety::SafetyGate;
use crate::types::{ControlError, JointSet, NativeCommand, Observation, Result, Role};
use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// 控制循环配置
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopConfig {
    /// 控制频率（Hz）
    pub rate_hz: f64,

    /// 最大 tick 数（None 表示一直运行到 `stop()`）
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            rate_hz: 10.0,
            max_ticks: None,
        }
    }
}

impl LoopConfig {
    /// 指定频率，无 tick 上限
    pub fn with_rate(rate_hz: f64) -> Self {
        LoopConfig {
            rate_hz,
            max_ticks: None,
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        validate_rate(self.rate_hz)
    }

    /// 标称周期
    ///
    /// 频率无效时返回 `InvalidConfig`。
    pub fn period(&self) -> Result<Duration> {
        rate_period(self.rate_hz)
    }
}

/// 控制循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopPhase {
    /// 未运行
    Idle,
    /// 正在运行
    Running,
    /// 已请求停止（或已自行结束），等待线程回收
    Stopping,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopPhase::Idle => write!(f, "Idle"),
            LoopPhase::Running => write!(f, "Running"),
            LoopPhase::Stopping => write!(f, "Stopping"),
        }
    }
}

/// 控制循环计数器
///
/// 控制线程写，任意线程读。
#[derive(Debug, Default)]
pub struct LoopMetrics {
    /// 已执行的 tick 数（含跳过的）
    pub ticks: AtomicU64,
    /// 因主臂读取失败而跳过的 tick 数
    pub skipped_reads: AtomicU64,
    /// 从臂写入失败次数
    pub write_failures: AtomicU64,
    /// 超过周期的 tick 数
    pub overruns: AtomicU64,
}

impl LoopMetrics {
    /// 读取快照
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        LoopMetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            skipped_reads: self.skipped_reads.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoopMetricsSnapshot {
    /// 已执行的 tick 数
    pub ticks: u64,
    /// 跳过的 tick 数
    pub skipped_reads: u64,
    /// 写入失败次数
    pub write_failures: u64,
    /// 超时 tick 数
    pub overruns: u64,
}

impl LoopMetricsSnapshot {
    /// 成功写入的 tick 数
    pub fn written(&self) -> u64 {
        self.ticks.saturating_sub(self.skipped_reads + self.write_failures)
    }
}

/// 单个 tick 的结果
#[derive(Debug)]
pub enum TickOutcome {
    /// 主臂读取失败，本 tick 被跳过
    Skipped(ControlError),
    /// 命令已写入从臂
    Written {
        /// 主臂观测（弧度）
        observation: Observation,
        /// 实际下发的原生命令
        command: NativeCommand,
    },
    /// 从臂写入失败
    WriteFailed {
        /// 主臂观测（弧度）
        observation: Observation,
        /// 写入错误
        error: ControlError,
    },
}

impl TickOutcome {
    /// 本 tick 的主臂观测（跳过时为 `None`）
    pub fn observation(&self) -> Option<&Observation> {
        match self {
            TickOutcome::Skipped(_) => None,
            TickOutcome::Written { observation, .. }
            | TickOutcome::WriteFailed { observation, .. } => Some(observation),
        }
    }

    /// 是否被跳过
    pub fn is_skipped(&self) -> bool {
        matches!(self, TickOutcome::Skipped(_))
    }
}

/// 单次运行的循环状态
///
/// 每次 `start()` 新建，线程退出时丢弃；只被控制线程访问。
#[derive(Debug, Default)]
pub struct LoopState {
    last_native_command: NativeCommand,
    limiter: VelocityLimiter,
}

impl LoopState {
    /// 新的空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 上一次下发（或尝试下发）的原生命令
    pub fn last_native_command(&self) -> &NativeCommand {
        &self.last_native_command
    }

    /// 速度限制器
    pub fn limiter(&self) -> &VelocityLimiter {
        &self.limiter
    }

    /// 纯变换：主臂读数 → 钳位后的从臂原生命令
    ///
    /// 主臂读数先转为百分比，再按从臂关节映射到原生角度；缺失的关节沿用上一次
    /// 命令，随后逐关节做速度限制，最后经 SafetyGate 钳位。
    pub fn transform(
        &mut self,
        reading: &JointReading,
        source: &JointSet,
        sink: &JointSet,
        dt: f64,
    ) -> NativeCommand {
        let command = reading.to_command(source);
        let mut native = UnitConverter::command_to_native(sink, &command);
        native.fill_from(&self.last_native_command);

        for (name, value) in native.iter_mut() {
            if let Some(spec) = sink.get(name) {
                *value = self.limiter.limit(name, *value, dt, spec.max_velocity());
            }
        }

        let safe = SafetyGate::validate(&native, sink);
        self.last_native_command = safe.clone();
        safe
    }

    /// 执行一个 tick（读取 → 变换 → 写入）
    pub fn tick(&mut self, leader: &ArmLeader, follower: &ArmFollower, dt: f64) -> TickOutcome {
        let reading = match leader.read() {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("Skipping tick: {}", e);
                return TickOutcome::Skipped(e);
            },
        };

        let observation = reading.to_observation(leader.joints());
        let command = self.transform(&reading, leader.joints(), follower.joints(), dt);

        match follower.send_native(&command) {
            Ok(command) => {
                tracing::debug!("Tick wrote {} joints to '{}'", command.len(), follower.name());
                TickOutcome::Written {
                    observation,
                    command,
                }
            },
            Err(error) => {
                tracing::warn!("Follower write failed, continuing: {}", error);
                TickOutcome::WriteFailed { observation, error }
            },
        }
    }
}

/// 停止句柄
///
/// 只清除运行标志，不等待线程；可以在 Ctrl-C 处理函数等任意线程中使用。
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// 请求停止
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// 循环是否仍在运行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// 控制线程共享的上下文
struct LoopContext {
    leader: Arc<ArmLeader>,
    follower: Arc<ArmFollower>,
    config: LoopConfig,
    running: Arc<AtomicBool>,
    metrics: Arc<LoopMetrics>,
    last_observation: Arc<ArcSwapOption<Observation>>,
}

/// 主从镜像控制循环
pub struct ControlLoop {
    leader: Arc<ArmLeader>,
    follower: Arc<ArmFollower>,
    config: LoopConfig,
    running: Arc<AtomicBool>,
    metrics: Arc<LoopMetrics>,
    last_observation: Arc<ArcSwapOption<Observation>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ControlLoop {
    /// 创建控制循环（处于 Idle）
    pub fn new(leader: Arc<ArmLeader>, follower: Arc<ArmFollower>, config: LoopConfig) -> Self {
        ControlLoop {
            leader,
            follower,
            config,
            running: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(LoopMetrics::default()),
            last_observation: Arc::new(ArcSwapOption::empty()),
            handle: None,
        }
    }

    /// 循环配置
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// 当前状态
    pub fn state(&self) -> LoopPhase {
        match &self.handle {
            None => LoopPhase::Idle,
            Some(handle) if self.running.load(Ordering::Acquire) && !handle.is_finished() => {
                LoopPhase::Running
            },
            Some(_) => LoopPhase::Stopping,
        }
    }

    /// 是否正在运行
    pub fn is_running(&self) -> bool {
        self.state() == LoopPhase::Running
    }

    /// 本次（或最近一次）运行的计数器快照
    pub fn metrics(&self) -> LoopMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 最近一次主臂观测（无锁读取）
    pub fn last_observation(&self) -> Option<Arc<Observation>> {
        self.last_observation.load_full()
    }

    /// 停止句柄
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: self.running.clone(),
        }
    }

    /// 启动控制线程
    ///
    /// # 错误
    ///
    /// - `InvalidTransition`: 循环未处于 Idle
    /// - `InvalidConfig`: 频率无效
    /// - `NotConnected`: 主臂或从臂未连接
    /// - `LoopThread`: 线程创建失败
    pub fn start(&mut self) -> Result<()> {
        let phase = self.state();
        if phase != LoopPhase::Idle {
            return Err(ControlError::invalid_transition(
                phase.to_string(),
                LoopPhase::Running.to_string(),
            ));
        }

        self.config.validate()?;
        if !self.leader.is_connected() {
            return Err(ControlError::NotConnected { role: Role::Source });
        }
        if !self.follower.is_connected() {
            return Err(ControlError::NotConnected { role: Role::Sink });
        }

        self.metrics = Arc::new(LoopMetrics::default());
        self.last_observation.store(None);
        self.running.store(true, Ordering::Release);

        let context = LoopContext {
            leader: self.leader.clone(),
            follower: self.follower.clone(),
            config: self.config,
            running: self.running.clone(),
            metrics: self.metrics.clone(),
            last_observation: self.last_observation.clone(),
        };

        let handle = thread::Builder::new()
            .name("roarm-control-loop".into())
            .spawn(move || Self::run(context))
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                ControlError::LoopThread(e.to_string())
            })?;

        self.handle = Some(handle);
        tracing::info!(
            "Control loop started: '{}' -> '{}' at {} Hz",
            self.leader.name(),
            self.follower.name(),
            self.config.rate_hz
        );
        Ok(())
    }

    /// 停止并等待控制线程退出
    ///
    /// Idle 时调用是空操作。
    pub fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        self.join()
    }

    /// 等待循环自行结束（`max_ticks` 或外部 [`StopHandle`]）
    pub fn wait(&mut self) -> Result<()> {
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle
            .join()
            .map_err(|_| ControlError::LoopThread("control loop thread panicked".into()))?;
        tracing::info!("Control loop stopped");
        Ok(())
    }

    fn run(context: LoopContext) {
        let LoopContext {
            leader,
            follower,
            config,
            running,
            metrics,
            last_observation,
        } = context;

        let scheduler = match RateScheduler::new(config.rate_hz) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                tracing::error!("Control loop cannot start: {}", e);
                running.store(false, Ordering::Release);
                return;
            },
        };
        let dt = scheduler.dt();
        let mut state = LoopState::new();
        let mut ticks: u64 = 0;

        while running.load(Ordering::Acquire) {
            if let Some(max_ticks) = config.max_ticks
                && ticks >= max_ticks
            {
                break;
            }

            let tick_start = Instant::now();
            let outcome = state.tick(&leader, &follower, dt);
            ticks += 1;
            metrics.ticks.fetch_add(1, Ordering::Relaxed);

            match outcome {
                TickOutcome::Skipped(_) => {
                    metrics.skipped_reads.fetch_add(1, Ordering::Relaxed);
                },
                TickOutcome::Written { observation, .. } => {
                    last_observation.store(Some(Arc::new(observation)));
                },
                TickOutcome::WriteFailed { observation, .. } => {
                    metrics.write_failures.fetch_add(1, Ordering::Relaxed);
                    last_observation.store(Some(Arc::new(observation)));
                },
            }

            if !running.load(Ordering::Acquire) {
                break;
            }
            if !scheduler.wait_until_next(tick_start) {
                metrics.overruns.fetch_add(1, Ordering::Relaxed);
            }
        }

        running.store(false, Ordering::Release);
        tracing::debug!("Control loop thread exiting after {} ticks", ticks);
    }
}

impl fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlLoop")
            .field("leader", &self.leader.name())
            .field("follower", &self.follower.name())
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("Control loop thread panicked");
        }
    }
}
