//! SafetyGate - 命令下发前的最后一道限位
//!
//! # 策略
//!
//! - **钳位而非拒绝**：越界值被钳位到 `[min_native, max_native]`，不会产生错误，
//!   控制循环也不会因此中止。
//! - **急停不抛错**：[`SafetyGate::emergency_stop`] 无条件尝试失能力矩；失败只记录
//!   `error!` 日志并返回 [`EmergencyStopOutcome::Failed`]，不会中断清理流程。

use crate::adapter::DeviceAdapter;
use crate::types::{AdapterError, JointSet, NativeCommand};

/// 急停结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmergencyStopOutcome {
    /// 力矩已失能
    Engaged,
    /// 失能失败（例如设备已断开），已记录日志
    Failed(AdapterError),
}

impl EmergencyStopOutcome {
    /// 力矩是否确认已失能
    pub fn is_engaged(&self) -> bool {
        matches!(self, Self::Engaged)
    }
}

/// 安全门
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyGate;

impl SafetyGate {
    /// 把命令钳位到关节限位内
    ///
    /// - 范围内的值原样通过
    /// - ±∞ 钳位到对应边界，NaN 替换为范围中点
    /// - `joints` 中不存在的关节被丢弃（无法校验的命令不下发）
    pub fn validate(native: &NativeCommand, joints: &JointSet) -> NativeCommand {
        native
            .iter()
            .filter_map(|(name, value)| {
                let Some(spec) = joints.get(name) else {
                    tracing::warn!("SafetyGate dropped command for unknown joint '{}'", name);
                    return None;
                };

                let safe = if value.is_nan() {
                    let mid = spec.min_native() + spec.span() / 2.0;
                    tracing::warn!("SafetyGate replaced NaN for '{}' with {:.2}°", name, mid);
                    mid
                } else {
                    spec.clamp(value)
                };

                if safe != value && !value.is_nan() {
                    tracing::debug!(
                        "SafetyGate clamped '{}': {:.2}° -> {:.2}° (limits [{:.1}, {:.1}])",
                        name,
                        value,
                        safe,
                        spec.min_native(),
                        spec.max_native()
                    );
                }
                Some((name.to_string(), safe))
            })
            .collect()
    }

    /// 急停：失能执行端力矩
    ///
    /// 可重入；对已断开的设备只记录日志，不返回错误。
    pub fn emergency_stop(sink: &dyn DeviceAdapter) -> EmergencyStopOutcome {
        match sink.set_torque(false) {
            Ok(()) => {
                tracing::warn!("Emergency stop engaged on '{}': torque disabled", sink.name());
                EmergencyStopOutcome::Engaged
            },
            Err(e) => {
                tracing::error!(
                    "Emergency stop on '{}' could not disable torque: {}",
                    sink.name(),
                    e
                );
                EmergencyStopOutcome::Failed(e)
            },
        }
    }
}
