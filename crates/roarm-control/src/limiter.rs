//! VelocityLimiter - 按键独立的速度限制器
//!
//! 限制相邻两次命令之间的变化量不超过 `max_velocity * dt`，防止单个噪声或
//! 错误命令让关节跳变。每个键（关节名）独立记录上一次输出，互不影响。
//!
//! # 行为
//!
//! - 某个键的第一次调用原样通过，并记录该值
//! - 之后 `|target - last| > max_velocity * dt` 时，把变化量钳位到
//!   `sign(delta) * max_velocity * dt`
//! - 返回值同时成为新的 `last`
//!
//! 控制会话重启时必须调用 [`VelocityLimiter::reset`]，否则旧的 `last` 会让
//! 重启后的第一条命令被错误限速。
//!
//! # 示例
//!
//! ```rust
//! use roarm_control::limiter::VelocityLimiter;
//!
//! let mut limiter = VelocityLimiter::new();
//! let out: Vec<f64> = [0.0, 1.0, 1.0]
//!     .iter()
//!     .map(|&t| limiter.limit("shoulder_pan", t, 0.1, 3.0))
//!     .collect();
//! assert!((out[1] - 0.3).abs() < 1e-9);
//! assert!((out[2] - 0.6).abs() < 1e-9);
//! ```

use std::collections::HashMap;

/// 速度限制器
#[derive(Debug, Clone, Default)]
pub struct VelocityLimiter {
    last_values: HashMap<String, f64>,
}

impl VelocityLimiter {
    /// 创建空的限制器
    pub fn new() -> Self {
        Self::default()
    }

    /// 对单个键做速度限制
    ///
    /// # 参数
    ///
    /// - `key`: 关节名
    /// - `target`: 目标值
    /// - `dt`: 时间步长（秒）
    /// - `max_velocity`: 最大速度（单位/秒，与 `target` 同单位）
    ///
    /// 非正或非有限的 `max_velocity * dt` 视为 0（保持上一次输出）。
    /// 非有限的 `target` 被忽略：有历史值时保持历史值。
    pub fn limit(&mut self, key: &str, target: f64, dt: f64, max_velocity: f64) -> f64 {
        let Some(&last) = self.last_values.get(key) else {
            if target.is_finite() {
                self.last_values.insert(key.to_string(), target);
            }
            return target;
        };

        if !target.is_finite() {
            return last;
        }

        let max_step = max_velocity * dt;
        let max_step = if max_step.is_finite() && max_step > 0.0 {
            max_step
        } else {
            0.0
        };

        let mut delta = target - last;
        if delta.abs() > max_step {
            delta = max_step.copysign(delta);
        }

        let limited = last + delta;
        if let Some(slot) = self.last_values.get_mut(key) {
            *slot = limited;
        }
        limited
    }

    /// 某个键上一次的输出
    pub fn last(&self, key: &str) -> Option<f64> {
        self.last_values.get(key).copied()
    }

    /// 清空所有历史值
    pub fn reset(&mut self) {
        self.last_values.clear();
    }

    /// 已记录的键数量
    pub fn len(&self) -> usize {
        self.last_values.len()
    }

    /// 是否没有任何历史值
    pub fn is_empty(&self) -> bool {
        self.last_values.is_empty()
    }
}
