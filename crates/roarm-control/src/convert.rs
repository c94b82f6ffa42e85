//! UnitConverter - 百分比 / 原生角度 / 弧度转换
//!
//! 所有函数都是纯函数，无副作用。
//!
//! # 映射
//!
//! ```text
//! to_native:     p ∈ ℝ  --clamp-->  [-100, 100]  --affine-->  [min, max]
//!                native = min + (p + 100) * (max - min) / 200
//! to_percentage: native --affine--> ℝ --clamp--> [-100, 100]
//! ```
//!
//! 输出侧钳位用于吸收机械沉降期间短暂越界的原生读数。
//!
//! # 示例
//!
//! ```rust
//! use roarm_control::convert::UnitConverter;
//! use roarm_control::types::JointSpec;
//!
//! let elbow = JointSpec::new("elbow_flex", -70.0, 190.0, 171.9).unwrap();
//! assert_eq!(UnitConverter::to_native(&elbow, 0.0), 60.0);
//! assert_eq!(UnitConverter::to_native(&elbow, 150.0), 190.0);
//! assert_eq!(UnitConverter::to_percentage(&elbow, -70.0), -100.0);
//! ```

use crate::types::{
    Deg, JointSet, JointSpec, NativeCommand, NormalizedCommand, Observation, PERCENT_MAX,
    PERCENT_MIN, Rad,
};

/// 单位转换器（按关节参数化）
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConverter;

impl UnitConverter {
    /// 百分比 → 原生角度（度）
    ///
    /// 输入先钳位到 [-100, 100]，因此结果总在 `[min_native, max_native]` 内。
    /// NaN 输入映射到范围中点。
    #[inline]
    pub fn to_native(joint: &JointSpec, percentage: f64) -> f64 {
        let clamped = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(PERCENT_MIN, PERCENT_MAX)
        };
        joint.min_native() + (clamped - PERCENT_MIN) * joint.span() / (PERCENT_MAX - PERCENT_MIN)
    }

    /// 原生角度（度） → 百分比
    ///
    /// `to_native` 的精确逆映射，输出钳位到 [-100, 100]。
    #[inline]
    pub fn to_percentage(joint: &JointSpec, native: f64) -> f64 {
        let raw = (native - joint.min_native()) / joint.span() * (PERCENT_MAX - PERCENT_MIN)
            + PERCENT_MIN;
        if raw.is_nan() {
            0.0
        } else {
            raw.clamp(PERCENT_MIN, PERCENT_MAX)
        }
    }

    /// 角度 → 弧度（×π/180）
    #[inline]
    pub fn deg_to_rad(degrees: f64) -> f64 {
        Deg(degrees).to_rad().0
    }

    /// 弧度 → 角度（×180/π）
    #[inline]
    pub fn rad_to_deg(radians: f64) -> f64 {
        Rad(radians).to_deg().0
    }

    /// 整条百分比命令 → 原生命令
    ///
    /// 不在 `joints` 中的键被忽略（上游可能携带其他特征）。
    pub fn command_to_native(joints: &JointSet, command: &NormalizedCommand) -> NativeCommand {
        command
            .iter()
            .filter_map(|(name, percentage)| match joints.get(name) {
                Some(spec) => Some((name.to_string(), Self::to_native(spec, percentage))),
                None => {
                    tracing::debug!("Ignoring action for unknown joint '{}'", name);
                    None
                },
            })
            .collect()
    }

    /// 设备读数（关节角度序列 + 可选夹爪角度）→ 百分比命令
    ///
    /// `angles` 按 `joints.joints()` 的顺序对应；多余的读数被忽略。
    pub fn angles_to_command(
        joints: &JointSet,
        angles: &[f64],
        gripper: Option<f64>,
    ) -> NormalizedCommand {
        let mut command: NormalizedCommand = joints
            .joints()
            .iter()
            .zip(angles)
            .map(|(spec, &deg)| (spec.name().to_string(), Self::to_percentage(spec, deg)))
            .collect();

        if let (Some(spec), Some(deg)) = (joints.gripper(), gripper) {
            command.insert(spec.name(), Self::to_percentage(spec, deg));
        }
        command
    }

    /// 设备读数 → 弧度观测
    pub fn angles_to_observation(
        joints: &JointSet,
        angles: &[f64],
        gripper: Option<f64>,
    ) -> Observation {
        let mut observation = Observation::new();
        for (spec, &deg) in joints.joints().iter().zip(angles) {
            observation.set_position(spec.name(), Deg(deg).to_rad());
        }
        if let (Some(spec), Some(deg)) = (joints.gripper(), gripper) {
            observation.set_position(spec.name(), Deg(deg).to_rad());
        }
        observation
    }
}
