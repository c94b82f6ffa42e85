//! 关节规格
//!
//! 每个可控关节（以及夹爪）由一个 [`JointSpec`] 描述：名称、原生角度范围和
//! 最大速度。[`JointSet`] 是一台机械臂的有序关节集合，在配置阶段确定，
//! 之后不可变。
//!
//! # 示例
//!
//! ```rust
//! use roarm_control::types::JointSet;
//!
//! let joints = JointSet::roarm_m3();
//! let elbow = joints.get("elbow_flex").unwrap();
//! assert_eq!(elbow.min_native(), -70.0);
//! assert_eq!(elbow.max_native(), 190.0);
//! assert!(joints.feature_keys().contains(&"gripper.pos".to_string()));
//! ```

use super::error::ControlError;
use std::collections::HashSet;
use std::fmt;

/// 特征键后缀（LeRobot 约定：`"<joint_name>.pos"`）
pub const POSITION_SUFFIX: &str = ".pos";

/// 生成特征键
#[inline]
pub fn feature_key(joint: &str) -> String {
    format!("{joint}{POSITION_SUFFIX}")
}

/// 从特征键中取出关节名（非 `.pos` 键返回 `None`）
#[inline]
pub fn joint_from_feature_key(key: &str) -> Option<&str> {
    key.strip_suffix(POSITION_SUFFIX)
}

/// 单个关节的物理规格
///
/// 不变量：`min_native < max_native`，`max_velocity > 0`，且均为有限值。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JointSpec {
    name: String,
    min_native: f64,
    max_native: f64,
    max_velocity: f64,
}

impl JointSpec {
    /// 创建关节规格
    ///
    /// # 参数
    ///
    /// - `min_native` / `max_native`: 原生角度范围（度）
    /// - `max_velocity`: 最大速度（度/秒）
    ///
    /// # 错误
    ///
    /// 范围为空、反向或含非有限值，以及速度非正时返回 `InvalidConfig`。
    pub fn new(
        name: impl Into<String>,
        min_native: f64,
        max_native: f64,
        max_velocity: f64,
    ) -> Result<Self, ControlError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ControlError::invalid_config("joint name must not be empty"));
        }
        if !min_native.is_finite() || !max_native.is_finite() {
            return Err(ControlError::invalid_config(format!(
                "joint {name}: limits must be finite ({min_native}, {max_native})"
            )));
        }
        if min_native >= max_native {
            return Err(ControlError::invalid_config(format!(
                "joint {name}: min_native ({min_native}) must be < max_native ({max_native})"
            )));
        }
        if !(max_velocity.is_finite() && max_velocity > 0.0) {
            return Err(ControlError::invalid_config(format!(
                "joint {name}: max_velocity must be > 0 (got {max_velocity})"
            )));
        }

        Ok(JointSpec {
            name,
            min_native,
            max_native,
            max_velocity,
        })
    }

    /// 关节名称
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 原生下限（度）
    #[inline]
    pub fn min_native(&self) -> f64 {
        self.min_native
    }

    /// 原生上限（度）
    #[inline]
    pub fn max_native(&self) -> f64 {
        self.max_native
    }

    /// 最大速度（度/秒）
    #[inline]
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// 原生范围宽度
    #[inline]
    pub fn span(&self) -> f64 {
        self.max_native - self.min_native
    }

    /// 是否在原生范围内（闭区间）
    #[inline]
    pub fn contains(&self, native: f64) -> bool {
        native >= self.min_native && native <= self.max_native
    }

    /// 钳位到原生范围
    #[inline]
    pub fn clamp(&self, native: f64) -> f64 {
        native.clamp(self.min_native, self.max_native)
    }

    /// 特征键（`"<name>.pos"`）
    pub fn feature_key(&self) -> String {
        feature_key(&self.name)
    }
}

impl fmt::Display for JointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.1}°, {:.1}°] ≤{:.1}°/s",
            self.name, self.min_native, self.max_native, self.max_velocity
        )
    }
}

/// 一台机械臂的关节集合
///
/// `joints` 的顺序即设备 `read_joint_angles` / `write_joint_angles` 的顺序；
/// 夹爪单独存放，通过夹爪接口读写。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JointSet {
    joints: Vec<JointSpec>,
    gripper: Option<JointSpec>,
}

impl JointSet {
    /// 创建关节集合
    ///
    /// # 错误
    ///
    /// 关节为空或名称重复时返回 `InvalidConfig`。
    pub fn new(joints: Vec<JointSpec>, gripper: Option<JointSpec>) -> Result<Self, ControlError> {
        if joints.is_empty() {
            return Err(ControlError::invalid_config("joint set must contain at least one joint"));
        }

        let mut seen = HashSet::new();
        for spec in joints.iter().chain(gripper.iter()) {
            if !seen.insert(spec.name()) {
                return Err(ControlError::invalid_config(format!(
                    "duplicate joint name: {}",
                    spec.name()
                )));
            }
        }

        Ok(JointSet { joints, gripper })
    }

    /// RoArm-M3 出厂限位
    ///
    /// 关节最大速度 3.0 rad/s，夹爪 2.0 rad/s（均换算为度/秒）。
    pub fn roarm_m3() -> Self {
        const JOINT_VELOCITY_RAD_S: f64 = 3.0;
        const GRIPPER_VELOCITY_RAD_S: f64 = 2.0;

        let joint_velocity = JOINT_VELOCITY_RAD_S.to_degrees();
        let limits = [
            ("shoulder_pan", -190.0, 190.0),
            ("shoulder_lift", -110.0, 110.0),
            ("elbow_flex", -70.0, 190.0),
            ("wrist_flex", -110.0, 110.0),
            ("wrist_roll", -190.0, 190.0),
        ];

        let joints = limits
            .iter()
            .map(|&(name, min, max)| JointSpec {
                name: name.to_string(),
                min_native: min,
                max_native: max,
                max_velocity: joint_velocity,
            })
            .collect();

        let gripper = JointSpec {
            name: "gripper".to_string(),
            min_native: -10.0,
            max_native: 100.0,
            max_velocity: GRIPPER_VELOCITY_RAD_S.to_degrees(),
        };

        JointSet {
            joints,
            gripper: Some(gripper),
        }
    }

    /// 有序关节（不含夹爪）
    #[inline]
    pub fn joints(&self) -> &[JointSpec] {
        &self.joints
    }

    /// 夹爪规格
    #[inline]
    pub fn gripper(&self) -> Option<&JointSpec> {
        self.gripper.as_ref()
    }

    /// 关节数量（不含夹爪）
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// 按名称查找（关节或夹爪）
    pub fn get(&self, name: &str) -> Option<&JointSpec> {
        self.iter().find(|spec| spec.name() == name)
    }

    /// 是否为夹爪
    pub fn is_gripper(&self, name: &str) -> bool {
        self.gripper.as_ref().is_some_and(|g| g.name() == name)
    }

    /// 遍历所有规格（先关节，后夹爪）
    pub fn iter(&self) -> impl Iterator<Item = &JointSpec> {
        self.joints.iter().chain(self.gripper.iter())
    }

    /// 动作/观测特征键
    pub fn feature_keys(&self) -> Vec<String> {
        self.iter().map(JointSpec::feature_key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_spec_rejects_inverted_range() {
        assert!(JointSpec::new("j", 10.0, 10.0, 1.0).is_err());
        assert!(JointSpec::new("j", 10.0, -10.0, 1.0).is_err());
        assert!(JointSpec::new("j", f64::NEG_INFINITY, 10.0, 1.0).is_err());
        assert!(JointSpec::new("j", -10.0, 10.0, 0.0).is_err());
        assert!(JointSpec::new("", -10.0, 10.0, 1.0).is_err());
        assert!(JointSpec::new("j", -10.0, 10.0, 1.0).is_ok());
    }

    #[test]
    fn test_joint_spec_clamp_and_contains() {
        let spec = JointSpec::new("elbow_flex", -70.0, 190.0, 100.0).unwrap();
        assert_eq!(spec.span(), 260.0);
        assert!(spec.contains(-70.0));
        assert!(spec.contains(190.0));
        assert!(!spec.contains(190.5));
        assert_eq!(spec.clamp(250.0), 190.0);
        assert_eq!(spec.clamp(-100.0), -70.0);
        assert_eq!(spec.feature_key(), "elbow_flex.pos");
    }

    #[test]
    fn test_joint_set_rejects_duplicates() {
        let a = JointSpec::new("a", -1.0, 1.0, 1.0).unwrap();
        let err = JointSet::new(vec![a.clone(), a.clone()], None).unwrap_err();
        assert!(err.is_config_error());

        let gripper = JointSpec::new("a", 0.0, 90.0, 1.0).unwrap();
        assert!(JointSet::new(vec![a], Some(gripper)).is_err());

        assert!(JointSet::new(vec![], None).is_err());
    }

    #[test]
    fn test_roarm_m3_layout() {
        let set = JointSet::roarm_m3();
        assert_eq!(set.joint_count(), 5);
        assert!(set.is_gripper("gripper"));
        assert!(!set.is_gripper("wrist_roll"));
        assert_eq!(
            set.feature_keys(),
            vec![
                "shoulder_pan.pos",
                "shoulder_lift.pos",
                "elbow_flex.pos",
                "wrist_flex.pos",
                "wrist_roll.pos",
                "gripper.pos",
            ]
        );
        let gripper = set.gripper().unwrap();
        assert_eq!((gripper.min_native(), gripper.max_native()), (-10.0, 100.0));
        assert!((set.joints()[0].max_velocity() - 3.0_f64.to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_feature_key_helpers() {
        assert_eq!(feature_key("gripper"), "gripper.pos");
        assert_eq!(joint_from_feature_key("gripper.pos"), Some("gripper"));
        assert_eq!(joint_from_feature_key("wrist_cam"), None);
    }
}
