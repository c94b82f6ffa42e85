//! 命令与观测
//!
//! - [`NormalizedCommand`]: 百分比动作（[-100, 100]），系统边界上的通用动作格式
//! - [`NativeCommand`]: 设备原生角度命令（度）
//! - [`Observation`]: 弧度观测 + 不透明的传感器负载
//!
//! 三者都是每个 tick 临时生成的值，不做持久化。

use super::joint::{feature_key, joint_from_feature_key};
use super::units::Rad;
use bytes::Bytes;
use std::collections::BTreeMap;

/// 百分比下限
pub const PERCENT_MIN: f64 = -100.0;
/// 百分比上限
pub const PERCENT_MAX: f64 = 100.0;

/// 百分比动作命令
///
/// 关节名 → [-100, 100] 的无量纲值。缺失的关节表示"保持当前位置"。
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedCommand(BTreeMap<String, f64>);

impl NormalizedCommand {
    /// 创建空命令
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 LeRobot 动作字典构造（只接受 `"<joint>.pos"` 键）
    pub fn from_action<'a, I>(action: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let values = action
            .into_iter()
            .filter_map(|(key, value)| joint_from_feature_key(key).map(|j| (j.to_string(), value)))
            .collect();
        NormalizedCommand(values)
    }

    /// 转换为 LeRobot 动作字典
    pub fn to_action(&self) -> BTreeMap<String, f64> {
        self.0.iter().map(|(joint, &v)| (feature_key(joint), v)).collect()
    }

    /// 设置关节值
    pub fn insert(&mut self, joint: impl Into<String>, percentage: f64) -> Option<f64> {
        self.0.insert(joint.into(), percentage)
    }

    /// 读取关节值
    pub fn get(&self, joint: &str) -> Option<f64> {
        self.0.get(joint).copied()
    }

    /// 遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// 关节数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for NormalizedCommand {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        NormalizedCommand(iter.into_iter().collect())
    }
}

/// 原生角度命令（度）
///
/// 经过 SafetyGate 之后，每个值都在对应关节的 `[min_native, max_native]` 内。
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NativeCommand(BTreeMap<String, f64>);

impl NativeCommand {
    /// 创建空命令
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置关节值
    pub fn insert(&mut self, joint: impl Into<String>, degrees: f64) -> Option<f64> {
        self.0.insert(joint.into(), degrees)
    }

    /// 读取关节值
    pub fn get(&self, joint: &str) -> Option<f64> {
        self.0.get(joint).copied()
    }

    /// 是否包含关节
    pub fn contains(&self, joint: &str) -> bool {
        self.0.contains_key(joint)
    }

    /// 遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// 可变遍历
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut f64)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// 用 `other` 中缺失的关节补全自身（已有值不覆盖）
    pub fn fill_from(&mut self, other: &NativeCommand) {
        for (joint, &value) in &other.0 {
            self.0.entry(joint.clone()).or_insert(value);
        }
    }

    /// 关节数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for NativeCommand {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        NativeCommand(iter.into_iter().collect())
    }
}

/// 观测
///
/// 关节位置以弧度上报；`payloads` 保存相机帧等不透明数据，控制层只透传。
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Observation {
    positions: BTreeMap<String, Rad>,
    #[cfg_attr(feature = "serde", serde(skip))]
    payloads: BTreeMap<String, Bytes>,
}

impl Observation {
    /// 创建空观测
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录关节位置
    pub fn set_position(&mut self, joint: impl Into<String>, position: Rad) {
        self.positions.insert(joint.into(), position);
    }

    /// 读取关节位置
    pub fn position(&self, joint: &str) -> Option<Rad> {
        self.positions.get(joint).copied()
    }

    /// 遍历关节位置
    pub fn positions(&self) -> impl Iterator<Item = (&str, Rad)> {
        self.positions.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// 附加不透明负载（链式）
    pub fn with_payload(mut self, name: impl Into<String>, data: Bytes) -> Self {
        self.payloads.insert(name.into(), data);
        self
    }

    /// 读取负载
    pub fn payload(&self, name: &str) -> Option<&Bytes> {
        self.payloads.get(name)
    }

    /// 转换为 LeRobot 观测字典（`"<joint>.pos"` → 弧度）
    pub fn to_features(&self) -> BTreeMap<String, f64> {
        self.positions.iter().map(|(joint, rad)| (feature_key(joint), rad.0)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_action_filters_non_position_keys() {
        let action = [("elbow_flex.pos", 10.0), ("wrist_cam", 1.0), ("gripper.pos", -5.0)];
        let cmd = NormalizedCommand::from_action(action);
        assert_eq!(cmd.len(), 2);
        assert_eq!(cmd.get("elbow_flex"), Some(10.0));
        assert_eq!(cmd.get("gripper"), Some(-5.0));
        assert_eq!(cmd.get("wrist_cam"), None);

        let back = cmd.to_action();
        assert_eq!(back.get("elbow_flex.pos"), Some(&10.0));
    }

    #[test]
    fn test_native_fill_from_keeps_existing() {
        let mut cmd: NativeCommand = [("a".to_string(), 1.0)].into_iter().collect();
        let held: NativeCommand =
            [("a".to_string(), 9.0), ("b".to_string(), 2.0)].into_iter().collect();
        cmd.fill_from(&held);
        assert_eq!(cmd.get("a"), Some(1.0));
        assert_eq!(cmd.get("b"), Some(2.0));
    }

    #[test]
    fn test_observation_payload_passthrough() {
        let frame = Bytes::from_static(&[1, 2, 3]);
        let mut obs = Observation::new().with_payload("wrist_cam", frame.clone());
        obs.set_position("elbow_flex", Rad(0.5));

        assert_eq!(obs.payload("wrist_cam"), Some(&frame));
        let features = obs.to_features();
        assert_eq!(features.len(), 1);
        assert_eq!(features.get("elbow_flex.pos"), Some(&0.5));
    }
}
