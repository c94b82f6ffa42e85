//! 主臂 / 从臂角色
//!
//! 同一个 [`DeviceAdapter`] 能力接口，两种用法：
//!
//! - [`ArmLeader`]（数据源）：连接后失能力矩，操作者手动拖动；输出百分比动作。
//! - [`ArmFollower`]（执行端）：连接后使能力矩；接收百分比动作并执行，上报弧度观测。
//!
//! 两者都显式持有自己的适配器实例，不依赖任何全局 SDK 句柄。

use crate::adapter::{DeviceAdapter, MotionProfile};
use crate::convert::UnitConverter;
use crate::safety::SafetyGate;
use crate::types::{
    AdapterError, ControlError, JointSet, NativeCommand, NormalizedCommand, Observation, Result,
    Role,
};
use std::sync::Arc;

/// 一次设备读数（原生角度，度）
#[derive(Debug, Clone, PartialEq)]
pub struct JointReading {
    /// 关节角度（按 `JointSet::joints()` 顺序）
    pub angles: Vec<f64>,
    /// 夹爪角度（关节集合不含夹爪时为 `None`）
    pub gripper: Option<f64>,
}

impl JointReading {
    /// 转换为百分比动作
    pub fn to_command(&self, joints: &JointSet) -> NormalizedCommand {
        UnitConverter::angles_to_command(joints, &self.angles, self.gripper)
    }

    /// 转换为弧度观测
    pub fn to_observation(&self, joints: &JointSet) -> Observation {
        UnitConverter::angles_to_observation(joints, &self.angles, self.gripper)
    }

    /// 按关节名索引的原生角度
    pub fn to_native(&self, joints: &JointSet) -> NativeCommand {
        let mut native: NativeCommand = joints
            .joints()
            .iter()
            .zip(&self.angles)
            .map(|(spec, &deg)| (spec.name().to_string(), deg))
            .collect();
        if let (Some(spec), Some(deg)) = (joints.gripper(), self.gripper) {
            native.insert(spec.name(), deg);
        }
        native
    }
}

/// 读取关节和夹爪；任何一项失败都视为整次读取失败
///
/// 返回的角度少于关节数时同样视为读取失败。
fn read_joints(adapter: &dyn DeviceAdapter, joints: &JointSet, role: Role) -> Result<JointReading> {
    let angles = adapter.read_joint_angles().map_err(|e| ControlError::read(role, e))?;
    if angles.len() < joints.joint_count() {
        return Err(ControlError::read(
            role,
            AdapterError::ReadFailed(format!(
                "'{}' returned {} angles, expected {}",
                adapter.name(),
                angles.len(),
                joints.joint_count()
            )),
        ));
    }

    let gripper = match joints.gripper() {
        Some(_) => Some(adapter.read_gripper().map_err(|e| ControlError::read(role, e))?),
        None => None,
    };

    Ok(JointReading { angles, gripper })
}

/// 主臂（遥操作数据源）
pub struct ArmLeader {
    adapter: Arc<dyn DeviceAdapter>,
    joints: JointSet,
}

impl ArmLeader {
    /// 创建主臂
    pub fn new(adapter: Arc<dyn DeviceAdapter>, joints: JointSet) -> Self {
        ArmLeader { adapter, joints }
    }

    /// 设备名称
    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// 关节集合
    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    /// 底层适配器
    pub fn adapter(&self) -> &Arc<dyn DeviceAdapter> {
        &self.adapter
    }

    /// 是否已连接
    pub fn is_connected(&self) -> bool {
        self.adapter.is_connected()
    }

    /// 连接并失能力矩（允许手动拖动）
    pub fn connect(&self) -> Result<()> {
        self.adapter.connect().map_err(|e| ControlError::connection(Role::Source, e))?;
        self.adapter
            .set_torque(false)
            .map_err(|e| ControlError::connection(Role::Source, e))?;
        tracing::info!("Leader '{}' connected, torque disabled", self.name());
        Ok(())
    }

    /// 重新使能力矩后断开
    pub fn disconnect(&self) -> Result<()> {
        if let Err(e) = self.adapter.set_torque(true) {
            tracing::warn!("Could not re-enable torque on leader '{}': {}", self.name(), e);
        }
        self.adapter.disconnect().map_err(|e| ControlError::connection(Role::Source, e))?;
        tracing::info!("Leader '{}' disconnected", self.name());
        Ok(())
    }

    /// 读取当前关节角度
    pub fn read(&self) -> Result<JointReading> {
        read_joints(self.adapter.as_ref(), &self.joints, Role::Source)
    }

    /// 当前姿态的百分比动作
    pub fn action(&self) -> Result<NormalizedCommand> {
        Ok(self.read()?.to_command(&self.joints))
    }
}

impl std::fmt::Debug for ArmLeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmLeader")
            .field("name", &self.name())
            .field("joints", &self.joints)
            .finish()
    }
}

/// 从臂（执行端）
pub struct ArmFollower {
    adapter: Arc<dyn DeviceAdapter>,
    joints: JointSet,
    motion: MotionProfile,
}

impl ArmFollower {
    /// 创建从臂（默认运动参数）
    pub fn new(adapter: Arc<dyn DeviceAdapter>, joints: JointSet) -> Self {
        ArmFollower {
            adapter,
            joints,
            motion: MotionProfile::default(),
        }
    }

    /// 指定运动参数
    pub fn with_motion(mut self, motion: MotionProfile) -> Self {
        self.motion = motion;
        self
    }

    /// 设备名称
    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// 关节集合
    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    /// 运动参数
    pub fn motion(&self) -> MotionProfile {
        self.motion
    }

    /// 底层适配器
    pub fn adapter(&self) -> &Arc<dyn DeviceAdapter> {
        &self.adapter
    }

    /// 是否已连接
    pub fn is_connected(&self) -> bool {
        self.adapter.is_connected()
    }

    /// 连接并使能力矩
    ///
    /// 力矩使能失败只记录警告，连接本身仍然成功。
    pub fn connect(&self) -> Result<()> {
        self.adapter.connect().map_err(|e| ControlError::connection(Role::Sink, e))?;
        if let Err(e) = self.adapter.set_torque(true) {
            tracing::warn!("Failed to enable torque on follower '{}': {}", self.name(), e);
        }
        tracing::info!("Follower '{}' connected", self.name());
        Ok(())
    }

    /// 释放力矩后断开
    pub fn disconnect(&self) -> Result<()> {
        if let Err(e) = self.adapter.set_torque(false) {
            tracing::warn!("Could not release torque on follower '{}': {}", self.name(), e);
        }
        self.adapter.disconnect().map_err(|e| ControlError::connection(Role::Sink, e))?;
        tracing::info!("Follower '{}' disconnected", self.name());
        Ok(())
    }

    /// 读取当前关节角度
    pub fn read(&self) -> Result<JointReading> {
        read_joints(self.adapter.as_ref(), &self.joints, Role::Sink)
    }

    /// 弧度观测（`"<joint>.pos"` → rad）
    pub fn observation(&self) -> Result<Observation> {
        Ok(self.read()?.to_observation(&self.joints))
    }

    /// 执行百分比动作
    ///
    /// 缺失的关节保持当前位置（读取一次从臂）；夹爪只在动作中出现时才写入。
    /// 返回实际下发的原生命令。
    pub fn send_action(&self, action: &NormalizedCommand) -> Result<NativeCommand> {
        let native = UnitConverter::command_to_native(&self.joints, action);
        self.send_native(&native)
    }

    /// 执行原生角度命令（经 SafetyGate 钳位）
    pub fn send_native(&self, native: &NativeCommand) -> Result<NativeCommand> {
        let complete = self.hold_missing(native)?;
        let safe = SafetyGate::validate(&complete, &self.joints);

        let angles: Vec<f64> = self
            .joints
            .joints()
            .iter()
            .filter_map(|spec| safe.get(spec.name()))
            .collect();
        self.adapter
            .write_joint_angles(&angles, self.motion)
            .map_err(|e| ControlError::write(Role::Sink, e))?;

        if let Some(angle) = self.joints.gripper().and_then(|spec| safe.get(spec.name())) {
            self.adapter
                .write_gripper(angle, self.motion)
                .map_err(|e| ControlError::write(Role::Sink, e))?;
        }

        tracing::trace!("Follower '{}' commanded {} joints", self.name(), safe.len());
        Ok(safe)
    }

    /// 用从臂当前位置补齐缺失的关节（不含夹爪）
    fn hold_missing(&self, native: &NativeCommand) -> Result<NativeCommand> {
        let mut complete = native.clone();
        let missing = self.joints.joints().iter().any(|spec| !native.contains(spec.name()));
        if !missing {
            return Ok(complete);
        }

        // read() 保证每个关节都有角度
        let current = self.read()?;
        for (spec, &deg) in self.joints.joints().iter().zip(&current.angles) {
            if !complete.contains(spec.name()) {
                complete.insert(spec.name(), deg);
            }
        }
        Ok(complete)
    }
}

impl std::fmt::Debug for ArmFollower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmFollower")
            .field("name", &self.name())
            .field("joints", &self.joints)
            .field("motion", &self.motion)
            .finish()
    }
}
