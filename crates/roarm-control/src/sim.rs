//! 仿真机械臂
//!
//! 无硬件依赖的 [`DeviceAdapter`] / [`CartesianAdapter`] 实现，用于测试和 CLI 演示。
//! 支持故障注入（读写失败、读取延迟、掉线）并记录所有写入。

use crate::adapter::{CartesianAdapter, DeviceAdapter, MotionProfile};
use crate::types::{AdapterError, CartesianPose};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug)]
struct SimState {
    connected: bool,
    torque_enabled: bool,
    joints: Vec<f64>,
    gripper: f64,
    pose: CartesianPose,
    fail_reads: u32,
    fail_writes: u32,
    fail_gripper_reads: u32,
    read_delay: Duration,
    joint_writes: Vec<Vec<f64>>,
    gripper_writes: Vec<f64>,
    pose_writes: Vec<CartesianPose>,
}

/// 仿真机械臂
///
/// 写入立即生效（无动力学），读出即上一次写入或手动设置的值。
#[derive(Debug)]
pub struct SimulatedArm {
    name: String,
    state: Mutex<SimState>,
    read_attempts: AtomicU64,
    write_attempts: AtomicU64,
}

impl SimulatedArm {
    /// 创建仿真臂（所有关节位于 0°，未连接）
    pub fn new(name: impl Into<String>, joint_count: usize) -> Self {
        SimulatedArm {
            name: name.into(),
            state: Mutex::new(SimState {
                connected: false,
                torque_enabled: false,
                joints: vec![0.0; joint_count],
                gripper: 0.0,
                pose: CartesianPose::new(150.0, 0.0, 250.0, 0.0, 0.0, 0.0),
                fail_reads: 0,
                fail_writes: 0,
                fail_gripper_reads: 0,
                read_delay: Duration::ZERO,
                joint_writes: Vec::new(),
                gripper_writes: Vec::new(),
                pose_writes: Vec::new(),
            }),
            read_attempts: AtomicU64::new(0),
            write_attempts: AtomicU64::new(0),
        }
    }

    /// 模拟手动拖动关节（不记录为写入）
    pub fn set_joint_angles(&self, angles: &[f64]) {
        self.state.lock().joints = angles.to_vec();
    }

    /// 模拟手动拖动夹爪
    pub fn set_gripper_angle(&self, angle: f64) {
        self.state.lock().gripper = angle;
    }

    /// 设置当前末端位姿
    pub fn set_pose(&self, pose: CartesianPose) {
        self.state.lock().pose = pose;
    }

    /// 接下来 `n` 次读取失败
    pub fn fail_next_reads(&self, n: u32) {
        self.state.lock().fail_reads = n;
    }

    /// 接下来 `n` 次夹爪读取失败（关节读取不受影响）
    pub fn fail_next_gripper_reads(&self, n: u32) {
        self.state.lock().fail_gripper_reads = n;
    }

    /// 接下来 `n` 次写入失败
    pub fn fail_next_writes(&self, n: u32) {
        self.state.lock().fail_writes = n;
    }

    /// 每次读取前的延迟（模拟慢速链路）
    pub fn set_read_delay(&self, delay: Duration) {
        self.state.lock().read_delay = delay;
    }

    /// 模拟掉线（不经过 `disconnect`）
    pub fn drop_connection(&self) {
        self.state.lock().connected = false;
    }

    /// 力矩是否使能
    pub fn torque_enabled(&self) -> bool {
        self.state.lock().torque_enabled
    }

    /// 读取尝试次数（含失败）
    pub fn read_attempts(&self) -> u64 {
        self.read_attempts.load(Ordering::SeqCst)
    }

    /// 写入尝试次数（关节/夹爪/位姿，含失败）
    pub fn write_attempts(&self) -> u64 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// 成功写入的关节命令历史
    pub fn joint_writes(&self) -> Vec<Vec<f64>> {
        self.state.lock().joint_writes.clone()
    }

    /// 最近一次成功写入的关节命令
    pub fn last_joint_write(&self) -> Option<Vec<f64>> {
        self.state.lock().joint_writes.last().cloned()
    }

    /// 成功写入的夹爪命令历史
    pub fn gripper_writes(&self) -> Vec<f64> {
        self.state.lock().gripper_writes.clone()
    }

    /// 成功写入的位姿历史
    pub fn pose_writes(&self) -> Vec<CartesianPose> {
        self.state.lock().pose_writes.clone()
    }

    fn begin_read(&self) -> Result<(), AdapterError> {
        self.read_attempts.fetch_add(1, Ordering::SeqCst);

        let delay = self.state.lock().read_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        if !state.connected {
            return Err(AdapterError::Disconnected);
        }
        if state.fail_reads > 0 {
            state.fail_reads -= 1;
            return Err(AdapterError::ReadFailed(format!("{}: injected read fault", self.name)));
        }
        Ok(())
    }

    fn begin_write(&self, state: &mut SimState) -> Result<(), AdapterError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);

        if !state.connected {
            return Err(AdapterError::Disconnected);
        }
        if state.fail_writes > 0 {
            state.fail_writes -= 1;
            return Err(AdapterError::WriteFailed(format!("{}: injected write fault", self.name)));
        }
        Ok(())
    }
}

impl DeviceAdapter for SimulatedArm {
    fn name(&self) -> &str {
        &self.name
    }

    fn connect(&self) -> Result<(), AdapterError> {
        self.state.lock().connected = true;
        tracing::debug!("Simulated arm '{}' connected", self.name);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.connected = false;
        state.torque_enabled = false;
        tracing::debug!("Simulated arm '{}' disconnected", self.name);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn read_joint_angles(&self) -> Result<Vec<f64>, AdapterError> {
        self.begin_read()?;
        Ok(self.state.lock().joints.clone())
    }

    fn write_joint_angles(
        &self,
        angles: &[f64],
        _motion: MotionProfile,
    ) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        self.begin_write(&mut state)?;
        state.joints = angles.to_vec();
        state.joint_writes.push(angles.to_vec());
        Ok(())
    }

    fn read_gripper(&self) -> Result<f64, AdapterError> {
        self.begin_read()?;
        let mut state = self.state.lock();
        if state.fail_gripper_reads > 0 {
            state.fail_gripper_reads -= 1;
            return Err(AdapterError::ReadFailed(format!(
                "{}: injected gripper fault",
                self.name
            )));
        }
        Ok(state.gripper)
    }

    fn write_gripper(&self, angle: f64, _motion: MotionProfile) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        self.begin_write(&mut state)?;
        state.gripper = angle;
        state.gripper_writes.push(angle);
        Ok(())
    }

    fn set_torque(&self, enabled: bool) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(AdapterError::Disconnected);
        }
        state.torque_enabled = enabled;
        Ok(())
    }
}

impl CartesianAdapter for SimulatedArm {
    fn read_pose(&self) -> Result<CartesianPose, AdapterError> {
        self.begin_read()?;
        Ok(self.state.lock().pose)
    }

    fn write_pose(&self, pose: &CartesianPose) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        self.begin_write(&mut state)?;
        state.pose = *pose;
        state.pose_writes.push(*pose);
        Ok(())
    }
}
