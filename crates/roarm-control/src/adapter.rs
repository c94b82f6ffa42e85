//! DeviceAdapter - 设备能力接口
//!
//! 控制层只通过这组窄接口与机械臂交互，具体传输（串口、WiFi、仿真）对控制层不可见。
//!
//! # 约定
//!
//! - 所有方法取 `&self`：实现方自行做内部同步，这样同一个适配器可以同时被控制线程
//!   和调用方线程（急停）使用。
//! - 读失败以 [`AdapterError`] 返回，不得 panic；调用方据此跳过当前 tick。
//! - 每个调用都应有自己的有界超时。控制循环没有独立的取消路径，适配器一旦阻塞，
//!   循环也会阻塞。
//!
//! # 示例
//!
//! ```rust
//! use roarm_control::adapter::{DeviceAdapter, MotionProfile};
//! use roarm_control::sim::SimulatedArm;
//!
//! let arm = SimulatedArm::new("follower", 5);
//! arm.connect().unwrap();
//! arm.write_joint_angles(&[0.0, 10.0, 60.0, 0.0, 0.0], MotionProfile::default()).unwrap();
//! assert_eq!(arm.read_joint_angles().unwrap()[2], 60.0);
//! ```

use crate::types::{AdapterError, CartesianPose};

/// 运动参数（透传给设备固件）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionProfile {
    /// 速度
    pub speed: u32,
    /// 加速度
    pub acceleration: u32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        MotionProfile {
            speed: 1000,
            acceleration: 50,
        }
    }
}

/// 关节空间设备能力
pub trait DeviceAdapter: Send + Sync {
    /// 设备名称（用于日志）
    fn name(&self) -> &str;

    /// 建立连接
    fn connect(&self) -> Result<(), AdapterError>;

    /// 断开连接
    fn disconnect(&self) -> Result<(), AdapterError>;

    /// 是否已连接
    fn is_connected(&self) -> bool;

    /// 读取关节角度（度，按关节顺序）
    fn read_joint_angles(&self) -> Result<Vec<f64>, AdapterError>;

    /// 写入关节角度（度，按关节顺序）
    fn write_joint_angles(&self, angles: &[f64], motion: MotionProfile)
    -> Result<(), AdapterError>;

    /// 读取夹爪角度（度）
    fn read_gripper(&self) -> Result<f64, AdapterError>;

    /// 写入夹爪角度（度）
    fn write_gripper(&self, angle: f64, motion: MotionProfile) -> Result<(), AdapterError>;

    /// 使能 / 失能力矩
    fn set_torque(&self, enabled: bool) -> Result<(), AdapterError>;
}

/// 笛卡尔空间设备能力（末端位姿读写，逆运动学由固件完成）
pub trait CartesianAdapter: Send + Sync {
    /// 读取末端位姿
    fn read_pose(&self) -> Result<CartesianPose, AdapterError>;

    /// 写入末端位姿
    fn write_pose(&self, pose: &CartesianPose) -> Result<(), AdapterError>;
}
