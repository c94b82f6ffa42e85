//! # RoArm Control
//!
//! RoArm 机械臂的关节命令转换与主从镜像控制层。
//!
//! # 数据流
//!
//! ```text
//! 主臂 DeviceAdapter --读取--> UnitConverter --百分比--> UnitConverter --原生角度-->
//!   VelocityLimiter --> SafetyGate --> 从臂 DeviceAdapter
//! ```
//!
//! # 模块
//!
//! - [`types`] - 单位、关节规格、命令 / 观测、错误
//! - [`convert`] - 百分比 / 原生角度 / 弧度转换
//! - [`limiter`] - 逐关节速度限制
//! - [`safety`] - 限位钳位与急停
//! - [`adapter`] - 设备能力接口
//! - [`robot`] - 主臂 / 从臂角色
//! - [`control`] - 控制循环与笛卡尔轨迹
//! - [`sim`] - 仿真机械臂
//!
//! 大多数场景直接使用 [`prelude`]：
//!
//! ```rust
//! use roarm_control::prelude::*;
//!
//! let joints = JointSet::roarm_m3();
//! let elbow = joints.get("elbow_flex").unwrap();
//! assert_eq!(UnitConverter::to_native(elbow, 0.0), 60.0);
//! ```

pub mod adapter;
pub mod control;
pub mod convert;
pub mod limiter;
pub mod prelude;
pub mod robot;
pub mod safety;
pub mod sim;
pub mod types;

pub use adapter::{CartesianAdapter, DeviceAdapter, MotionProfile};
pub use control::{ControlLoop, LoopConfig, LoopPhase};
pub use convert::UnitConverter;
pub use limiter::VelocityLimiter;
pub use robot::{ArmFollower, ArmLeader};
pub use safety::{EmergencyStopOutcome, SafetyGate};
pub use types::{ControlError, Result};
