//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use roarm_control::prelude::*;
//! ```

pub use crate::adapter::{CartesianAdapter, DeviceAdapter, MotionProfile};
pub use crate::control::{
    Axis, ControlLoop, LoopConfig, LoopMetricsSnapshot, LoopPhase, LoopState, StopHandle,
    StreamReport, TickOutcome, Trajectory, TrajectoryPlanner, stream_trajectory,
};
pub use crate::convert::UnitConverter;
pub use crate::limiter::VelocityLimiter;
pub use crate::robot::{ArmFollower, ArmLeader, JointReading};
pub use crate::safety::{EmergencyStopOutcome, SafetyGate};
pub use crate::sim::SimulatedArm;
pub use crate::types::*;
