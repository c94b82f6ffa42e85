//! 集成测试公共设施
//!
//! 一对已连接的仿真主臂 / 从臂，以及轮询等待工具。

#![allow(dead_code)]

use roarm_control::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 安装测试日志（重复调用无害）
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("roarm_control=debug"))
        .with_test_writer()
        .try_init();
}

/// RoArm-M3 的五个关节（不含夹爪）
///
/// 每个 tick 只读取一次主臂，`read_attempts()` 即 tick 序号。
pub fn joints_without_gripper() -> JointSet {
    let full = JointSet::roarm_m3();
    JointSet::new(full.joints().to_vec(), None).unwrap()
}

/// 主从测试台
pub struct Rig {
    pub source: Arc<SimulatedArm>,
    pub sink: Arc<SimulatedArm>,
    pub leader: Arc<ArmLeader>,
    pub follower: Arc<ArmFollower>,
}

impl Rig {
    /// 创建并连接主从臂
    pub fn connected(joints: JointSet) -> Self {
        let rig = Self::disconnected(joints);
        rig.leader.connect().unwrap();
        rig.follower.connect().unwrap();
        rig
    }

    /// 创建但不连接
    pub fn disconnected(joints: JointSet) -> Self {
        let count = joints.joint_count();
        let source = Arc::new(SimulatedArm::new("leader", count));
        let sink = Arc::new(SimulatedArm::new("follower", count));
        let leader = Arc::new(ArmLeader::new(source.clone(), joints.clone()));
        let follower = Arc::new(ArmFollower::new(sink.clone(), joints));
        Rig {
            source,
            sink,
            leader,
            follower,
        }
    }

    /// 以给定配置构造控制循环
    pub fn control_loop(&self, config: LoopConfig) -> ControlLoop {
        ControlLoop::new(self.leader.clone(), self.follower.clone(), config)
    }
}

/// 轮询直到条件成立或超时
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
