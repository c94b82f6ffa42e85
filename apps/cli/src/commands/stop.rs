//! 急停命令
//!
//! 连接从臂并失能全部关节力矩。失能失败只报告，不视为命令错误。

use super::config::load_config;
use anyhow::{Context, Result};
use clap::Args;
use roarm_control::prelude::{ArmFollower, EmergencyStopOutcome, SafetyGate, SimulatedArm};
use std::path::Path;
use std::sync::Arc;

/// 急停命令参数
#[derive(Args, Debug)]
pub struct StopCommand {
    /// 从臂名称
    #[arg(long, default_value = "follower")]
    pub name: String,
}

impl StopCommand {
    /// 执行急停
    pub fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let joints = config.joint_set()?;

        println!("🔌 Connecting to {} ({})...", self.name, config.connection.transport()?);
        let arm = Arc::new(SimulatedArm::new(self.name.clone(), joints.joint_count()));
        let follower = ArmFollower::new(arm.clone(), joints).with_motion(config.motion_profile());
        follower.connect().context("Failed to connect follower")?;

        println!("🛑 Disabling torque on all joints...");
        match SafetyGate::emergency_stop(arm.as_ref()) {
            EmergencyStopOutcome::Engaged => println!("✅ Emergency stop engaged"),
            EmergencyStopOutcome::Failed(err) => {
                println!("⚠️  Emergency stop could not be confirmed: {err}")
            },
        }

        Ok(())
    }
}
