//! 笛卡尔轨迹命令
//!
//! 以当前末端位姿为原点，按固定频率下发圆周或往复直线轨迹。

use super::config::load_config;
use super::install_interrupt_handler;
use anyhow::{Context, Result};
use clap::Args;
use roarm_control::prelude::{
    CartesianAdapter, DeviceAdapter, SimulatedArm, Trajectory, TrajectoryPlanner,
    stream_trajectory,
};
use std::path::Path;
use std::time::Duration;

/// 轨迹命令参数
#[derive(Args, Debug)]
pub struct TrajectoryCommand {
    /// 轨迹：circle-xy, circle-xz, line-x, line-y, line-z
    pub trajectory: Trajectory,

    /// 运行时长（秒）
    #[arg(short, long, default_value_t = 10.0)]
    pub duration: f64,

    /// 下发频率（Hz）
    #[arg(short, long, default_value_t = 20.0)]
    pub rate: f64,

    /// 直线轨迹的轴向位移反相（双臂镜像）
    #[arg(long)]
    pub invert: bool,
}

impl TrajectoryCommand {
    fn trajectory(&self) -> Trajectory {
        if self.invert {
            self.trajectory.inverted()
        } else {
            self.trajectory
        }
    }

    fn duration(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.duration)
            .ok()
            .filter(|d| !d.is_zero())
            .with_context(|| format!("duration must be positive, got {}", self.duration))
    }

    /// 执行轨迹
    pub fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let joints = config.joint_set()?;
        let duration = self.duration()?;

        let arm = SimulatedArm::new("cartesian", joints.joint_count());
        arm.connect().context("Failed to connect arm")?;
        if let Err(e) = arm.set_torque(true) {
            tracing::warn!("Failed to enable torque: {}", e);
        }

        let origin = arm.read_pose().context("Failed to read current pose")?;
        let planner = TrajectoryPlanner::new(
            self.trajectory(),
            origin,
            config.pose_limits(),
            duration,
            self.rate,
        )?;

        println!(
            "🧭 Streaming {} ({} poses at {} Hz) around ({:.1}, {:.1}, {:.1})",
            self.trajectory.name(),
            planner.len(),
            self.rate,
            planner.center().x,
            planner.center().y,
            planner.center().z,
        );

        // Ctrl-C 置位的标志即下发循环的停止标志
        let interrupted = install_interrupt_handler(|| {})?;
        let report = stream_trajectory(&arm, planner, &interrupted)?;

        if let Err(e) = arm.disconnect() {
            tracing::warn!("Failed to disconnect arm: {}", e);
        }

        let summary = serde_json::json!({
            "trajectory": self.trajectory.name(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);

        Ok(())
    }
}
