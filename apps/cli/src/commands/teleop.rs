//! 遥操作命令
//!
//! 主臂（力矩失能，由人手拖动）按固定频率镜像到从臂。仿真模式下由一个后台线程
//! 以缓慢的正弦运动拖动主臂。结束后以 JSON 输出循环统计。

use super::config::load_config;
use super::install_interrupt_handler;
use anyhow::{Context, Result};
use clap::Args;
use roarm_control::prelude::{
    ArmFollower, ArmLeader, ControlLoop, JointSet, LoopConfig, SimulatedArm,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// 仿真操作者更新主臂的间隔
const OPERATOR_STEP: Duration = Duration::from_millis(20);

/// 遥操作命令参数
#[derive(Args, Debug)]
pub struct TeleopCommand {
    /// 控制频率（Hz，覆盖配置）
    #[arg(short, long)]
    pub rate: Option<f64>,

    /// 运行时长（秒），不指定则运行到 Ctrl-C
    #[arg(short, long)]
    pub duration: Option<f64>,
}

impl TeleopCommand {
    /// 组合配置与命令行参数
    fn loop_config(&self, base: LoopConfig) -> Result<LoopConfig> {
        let mut config = base;
        if let Some(rate) = self.rate {
            config.rate_hz = rate;
        }
        config.validate()?;

        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration <= 0.0 {
                anyhow::bail!("duration must be positive, got {duration}");
            }
            config.max_ticks = Some((duration * config.rate_hz).ceil().max(1.0) as u64);
        }
        Ok(config)
    }

    /// 执行遥操作
    pub fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let joints = config.joint_set()?;
        let loop_config = self.loop_config(config.loop_config())?;

        let source = Arc::new(SimulatedArm::new("leader", joints.joint_count()));
        let sink = Arc::new(SimulatedArm::new("follower", joints.joint_count()));
        let leader = Arc::new(ArmLeader::new(source.clone(), joints.clone()));
        let follower =
            Arc::new(ArmFollower::new(sink, joints.clone()).with_motion(config.motion_profile()));

        leader.connect().context("Failed to connect leader")?;
        follower.connect().context("Failed to connect follower")?;

        let mut control = ControlLoop::new(leader.clone(), follower.clone(), loop_config);
        let handle = control.stop_handle();
        install_interrupt_handler(move || handle.stop())?;

        let operator_done = Arc::new(AtomicBool::new(false));
        let operator = {
            let done = operator_done.clone();
            let source = source.clone();
            thread::Builder::new()
                .name("roarm-sim-operator".into())
                .spawn(move || drive_leader(&source, &joints, &done))
                .context("Failed to spawn simulated operator")?
        };

        println!(
            "🤖 Mirroring leader → follower at {} Hz{}",
            loop_config.rate_hz,
            match loop_config.max_ticks {
                Some(ticks) => format!(" for {ticks} ticks"),
                None => " (Ctrl-C to stop)".to_string(),
            }
        );

        let result = control.start().and_then(|_| control.wait());

        operator_done.store(true, Ordering::SeqCst);
        if operator.join().is_err() {
            tracing::warn!("Simulated operator thread panicked");
        }
        if let Err(e) = follower.disconnect() {
            tracing::warn!("Failed to disconnect follower: {}", e);
        }
        if let Err(e) = leader.disconnect() {
            tracing::warn!("Failed to disconnect leader: {}", e);
        }
        result.context("Control loop failed")?;

        let report = serde_json::json!({
            "metrics": control.metrics(),
            "last_observation": control.last_observation().map(|obs| obs.to_features()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    }
}

/// 仿真操作者：每个关节在各自量程中部做相位错开的正弦摆动
fn drive_leader(source: &SimulatedArm, joints: &JointSet, done: &AtomicBool) {
    let begin = Instant::now();
    while !done.load(Ordering::SeqCst) {
        let t = begin.elapsed().as_secs_f64();
        let angles: Vec<f64> = joints
            .joints()
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let mid = (spec.min_native() + spec.max_native()) / 2.0;
                let amplitude = spec.span() * 0.2;
                let phase = i as f64 * std::f64::consts::FRAC_PI_3;
                mid + amplitude * (std::f64::consts::TAU * 0.2 * t + phase).sin()
            })
            .collect();
        source.set_joint_angles(&angles);

        if let Some(gripper) = joints.gripper() {
            let open = (std::f64::consts::TAU * 0.1 * t).sin() * 0.5 + 0.5;
            source.set_gripper_angle(gripper.min_native() + open * gripper.span());
        }

        thread::sleep(OPERATOR_STEP);
    }
}
