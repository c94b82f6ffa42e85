//! # RoArm CLI
//!
//! RoArm 机械臂命令行工具。设备层为仿真臂，用于在无硬件时演练控制流程。
//!
//! ```bash
//! # 主从遥操作，10 Hz 运行 5 秒
//! roarm-cli teleop --rate 10 --duration 5
//!
//! # 笛卡尔轨迹
//! roarm-cli trajectory circle-xz --duration 10 --rate 20
//!
//! # 急停
//! roarm-cli stop
//!
//! # 配置
//! roarm-cli config default > config.toml
//! roarm-cli --config config.toml config check
//! ```
//!
//! Ctrl-C 会让正在运行的循环在当前周期结束后停止。

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, StopCommand, TeleopCommand, TrajectoryCommand};

/// 未设置 RUST_LOG 时的日志级别
const DEFAULT_LOG_DIRECTIVES: &str = "roarm_cli=info,roarm_control=info";

/// RoArm CLI - 机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "roarm-cli")]
#[command(about = "Command-line interface for RoArm teleoperation and Cartesian scripting", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（默认 <config_dir>/roarm/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 主从遥操作（主臂镜像到从臂）
    Teleop {
        #[command(flatten)]
        args: TeleopCommand,
    },

    /// 下发笛卡尔轨迹
    Trajectory {
        #[command(flatten)]
        args: TrajectoryCommand,
    },

    /// 急停（失能从臂力矩）
    Stop {
        #[command(flatten)]
        args: StopCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Teleop { args } => args.execute(config_path),
        Commands::Trajectory { args } => args.execute(config_path),
        Commands::Stop { args } => args.execute(config_path),
        Commands::Config(cmd) => cmd.execute(config_path),
    }
}
