//! 配置管理命令
//!
//! 配置文件查找顺序：`--config` 指定的路径，其次 `<config_dir>/roarm/config.toml`，
//! 都不存在时使用 RoArm-M3 出厂配置。

use anyhow::{Context, Result};
use clap::Subcommand;
use roarm_config::RoarmConfig;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("roarm").join("config.toml"))
}

/// 加载配置
///
/// 显式指定的文件必须存在；默认位置的文件缺失时回退到出厂配置。
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<RoarmConfig> {
    if let Some(path) = explicit {
        return RoarmConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match default_config_file() {
        Some(path) if path.exists() => RoarmConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        _ => {
            tracing::debug!("No config file found, using factory defaults");
            Ok(RoarmConfig::default())
        },
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置
    Show,

    /// 校验配置文件
    Check,

    /// 输出出厂配置
    Default {
        /// 写入文件（默认输出到 stdout）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl ConfigCommand {
    /// 执行配置命令
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = load_config(config_path)?;
                print!("{}", config.to_toml_string()?);
            },

            ConfigCommand::Check => {
                let config = load_config(config_path)?;
                let joints = config.joint_set()?;
                println!(
                    "✅ Config OK: {} ({} joints{}, {}, {} Hz)",
                    config.roarm_type,
                    joints.joint_count(),
                    if joints.gripper().is_some() { " + gripper" } else { "" },
                    config.connection.transport()?,
                    config.control.rate_hz,
                );
            },

            ConfigCommand::Default { output } => {
                let content = RoarmConfig::default().to_toml_string()?;
                match output {
                    Some(path) => {
                        if let Some(parent) = path.parent()
                            && !parent.as_os_str().is_empty()
                        {
                            std::fs::create_dir_all(parent).with_context(|| {
                                format!("Failed to create directory {}", parent.display())
                            })?;
                        }
                        std::fs::write(&path, content)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        println!("✅ Wrote default config to {}", path.display());
                    },
                    None => print!("{content}"),
                }
            },
        }

        Ok(())
    }
}
