//! RoArm 配置文件
//!
//! # 格式
//!
//! ```toml
//! roarm_type = "roarm_m3"
//!
//! [connection]            # 从臂（执行端）
//! port = "/dev/ttyUSB0"   # 串口，与 host 二选一
//! baudrate = 115200
//!
//! [leader]                # 主臂（遥操作），可选
//! host = "192.168.4.1"
//!
//! [motion]
//! default_speed = 1000
//! default_acc = 50
//!
//! [safety]
//! max_joint_velocity = 3.0    # rad/s
//! max_gripper_velocity = 2.0  # rad/s
//!
//! [control]
//! rate_hz = 10.0
//!
//! [[joints]]
//! name = "shoulder_pan"
//! min_deg = -190.0
//! max_deg = 190.0
//!
//! [gripper]
//! name = "gripper"
//! min_deg = -10.0
//! max_deg = 100.0
//! ```
//!
//! 缺省的节使用 RoArm-M3 出厂值。速度限制以 rad/s 配置，构建 [`JointSet`] 时换算为
//! 度/秒，与关节原生单位一致。

use crate::error::{ConfigError, Result};
use roarm_control::control::LoopConfig;
use roarm_control::types::{JointSet, JointSpec, PoseLimits};
use roarm_control::MotionProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// 默认波特率
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// 已知的机型
const KNOWN_MODELS: &[&str] = &["roarm_m1", "roarm_m2", "roarm_m3"];

/// 设备连接参数（串口与 WiFi 二选一）
///
/// 表内未写出的 `port` / `host` 视为未指定；整节缺省时使用 `/dev/ttyUSB0`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// 串口设备
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// WiFi 地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// 串口波特率
    #[serde(default = "default_baudrate")]
    pub baudrate: u32,
}

fn default_baudrate() -> u32 {
    DEFAULT_BAUDRATE
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            port: Some("/dev/ttyUSB0".to_string()),
            host: None,
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}

/// 解析后的传输方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// 串口
    Serial {
        /// 设备路径
        port: String,
        /// 波特率
        baudrate: u32,
    },
    /// WiFi
    Wifi {
        /// 主机地址
        host: String,
    },
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Serial { port, baudrate } => write!(f, "serial {port} @ {baudrate}"),
            Transport::Wifi { host } => write!(f, "wifi {host}"),
        }
    }
}

impl ConnectionConfig {
    /// 串口连接
    pub fn serial(port: impl Into<String>) -> Self {
        ConnectionConfig {
            port: Some(port.into()),
            host: None,
            baudrate: DEFAULT_BAUDRATE,
        }
    }

    /// WiFi 连接
    pub fn wifi(host: impl Into<String>) -> Self {
        ConnectionConfig {
            port: None,
            host: Some(host.into()),
            baudrate: DEFAULT_BAUDRATE,
        }
    }

    /// 校验并解析传输方式
    pub fn transport(&self) -> Result<Transport> {
        match (&self.port, &self.host) {
            (Some(port), None) => {
                if self.baudrate == 0 {
                    return Err(ConfigError::invalid("baudrate must be positive"));
                }
                Ok(Transport::Serial {
                    port: port.clone(),
                    baudrate: self.baudrate,
                })
            },
            (None, Some(host)) => Ok(Transport::Wifi { host: host.clone() }),
            (None, None) => Err(ConfigError::invalid(
                "either 'port' (serial) or 'host' (WiFi) must be specified",
            )),
            (Some(_), Some(_)) => Err(ConfigError::invalid(
                "cannot specify both 'port' and 'host'; choose one connection method",
            )),
        }
    }
}

/// 单个关节的角度范围
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointLimitConfig {
    /// 关节名
    pub name: String,
    /// 下限（度）
    pub min_deg: f64,
    /// 上限（度）
    pub max_deg: f64,
}

impl JointLimitConfig {
    fn new(name: &str, min_deg: f64, max_deg: f64) -> Self {
        JointLimitConfig {
            name: name.to_string(),
            min_deg,
            max_deg,
        }
    }

    fn to_spec(&self, max_velocity_rad_s: f64) -> Result<JointSpec> {
        if !(self.min_deg < self.max_deg) {
            return Err(ConfigError::invalid(format!(
                "joint '{}': min_deg ({}) must be less than max_deg ({})",
                self.name, self.min_deg, self.max_deg
            )));
        }
        Ok(JointSpec::new(
            self.name.clone(),
            self.min_deg,
            self.max_deg,
            max_velocity_rad_s.to_degrees(),
        )?)
    }
}

/// 运动参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// 默认速度
    pub default_speed: u32,
    /// 默认加速度
    pub default_acc: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        let profile = MotionProfile::default();
        MotionConfig {
            default_speed: profile.speed,
            default_acc: profile.acceleration,
        }
    }
}

/// 安全限制（rad/s）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// 关节最大速度
    pub max_joint_velocity: f64,
    /// 夹爪最大速度
    pub max_gripper_velocity: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        SafetyConfig {
            max_joint_velocity: 3.0,
            max_gripper_velocity: 2.0,
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoarmConfig {
    /// 机型
    pub roarm_type: String,
    /// 从臂连接
    pub connection: ConnectionConfig,
    /// 主臂连接（遥操作时使用）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<ConnectionConfig>,
    /// 运动参数
    pub motion: MotionConfig,
    /// 安全限制
    pub safety: SafetyConfig,
    /// 控制循环
    pub control: LoopConfig,
    /// 末端位姿限位
    pub cartesian: PoseLimits,
    /// 关节（有序）
    pub joints: Vec<JointLimitConfig>,
    /// 夹爪
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gripper: Option<JointLimitConfig>,
}

impl Default for RoarmConfig {
    /// RoArm-M3 出厂配置
    fn default() -> Self {
        RoarmConfig {
            roarm_type: "roarm_m3".to_string(),
            connection: ConnectionConfig::default(),
            leader: None,
            motion: MotionConfig::default(),
            safety: SafetyConfig::default(),
            control: LoopConfig::default(),
            cartesian: PoseLimits::default(),
            joints: vec![
                JointLimitConfig::new("shoulder_pan", -190.0, 190.0),
                JointLimitConfig::new("shoulder_lift", -110.0, 110.0),
                JointLimitConfig::new("elbow_flex", -70.0, 190.0),
                JointLimitConfig::new("wrist_flex", -110.0, 110.0),
                JointLimitConfig::new("wrist_roll", -190.0, 190.0),
            ],
            gripper: Some(JointLimitConfig::new("gripper", -10.0, 100.0)),
        }
    }
}

impl RoarmConfig {
    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RoarmConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 写入文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 校验全部字段
    pub fn validate(&self) -> Result<()> {
        if !KNOWN_MODELS.contains(&self.roarm_type.as_str()) {
            tracing::warn!("Unknown roarm_type '{}', using configured limits as-is", self.roarm_type);
        }

        self.connection.transport()?;
        if let Some(leader) = &self.leader {
            leader.transport()?;
        }

        for (label, velocity) in [
            ("max_joint_velocity", self.safety.max_joint_velocity),
            ("max_gripper_velocity", self.safety.max_gripper_velocity),
        ] {
            if !velocity.is_finite() || velocity <= 0.0 {
                return Err(ConfigError::invalid(format!(
                    "{label} must be positive, got {velocity}"
                )));
            }
        }

        self.control.validate()?;

        let mut names = HashSet::new();
        for joint in self.joints.iter().chain(self.gripper.iter()) {
            if !names.insert(joint.name.as_str()) {
                return Err(ConfigError::invalid(format!("duplicate joint name '{}'", joint.name)));
            }
        }

        for (axis, (lo, hi)) in [
            ("x", self.cartesian.x),
            ("y", self.cartesian.y),
            ("z", self.cartesian.z),
            ("roll", self.cartesian.roll),
            ("pitch", self.cartesian.pitch),
            ("yaw", self.cartesian.yaw),
        ] {
            if !(lo < hi) {
                return Err(ConfigError::invalid(format!(
                    "cartesian.{axis}: lower bound ({lo}) must be less than upper bound ({hi})"
                )));
            }
        }

        self.joint_set().map(|_| ())
    }

    /// 构建关节集合（速度换算为度/秒）
    pub fn joint_set(&self) -> Result<JointSet> {
        let joints = self
            .joints
            .iter()
            .map(|j| j.to_spec(self.safety.max_joint_velocity))
            .collect::<Result<Vec<_>>>()?;
        let gripper = self
            .gripper
            .as_ref()
            .map(|g| g.to_spec(self.safety.max_gripper_velocity))
            .transpose()?;
        Ok(JointSet::new(joints, gripper)?)
    }

    /// 控制循环配置
    pub fn loop_config(&self) -> LoopConfig {
        self.control
    }

    /// 末端位姿限位
    pub fn pose_limits(&self) -> PoseLimits {
        self.cartesian
    }

    /// 运动参数
    pub fn motion_profile(&self) -> MotionProfile {
        MotionProfile {
            speed: self.motion.default_speed,
            acceleration: self.motion.default_acc,
        }
    }
}
