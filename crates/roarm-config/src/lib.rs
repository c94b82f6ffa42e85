//! # RoArm Config
//!
//! RoArm 机械臂的 TOML 配置：连接方式、关节限位、运动参数、安全限制与控制频率。
//!
//! ```
//! use roarm_config::RoarmConfig;
//!
//! let config = RoarmConfig::from_toml_str(
//!     r#"
//!     [connection]
//!     host = "192.168.4.1"
//!
//!     [control]
//!     rate_hz = 20.0
//!     "#,
//! )?;
//! let joints = config.joint_set()?;
//! assert_eq!(joints.joint_count(), 5);
//! # Ok::<(), roarm_config::ConfigError>(())
//! ```

mod config;
mod error;

pub use config::{
    ConnectionConfig, DEFAULT_BAUDRATE, JointLimitConfig, MotionConfig, RoarmConfig,
    SafetyConfig, Transport,
};
pub use error::{ConfigError, Result};
