//! 基础类型系统（单位、关节、命令、错误）

pub mod command;
pub mod error;
pub mod joint;
pub mod pose;
pub mod units;

pub use command::{NativeCommand, NormalizedCommand, Observation, PERCENT_MAX, PERCENT_MIN};
pub use error::{AdapterError, ControlError, Result, Role};
pub use joint::{JointSet, JointSpec, POSITION_SUFFIX, feature_key, joint_from_feature_key};
pub use pose::{CartesianPose, PoseLimits};
pub use units::{Deg, Rad};
