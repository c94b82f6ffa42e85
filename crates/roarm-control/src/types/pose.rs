//! 笛卡尔位姿
//!
//! 位置单位毫米，姿态单位度（与 RoArm 固件的 `pose_ctrl` 一致）。

use std::fmt;

/// 末端位姿
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartesianPose {
    /// X（毫米）
    pub x: f64,
    /// Y（毫米）
    pub y: f64,
    /// Z（毫米）
    pub z: f64,
    /// 横滚（度）
    pub roll: f64,
    /// 俯仰（度）
    pub pitch: f64,
    /// 偏航（度）
    pub yaw: f64,
}

impl CartesianPose {
    /// 创建位姿
    pub const fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        CartesianPose {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    /// 固件顺序的数组 `[x, y, z, roll, pitch, yaw]`
    pub fn to_array(self) -> [f64; 6] {
        [self.x, self.y, self.z, self.roll, self.pitch, self.yaw]
    }

    /// 从固件顺序的数组构造
    pub fn from_array(values: [f64; 6]) -> Self {
        let [x, y, z, roll, pitch, yaw] = values;
        CartesianPose::new(x, y, z, roll, pitch, yaw)
    }

    /// 与另一位姿的位置距离（毫米）
    pub fn distance_to(&self, other: &CartesianPose) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for CartesianPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.1}, {:.1}, {:.1}] mm / [{:.1}, {:.1}, {:.1}]°",
            self.x, self.y, self.z, self.roll, self.pitch, self.yaw
        )
    }
}

/// 位姿限位（闭区间）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseLimits {
    /// X 范围（毫米）
    pub x: (f64, f64),
    /// Y 范围（毫米）
    pub y: (f64, f64),
    /// Z 范围（毫米）
    pub z: (f64, f64),
    /// 横滚范围（度）
    pub roll: (f64, f64),
    /// 俯仰范围（度）
    pub pitch: (f64, f64),
    /// 偏航范围（度）
    pub yaw: (f64, f64),
}

impl Default for PoseLimits {
    /// 固件校验范围；Z 下限抬高到 50mm，与桌面保持距离（固件本身接受 0）
    fn default() -> Self {
        PoseLimits {
            x: (-600.0, 600.0),
            y: (-600.0, 600.0),
            z: (50.0, 600.0),
            roll: (-90.0, 90.0),
            pitch: (-180.0, 180.0),
            yaw: (-180.0, 180.0),
        }
    }
}

impl PoseLimits {
    /// 逐轴钳位
    pub fn clamp(&self, pose: &CartesianPose) -> CartesianPose {
        let c = |v: f64, (lo, hi): (f64, f64)| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        CartesianPose {
            x: c(pose.x, self.x),
            y: c(pose.y, self.y),
            z: c(pose.z, self.z),
            roll: c(pose.roll, self.roll),
            pitch: c(pose.pitch, self.pitch),
            yaw: c(pose.yaw, self.yaw),
        }
    }

    /// 是否所有轴都在范围内
    pub fn contains(&self, pose: &CartesianPose) -> bool {
        self.clamp(pose) == *pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_roundtrip() {
        let pose = CartesianPose::new(150.0, 0.0, 250.0, 0.0, 10.0, -5.0);
        assert_eq!(CartesianPose::from_array(pose.to_array()), pose);
    }

    #[test]
    fn test_limits_clamp() {
        let limits = PoseLimits::default();
        let pose = CartesianPose::new(700.0, -700.0, 10.0, 95.0, 0.0, -200.0);
        let clamped = limits.clamp(&pose);
        assert_eq!(clamped, CartesianPose::new(600.0, -600.0, 50.0, 90.0, 0.0, -180.0));
        assert!(limits.contains(&clamped));
        assert!(!limits.contains(&pose));
    }

    #[test]
    fn test_distance() {
        let a = CartesianPose::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let b = CartesianPose::new(3.0, 4.0, 0.0, 45.0, 0.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
