//! 角度单位
//!
//! RoArm 固件以角度（度）收发关节值，LeRobot 观测使用弧度；两者只在
//! [`UnitConverter`](crate::convert::UnitConverter) 的边界上互转。
//!
//! ```rust
//! use roarm_control::types::{Deg, Rad};
//!
//! let elbow = Deg(90.0);
//! assert!((elbow.to_rad().0 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! assert_eq!(Rad(0.0).to_deg(), Deg(0.0));
//! ```

/// 弧度
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rad(pub f64);

impl Rad {
    /// ×180/π
    #[inline]
    pub fn to_deg(self) -> Deg {
        Deg(self.0.to_degrees())
    }
}

/// 角度（设备原生单位）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deg(pub f64);

impl Deg {
    /// ×π/180
    #[inline]
    pub fn to_rad(self) -> Rad {
        Rad(self.0.to_radians())
    }
}
