//! 笛卡尔轨迹脚本
//!
//! 以起始位姿为中心生成平滑的末端轨迹，并通过 [`CartesianAdapter`] 以固定频率下发。
//!
//! # 轨迹
//!
//! ```text
//! CircleXy:  x = cx + r·cos(2πs),  y = cy + r·sin(2πs)
//! CircleXz:  x = cx + r·cos(2πs),  z = cz + r·sin(2πs)   (cz ≥ floor + r)
//! Line:      p = sin(2π·cycles·s),  axis = a0 ± d/2 · p
//!            yaw = clamp(yaw0 + 15·p, 0, 85)       (rotate)
//!            pitch = clamp(pitch0 + 30·p, -85, 85) (tilt)
//! ```
//!
//! 其中 `s = i / N ∈ [0, 1)`，`N = duration × rate`。反相（`inverted`）只翻转轴向位移，
//! 姿态摆动保持同相，两台臂可以做镜像动作。所有位姿在下发前经
//! [`PoseLimits`] 钳位。
//!
//! # 示例
//!
//! ```rust
//! use roarm_control::control::{Trajectory, TrajectoryPlanner};
//! use roarm_control::types::{CartesianPose, PoseLimits};
//! use std::time::Duration;
//!
//! let origin = CartesianPose::new(150.0, 0.0, 250.0, 0.0, 0.0, 0.0);
//! let planner = TrajectoryPlanner::new(
//!     Trajectory::circle_xy(),
//!     origin,
//!     PoseLimits::default(),
//!     Duration::from_secs(2),
//!     20.0,
//! )
//! .unwrap();
//! assert_eq!(planner.len(), 40);
//! ```

use super::rate::RateScheduler;
use crate::adapter::CartesianAdapter;
use crate::types::{CartesianPose, ControlError, PoseLimits, Result};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 默认圆半径（毫米）
pub const DEFAULT_RADIUS_MM: f64 = 30.0;

/// 直线往复时 yaw 的摆幅（度）及安全范围
const YAW_SWING_DEG: f64 = 15.0;
const YAW_RANGE_DEG: (f64, f64) = (0.0, 85.0);

/// 直线往复时 pitch 的摆幅（度）及安全范围
const PITCH_SWING_DEG: f64 = 30.0;
const PITCH_RANGE_DEG: (f64, f64) = (-85.0, 85.0);

/// 直线轨迹的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// X 轴
    X,
    /// Y 轴
    Y,
    /// Z 轴
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// 轨迹形状
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trajectory {
    /// 水平圆（XY 平面）
    CircleXy {
        /// 半径（毫米）
        radius: f64,
    },
    /// 竖直圆（XZ 平面），圆心自动抬高到地面以上
    CircleXz {
        /// 半径（毫米）
        radius: f64,
    },
    /// 沿单轴的正弦往复
    Line {
        /// 运动轴
        axis: Axis,
        /// 峰峰距离（毫米）
        distance: f64,
        /// 往复次数
        cycles: u32,
        /// yaw 随位移同步摆动
        rotate: bool,
        /// pitch 随位移同步摆动
        tilt: bool,
        /// 轴向位移反相
        inverted: bool,
    },
}

impl Trajectory {
    /// 默认半径的水平圆
    pub fn circle_xy() -> Self {
        Trajectory::CircleXy {
            radius: DEFAULT_RADIUS_MM,
        }
    }

    /// 默认半径的竖直圆
    pub fn circle_xz() -> Self {
        Trajectory::CircleXz {
            radius: DEFAULT_RADIUS_MM,
        }
    }

    /// 默认参数的直线往复（X/Y 150mm，Z 240mm，3 次）
    ///
    /// Z 轴往复同时摆动 yaw 和 pitch。
    pub fn line(axis: Axis) -> Self {
        let distance = match axis {
            Axis::X | Axis::Y => 150.0,
            Axis::Z => 240.0,
        };
        let orient = axis == Axis::Z;
        Trajectory::Line {
            axis,
            distance,
            cycles: 3,
            rotate: orient,
            tilt: orient,
            inverted: false,
        }
    }

    /// 轴向位移反相的同一轨迹（圆轨迹不变）
    pub fn inverted(self) -> Self {
        match self {
            Trajectory::Line {
                axis,
                distance,
                cycles,
                rotate,
                tilt,
                inverted,
            } => Trajectory::Line {
                axis,
                distance,
                cycles,
                rotate,
                tilt,
                inverted: !inverted,
            },
            other => other,
        }
    }

    /// 轨迹名称（与 CLI 参数一致）
    pub fn name(&self) -> String {
        match self {
            Trajectory::CircleXy { .. } => "circle-xy".to_string(),
            Trajectory::CircleXz { .. } => "circle-xz".to_string(),
            Trajectory::Line { axis, .. } => format!("line-{axis}"),
        }
    }

    /// 根据限位调整轨迹中心（竖直圆整圈保持在 Z 下限之上）
    pub fn center(&self, origin: &CartesianPose, limits: &PoseLimits) -> CartesianPose {
        let mut center = *origin;
        if let Trajectory::CircleXz { radius } = *self {
            let floor = limits.z.0;
            if center.z - radius < floor {
                center.z = floor + radius;
                tracing::info!("Adjusted circle centre Z to {:.1}mm to stay above floor", center.z);
            }
        }
        center
    }

    /// 归一化时间 `s ∈ [0, 1)` 处的位姿（未钳位）
    pub fn pose_at(&self, center: &CartesianPose, s: f64) -> CartesianPose {
        let mut pose = *center;
        match *self {
            Trajectory::CircleXy { radius } => {
                let angle = TAU * s;
                pose.x = center.x + radius * angle.cos();
                pose.y = center.y + radius * angle.sin();
            },
            Trajectory::CircleXz { radius } => {
                let angle = TAU * s;
                pose.x = center.x + radius * angle.cos();
                pose.z = center.z + radius * angle.sin();
            },
            Trajectory::Line {
                axis,
                distance,
                cycles,
                rotate,
                tilt,
                inverted,
            } => {
                let progress = (TAU * f64::from(cycles) * s).sin();
                let direction = if inverted { -1.0 } else { 1.0 };
                let offset = distance / 2.0 * direction * progress;
                match axis {
                    Axis::X => pose.x += offset,
                    Axis::Y => pose.y += offset,
                    Axis::Z => pose.z += offset,
                }
                if rotate {
                    let (lo, hi) = YAW_RANGE_DEG;
                    pose.yaw = (center.yaw + YAW_SWING_DEG * progress).clamp(lo, hi);
                }
                if tilt {
                    let (lo, hi) = PITCH_RANGE_DEG;
                    pose.pitch = (center.pitch + PITCH_SWING_DEG * progress).clamp(lo, hi);
                }
            },
        }
        pose
    }
}

impl FromStr for Trajectory {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "circle-xy" => Ok(Trajectory::circle_xy()),
            "circle-xz" => Ok(Trajectory::circle_xz()),
            "line-x" => Ok(Trajectory::line(Axis::X)),
            "line-y" => Ok(Trajectory::line(Axis::Y)),
            "line-z" => Ok(Trajectory::line(Axis::Z)),
            other => Err(ControlError::invalid_config(format!(
                "unknown trajectory '{other}' (expected circle-xy, circle-xz, line-x, line-y, line-z)"
            ))),
        }
    }
}

/// 轨迹规划器
///
/// 按需生成 `duration × rate` 个钳位后的位姿。
#[derive(Debug, Clone)]
pub struct TrajectoryPlanner {
    trajectory: Trajectory,
    center: CartesianPose,
    limits: PoseLimits,
    rate_hz: f64,
    current_index: usize,
    total_samples: usize,
}

impl TrajectoryPlanner {
    /// 创建规划器
    ///
    /// # 错误
    ///
    /// `rate_hz` 非正或非有限时返回 `InvalidConfig`。
    pub fn new(
        trajectory: Trajectory,
        origin: CartesianPose,
        limits: PoseLimits,
        duration: Duration,
        rate_hz: f64,
    ) -> Result<Self> {
        super::rate::validate_rate(rate_hz)?;
        let total_samples = (duration.as_secs_f64() * rate_hz).floor() as usize;
        let center = trajectory.center(&limits.clamp(&origin), &limits);

        Ok(TrajectoryPlanner {
            trajectory,
            center,
            limits,
            rate_hz,
            current_index: 0,
            total_samples,
        })
    }

    /// 轨迹形状
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// 轨迹中心
    pub fn center(&self) -> &CartesianPose {
        &self.center
    }

    /// 采样频率
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// 第 `index` 个采样点（钳位后）
    pub fn sample(&self, index: usize) -> CartesianPose {
        let s = if self.total_samples == 0 {
            0.0
        } else {
            index as f64 / self.total_samples as f64
        };
        self.limits.clamp(&self.trajectory.pose_at(&self.center, s))
    }
}

impl Iterator for TrajectoryPlanner {
    type Item = CartesianPose;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.total_samples {
            return None;
        }
        let pose = self.sample(self.current_index);
        self.current_index += 1;
        Some(pose)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_samples - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrajectoryPlanner {}

/// 轨迹下发结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StreamReport {
    /// 成功下发的位姿数
    pub sent: u64,
    /// 下发失败次数
    pub write_failures: u64,
    /// 超时的周期数
    pub overruns: u64,
    /// 是否被停止标志提前终止
    pub stopped: bool,
}

/// 以固定频率下发整条轨迹
///
/// 与 ControlLoop 相同的调度策略：单个位姿写入失败只记录日志并继续；
/// `stop` 在每个周期边界检查。
pub fn stream_trajectory(
    adapter: &dyn CartesianAdapter,
    planner: TrajectoryPlanner,
    stop: &AtomicBool,
) -> Result<StreamReport> {
    let scheduler = RateScheduler::new(planner.rate_hz())?;
    let name = planner.trajectory().name();
    let total = planner.len();
    let mut report = StreamReport::default();

    tracing::info!(
        "Streaming trajectory '{}': {} poses at {} Hz",
        name,
        total,
        planner.rate_hz()
    );

    for (index, pose) in planner.enumerate() {
        if stop.load(Ordering::Acquire) {
            report.stopped = true;
            tracing::info!("Trajectory '{}' stopped at pose {}/{}", name, index, total);
            break;
        }

        let tick_start = Instant::now();
        match adapter.write_pose(&pose) {
            Ok(()) => {
                report.sent += 1;
                tracing::trace!("Pose {}/{}: {}", index + 1, total, pose);
            },
            Err(e) => {
                report.write_failures += 1;
                tracing::warn!("Failed to send pose {}: {}", index, e);
            },
        }

        if !scheduler.wait_until_next(tick_start) {
            report.overruns += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> CartesianPose {
        CartesianPose::new(150.0, 0.0, 250.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_parse_names() {
        for name in ["circle-xy", "circle-xz", "line-x", "line-y", "line-z"] {
            let trajectory: Trajectory = name.parse().unwrap();
            assert_eq!(trajectory.name(), name);
        }
        assert_eq!("circle_xy".parse::<Trajectory>().unwrap(), Trajectory::circle_xy());
        assert!("spiral".parse::<Trajectory>().unwrap_err().is_config_error());
    }

    #[test]
    fn test_circle_xy_starts_at_radius() {
        let pose = Trajectory::circle_xy().pose_at(&origin(), 0.0);
        assert!((pose.x - 180.0).abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
        assert_eq!(pose.z, 250.0);
    }

    #[test]
    fn test_circle_xz_centre_lifted_above_floor() {
        let limits = PoseLimits::default();
        let low = CartesianPose::new(150.0, 0.0, 60.0, 0.0, 0.0, 0.0);
        let center = Trajectory::circle_xz().center(&low, &limits);
        assert_eq!(center.z, 50.0 + DEFAULT_RADIUS_MM);

        let planner =
            TrajectoryPlanner::new(Trajectory::circle_xz(), low, limits, Duration::from_secs(1), 40.0)
                .unwrap();
        assert!(planner.into_iter().all(|p| p.z >= 50.0));
    }

    #[test]
    fn test_line_returns_to_origin_each_cycle() {
        let trajectory = Trajectory::line(Axis::Y);
        let pose = trajectory.pose_at(&origin(), 1.0 / 3.0);
        assert!(pose.y.abs() < 1e-9);
        let peak = trajectory.pose_at(&origin(), 1.0 / 12.0);
        assert!((peak.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_z_swings_yaw_and_pitch() {
        let trajectory = Trajectory::line(Axis::Z);
        let peak = trajectory.pose_at(&origin(), 1.0 / 12.0);
        assert!((peak.z - 370.0).abs() < 1e-9);
        assert!((peak.yaw - 15.0).abs() < 1e-9);
        assert!((peak.pitch - 30.0).abs() < 1e-9);

        // 谷底：yaw 钳位到 0，pitch 反向
        let trough = trajectory.pose_at(&origin(), 3.0 / 12.0);
        assert!((trough.z - 130.0).abs() < 1e-9);
        assert_eq!(trough.yaw, 0.0);
        assert!((trough.pitch + 30.0).abs() < 1e-9);

        // X/Y 往复不改变姿态
        let flat = Trajectory::line(Axis::X).pose_at(&origin(), 1.0 / 12.0);
        assert_eq!((flat.yaw, flat.pitch), (0.0, 0.0));
    }

    #[test]
    fn test_orientation_clamped_to_safe_range() {
        let tilted = CartesianPose::new(150.0, 0.0, 250.0, 0.0, 70.0, 80.0);
        let peak = Trajectory::line(Axis::Z).pose_at(&tilted, 1.0 / 12.0);
        assert_eq!(peak.yaw, 85.0);
        assert_eq!(peak.pitch, 85.0);
    }

    #[test]
    fn test_inverted_line_mirrors_axis_only() {
        let trajectory = Trajectory::line(Axis::Z).inverted();
        let peak = trajectory.pose_at(&origin(), 1.0 / 12.0);
        assert!((peak.z - 130.0).abs() < 1e-9);
        assert!((peak.yaw - 15.0).abs() < 1e-9);
        assert!((peak.pitch - 30.0).abs() < 1e-9);

        assert_eq!(trajectory.inverted(), Trajectory::line(Axis::Z));
        assert_eq!(Trajectory::circle_xy().inverted(), Trajectory::circle_xy());
    }

    #[test]
    fn test_planner_sample_count_and_limits() {
        let limits = PoseLimits::default();
        let planner = TrajectoryPlanner::new(
            Trajectory::Line {
                axis: Axis::Z,
                distance: 1000.0,
                cycles: 1,
                rotate: true,
                tilt: true,
                inverted: false,
            },
            origin(),
            limits,
            Duration::from_millis(1500),
            20.0,
        )
        .unwrap();
        assert_eq!(planner.len(), 30);
        assert!(planner.into_iter().all(|p| limits.contains(&p)));
    }

    #[test]
    fn test_planner_rejects_bad_rate() {
        let result = TrajectoryPlanner::new(
            Trajectory::circle_xy(),
            origin(),
            PoseLimits::default(),
            Duration::from_secs(1),
            0.0,
        );
        assert!(result.is_err());
    }
}
