//! 笛卡尔轨迹下发测试

mod common;

use roarm_control::prelude::*;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

fn connected_arm() -> SimulatedArm {
    let arm = SimulatedArm::new("cartesian", 5);
    arm.connect().unwrap();
    arm
}

fn planner(trajectory: Trajectory, duration: Duration, rate_hz: f64) -> TrajectoryPlanner {
    let origin = CartesianPose::new(150.0, 0.0, 250.0, 0.0, 0.0, 0.0);
    TrajectoryPlanner::new(trajectory, origin, PoseLimits::default(), duration, rate_hz).unwrap()
}

#[test]
fn streams_every_pose_at_rate() {
    common::init_tracing();
    let arm = connected_arm();
    let stop = AtomicBool::new(false);
    let plan = planner(Trajectory::circle_xy(), Duration::from_millis(500), 40.0);
    let expected: Vec<CartesianPose> = plan.clone().collect();

    let begin = Instant::now();
    let report = stream_trajectory(&arm, plan, &stop).unwrap();
    let elapsed = begin.elapsed();

    assert_eq!(report.sent, 20);
    assert_eq!(report.write_failures, 0);
    assert!(!report.stopped);
    assert_eq!(arm.pose_writes(), expected);
    // 20 个周期 × 25ms
    assert!(elapsed >= Duration::from_millis(480), "finished too early: {elapsed:?}");
}

#[test]
fn planner_rejects_unrepresentable_rate() {
    let origin = CartesianPose::new(150.0, 0.0, 250.0, 0.0, 0.0, 0.0);
    let result = TrajectoryPlanner::new(
        Trajectory::circle_xy(),
        origin,
        PoseLimits::default(),
        Duration::from_secs(1),
        1e-20,
    );
    assert!(result.unwrap_err().is_config_error());
}

#[test]
fn write_failures_are_counted_and_skipped() {
    let arm = connected_arm();
    arm.fail_next_writes(3);
    let stop = AtomicBool::new(false);

    let report = stream_trajectory(
        &arm,
        planner(Trajectory::line(Axis::X), Duration::from_millis(250), 40.0),
        &stop,
    )
    .unwrap();

    assert_eq!(report.write_failures, 3);
    assert_eq!(report.sent, 7);
    assert_eq!(arm.pose_writes().len(), 7);
}

#[test]
fn stop_flag_ends_stream_early() {
    let arm = connected_arm();
    let stop = AtomicBool::new(true);

    let report = stream_trajectory(
        &arm,
        planner(Trajectory::circle_xz(), Duration::from_secs(5), 20.0),
        &stop,
    )
    .unwrap();

    assert!(report.stopped);
    assert_eq!(report.sent, 0);
    assert!(arm.pose_writes().is_empty());
}

#[test]
fn disconnected_arm_never_panics() {
    let arm = SimulatedArm::new("cartesian", 5);
    let stop = AtomicBool::new(false);

    let report = stream_trajectory(
        &arm,
        planner(Trajectory::line(Axis::Z), Duration::from_millis(100), 50.0),
        &stop,
    )
    .unwrap();

    assert_eq!(report.sent, 0);
    assert_eq!(report.write_failures, 5);
}

#[test]
fn streamed_poses_respect_limits() {
    let arm = connected_arm();
    let stop = AtomicBool::new(false);
    let limits = PoseLimits::default();
    let origin = CartesianPose::new(580.0, 0.0, 60.0, 0.0, 0.0, 0.0);
    let plan = TrajectoryPlanner::new(
        Trajectory::Line {
            axis: Axis::X,
            distance: 200.0,
            cycles: 1,
            rotate: false,
            tilt: false,
            inverted: false,
        },
        origin,
        limits,
        Duration::from_millis(200),
        100.0,
    )
    .unwrap();

    stream_trajectory(&arm, plan, &stop).unwrap();
    let poses = arm.pose_writes();
    assert_eq!(poses.len(), 20);
    assert!(poses.iter().all(|p| limits.contains(p)));
    assert!(poses.iter().any(|p| p.x == 600.0));
}
