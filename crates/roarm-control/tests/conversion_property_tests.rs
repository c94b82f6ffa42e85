//! 转换 / 限速 / 钳位的属性测试
//!
//! 使用 proptest 验证对任意关节范围和输入都成立的性质。

use proptest::prelude::*;
use roarm_control::prelude::{
    JointSet, JointSpec, NativeCommand, PERCENT_MAX, PERCENT_MIN, SafetyGate, UnitConverter,
    VelocityLimiter,
};

/// 任意合法关节：min ∈ [-360, 0)，跨度 ∈ [1, 400]
fn joint_spec() -> impl Strategy<Value = JointSpec> {
    (-360.0..0.0f64, 1.0..400.0f64, 1.0..500.0f64)
        .prop_map(|(min, span, vel)| JointSpec::new("j", min, min + span, vel).unwrap())
}

proptest! {
    /// 百分比 → 原生 → 百分比 往返
    #[test]
    fn percentage_roundtrip(spec in joint_spec(), pct in -100.0..=100.0f64) {
        let native = UnitConverter::to_native(&spec, pct);
        let back = UnitConverter::to_percentage(&spec, native);
        prop_assert!((back - pct).abs() < 1e-9, "pct={pct} native={native} back={back}");
    }

    /// 越界百分比先钳位
    #[test]
    fn to_native_clamps_input(spec in joint_spec(), excess in 0.0..1e6f64) {
        prop_assert_eq!(
            UnitConverter::to_native(&spec, 100.0 + excess),
            UnitConverter::to_native(&spec, 100.0)
        );
        prop_assert_eq!(
            UnitConverter::to_native(&spec, -100.0 - excess),
            UnitConverter::to_native(&spec, -100.0)
        );
    }

    /// to_native 的输出总在关节范围内
    #[test]
    fn to_native_within_limits(spec in joint_spec(), pct in proptest::num::f64::ANY) {
        let native = UnitConverter::to_native(&spec, pct);
        prop_assert!(spec.contains(native));
    }

    /// to_percentage 的输出总在 [-100, 100] 内（即使原生读数越界）
    #[test]
    fn to_percentage_clamped(spec in joint_spec(), native in -1e4..1e4f64) {
        let pct = UnitConverter::to_percentage(&spec, native);
        prop_assert!((PERCENT_MIN..=PERCENT_MAX).contains(&pct));
    }

    /// 限速器：首次调用原样通过，之后每步不超过 max_velocity * dt
    #[test]
    fn limiter_step_bound(
        targets in prop::collection::vec(-1000.0..1000.0f64, 1..50),
        dt in 0.001..0.5f64,
        max_velocity in 0.1..500.0f64,
    ) {
        let mut limiter = VelocityLimiter::new();
        let outputs: Vec<f64> = targets
            .iter()
            .map(|&t| limiter.limit("j", t, dt, max_velocity))
            .collect();

        prop_assert_eq!(outputs[0], targets[0]);
        let max_step = max_velocity * dt;
        for pair in outputs.windows(2) {
            prop_assert!((pair[1] - pair[0]).abs() <= max_step + 1e-9);
        }
    }

    /// 限速器：不同键互不影响
    #[test]
    fn limiter_keys_independent(a in -100.0..100.0f64, b in -100.0..100.0f64) {
        let mut limiter = VelocityLimiter::new();
        limiter.limit("a", 0.0, 0.1, 1.0);
        prop_assert_eq!(limiter.limit("b", b, 0.1, 1.0), b);
        let _ = limiter.limit("a", a, 0.1, 1.0);
        prop_assert_eq!(limiter.last("b"), Some(b));
    }

    /// SafetyGate：输出总在限位内
    #[test]
    fn gate_output_within_limits(values in prop::collection::vec(-1e4..1e4f64, 6)) {
        let joints = JointSet::roarm_m3();
        let native: NativeCommand = joints
            .iter()
            .zip(&values)
            .map(|(spec, &v)| (spec.name().to_string(), v))
            .collect();

        let safe = SafetyGate::validate(&native, &joints);
        prop_assert_eq!(safe.len(), native.len());
        for (name, value) in safe.iter() {
            prop_assert!(joints.get(name).unwrap().contains(value));
        }
    }

    /// SafetyGate：范围内的命令原样通过
    #[test]
    fn gate_identity_on_valid(pcts in prop::collection::vec(-100.0..=100.0f64, 6)) {
        let joints = JointSet::roarm_m3();
        let native: NativeCommand = joints
            .iter()
            .zip(&pcts)
            .map(|(spec, &p)| (spec.name().to_string(), UnitConverter::to_native(spec, p)))
            .collect();

        prop_assert_eq!(SafetyGate::validate(&native, &joints), native);
    }
}

#[test]
fn elbow_flex_scenario() {
    let joints = JointSet::roarm_m3();
    let elbow = joints.get("elbow_flex").unwrap();
    assert_eq!(UnitConverter::to_native(elbow, 0.0), 60.0);
    assert_eq!(UnitConverter::to_native(elbow, 100.0), 190.0);
    assert_eq!(UnitConverter::to_native(elbow, -100.0), -70.0);
}

#[test]
fn limiter_ramp_scenario() {
    let mut limiter = VelocityLimiter::new();
    let outputs: Vec<f64> = [0.0, 1.0, 1.0]
        .iter()
        .map(|&target| limiter.limit("elbow_flex", target, 0.1, 3.0))
        .collect();
    let expected = [0.0, 0.3, 0.6];
    for (got, want) in outputs.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }
}
