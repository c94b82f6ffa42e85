//! 配置文件读写测试

use roarm_config::{ConfigError, ConnectionConfig, RoarmConfig, Transport};
use std::fs;
use tempfile::TempDir;

#[test]
fn save_then_load_keeps_every_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = RoarmConfig::default();
    config.connection = ConnectionConfig::serial("/dev/ttyACM0");
    config.leader = Some(ConnectionConfig::wifi("192.168.4.1"));
    config.control.rate_hz = 25.0;
    config.motion.default_speed = 500;
    config.joints[0].max_deg = 120.0;

    config.save(&path).unwrap();
    let loaded = RoarmConfig::load(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(
        loaded.leader.unwrap().transport().unwrap(),
        Transport::Wifi {
            host: "192.168.4.1".into()
        }
    );
}

#[test]
fn load_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = RoarmConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn load_rejects_port_and_host_together() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [connection]
        port = "/dev/ttyUSB0"
        host = "192.168.4.1"
        "#,
    )
    .unwrap();

    let err = RoarmConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("both"));
}

#[test]
fn load_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[control\nrate_hz = ").unwrap();

    assert!(matches!(RoarmConfig::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn custom_joints_drive_the_joint_set() {
    let config = RoarmConfig::from_toml_str(
        r#"
        [safety]
        max_joint_velocity = 1.0
        max_gripper_velocity = 0.5

        [[joints]]
        name = "base"
        min_deg = -90.0
        max_deg = 90.0

        [[joints]]
        name = "lift"
        min_deg = 0.0
        max_deg = 45.0
        "#,
    )
    .unwrap();

    // 写出 [[joints]] 时夹爪仍取出厂值
    let joints = config.joint_set().unwrap();
    assert_eq!(joints.joint_count(), 2);
    assert_eq!(joints.joints()[1].name(), "lift");
    assert!((joints.joints()[0].max_velocity() - 1.0f64.to_degrees()).abs() < 1e-12);
    assert!(joints.gripper().is_some());
}

#[test]
fn empty_file_is_the_factory_config() {
    let config = RoarmConfig::from_toml_str("").unwrap();
    assert_eq!(config, RoarmConfig::default());
}
