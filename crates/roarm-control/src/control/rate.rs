//! 固定频率调度
//!
//! 每个周期测量自身耗时，只睡眠剩余部分 `period - elapsed`；超时的周期直接进入
//! 下一个周期，不累积补偿（接受漂移，不会连续快速下发两次命令）。

use crate::types::{ControlError, Result};
use spin_sleep::SpinSleeper;
use std::time::{Duration, Instant};

/// 超过此频率时给出性能警告
const HIGH_RATE_WARN_HZ: f64 = 10_000.0;

/// 由控制频率计算标称周期
///
/// # 错误
///
/// 频率非正、非有限，或周期超出 `Duration` 表示范围（过低）、舍入为零（过高）时
/// 返回 `InvalidConfig`。
pub fn rate_period(rate_hz: f64) -> Result<Duration> {
    if !rate_hz.is_finite() || rate_hz <= 0.0 {
        return Err(ControlError::invalid_config(format!(
            "Invalid rate_hz: {rate_hz} (must be > 0)"
        )));
    }
    let period = Duration::try_from_secs_f64(1.0 / rate_hz)
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or_else(|| {
            ControlError::invalid_config(format!(
                "Invalid rate_hz: {rate_hz} (period out of range)"
            ))
        })?;
    if rate_hz > HIGH_RATE_WARN_HZ {
        tracing::warn!(
            "Very high control frequency: {} Hz. This may cause performance issues.",
            rate_hz
        );
    }
    Ok(period)
}

/// 校验控制频率
pub fn validate_rate(rate_hz: f64) -> Result<()> {
    rate_period(rate_hz).map(|_| ())
}

/// 固定频率调度器
#[derive(Debug)]
pub struct RateScheduler {
    period: Duration,
    sleeper: SpinSleeper,
}

impl RateScheduler {
    /// 创建调度器
    ///
    /// # 错误
    ///
    /// 同 [`rate_period`]。
    pub fn new(rate_hz: f64) -> Result<Self> {
        Ok(RateScheduler {
            period: rate_period(rate_hz)?,
            sleeper: SpinSleeper::default(),
        })
    }

    /// 标称周期
    pub fn period(&self) -> Duration {
        self.period
    }

    /// 标称周期（秒），即速度限制使用的 dt
    pub fn dt(&self) -> f64 {
        self.period.as_secs_f64()
    }

    /// 睡眠到本周期结束
    ///
    /// 返回 `false` 表示本周期已超时（未睡眠）。
    pub fn wait_until_next(&self, tick_start: Instant) -> bool {
        let elapsed = tick_start.elapsed();
        match self.period.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => {
                self.sleeper.sleep(remaining);
                true
            },
            _ => {
                tracing::debug!(
                    "Tick overran its period: {:?} > {:?}",
                    elapsed,
                    self.period
                );
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_rates() {
        assert!(RateScheduler::new(0.0).is_err());
        assert!(RateScheduler::new(-5.0).is_err());
        assert!(RateScheduler::new(f64::NAN).is_err());
        assert!(RateScheduler::new(f64::INFINITY).is_err());
        assert!(RateScheduler::new(20.0).is_ok());
    }

    #[test]
    fn test_rejects_unrepresentable_periods() {
        // 周期超出 Duration 范围
        assert!(validate_rate(1e-20).unwrap_err().is_config_error());
        assert!(RateScheduler::new(1e-20).is_err());
        // 周期舍入为零
        assert!(RateScheduler::new(1e300).is_err());
        assert_eq!(rate_period(0.5).unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_period_and_dt() {
        let scheduler = RateScheduler::new(10.0).unwrap();
        assert_eq!(scheduler.period(), Duration::from_millis(100));
        assert!((scheduler.dt() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_sleeps_remaining_period() {
        let scheduler = RateScheduler::new(50.0).unwrap();
        let start = Instant::now();
        assert!(scheduler.wait_until_next(start));
        assert!(start.elapsed() >= Duration::from_millis(19));
    }

    #[test]
    fn test_overrun_does_not_sleep() {
        let scheduler = RateScheduler::new(1000.0).unwrap();
        let start = Instant::now();
        std::thread::sleep(Duration::from_millis(5));
        let before = Instant::now();
        assert!(!scheduler.wait_until_next(start));
        assert!(before.elapsed() < Duration::from_millis(5));
    }
}
