//! 传感通道（单个传感器的超时守护读取包装）
//!
//! 底层读取会抛瞬态"未就绪"错误，也可能暂时没有值；这里不去
//! 区分"传感器没准备好"和"面前没有魔方"——两者都表现为
//! 重试直到超时，轮询节奏（0.2s）本身就匹配预期的稳定时间。

use std::sync::Arc;
use std::time::Instant;

use cubescan_hw::{HwError, PortDriver, Rgb, SensorMode, SensorPort, SensorValue};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::SensorConfig;
use crate::error::RigError;

pub struct SensingChannel {
    driver: Arc<dyn PortDriver>,
    port: SensorPort,
    mode: SensorMode,
    config: SensorConfig,
    cancel: CancelToken,
}

impl SensingChannel {
    /// 创建通道并把工作模式一次性配置到驱动板
    pub fn new(
        driver: Arc<dyn PortDriver>,
        port: SensorPort,
        mode: SensorMode,
        config: SensorConfig,
        cancel: CancelToken,
    ) -> Result<Self, RigError> {
        driver.configure_sensor(port, mode)?;
        Ok(Self {
            driver,
            port,
            mode,
            config,
            cancel,
        })
    }

    pub fn port(&self) -> SensorPort {
        self.port
    }

    pub fn mode(&self) -> SensorMode {
        self.mode
    }

    /// 超时守护的原始读取
    ///
    /// 循环尝试：瞬态错误丢弃重试，暂无值重试，每次尝试之间睡
    /// 一个轮询间隔并累计等待时间；超出配置超时前仍无有效值则
    /// 返回 `RigError::SensorTimeout`。其他硬件错误立即上抛。
    pub fn read(&self) -> Result<SensorValue, RigError> {
        let start = Instant::now();

        loop {
            match self.driver.get_sensor_value(self.port) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    debug!(sensor = %self.port, "no value yet, retrying");
                },
                Err(HwError::TransientSensor { .. }) => {
                    debug!(sensor = %self.port, "transient sensor error, retrying");
                },
                Err(e) => return Err(e.into()),
            }

            if start.elapsed() >= self.config.timeout() {
                return Err(RigError::SensorTimeout {
                    port: self.port,
                    waited: start.elapsed(),
                });
            }
            if self.cancel.sleep(self.config.poll_interval()) {
                return Err(RigError::Cancelled);
            }
        }
    }

    /// 读取颜色分量；通道模式不符时报 `UnexpectedValue`
    pub fn read_color(&self) -> Result<Rgb, RigError> {
        match self.read()? {
            SensorValue::Color(rgb) => Ok(rgb),
            SensorValue::Distance(_) => Err(RigError::UnexpectedValue { port: self.port }),
        }
    }

    /// 读取距离（英寸）
    pub fn read_distance(&self) -> Result<f64, RigError> {
        match self.read()? {
            SensorValue::Distance(inches) => Ok(inches),
            SensorValue::Color(_) => Err(RigError::UnexpectedValue { port: self.port }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescan_hw::mock::{MockDriver, SensorOutcome};
    use std::time::Duration;

    fn fast_config() -> SensorConfig {
        SensorConfig {
            timeout_ms: 300,
            poll_interval_ms: 50,
            ..SensorConfig::default()
        }
    }

    fn channel_on(
        driver: Arc<MockDriver>,
        mode: SensorMode,
        config: SensorConfig,
    ) -> SensingChannel {
        SensingChannel::new(driver, SensorPort::S1, mode, config, CancelToken::never()).unwrap()
    }

    /// 构造即下发模式配置
    #[test]
    fn test_mode_configured_at_construction() {
        let driver = Arc::new(MockDriver::new());
        let channel = channel_on(
            driver.clone(),
            SensorMode::ColorComponents,
            SensorConfig::default(),
        );
        assert_eq!(channel.mode(), SensorMode::ColorComponents);
        assert_eq!(
            driver.commands(),
            vec![cubescan_hw::Command::ConfigureSensor {
                port: SensorPort::S1,
                mode: SensorMode::ColorComponents,
            }]
        );
    }

    /// 瞬态错误一段时间后出值：在超时内成功
    ///
    /// 默认节奏下对应"0.6 秒内都是瞬态、随后有效"的硬件行为。
    #[test]
    fn test_recovers_from_transient_errors() {
        let driver = Arc::new(MockDriver::new());
        driver.script_sensor(
            SensorPort::S1,
            [
                SensorOutcome::Transient,
                SensorOutcome::Transient,
                SensorOutcome::Transient,
                SensorOutcome::Value(SensorValue::Color(Rgb::new(20, 105, 74))),
            ],
        );

        let channel = channel_on(driver, SensorMode::ColorComponents, fast_config());
        let value = channel.read().unwrap();
        assert_eq!(value, SensorValue::Color(Rgb::new(20, 105, 74)));
    }

    /// 始终无值：按实测耗时在超时后失败（断言经过的时间，
    /// 不是睡眠次数）
    #[test]
    fn test_never_valid_times_out() {
        let driver = Arc::new(MockDriver::new());
        // 未编排脚本 => 永远 Ok(None)
        let channel = channel_on(driver, SensorMode::ColorComponents, fast_config());

        let start = Instant::now();
        let err = channel.read().unwrap_err();
        let elapsed = start.elapsed();

        match err {
            RigError::SensorTimeout { port, waited } => {
                assert_eq!(port, SensorPort::S1);
                assert!(waited >= Duration::from_millis(300));
            },
            other => panic!("expected SensorTimeout, got {other:?}"),
        }
        assert!(elapsed >= Duration::from_millis(300), "gave up early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(900), "gave up late: {elapsed:?}");
    }

    /// 非瞬态硬件错误立即上抛，不重试到超时
    #[test]
    fn test_fatal_hw_error_propagates_immediately() {
        struct BrokenDriver;
        impl PortDriver for BrokenDriver {
            fn set_motor_power(&self, _: cubescan_hw::MotorPort, _: i8) -> Result<(), HwError> {
                Ok(())
            }
            fn set_motor_position_target(
                &self,
                _: cubescan_hw::MotorPort,
                _: i32,
            ) -> Result<(), HwError> {
                Ok(())
            }
            fn get_motor_encoder(&self, _: cubescan_hw::MotorPort) -> Result<i32, HwError> {
                Ok(0)
            }
            fn reset_motor_encoder(&self, _: cubescan_hw::MotorPort) -> Result<(), HwError> {
                Ok(())
            }
            fn configure_sensor(&self, _: SensorPort, _: SensorMode) -> Result<(), HwError> {
                Ok(())
            }
            fn get_sensor_value(&self, _: SensorPort) -> Result<Option<SensorValue>, HwError> {
                Err(HwError::Io("bus gone".to_string()))
            }
        }

        let channel = SensingChannel::new(
            Arc::new(BrokenDriver),
            SensorPort::S1,
            SensorMode::ColorComponents,
            fast_config(),
            CancelToken::never(),
        )
        .unwrap();

        let start = Instant::now();
        let err = channel.read().unwrap_err();
        assert!(matches!(err, RigError::Hw(HwError::Io(_))));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    /// 模式不符的类型化读取报 UnexpectedValue
    #[test]
    fn test_typed_read_mode_mismatch() {
        let driver = Arc::new(MockDriver::new());
        driver.script_sensor(
            SensorPort::S1,
            [SensorOutcome::Value(SensorValue::Distance(4.2))],
        );

        let channel = channel_on(driver, SensorMode::DistanceInches, fast_config());
        let err = channel.read_color().unwrap_err();
        assert!(matches!(err, RigError::UnexpectedValue { .. }));
    }

    #[test]
    fn test_read_distance() {
        let driver = Arc::new(MockDriver::new());
        driver.script_sensor(
            SensorPort::S1,
            [SensorOutcome::Value(SensorValue::Distance(8.5))],
        );
        let channel = channel_on(driver, SensorMode::DistanceInches, fast_config());
        assert_eq!(channel.read_distance().unwrap(), 8.5);
    }
}
