//! 执行机构（单个电机的位置/功率控制包装）
//!
//! 组合持有驱动板句柄（不继承驱动 API），只暴露位置收敛与功率
//! 两类能力。核心是**有界等待收敛循环**：下发目标后阻塞轮询
//! 编码器，直到读数严格落入公差开区间。
//!
//! 参考行为没有收敛超时——目标物理不可达时无限阻塞。这里把
//! 上限做成可配置（默认仍为无上限），并把每次睡眠挂在取消令牌
//! 上，调用方可以在外层组合自己的超时/取消策略。

use std::sync::Arc;
use std::time::Instant;

use cubescan_hw::{MotorPort, PortDriver};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::MotorConfig;
use crate::error::RigError;

pub struct Actuator {
    driver: Arc<dyn PortDriver>,
    port: MotorPort,
    name: &'static str,
    config: MotorConfig,
    cancel: CancelToken,
}

impl std::fmt::Debug for Actuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actuator")
            .field("port", &self.port)
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Actuator {
    pub fn new(
        driver: Arc<dyn PortDriver>,
        port: MotorPort,
        name: &'static str,
        config: MotorConfig,
        cancel: CancelToken,
    ) -> Self {
        Self {
            driver,
            port,
            name,
            config,
            cancel,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn port(&self) -> MotorPort {
        self.port
    }

    /// 设置电机功率；`None` 使用配置的默认功率
    pub fn set_power(&self, power: Option<i8>) -> Result<(), RigError> {
        let power = power.unwrap_or(self.config.power);
        debug!(motor = self.name, power, "setting motor power");
        self.driver.set_motor_power(self.port, power)?;
        Ok(())
    }

    /// 将该端口的位置参考清零
    ///
    /// 之后的位置读数都相对新零点，用于在多次运行之间建立
    /// 可复现的机械原点。
    pub fn reset_position(&self) -> Result<(), RigError> {
        debug!(motor = self.name, "resetting encoder reference");
        self.driver.reset_motor_encoder(self.port)?;
        Ok(())
    }

    /// 读取当前编码器位置
    ///
    /// 每次都从驱动板取新值，绝不缓存：相对移动基于陈旧位置
    /// 会让后续所有相对目标失准。
    pub fn position(&self) -> Result<i32, RigError> {
        Ok(self.driver.get_motor_encoder(self.port)?)
    }

    /// 移动到绝对位置并阻塞等待收敛
    ///
    /// 接受窗口是开区间 `(target - tolerance, target + tolerance)`：
    /// 恰好等于边界的读数不算到位。下发目标前先读一次当前位置，
    /// 若已在窗口内则不经历任何睡眠直接返回。
    ///
    /// 阻塞期间每个轮询间隔检查一次取消令牌；配置了收敛超时的
    /// 情况下超出上限返回 `RigError::MotorTimeout`。
    pub fn set_position(&self, target: i32) -> Result<(), RigError> {
        let lower = target - self.config.tolerance;
        let upper = target + self.config.tolerance;

        let mut current = self.position()?;
        debug!(
            motor = self.name,
            current, target, lower, upper, "positioning"
        );

        self.driver.set_motor_position_target(self.port, target)?;

        let start = Instant::now();
        while !(lower < current && current < upper) {
            if let Some(bound) = self.config.convergence_timeout()
                && start.elapsed() >= bound
            {
                return Err(RigError::MotorTimeout {
                    motor: self.name.to_string(),
                    target,
                    timeout: bound,
                });
            }
            if self.cancel.sleep(self.config.poll_interval()) {
                return Err(RigError::Cancelled);
            }
            current = self.position()?;
            debug!(motor = self.name, current, "convergence poll");
        }

        Ok(())
    }

    /// 相对当前位置移动 `delta`
    ///
    /// 当前位置取新读数后与 `delta` 求和，委托给 `set_position`，
    /// 复用同样的阻塞/公差语义。
    pub fn set_position_relative(&self, delta: i32) -> Result<(), RigError> {
        let current = self.position()?;
        self.set_position(current + delta)
    }
}
