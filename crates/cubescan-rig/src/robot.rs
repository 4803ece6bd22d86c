//! 面扫描调度器
//!
//! Robot 级的固定时序状态机：摆好传感臂，在臂的起始停点读两格，
//! 然后反复"旋转盘转一步 + 臂做角块/棱块补偿 + 稳定等待 + 读色"，
//! 产出一趟扫描的有序分类结果。序列是写死的，不做数据驱动——
//! 对已知几何的六面魔方这是刻意的简化。
//!
//! 全程严格顺序执行：几何上要求臂/盘停稳之后颜色读取才有意义，
//! 电机之间、电机与传感之间都没有并行。

use std::sync::Arc;

use cubescan_hw::{PortDriver, SensorMode};
use tracing::{debug, info};

use crate::actuator::Actuator;
use crate::cancel::CancelToken;
use crate::color::{FaceColor, classify};
use crate::config::{RigConfig, ScanConfig, SensorConfig};
use crate::error::RigError;
use crate::sensor::SensingChannel;

/// 扫描 rig：三个执行机构 + 两路传感通道
pub struct Robot {
    flipper: Actuator,
    spinner: Actuator,
    arm: Actuator,
    color_sensor: SensingChannel,
    ultrasonic: SensingChannel,
    scan: ScanConfig,
    sensor: SensorConfig,
    cancel: CancelToken,
}

impl Robot {
    /// 按配置的端口分配组装整个 rig
    ///
    /// 传感通道在此处完成模式配置（颜色分量 / 英寸距离）。
    pub fn new(
        driver: Arc<dyn PortDriver>,
        config: &RigConfig,
        cancel: CancelToken,
    ) -> Result<Self, RigError> {
        let color_sensor = SensingChannel::new(
            driver.clone(),
            config.ports.color_sensor,
            SensorMode::ColorComponents,
            config.sensor.clone(),
            cancel.clone(),
        )?;
        let ultrasonic = SensingChannel::new(
            driver.clone(),
            config.ports.ultrasonic,
            SensorMode::DistanceInches,
            config.sensor.clone(),
            cancel.clone(),
        )?;

        Ok(Self {
            flipper: Actuator::new(
                driver.clone(),
                config.ports.flipper,
                "flipper",
                config.motors.clone(),
                cancel.clone(),
            ),
            spinner: Actuator::new(
                driver.clone(),
                config.ports.spinner,
                "spinner",
                config.motors.clone(),
                cancel.clone(),
            ),
            arm: Actuator::new(
                driver,
                config.ports.arm,
                "arm",
                config.motors.clone(),
                cancel.clone(),
            ),
            color_sensor,
            ultrasonic,
            scan: config.scan.clone(),
            sensor: config.sensor.clone(),
            cancel,
        })
    }

    pub fn flipper(&self) -> &Actuator {
        &self.flipper
    }

    pub fn spinner(&self) -> &Actuator {
        &self.spinner
    }

    pub fn arm(&self) -> &Actuator {
        &self.arm
    }

    /// 按固定标签查找执行机构
    ///
    /// 标签集合是显式映射（`flipper` / `spinner` / `arm`），未知
    /// 名字返回 `RigError::UnknownActuator`，调用方应在任何物理
    /// 运动之前以致命错误处理。
    pub fn actuator(&self, name: &str) -> Result<&Actuator, RigError> {
        match name {
            "flipper" => Ok(&self.flipper),
            "spinner" => Ok(&self.spinner),
            "arm" => Ok(&self.arm),
            _ => Err(RigError::UnknownActuator {
                name: name.to_string(),
            }),
        }
    }

    /// 将三个执行机构的位置参考全部清零
    ///
    /// 扫描前后各调一次，为多次运行建立已知的机械原点。
    pub fn reset_motor_positions(&self) -> Result<(), RigError> {
        for actuator in [&self.flipper, &self.spinner, &self.arm] {
            actuator.reset_position()?;
        }
        Ok(())
    }

    /// 等待魔方就位
    ///
    /// 轮询超声波通道，读数低于在位阈值即返回。可被取消令牌
    /// 打断。
    pub fn wait_for_cube(&self) -> Result<(), RigError> {
        loop {
            let distance = self.ultrasonic.read_distance()?;
            debug!(distance, "waiting for cube");
            if distance < self.sensor.presence_threshold_inches {
                info!(distance, "cube detected");
                return Ok(());
            }
            if self.cancel.sleep(self.sensor.poll_interval()) {
                return Err(RigError::Cancelled);
            }
        }
    }

    /// 一趟面扫描
    ///
    /// 固定序列：
    /// 1. 臂到标定的扫描起始绝对位置，读第 1 格；
    /// 2. 臂相对偏移到同一停点的第 2 格，读第 2 格；
    /// 3. N 次：旋转盘相对转一步，臂按步序奇偶做 ±补偿，
    ///    稳定等待后读下一格。
    ///
    /// 返回 2 + N 个分类结果，顺序即走位顺序。任一步失败整趟
    /// 中止：没有部分恢复，也不对可疑分类重读。
    pub fn scan_face(&self) -> Result<Vec<FaceColor>, RigError> {
        let mut colors = Vec::with_capacity(self.scan.squares_per_pass());

        self.arm.set_position(self.scan.arm_home)?;
        colors.push(self.read_square(colors.len())?);

        self.arm.set_position_relative(self.scan.second_square_offset)?;
        colors.push(self.read_square(colors.len())?);

        for step in 0..self.scan.spin_steps {
            self.spinner.set_position_relative(self.scan.spin_step)?;

            // 角块比棱块离传感臂更远：按步序奇偶交替补偿
            let compensation = if step % 2 == 0 {
                self.scan.arm_compensation
            } else {
                -self.scan.arm_compensation
            };
            self.arm.set_position_relative(compensation)?;

            if self.cancel.sleep(self.scan.settle()) {
                return Err(RigError::Cancelled);
            }
            colors.push(self.read_square(colors.len())?);
        }

        Ok(colors)
    }

    fn read_square(&self, square: usize) -> Result<FaceColor, RigError> {
        let rgb = self.color_sensor.read_color()?;
        let color = classify(rgb);
        info!(square, %rgb, %color, "classified square");
        Ok(color)
    }
}
