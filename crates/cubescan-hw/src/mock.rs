//! Mock 驱动板后端
//!
//! 用于测试与无硬件仿真：
//! - 记录所有写命令的下发顺序（`Command` 日志），供时序断言；
//! - 编码器模型：默认"瞬移"（下发目标后读数即为目标值），
//!   可为某端口预排一段读数脚本覆盖默认行为；
//! - 传感器模型：按端口的 FIFO 脚本逐次弹出结果，脚本耗尽后
//!   重复最后一个结果（默认为"暂无有效值"）。

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::{HwError, MotorPort, PortDriver, SensorMode, SensorPort, SensorValue};

/// 下发到驱动板的写命令（读操作不记录）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetPower { port: MotorPort, power: i8 },
    SetPositionTarget { port: MotorPort, target: i32 },
    ResetEncoder { port: MotorPort },
    ConfigureSensor { port: SensorPort, mode: SensorMode },
}

/// 单次传感读取的脚本结果
#[derive(Debug, Clone, Copy)]
pub enum SensorOutcome {
    /// 瞬态错误（`HwError::TransientSensor`）
    Transient,
    /// 暂无有效值（`Ok(None)`）
    NotReady,
    /// 有效值
    Value(SensorValue),
}

#[derive(Default)]
struct MockState {
    log: Vec<Command>,
    /// 每端口最近一次下发的目标（瞬移模型的读数来源）
    targets: HashMap<MotorPort, i32>,
    /// 编码器读数脚本（优先于瞬移模型）
    encoder_scripts: HashMap<MotorPort, VecDeque<i32>>,
    /// 冻结的编码器读数（模拟机械卡死，优先于目标值）
    held: HashMap<MotorPort, i32>,
    /// 传感结果脚本
    sensor_scripts: HashMap<SensorPort, VecDeque<SensorOutcome>>,
    /// 脚本耗尽后重复的结果
    sensor_last: HashMap<SensorPort, SensorOutcome>,
}

/// 可编排脚本的 Mock 驱动板
///
/// 内部可变性通过 `parking_lot::Mutex` 实现，满足 `PortDriver`
/// 的 `&self` 约定；调用方以 `Arc<MockDriver>` 共享。
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某电机端口预排一段编码器读数脚本
    ///
    /// 脚本非空时每次 `get_motor_encoder` 弹出一个值；
    /// 耗尽后回落到瞬移模型（最近目标值）。
    pub fn enqueue_encoder(&self, port: MotorPort, readings: impl IntoIterator<Item = i32>) {
        let mut state = self.state.lock();
        state
            .encoder_scripts
            .entry(port)
            .or_default()
            .extend(readings);
    }

    /// 将某电机端口的编码器读数冻结在固定值（模拟机械卡死）
    pub fn hold_encoder(&self, port: MotorPort, reading: i32) {
        self.state.lock().held.insert(port, reading);
    }

    /// 为某传感端口预排一段读取结果脚本
    pub fn script_sensor(&self, port: SensorPort, outcomes: impl IntoIterator<Item = SensorOutcome>) {
        let mut state = self.state.lock();
        state
            .sensor_scripts
            .entry(port)
            .or_default()
            .extend(outcomes);
    }

    /// 到目前为止记录的写命令（按下发顺序）
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().log.clone()
    }
}

impl PortDriver for MockDriver {
    fn set_motor_power(&self, port: MotorPort, power: i8) -> Result<(), HwError> {
        self.state.lock().log.push(Command::SetPower { port, power });
        Ok(())
    }

    fn set_motor_position_target(&self, port: MotorPort, target: i32) -> Result<(), HwError> {
        let mut state = self.state.lock();
        state.log.push(Command::SetPositionTarget { port, target });
        state.targets.insert(port, target);
        Ok(())
    }

    fn get_motor_encoder(&self, port: MotorPort) -> Result<i32, HwError> {
        let mut state = self.state.lock();
        if let Some(script) = state.encoder_scripts.get_mut(&port)
            && let Some(reading) = script.pop_front()
        {
            return Ok(reading);
        }
        if let Some(reading) = state.held.get(&port) {
            return Ok(*reading);
        }
        Ok(state.targets.get(&port).copied().unwrap_or(0))
    }

    fn reset_motor_encoder(&self, port: MotorPort) -> Result<(), HwError> {
        let mut state = self.state.lock();
        state.log.push(Command::ResetEncoder { port });
        state.targets.insert(port, 0);
        Ok(())
    }

    fn configure_sensor(&self, port: SensorPort, mode: SensorMode) -> Result<(), HwError> {
        self.state
            .lock()
            .log
            .push(Command::ConfigureSensor { port, mode });
        Ok(())
    }

    fn get_sensor_value(&self, port: SensorPort) -> Result<Option<SensorValue>, HwError> {
        let mut state = self.state.lock();
        let outcome = match state
            .sensor_scripts
            .get_mut(&port)
            .and_then(|script| script.pop_front())
        {
            Some(outcome) => {
                state.sensor_last.insert(port, outcome);
                outcome
            },
            None => state
                .sensor_last
                .get(&port)
                .copied()
                .unwrap_or(SensorOutcome::NotReady),
        };

        match outcome {
            SensorOutcome::Transient => Err(HwError::TransientSensor { port }),
            SensorOutcome::NotReady => Ok(None),
            SensorOutcome::Value(value) => Ok(Some(value)),
        }
    }
}
