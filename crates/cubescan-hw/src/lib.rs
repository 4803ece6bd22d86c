//! # Cubescan 硬件抽象层
//!
//! 提供统一的驱动板接口抽象：端口标识、传感器模式、原始传感值，
//! 以及 `PortDriver` trait（厂商硬件访问层的不透明边界）。
//!
//! 协议细节（如何与驱动板通信）不在本层实现：真实后端由厂商绑定
//! 提供，本层只约定能力面。`mock` feature 提供一个可编排脚本的
//! `MockDriver`，用于测试与仿真。

use thiserror::Error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{Command, MockDriver};

/// 电机端口标识（驱动板上的物理接口）
///
/// 一经分配给某个执行机构即不再变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorPort {
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for MotorPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotorPort::A => write!(f, "MA"),
            MotorPort::B => write!(f, "MB"),
            MotorPort::C => write!(f, "MC"),
            MotorPort::D => write!(f, "MD"),
        }
    }
}

/// 传感器端口标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorPort {
    S1,
    S2,
    S3,
    S4,
}

impl std::fmt::Display for SensorPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorPort::S1 => write!(f, "S1"),
            SensorPort::S2 => write!(f, "S2"),
            SensorPort::S3 => write!(f, "S3"),
            SensorPort::S4 => write!(f, "S4"),
        }
    }
}

/// 传感器工作模式
///
/// 构造 Sensing Channel 时一次性配置到驱动板。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorMode {
    /// 颜色分量模式（返回 RGB 三元组）
    ColorComponents,
    /// 距离模式（返回英寸标量）
    DistanceInches,
}

/// RGB 三元组（各分量 0-255）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// 原始传感值（按配置的模式返回对应变体）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    /// 颜色分量（`SensorMode::ColorComponents`）
    Color(Rgb),
    /// 距离，英寸（`SensorMode::DistanceInches`）
    Distance(f64),
}

/// 硬件层统一错误类型
#[derive(Error, Debug)]
pub enum HwError {
    /// 瞬态传感错误（传感器尚未就绪）
    ///
    /// 可重试：Sensing Channel 的轮询循环会静默吞掉并重试，
    /// 永远不会越过该层向上传播。
    #[error("Transient sensor error on {port}")]
    TransientSensor { port: SensorPort },

    /// 后端通信故障（不可重试）
    #[error("IO Error: {0}")]
    Io(String),
}

/// 驱动板能力面（厂商硬件访问层的边界）
///
/// 语义约定：
/// - `set_motor_position_target` 是**异步**的：命令下发后立即返回，
///   电机到位与否由调用方自行轮询编码器判断；
/// - `get_sensor_value` 返回 `Ok(None)` 表示传感器暂无有效值
///   （与瞬态错误一样由上层重试）；
/// - 所有方法取 `&self`，实现方自行负责内部可变性，调用方以
///   `Arc<dyn PortDriver>` 共享同一块驱动板。
pub trait PortDriver {
    /// 设置电机功率（-100..=100）
    fn set_motor_power(&self, port: MotorPort, power: i8) -> Result<(), HwError>;

    /// 下发目标编码器位置（异步，不等待到位）
    fn set_motor_position_target(&self, port: MotorPort, target: i32) -> Result<(), HwError>;

    /// 读取当前编码器位置
    fn get_motor_encoder(&self, port: MotorPort) -> Result<i32, HwError>;

    /// 将该端口的位置参考清零（后续读数相对新零点）
    fn reset_motor_encoder(&self, port: MotorPort) -> Result<(), HwError>;

    /// 配置传感器工作模式
    fn configure_sensor(&self, port: SensorPort, mode: SensorMode) -> Result<(), HwError>;

    /// 读取原始传感值；`Ok(None)` 表示暂无有效值
    fn get_sensor_value(&self, port: SensorPort) -> Result<Option<SensorValue>, HwError>;
}
