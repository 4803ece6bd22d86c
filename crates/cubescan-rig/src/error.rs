//! Rig 层错误类型定义

use std::time::Duration;

use cubescan_hw::{HwError, SensorPort};
use thiserror::Error;

/// Rig 层错误类型
#[derive(Error, Debug)]
pub enum RigError {
    /// 硬件层故障（不可重试，直接上抛）
    #[error("Hardware error: {0}")]
    Hw(#[from] HwError),

    /// 传感读取在超时窗口内未获得有效值
    ///
    /// 轮询循环已吞掉所有瞬态错误；走到这里说明传感器在
    /// `waited` 时间内始终没有产出。调度层不做重试，整个
    /// 扫描随之中止。
    #[error("Sensor on {port} timed out after {waited:?}")]
    SensorTimeout { port: SensorPort, waited: Duration },

    /// 电机收敛超出配置的时间上限
    ///
    /// 仅在显式配置了收敛超时才会出现；默认行为与参考实现
    /// 一致——无限阻塞。
    #[error("Motor '{motor}' failed to reach {target} within {timeout:?}")]
    MotorTimeout {
        motor: String,
        target: i32,
        timeout: Duration,
    },

    /// 按名字查找执行机构失败
    ///
    /// 调用方必须视为致命错误：在任何物理运动发生前中止。
    #[error("Unknown actuator '{name}' (expected one of: flipper, spinner, arm)")]
    UnknownActuator { name: String },

    /// 传感值与通道配置的模式不符
    #[error("Unexpected sensor value on {port} for the configured mode")]
    UnexpectedValue { port: SensorPort },

    /// 阻塞等待被取消令牌打断
    #[error("Operation cancelled")]
    Cancelled,

    /// 配置文件读取或解析失败
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 配置文件错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
