//! Rig 配置
//!
//! 所有标定常量（公差、超时、扫描几何偏移）集中在 `RigConfig`，
//! 带完整默认值，可从 TOML 文件整体或部分覆盖。
//!
//! 扫描几何里的 ±60 补偿与 140 旋转步进是实测标定值（角块比
//! 棱块离传感臂更远），照抄，不要重新推导。

use std::path::Path;
use std::time::Duration;

use cubescan_hw::{MotorPort, SensorPort};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 电机控制参数（三个执行机构共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// 默认功率（`set_power` 未显式给值时使用）
    pub power: i8,

    /// 位置公差（编码器单位）
    ///
    /// 编码器读数有机械游隙噪声，收敛判定用开区间
    /// `(target - tolerance, target + tolerance)` 而非严格相等。
    pub tolerance: i32,

    /// 收敛轮询间隔（毫秒）
    pub poll_interval_ms: u64,

    /// 收敛超时上限（毫秒）
    ///
    /// `None`（默认）与参考行为一致：目标物理不可达时无限阻塞。
    /// 配置上限后超出返回 `RigError::MotorTimeout`。
    pub convergence_timeout_ms: Option<u64>,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            power: 15,
            tolerance: 7,
            poll_interval_ms: 100,
            convergence_timeout_ms: None,
        }
    }
}

impl MotorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn convergence_timeout(&self) -> Option<Duration> {
        self.convergence_timeout_ms.map(Duration::from_millis)
    }
}

/// 传感读取参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// 读取超时（毫秒）
    pub timeout_ms: u64,

    /// 重试轮询间隔（毫秒）
    pub poll_interval_ms: u64,

    /// 魔方在位判定阈值（英寸，超声波读数低于该值视为在位）
    pub presence_threshold_inches: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            poll_interval_ms: 200,
            presence_threshold_inches: 10.0,
        }
    }
}

impl SensorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 扫描序列几何参数（标定值）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 传感臂扫描起始绝对位置
    pub arm_home: i32,

    /// 同一旋转停点内第二格的臂相对偏移
    pub second_square_offset: i32,

    /// 旋转盘每步相对增量（编码器单位）
    pub spin_step: i32,

    /// 臂补偿幅值：偶数步 +，奇数步 -（角块/棱块几何差）
    pub arm_compensation: i32,

    /// 每步旋转后的机械稳定等待（毫秒）
    pub settle_ms: u64,

    /// 旋转步数 N（一趟扫描产出 2 + N 个色块）
    pub spin_steps: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            arm_home: -500,
            second_square_offset: -60,
            spin_step: 140,
            arm_compensation: 60,
            settle_ms: 200,
            spin_steps: 7,
        }
    }
}

impl ScanConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// 一趟扫描总共产出的色块数
    pub fn squares_per_pass(&self) -> usize {
        2 + self.spin_steps as usize
    }
}

/// 端口分配（接线约定）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub flipper: MotorPort,
    pub spinner: MotorPort,
    pub arm: MotorPort,
    pub color_sensor: SensorPort,
    pub ultrasonic: SensorPort,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            flipper: MotorPort::A,
            spinner: MotorPort::B,
            arm: MotorPort::C,
            color_sensor: SensorPort::S1,
            ultrasonic: SensorPort::S2,
        }
    }
}

/// Rig 总配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub motors: MotorConfig,
    pub sensor: SensorConfig,
    pub scan: ScanConfig,
    pub ports: PortConfig,
}

impl RigConfig {
    /// 从 TOML 文件加载（缺省字段取默认值）
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
