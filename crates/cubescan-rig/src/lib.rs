//! # Cubescan Rig Core
//!
//! 魔方面扫描 rig 的核心逻辑：
//! - `Actuator` - 单电机位置/功率控制，有界等待收敛循环
//! - `SensingChannel` - 单传感器的超时守护读取
//! - `color` - 固定调色板上的最近邻颜色分类（纯函数）
//! - `Robot` - 面扫描固定时序调度器
//! - `RigConfig` - 标定常量与参数的文件配置
//! - `CancelToken` - 阻塞等待的外部取消
//!
//! 硬件访问经由 `cubescan-hw` 的 `PortDriver` trait，组合持有、
//! 不继承，真实后端与 mock 后端同样可插。

pub mod actuator;
pub mod cancel;
pub mod color;
pub mod config;
pub mod error;
pub mod robot;
pub mod sensor;

pub use actuator::Actuator;
pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use color::{FaceColor, REFERENCE_PALETTE, classify};
pub use config::{MotorConfig, PortConfig, RigConfig, ScanConfig, SensorConfig};
pub use error::{ConfigError, RigError};
pub use robot::Robot;
pub use sensor::SensingChannel;
