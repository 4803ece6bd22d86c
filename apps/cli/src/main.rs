//! # Cubescan CLI
//!
//! 扫描 rig 的命令行入口：
//!
//! ```bash
//! # 扫一趟面，按走位顺序打印分类结果
//! cubescan-cli scan
//!
//! # 确认某个电机真的在动（排除"是不是我疯了"）
//! cubescan-cli motor --motor spinner --position 140
//!
//! # 提高日志级别 / 加载标定配置
//! cubescan-cli --debug --config rig.toml scan
//! ```
//!
//! Ctrl-C 通过取消令牌打断任何阻塞中的收敛等待或传感轮询，
//! 不需要杀进程。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use cubescan_hw::mock::{MockDriver, SensorOutcome};
use cubescan_hw::{PortDriver, Rgb, SensorValue};
use cubescan_rig::{RigConfig, Robot, cancel_pair};
use tracing::{debug, info};

/// Cubescan CLI - 魔方面扫描 rig 命令行工具
#[derive(Parser, Debug)]
#[command(name = "cubescan-cli")]
#[command(about = "Command-line interface for the Cubescan face scanning rig", long_about = None)]
#[command(version)]
struct Cli {
    /// 调高日志级别到 debug
    #[arg(long, global = true)]
    debug: bool,

    /// 标定配置文件（TOML，缺省字段取内置默认）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫一趟面并按走位顺序打印分类结果
    Scan {
        /// 扫描前先等魔方就位（超声波）
        #[arg(long)]
        wait_cube: bool,
    },

    /// 电机调试器：归零、驱动到目标位，然后采样编码器 5 秒
    Motor {
        /// 执行机构标签：flipper / spinner / arm
        #[arg(long)]
        motor: String,

        /// 旋转功率（缺省用配置默认值）
        #[arg(long)]
        power: Option<i8>,

        /// 目标位置
        #[arg(long, default_value_t = 0)]
        position: i32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志：--debug 抬高默认级别，RUST_LOG 可覆盖
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => RigConfig::load(path)?,
        None => RigConfig::default(),
    };

    // Ctrl-C -> 取消令牌，解除阻塞中的收敛等待 / 传感轮询
    let (handle, token) = cancel_pair();
    ctrlc::set_handler(move || handle.cancel())?;

    // TODO: 厂商驱动板的 Rust 绑定发布后接入真实后端；目前
    // 用带演示脚本的 mock 后端代替
    let driver = demo_backend(&config);
    let robot = Robot::new(driver, &config, token)?;

    match cli.command {
        Commands::Scan { wait_cube } => run_scan(&robot, wait_cube),
        Commands::Motor {
            motor,
            power,
            position,
        } => run_motor_debugger(&robot, &motor, power, position),
    }
}

fn run_scan(robot: &Robot, wait_cube: bool) -> Result<()> {
    robot.reset_motor_positions()?;
    if wait_cube {
        robot.wait_for_cube()?;
    }

    let colors = robot.scan_face()?;
    for (square, color) in colors.iter().enumerate() {
        info!(square, %color, "scanned");
    }

    robot.reset_motor_positions()?;
    Ok(())
}

fn run_motor_debugger(
    robot: &Robot,
    motor: &str,
    power: Option<i8>,
    position: i32,
) -> Result<()> {
    // 未知标签在任何物理运动之前即失败退出
    let actuator = robot.actuator(motor)?;

    actuator.reset_position()?;
    if power.is_some() {
        actuator.set_power(power)?;
    }
    actuator.set_position(position)?;

    // 到位后采样编码器 5 秒，肉眼确认没有漂移
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(5) {
        debug!(motor, position = actuator.position()?, "motor position");
        spin_sleep::sleep(Duration::from_millis(100));
    }

    Ok(())
}

/// 演示后端：mock 驱动板预排一面魔方的颜色与就位的超声距离
fn demo_backend(config: &RigConfig) -> Arc<dyn PortDriver> {
    let driver = MockDriver::new();

    let face: Vec<SensorOutcome> = [
        (235, 254, 250),
        (20, 105, 74),
        (250, 210, 10),
        (240, 95, 5),
        (10, 60, 160),
        (200, 40, 60),
        (252, 250, 245),
        (8, 148, 70),
        (250, 205, 12),
    ]
    .into_iter()
    .map(|(r, g, b)| SensorOutcome::Value(SensorValue::Color(Rgb::new(r, g, b))))
    .collect();
    driver.script_sensor(config.ports.color_sensor, face);

    driver.script_sensor(
        config.ports.ultrasonic,
        [
            SensorOutcome::Value(SensorValue::Distance(14.0)),
            SensorOutcome::Value(SensorValue::Distance(4.0)),
        ],
    );

    Arc::new(driver)
}
