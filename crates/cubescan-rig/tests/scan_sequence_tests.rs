//! 面扫描时序集成测试
//!
//! 用脚本化的 MockDriver 驱动一整趟扫描，断言两件事：
//! - 产出的分类序列与走位顺序一一对应（2 + N 个）；
//! - 驱动板收到的命令顺序是 臂绝对位、臂相对位、
//!   (盘相对步进、臂补偿) × N，补偿符号按步序奇偶交替。

use std::sync::Arc;

use cubescan_hw::mock::{MockDriver, SensorOutcome};
use cubescan_hw::{Command, MotorPort, Rgb, SensorMode, SensorPort, SensorValue};
use cubescan_rig::{CancelToken, FaceColor, RigConfig, RigError, Robot};

/// 测试节奏：毫秒级轮询与稳定等待，让整趟扫描在亚秒内跑完
fn fast_config() -> RigConfig {
    let mut config = RigConfig::default();
    config.motors.poll_interval_ms = 5;
    config.sensor.poll_interval_ms = 5;
    config.sensor.timeout_ms = 500;
    config.scan.settle_ms = 5;
    config
}

fn color(r: u8, g: u8, b: u8) -> SensorOutcome {
    SensorOutcome::Value(SensorValue::Color(Rgb::new(r, g, b)))
}

#[test]
fn test_full_scan_pass_colors_and_command_order() {
    let driver = Arc::new(MockDriver::new());
    // 每个停点一个可区分的 RGB，覆盖全部六种面色
    driver.script_sensor(
        SensorPort::S1,
        [
            color(235, 254, 250), // White
            color(20, 105, 74),   // Green
            color(250, 210, 10),  // Yellow
            color(240, 95, 5),    // Orange
            color(10, 60, 160),   // Blue
            color(200, 40, 60),   // Red
            color(255, 255, 250), // White
            color(5, 150, 70),    // Green
            color(0, 0, 0),       // 最近锚点是 Green（见分类器单测）
        ],
    );

    let config = fast_config();
    let robot = Robot::new(driver.clone(), &config, CancelToken::never()).unwrap();

    robot.reset_motor_positions().unwrap();
    let colors = robot.scan_face().unwrap();

    assert_eq!(colors.len(), config.scan.squares_per_pass());
    assert_eq!(
        colors,
        vec![
            FaceColor::White,
            FaceColor::Green,
            FaceColor::Yellow,
            FaceColor::Orange,
            FaceColor::Blue,
            FaceColor::Red,
            FaceColor::White,
            FaceColor::Green,
            FaceColor::Green,
        ]
    );

    let expected = vec![
        // Robot::new - 两路传感通道的模式配置
        Command::ConfigureSensor {
            port: SensorPort::S1,
            mode: SensorMode::ColorComponents,
        },
        Command::ConfigureSensor {
            port: SensorPort::S2,
            mode: SensorMode::DistanceInches,
        },
        // reset_motor_positions - 固定顺序 flipper, spinner, arm
        Command::ResetEncoder { port: MotorPort::A },
        Command::ResetEncoder { port: MotorPort::B },
        Command::ResetEncoder { port: MotorPort::C },
        // 臂到扫描起始绝对位，再相对偏移到第二格
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -500,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -560,
        },
        // 7 步：盘 +140，臂补偿 +60 / -60 交替
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 140,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -500,
        },
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 280,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -560,
        },
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 420,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -500,
        },
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 560,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -560,
        },
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 700,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -500,
        },
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 840,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -560,
        },
        Command::SetPositionTarget {
            port: MotorPort::B,
            target: 980,
        },
        Command::SetPositionTarget {
            port: MotorPort::C,
            target: -500,
        },
    ];
    assert_eq!(driver.commands(), expected);
}

/// spin_steps 可配置：产出数量跟随 2 + N
#[test]
fn test_scan_length_follows_configured_steps() {
    let driver = Arc::new(MockDriver::new());
    driver.script_sensor(
        SensorPort::S1,
        std::iter::repeat_n(color(20, 105, 74), 5),
    );

    let mut config = fast_config();
    config.scan.spin_steps = 3;

    let robot = Robot::new(driver, &config, CancelToken::never()).unwrap();
    let colors = robot.scan_face().unwrap();
    assert_eq!(colors.len(), 5);
    assert!(colors.iter().all(|c| *c == FaceColor::Green));
}

/// 未知执行机构名：查找即失败，且没有任何运动命令下发
#[test]
fn test_unknown_actuator_fails_before_any_motion() {
    let driver = Arc::new(MockDriver::new());
    let robot = Robot::new(driver.clone(), &fast_config(), CancelToken::never()).unwrap();

    let err = robot.actuator("flopper").unwrap_err();
    assert!(matches!(err, RigError::UnknownActuator { .. }));

    // 构造期只有传感器模式配置，没有电机命令
    let commands = driver.commands();
    assert_eq!(commands.len(), 2);
    assert!(
        commands
            .iter()
            .all(|c| matches!(c, Command::ConfigureSensor { .. }))
    );
}

/// 已知标签都能解析到对应端口
#[test]
fn test_actuator_lookup_fixed_tags() {
    let driver = Arc::new(MockDriver::new());
    let robot = Robot::new(driver, &fast_config(), CancelToken::never()).unwrap();

    assert_eq!(robot.actuator("flipper").unwrap().port(), MotorPort::A);
    assert_eq!(robot.actuator("spinner").unwrap().port(), MotorPort::B);
    assert_eq!(robot.actuator("arm").unwrap().port(), MotorPort::C);
}

/// 超声波读数降到阈值以下后 wait_for_cube 返回
#[test]
fn test_wait_for_cube_until_presence() {
    let driver = Arc::new(MockDriver::new());
    driver.script_sensor(
        SensorPort::S2,
        [
            SensorOutcome::Value(SensorValue::Distance(14.0)),
            SensorOutcome::Value(SensorValue::Distance(11.5)),
            SensorOutcome::Value(SensorValue::Distance(4.0)),
        ],
    );

    let robot = Robot::new(driver, &fast_config(), CancelToken::never()).unwrap();
    robot.wait_for_cube().unwrap();
}

/// 扫描中途传感超时：整趟中止，错误原样上抛
#[test]
fn test_sensor_timeout_aborts_scan() {
    let driver = Arc::new(MockDriver::new());
    // 只给前两格的值，第三格起永远没有输出
    driver.script_sensor(
        SensorPort::S1,
        [
            color(235, 254, 250),
            color(20, 105, 74),
            SensorOutcome::NotReady,
        ],
    );

    let mut config = fast_config();
    config.sensor.timeout_ms = 100;

    let robot = Robot::new(driver, &config, CancelToken::never()).unwrap();
    let err = robot.scan_face().unwrap_err();
    assert!(matches!(err, RigError::SensorTimeout { .. }));
}
