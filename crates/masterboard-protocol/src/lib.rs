//! # Master Board Protocol
//!
//! 主控板（master board）数据模型定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 驱动器/电机数量、直方图桶数等常量
//! - `command`: 驱动器与电机的命令表
//! - `feedback`: 传感器反馈（电机、驱动器、IMU）
//! - `stats`: 链路统计、丢包直方图、丢包跟踪器
//!
//! ## 范围
//!
//! 本 crate 只描述主控板接口"交换什么"，不定义任何线上帧格式或比特布局。

pub mod command;
pub mod constants;
pub mod feedback;
pub mod stats;

// 重新导出常用类型
pub use command::*;
pub use constants::*;
pub use feedback::*;
pub use stats::*;

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// 索引越界（驱动器、电机、直方图桶）
    #[error("{what} index {index} out of range (limit: {limit})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },
}

/// 电机在驱动器内的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorSlot {
    /// 驱动器的第一个电机（`motor1`）
    First,
    /// 驱动器的第二个电机（`motor2`）
    Second,
}

/// 将全局电机索引映射为 `(驱动器索引, 槽位)`
///
/// 每个驱动器控制两个电机：电机 `i` 属于驱动器 `i / 2`，
/// 偶数索引为 `motor1`，奇数索引为 `motor2`。
///
/// # 示例
///
/// ```rust
/// use masterboard_protocol::{MotorSlot, motor_location};
///
/// assert_eq!(motor_location(0).unwrap(), (0, MotorSlot::First));
/// assert_eq!(motor_location(3).unwrap(), (1, MotorSlot::Second));
/// assert!(motor_location(12).is_err());
/// ```
pub fn motor_location(motor_index: usize) -> Result<(usize, MotorSlot), ProtocolError> {
    if motor_index >= N_MOTORS {
        return Err(ProtocolError::IndexOutOfRange {
            what: "motor",
            index: motor_index,
            limit: N_MOTORS,
        });
    }
    let slot = if motor_index % MOTORS_PER_DRIVER == 0 {
        MotorSlot::First
    } else {
        MotorSlot::Second
    };
    Ok((motor_index / MOTORS_PER_DRIVER, slot))
}

/// 检查驱动器索引
pub fn check_driver_index(driver_index: usize) -> Result<usize, ProtocolError> {
    if driver_index >= N_SLAVES {
        return Err(ProtocolError::IndexOutOfRange {
            what: "driver",
            index: driver_index,
            limit: N_SLAVES,
        });
    }
    Ok(driver_index)
}
