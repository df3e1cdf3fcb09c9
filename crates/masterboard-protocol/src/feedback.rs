//! 反馈数据结构定义
//!
//! 主控板每个周期回传一帧传感器数据，包含：
//! - 每个电机的状态（使能、就绪、位置、速度、电流）
//! - 每个驱动器的状态（使能、错误码、ADC）
//! - IMU 数据（加速度计、陀螺仪、姿态、线加速度）

use crate::{N_ADC, N_IMU_AXES, N_MOTORS, N_SLAVES};

/// 单个电机的反馈状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorState {
    /// 电机已使能
    pub enabled: bool,
    /// 电机就绪（完成上电校准，可以接收控制指令）
    pub ready: bool,
    /// 编码器索引已检测到
    pub index_detected: bool,
    /// 位置（rad）
    pub position: f32,
    /// 速度（rad/s）
    pub velocity: f32,
    /// 电流（A）
    pub current: f32,
}

impl MotorState {
    /// 使能且就绪
    pub fn is_operational(&self) -> bool {
        self.enabled && self.ready
    }
}

/// 单个驱动器的反馈状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverState {
    /// 驱动器已使能
    pub enabled: bool,
    /// 错误码（0 表示无错误）
    pub error_code: u8,
    /// ADC 读数（V）
    pub adc: [f32; N_ADC],
}

/// IMU 数据
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImuData {
    /// 加速度计（m/s²）
    pub accelerometer: [f32; N_IMU_AXES],
    /// 陀螺仪（rad/s）
    pub gyroscope: [f32; N_IMU_AXES],
    /// 姿态（roll, pitch, yaw，rad）
    pub attitude: [f32; N_IMU_AXES],
    /// 去除重力后的线加速度（m/s²）
    pub linear_acceleration: [f32; N_IMU_AXES],
}

/// 一帧完整的传感器数据
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorData {
    pub motors: [MotorState; N_MOTORS],
    pub drivers: [DriverState; N_SLAVES],
    pub imu: ImuData,
}

impl SensorData {
    /// 前 `count` 个电机是否全部使能且就绪
    ///
    /// `count` 超过电机总数时按电机总数计算。
    pub fn motors_operational(&self, count: usize) -> bool {
        self.motors
            .iter()
            .take(count.min(N_MOTORS))
            .all(MotorState::is_operational)
    }
}
