//! 诊断快照
//!
//! 一次性从 [`MasterBoard`] 读取 IMU、ADC、电机、驱动器和两个方向的链路统计，
//! 并按段落渲染为文本（对应原生接口的 `PrintIMU` / `PrintADC` / `PrintMotors` /
//! `PrintMotorDrivers` / `PrintCmdStats` / `PrintSensorStats`）。

use crate::board::MasterBoard;
use masterboard_protocol::{
    DriverState, ImuData, LinkStats, MOTORS_PER_DRIVER, MotorState, N_SLAVES,
};
use std::fmt;

/// 诊断快照（不可变）
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub imu: ImuData,
    /// 受控驱动器的状态（按索引）
    pub drivers: Vec<DriverState>,
    /// 受控电机的状态（按全局索引）
    pub motors: Vec<MotorState>,
    pub cmd_stats: LinkStats,
    pub sensor_stats: LinkStats,
}

impl BoardSnapshot {
    /// 读取前 `controlled_drivers` 个驱动器（及其电机）的快照
    ///
    /// `controlled_drivers` 超过 `N_SLAVES` 时按 `N_SLAVES` 计算。
    pub fn capture<B>(board: &B, controlled_drivers: usize) -> Self
    where
        B: MasterBoard + ?Sized,
    {
        let drivers = controlled_drivers.min(N_SLAVES);
        let data = board.sensor_data();
        Self {
            imu: data.imu,
            drivers: data.drivers[..drivers].to_vec(),
            motors: data.motors[..drivers * MOTORS_PER_DRIVER].to_vec(),
            cmd_stats: board.cmd_stats(),
            sensor_stats: board.sensor_stats(),
        }
    }

    pub fn imu_report(&self) -> ImuReport<'_> {
        ImuReport(&self.imu)
    }

    pub fn adc_report(&self) -> AdcReport<'_> {
        AdcReport(&self.drivers)
    }

    pub fn motors_report(&self) -> MotorsReport<'_> {
        MotorsReport(&self.motors)
    }

    pub fn drivers_report(&self) -> DriversReport<'_> {
        DriversReport(&self.drivers)
    }

    pub fn cmd_stats_report(&self) -> StatsReport {
        StatsReport {
            title: "Command packets",
            stats: self.cmd_stats,
        }
    }

    pub fn sensor_stats_report(&self) -> StatsReport {
        StatsReport {
            title: "Sensor packets",
            stats: self.sensor_stats,
        }
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.imu_report())?;
        write!(f, "{}", self.adc_report())?;
        write!(f, "{}", self.motors_report())?;
        write!(f, "{}", self.drivers_report())?;
        write!(f, "{}", self.cmd_stats_report())?;
        write!(f, "{}", self.sensor_stats_report())
    }
}

fn write_axes(f: &mut fmt::Formatter<'_>, label: &str, axes: &[f32; 3]) -> fmt::Result {
    writeln!(
        f,
        "  {:<12} {:>9.3} {:>9.3} {:>9.3}",
        label, axes[0], axes[1], axes[2]
    )
}

/// IMU 段落
pub struct ImuReport<'a>(&'a ImuData);

impl fmt::Display for ImuReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IMU")?;
        write_axes(f, "accel", &self.0.accelerometer)?;
        write_axes(f, "gyro", &self.0.gyroscope)?;
        write_axes(f, "attitude", &self.0.attitude)?;
        write_axes(f, "linear acc", &self.0.linear_acceleration)
    }
}

/// ADC 段落
pub struct AdcReport<'a>(&'a [DriverState]);

impl fmt::Display for AdcReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ADC")?;
        for (i, driver) in self.0.iter().enumerate() {
            writeln!(
                f,
                "  driver {:>2}: {:>7.3} {:>7.3}",
                i, driver.adc[0], driver.adc[1]
            )?;
        }
        Ok(())
    }
}

/// 电机段落
pub struct MotorsReport<'a>(&'a [MotorState]);

impl fmt::Display for MotorsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Motors    | enabled | ready | index |  position |  velocity |  current"
        )?;
        for (i, motor) in self.0.iter().enumerate() {
            writeln!(
                f,
                "  motor {:>2} | {:>7} | {:>5} | {:>5} | {:>9.3} | {:>9.3} | {:>8.3}",
                i,
                motor.enabled,
                motor.ready,
                motor.index_detected,
                motor.position,
                motor.velocity,
                motor.current
            )?;
        }
        Ok(())
    }
}

/// 驱动器段落
pub struct DriversReport<'a>(&'a [DriverState]);

impl fmt::Display for DriversReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Drivers   | enabled | error")?;
        for (i, driver) in self.0.iter().enumerate() {
            writeln!(
                f,
                "  driver {:>2} | {:>7} | {:>5}",
                i, driver.enabled, driver.error_code
            )?;
        }
        Ok(())
    }
}

/// 链路统计段落
pub struct StatsReport {
    title: &'static str,
    stats: LinkStats,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.title, self.stats)
    }
}
