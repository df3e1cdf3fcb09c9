//! 主控板接口边界
//!
//! [`MasterBoard`] 是上层（会话、诊断、CLI）与具体后端之间唯一的接缝。
//! 能力集刻意保持很窄：
//!
//! - **握手**: `init()` / `send_init()` / `is_ack_received()` / `is_timeout()`
//! - **周期收发**: `parse_sensor_data()` / `send_command()`
//! - **配置**: `driver_command()` 返回可写的驱动器命令表
//! - **就绪查询**: `motor()` / `driver()` / `imu()`
//! - **丢包统计**: `cmd_stats()` / `sensor_stats()` / 两个直方图
//! - **关闭**: `stop()`
//!
//! 后端可以是仿真器（[`SimMasterBoard`](crate::SimMasterBoard)），
//! 也可以是未来移植的真实协议引擎，控制循环无需任何修改。

use crate::error::DriverError;
use masterboard_protocol::{
    DriverCommand, DriverState, ImuData, LinkStats, LossHistogram, MotorState, SensorData,
    check_driver_index, motor_location,
};

/// 主控板接口
///
/// # 调用顺序
///
/// 1. `init()`（必须先于任何收发）
/// 2. 通过 `driver_command()` 配置驱动器与电机
/// 3. 周期调用 `send_init()` 直到 `is_ack_received()` 或 `is_timeout()`
/// 4. 每个控制周期：`parse_sensor_data()` → 读取状态 → `send_command()`
/// 5. `stop()`（后端自行检测到超时时已自动停止，无需再调用）
pub trait MasterBoard {
    /// 绑定的接口名称
    fn interface(&self) -> &str;

    /// 开始握手（发送第一条初始化消息）
    fn init(&mut self) -> Result<(), DriverError>;

    /// 重发初始化消息
    fn send_init(&mut self) -> Result<(), DriverError>;

    /// 是否已收到主控板的 ack
    fn is_ack_received(&self) -> bool;

    /// 是否检测到超时（握手超时或运行期链路超时）
    fn is_timeout(&self) -> bool;

    /// 可写的驱动器命令表（下一次 `send_command()` 生效）
    fn driver_command(&mut self, index: usize) -> Result<&mut DriverCommand, DriverError>;

    /// 解析最新一帧传感器数据
    fn parse_sensor_data(&mut self) -> Result<(), DriverError>;

    /// 编码并发送命令帧
    fn send_command(&mut self) -> Result<(), DriverError>;

    /// 最近一次解析得到的传感器数据
    fn sensor_data(&self) -> &SensorData;

    /// 命令方向（主机 → 主控板）的累计统计
    fn cmd_stats(&self) -> LinkStats;

    /// 传感器方向（主控板 → 主机）的累计统计
    fn sensor_stats(&self) -> LinkStats;

    /// 命令方向的丢包直方图
    fn cmd_histogram(&self) -> LossHistogram;

    /// 传感器方向的丢包直方图
    fn sensor_histogram(&self) -> LossHistogram;

    /// 关闭接口（停止命令流）
    fn stop(&mut self) -> Result<(), DriverError>;

    /// 单个电机的状态
    fn motor(&self, index: usize) -> Result<MotorState, DriverError> {
        motor_location(index)?;
        Ok(self.sensor_data().motors[index])
    }

    /// 单个驱动器的状态
    fn driver(&self, index: usize) -> Result<DriverState, DriverError> {
        let index = check_driver_index(index)?;
        Ok(self.sensor_data().drivers[index])
    }

    /// IMU 数据
    fn imu(&self) -> ImuData {
        self.sensor_data().imu
    }
}
