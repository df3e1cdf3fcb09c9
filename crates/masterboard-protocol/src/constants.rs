//! 主控板相关常量定义
//!
//! 集中定义所有硬件相关的常量，避免在代码中散落"魔法数"。

/// 主控板最多可管理的驱动器（slave）数量
pub const N_SLAVES: usize = 6;

/// 每个驱动器控制的电机数量
pub const MOTORS_PER_DRIVER: usize = 2;

/// 电机总数（`N_SLAVES * MOTORS_PER_DRIVER`）
pub const N_MOTORS: usize = N_SLAVES * MOTORS_PER_DRIVER;

/// IMU 三轴数据的维度
pub const N_IMU_AXES: usize = 3;

/// 每个驱动器的 ADC 通道数
pub const N_ADC: usize = 2;

/// 丢包直方图的桶数
///
/// 桶 `i` 统计长度为 `i + 1` 的连续丢包段，最后一个桶饱和（≥ 20）。
pub const HISTOGRAM_BUCKETS: usize = 20;
