//! 驱动层模块
//!
//! 本模块提供主控板的设备接口，包括：
//! - [`MasterBoard`] 接口边界（握手、周期收发、丢包统计、关闭）
//! - 进程内仿真后端 [`SimMasterBoard`]
//! - 链路存活检测 [`ConnectionMonitor`]
//! - 网卡状态检查（Linux）
//! - 诊断快照 [`BoardSnapshot`]
//!
//! # 使用场景
//!
//! 大多数用户应该使用 `masterboard-client` 提供的会话循环，
//! 而不是直接驱动 [`MasterBoard`]。

mod board;
mod builder;
mod error;
pub mod heartbeat;
#[cfg(target_os = "linux")]
pub mod interface_check;
pub mod sim;
pub mod snapshot;

pub use board::MasterBoard;
pub use builder::{MasterBoardBuilder, SIM_INTERFACE, is_sim_interface};
pub use error::DriverError;
pub use heartbeat::ConnectionMonitor;
pub use sim::{SimConfig, SimMasterBoard};
pub use snapshot::BoardSnapshot;
