//! Master Board SDK - 主控板统计会话 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 无硬件的数据模型（命令表、遥测、丢包统计）
//! - **驱动层** (`driver`): `MasterBoard` 接口边界、仿真后端、网卡检查
//! - **工具层** (`tools`): 运行记录、统计、文本图表
//! - **客户端层** (`client`): 固定周期会话循环、时钟、配置
//!
//! # 快速开始
//!
//! ```rust
//! use masterboard_sdk::prelude::*;
//! use std::sync::atomic::AtomicBool;
//!
//! let mut board = MasterBoardBuilder::new().interface("sim").build().unwrap();
//! let config = LoopConfig {
//!     duration_ms: 200,
//!     ..LoopConfig::default()
//! };
//! let record = run_session(
//!     board.as_mut(),
//!     &FakeClock::new(),
//!     &config,
//!     &AtomicBool::new(false),
//!     &mut std::io::sink(),
//! )
//! .unwrap();
//! assert_eq!(record.outcome, RunOutcome::Completed);
//! ```

pub use masterboard_client as client;
pub use masterboard_driver as driver;
pub use masterboard_protocol as protocol;
pub use masterboard_tools as tools;

mod logging;
pub mod prelude;

pub use logging::init_logger;

// --- 用户以此为界 ---
// 以下是通过 Facade Pattern 提供的公共 API

pub use client::{ClientError, LoopConfig, SessionConfig, run_session};
pub use driver::{DriverError, MasterBoard, MasterBoardBuilder, SimConfig, SimMasterBoard};
pub use protocol::ProtocolError;
pub use tools::{RunOutcome, RunRecord};
