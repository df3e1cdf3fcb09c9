//! 客户端接口模块
//!
//! 本模块在 [`MasterBoard`](masterboard_driver::MasterBoard) 之上提供统计会话：
//! - 时钟抽象（单调时钟 / 虚拟时钟）
//! - 固定周期会话循环，返回 [`RunRecord`](masterboard_tools::RunRecord)
//! - 锁存式就绪闸门
//! - 周期诊断报告
//! - TOML 会话配置
//!
//! # 使用场景
//!
//! 这是大多数用户应该使用的模块。
//! 如果需要逐帧驱动接口，可以直接使用 `masterboard-driver`。

pub mod clock;
pub mod config;
pub mod control;
pub mod diagnostics;
mod error;

// 重新导出常用类型
pub use clock::{Clock, FakeClock, MonotonicClock};
pub use config::SessionConfig;
pub use control::{LoopConfig, ReadinessGate, Ticker, run_session};
pub use diagnostics::{CLEAR_SCREEN, write_report};
pub use error::ClientError;
