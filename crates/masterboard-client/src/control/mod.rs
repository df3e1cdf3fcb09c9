//! 会话控制模块
//!
//! - `loop_runner`: 统计会话循环（握手、控制循环、退出时关闭接口）
//! - `ticker`: 固定周期调度（超时重新锚定）
//! - `gate`: 锁存式就绪闸门

pub mod gate;
pub mod loop_runner;
pub mod ticker;

pub use gate::ReadinessGate;
pub use loop_runner::{LoopConfig, run_session};
pub use ticker::Ticker;
