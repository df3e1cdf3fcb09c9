//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use masterboard_sdk::prelude::*;
//! ```

// 客户端层（推荐使用）
pub use crate::client::{Clock, FakeClock, LoopConfig, MonotonicClock, SessionConfig, run_session};

// 驱动层
pub use crate::driver::{MasterBoard, MasterBoardBuilder, SimConfig, SimMasterBoard};

// 运行记录
pub use crate::tools::{LossSeries, RunOutcome, RunRecord};

// 错误类型
pub use crate::client::ClientError;
pub use crate::driver::DriverError;
pub use crate::protocol::ProtocolError;
