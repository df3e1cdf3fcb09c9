//! # Master Board Tools - 共享数据结构和算法
//!
//! **依赖原则**: 只依赖 `masterboard-protocol`，避免依赖 `masterboard-client`
//!
//! ## 包含模块
//!
//! - `record` - 运行记录（对齐的丢包序列、直方图、结束原因，JSON 导出）
//! - `statistics` - 丢包率统计（纯函数）
//! - `chart` - 终端文本图表

pub mod chart;
pub mod record;
pub mod statistics;

// 重新导出常用类型
pub use chart::{DEFAULT_BAR_WIDTH, render_histogram, render_record, render_series};
pub use record::{LossSample, LossSeries, MisalignedSeries, RunOutcome, RunRecord};
pub use statistics::{DirectionSummary, LossSummary, interval_ratios, loss_ratio};
