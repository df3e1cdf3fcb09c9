//! 链路统计
//!
//! 命令（主机 → 主控板）和传感器（主控板 → 主机）两个方向各有一份统计：
//! - [`LinkStats`]: 累计发送数与丢失数
//! - [`LossHistogram`]: 连续丢包段长度分布（20 个桶）
//! - [`LossTracker`]: 逐包记录送达/丢失，维护上面两者

use crate::{HISTOGRAM_BUCKETS, ProtocolError};
use std::fmt;

/// 单方向链路的累计计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkStats {
    /// 已发送的包数
    pub sent: u64,
    /// 丢失的包数
    pub lost: u64,
}

impl LinkStats {
    /// 丢包率（%）
    ///
    /// `100 * lost / sent`，`sent == 0` 时返回 0.0。
    pub fn loss_ratio(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        100.0 * self.lost as f64 / self.sent as f64
    }

    /// 已送达的包数
    pub fn delivered(&self) -> u64 {
        self.sent.saturating_sub(self.lost)
    }
}

impl fmt::Display for LinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent: {:>8}  lost: {:>8}  ratio: {:>7.3}%",
            self.sent,
            self.lost,
            self.loss_ratio()
        )
    }
}

/// 连续丢包段长度直方图
///
/// 桶 `i` 统计长度恰好为 `i + 1` 的连续丢包段；长度 ≥ 20 的段全部计入最后一个桶。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossHistogram {
    buckets: [u32; HISTOGRAM_BUCKETS],
}

impl LossHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个长度为 `run_length` 的丢包段（0 被忽略）
    pub fn record_run(&mut self, run_length: u64) {
        if run_length == 0 {
            return;
        }
        let index = (run_length as usize).min(HISTOGRAM_BUCKETS) - 1;
        self.buckets[index] = self.buckets[index].saturating_add(1);
    }

    /// 读取第 `index` 个桶
    pub fn bucket(&self, index: usize) -> Result<u32, ProtocolError> {
        self.buckets
            .get(index)
            .copied()
            .ok_or(ProtocolError::IndexOutOfRange {
                what: "histogram bucket",
                index,
                limit: HISTOGRAM_BUCKETS,
            })
    }

    /// 全部桶（固定 20 个）
    pub fn buckets(&self) -> &[u32; HISTOGRAM_BUCKETS] {
        &self.buckets
    }

    /// 丢包段总数
    pub fn total_runs(&self) -> u64 {
        self.buckets.iter().map(|&c| c as u64).sum()
    }

    /// 按段长加权的丢包总数（最后一个桶按 20 计）
    pub fn weighted_total(&self) -> u64 {
        self.buckets
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as u64 + 1) * c as u64)
            .sum()
    }
}

/// 逐包丢失跟踪器
///
/// # 示例
///
/// ```rust
/// use masterboard_protocol::LossTracker;
///
/// let mut tracker = LossTracker::new();
/// for delivered in [true, false, false, true, false] {
///     tracker.record(delivered);
/// }
///
/// assert_eq!(tracker.stats().sent, 5);
/// assert_eq!(tracker.stats().lost, 3);
/// // 一个长度为 2 的段 + 一个仍未结束的长度为 1 的段
/// assert_eq!(tracker.histogram().bucket(1).unwrap(), 1);
/// assert_eq!(tracker.histogram().bucket(0).unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LossTracker {
    stats: LinkStats,
    closed: LossHistogram,
    current_run: u64,
}

impl LossTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个包的结果
    pub fn record(&mut self, delivered: bool) {
        self.stats.sent += 1;
        if delivered {
            if self.current_run > 0 {
                self.closed.record_run(self.current_run);
                self.current_run = 0;
            }
        } else {
            self.stats.lost += 1;
            self.current_run += 1;
        }
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// 当前连续丢包数（最近一次送达之后）
    pub fn current_run(&self) -> u64 {
        self.current_run
    }

    /// 直方图（包含尚未结束的末尾丢包段）
    pub fn histogram(&self) -> LossHistogram {
        let mut histogram = self.closed;
        histogram.record_run(self.current_run);
        histogram
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
