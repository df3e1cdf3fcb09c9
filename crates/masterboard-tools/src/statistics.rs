//! # 统计工具
//!
//! 基于 [`LossSeries`] 的丢包率汇总。

use crate::record::LossSeries;
use masterboard_protocol::LinkStats;
use serde::{Deserialize, Serialize};

/// 计算丢包率（%），同 [`LinkStats::loss_ratio`]
pub fn loss_ratio(lost: u64, sent: u64) -> f64 {
    LinkStats { sent, lost }.loss_ratio()
}

/// 相邻两个采样点之间的区间丢包率（%）
///
/// 返回的序列比采样点少一个；累计计数回退的区间按 0 计算。
pub fn interval_ratios(sent: &[u64], lost: &[u64]) -> Vec<f64> {
    sent.windows(2)
        .zip(lost.windows(2))
        .map(|(s, l)| loss_ratio(l[1].saturating_sub(l[0]), s[1].saturating_sub(s[0])))
        .collect()
}

/// 单方向的丢包汇总
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionSummary {
    /// 最后一个采样点的累计丢包率（%）
    pub final_ratio: f64,
    /// 区间丢包率的最大值（%）
    pub peak_interval_ratio: f64,
    /// 最后一个采样点的累计丢包数
    pub lost: u64,
    /// 最后一个采样点的累计发送数
    pub sent: u64,
}

impl DirectionSummary {
    fn calculate(sent: &[u64], lost: &[u64]) -> Self {
        let (Some(&sent_total), Some(&lost_total)) = (sent.last(), lost.last()) else {
            return Self::default();
        };
        let peak = interval_ratios(sent, lost)
            .into_iter()
            .fold(0.0_f64, f64::max);
        Self {
            final_ratio: loss_ratio(lost_total, sent_total),
            peak_interval_ratio: peak,
            lost: lost_total,
            sent: sent_total,
        }
    }
}

/// 整个会话的丢包汇总
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LossSummary {
    pub samples: usize,
    /// 第一个到最后一个采样点的时间跨度（秒）
    pub span: f64,
    pub cmd: DirectionSummary,
    pub sensor: DirectionSummary,
}

impl LossSummary {
    pub fn calculate(series: &LossSeries) -> Self {
        let span = match (series.time().first(), series.time().last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        Self {
            samples: series.len(),
            span,
            cmd: DirectionSummary::calculate(series.cmd_sent(), series.cmd_lost()),
            sensor: DirectionSummary::calculate(series.sensor_sent(), series.sensor_lost()),
        }
    }
}
