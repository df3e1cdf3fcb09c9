//! # 文本图表
//!
//! 在终端中渲染运行记录：
//! - 丢包直方图（横向条形图，刻度 1..=20）
//! - 丢包数 / 丢包率随时间的变化（sparkline）

use crate::record::RunRecord;
use std::fmt::Write;

/// 条形图的默认最大宽度（字符）
pub const DEFAULT_BAR_WIDTH: usize = 40;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// 渲染横向条形直方图
///
/// 第 `i` 行的刻度为 `i + 1`（连续丢包段长度）。非零计数至少显示一格。
pub fn render_histogram(title: &str, buckets: &[u32], width: usize) -> String {
    let max = buckets.iter().copied().max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    for (i, &count) in buckets.iter().enumerate() {
        let len = if max == 0 || count == 0 {
            0
        } else {
            ((count as u64 * width as u64).div_ceil(max as u64)) as usize
        };
        let _ = writeln!(out, "  {:>2} | {} {}", i + 1, "█".repeat(len), count);
    }
    out
}

/// 渲染 sparkline
///
/// 空序列只输出标题；数值按 `[min, max]` 线性映射到 8 个字符高度。
pub fn render_series(title: &str, time: &[f64], values: &[f64]) -> String {
    let mut out = String::new();
    if values.is_empty() {
        let _ = writeln!(out, "{}: no samples", title);
        return out;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let line: String = values
        .iter()
        .map(|&v| {
            if range <= 0.0 {
                SPARK_LEVELS[0]
            } else {
                let level = ((v - min) / range * (SPARK_LEVELS.len() - 1) as f64).round();
                SPARK_LEVELS[(level as usize).min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect();

    let (start, end) = match (time.first(), time.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => (0.0, 0.0),
    };
    let _ = writeln!(
        out,
        "{} [{:.3} .. {:.3}] over {:.2}s .. {:.2}s",
        title, min, max, start, end
    );
    let _ = writeln!(out, "  {}", line);
    out
}

/// 渲染整个运行记录（直方图 + 四条时间序列）
pub fn render_record(record: &RunRecord, width: usize) -> String {
    let samples = &record.samples;
    let as_f64 = |values: &[u64]| values.iter().map(|&v| v as f64).collect::<Vec<_>>();

    let mut out = String::new();
    out.push_str(&render_histogram(
        "Histogram : sensors lost",
        &record.histogram_sensor,
        width,
    ));
    out.push_str(&render_histogram(
        "Histogram : commands lost",
        &record.histogram_cmd,
        width,
    ));
    out.push_str(&render_series(
        "commands lost",
        samples.time(),
        &as_f64(samples.cmd_lost()),
    ));
    out.push_str(&render_series(
        "sensors lost",
        samples.time(),
        &as_f64(samples.sensor_lost()),
    ));
    out.push_str(&render_series(
        "ratio command loss (%)",
        samples.time(),
        samples.cmd_ratio(),
    ));
    out.push_str(&render_series(
        "ratio sensor loss (%)",
        samples.time(),
        samples.sensor_ratio(),
    ));
    out
}
