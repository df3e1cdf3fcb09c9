//! # 运行记录
//!
//! 一次会话的全部结果：按采样点对齐的丢包序列、两个方向的丢包直方图、
//! tick 计数与结束原因。可导出为 JSON。

use anyhow::{Context, Result};
use masterboard_protocol::{HISTOGRAM_BUCKETS, LinkStats};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 单个采样点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossSample {
    /// 距会话开始的时间（秒）
    pub time: f64,
    pub cmd: LinkStats,
    pub sensor: LinkStats,
}

impl LossSample {
    pub fn new(time: f64, cmd: LinkStats, sensor: LinkStats) -> Self {
        Self { time, cmd, sensor }
    }
}

/// 按采样点对齐的丢包序列
///
/// 所有序列长度相同，只能通过 [`push`](LossSeries::push) 同时追加。
/// 丢包率在追加时由 [`LinkStats::loss_ratio`] 计算。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLossSeries")]
pub struct LossSeries {
    time: Vec<f64>,
    cmd_lost: Vec<u64>,
    sensor_lost: Vec<u64>,
    cmd_ratio: Vec<f64>,
    sensor_ratio: Vec<f64>,
    cmd_sent: Vec<u64>,
    sensor_sent: Vec<u64>,
}

/// 反序列化中间形态
///
/// 丢包率不读取，加载时由 lost/sent 重新计算，长度校验后才转换为 [`LossSeries`]。
#[derive(Deserialize)]
struct RawLossSeries {
    time: Vec<f64>,
    cmd_lost: Vec<u64>,
    sensor_lost: Vec<u64>,
    cmd_sent: Vec<u64>,
    sensor_sent: Vec<u64>,
}

/// 反序列化的序列长度不一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisalignedSeries {
    /// `time`, `cmd_lost`, `sensor_lost`, `cmd_sent`, `sensor_sent` 的长度
    pub lengths: [usize; 5],
}

impl fmt::Display for MisalignedSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loss series have different lengths: {:?}", self.lengths)
    }
}

impl std::error::Error for MisalignedSeries {}

impl TryFrom<RawLossSeries> for LossSeries {
    type Error = MisalignedSeries;

    fn try_from(raw: RawLossSeries) -> Result<Self, Self::Error> {
        let lengths = [
            raw.time.len(),
            raw.cmd_lost.len(),
            raw.sensor_lost.len(),
            raw.cmd_sent.len(),
            raw.sensor_sent.len(),
        ];
        if lengths.iter().any(|&len| len != lengths[0]) {
            return Err(MisalignedSeries { lengths });
        }
        let mut series = Self::with_capacity(lengths[0]);
        for index in 0..lengths[0] {
            series.push(LossSample {
                time: raw.time[index],
                cmd: LinkStats {
                    sent: raw.cmd_sent[index],
                    lost: raw.cmd_lost[index],
                },
                sensor: LinkStats {
                    sent: raw.sensor_sent[index],
                    lost: raw.sensor_lost[index],
                },
            });
        }
        Ok(series)
    }
}

impl LossSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            cmd_lost: Vec::with_capacity(capacity),
            sensor_lost: Vec::with_capacity(capacity),
            cmd_ratio: Vec::with_capacity(capacity),
            sensor_ratio: Vec::with_capacity(capacity),
            cmd_sent: Vec::with_capacity(capacity),
            sensor_sent: Vec::with_capacity(capacity),
        }
    }

    /// 追加一个采样点（所有序列同时增长）
    pub fn push(&mut self, sample: LossSample) {
        self.time.push(sample.time);
        self.cmd_lost.push(sample.cmd.lost);
        self.sensor_lost.push(sample.sensor.lost);
        self.cmd_ratio.push(sample.cmd.loss_ratio());
        self.sensor_ratio.push(sample.sensor.loss_ratio());
        self.cmd_sent.push(sample.cmd.sent);
        self.sensor_sent.push(sample.sensor.sent);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// 第 `index` 个采样点
    pub fn get(&self, index: usize) -> Option<LossSample> {
        Some(LossSample {
            time: *self.time.get(index)?,
            cmd: LinkStats {
                sent: self.cmd_sent[index],
                lost: self.cmd_lost[index],
            },
            sensor: LinkStats {
                sent: self.sensor_sent[index],
                lost: self.sensor_lost[index],
            },
        })
    }

    /// 按顺序遍历所有采样点
    pub fn iter(&self) -> impl Iterator<Item = LossSample> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }

    pub fn last(&self) -> Option<LossSample> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn cmd_lost(&self) -> &[u64] {
        &self.cmd_lost
    }

    pub fn sensor_lost(&self) -> &[u64] {
        &self.sensor_lost
    }

    pub fn cmd_ratio(&self) -> &[f64] {
        &self.cmd_ratio
    }

    pub fn sensor_ratio(&self) -> &[f64] {
        &self.sensor_ratio
    }

    pub fn cmd_sent(&self) -> &[u64] {
        &self.cmd_sent
    }

    pub fn sensor_sent(&self) -> &[u64] {
        &self.sensor_sent
    }
}

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// 到达时长上限
    Completed,
    /// 握手期间超时，控制循环未运行
    AckTimeout,
    /// 运行期间主控板超时
    BoardTimeout,
    /// 用户中断
    Interrupted,
}

impl RunOutcome {
    /// 是否由主控板检测到的超时结束
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::AckTimeout | Self::BoardTimeout)
    }

    /// 面向用户的结束提示（正常结束时为 None）
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Completed => None,
            Self::AckTimeout => Some("Timeout while waiting for ack."),
            Self::BoardTimeout => Some(
                "Masterboard timeout detected. Either the masterboard has been shut down \
                 or there has been a connection issue with the cable/wifi.",
            ),
            Self::Interrupted => Some("Keyboard Interrupt"),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Completed => "completed",
            Self::AckTimeout => "ack timeout",
            Self::BoardTimeout => "board timeout",
            Self::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// 一次会话的运行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// 会话所用的接口名称
    pub interface: String,
    pub outcome: RunOutcome,
    /// 执行的控制 tick 数
    pub ticks: u64,
    /// 就绪闸门锁存时的 tick（从未就绪时为 None）
    pub ready_tick: Option<u64>,
    /// 错过截止时间超过一个周期的 tick 数
    pub overruns: u64,
    pub samples: LossSeries,
    /// 传感器方向丢包直方图（桶 i 对应长度 i + 1 的连续丢包段）
    pub histogram_sensor: [u32; HISTOGRAM_BUCKETS],
    /// 命令方向丢包直方图
    pub histogram_cmd: [u32; HISTOGRAM_BUCKETS],
}

impl RunRecord {
    /// 创建空记录（结束原因默认为 `Completed`）
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            outcome: RunOutcome::Completed,
            ticks: 0,
            ready_tick: None,
            overruns: 0,
            samples: LossSeries::new(),
            histogram_sensor: [0; HISTOGRAM_BUCKETS],
            histogram_cmd: [0; HISTOGRAM_BUCKETS],
        }
    }

    /// 保存为 JSON 文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("创建运行记录文件失败: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).context("序列化运行记录失败")?;
        writer.flush().context("刷新缓冲区失败")?;
        Ok(())
    }

    /// 从 JSON 文件加载
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("打开运行记录文件失败: {}", path.display()))?;
        let record =
            serde_json::from_reader(BufReader::new(file)).context("反序列化运行记录失败")?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn stats(sent: u64, lost: u64) -> LinkStats {
        LinkStats { sent, lost }
    }

    #[test]
    fn test_push_derives_ratios() {
        let mut series = LossSeries::new();
        series.push(LossSample::new(0.1, stats(100, 3), stats(100, 0)));
        series.push(LossSample::new(0.2, stats(200, 3), stats(200, 7)));

        assert_eq!(series.len(), 2);
        assert_eq!(series.cmd_ratio(), &[3.0, 1.5]);
        assert_eq!(series.sensor_ratio(), &[0.0, 3.5]);
        assert_eq!(series.cmd_sent(), &[100, 200]);
        assert_eq!(series.last().unwrap().sensor, stats(200, 7));
    }

    #[test]
    fn test_zero_sent_ratio_is_zero() {
        let mut series = LossSeries::new();
        series.push(LossSample::new(0.0, stats(0, 0), stats(0, 0)));
        assert_eq!(series.cmd_ratio(), &[0.0]);
        assert_eq!(series.sensor_ratio(), &[0.0]);
    }

    #[test]
    fn test_get_out_of_range() {
        let series = LossSeries::new();
        assert!(series.get(0).is_none());
        assert!(series.last().is_none());
        assert!(series.is_empty());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(RunOutcome::Completed.message(), None);
        assert_eq!(
            RunOutcome::AckTimeout.message(),
            Some("Timeout while waiting for ack.")
        );
        assert!(
            RunOutcome::BoardTimeout
                .message()
                .unwrap()
                .starts_with("Masterboard timeout detected.")
        );
        assert!(RunOutcome::AckTimeout.is_timeout());
        assert!(!RunOutcome::Interrupted.is_timeout());
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");

        let mut record = RunRecord::new("sim");
        record.ticks = 300;
        record.ready_tick = Some(101);
        record.outcome = RunOutcome::Interrupted;
        record.histogram_cmd[0] = 4;
        record.histogram_sensor[19] = 1;
        for k in 1..=3u64 {
            record.samples.push(LossSample::new(
                k as f64 * 0.5,
                stats(k * 100, k),
                stats(k * 100, 2 * k),
            ));
        }

        record.save_json(&path).unwrap();
        let loaded = RunRecord::load_json(&path).unwrap();
        assert_eq!(loaded, record);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"outcome\": \"interrupted\""));
    }

    #[test]
    fn test_load_rejects_misaligned_series() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");

        let record = RunRecord::new("sim");
        let mut value = serde_json::to_value(&record).unwrap();
        value["samples"]["time"] = serde_json::json!([0.1]);
        std::fs::write(&path, value.to_string()).unwrap();

        let err = RunRecord::load_json(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("different lengths"));
    }

    #[test]
    fn test_load_recomputes_ratios_from_counters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edited.json");

        let mut record = RunRecord::new("sim");
        record
            .samples
            .push(LossSample::new(0.5, stats(200, 5), stats(400, 1)));
        let mut value = serde_json::to_value(&record).unwrap();
        value["samples"]["cmd_ratio"] = serde_json::json!([99.0]);
        value["samples"]
            .as_object_mut()
            .unwrap()
            .remove("sensor_ratio");
        std::fs::write(&path, value.to_string()).unwrap();

        let loaded = RunRecord::load_json(&path).unwrap();
        assert_eq!(loaded.samples.cmd_ratio(), &[2.5]);
        assert_eq!(loaded.samples.sensor_ratio(), &[0.25]);
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = RunRecord::load_json(dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    proptest! {
        #[test]
        fn prop_series_stay_aligned(
            points in prop::collection::vec((1u64..10_000, 0u64..10_000, 1u64..10_000, 0u64..10_000), 0..64)
        ) {
            let mut series = LossSeries::new();
            for (k, &(cmd_sent, cmd_lost, sensor_sent, sensor_lost)) in points.iter().enumerate() {
                let cmd = stats(cmd_sent, cmd_lost.min(cmd_sent));
                let sensor = stats(sensor_sent, sensor_lost.min(sensor_sent));
                series.push(LossSample::new(k as f64, cmd, sensor));
            }

            let len = series.len();
            prop_assert_eq!(len, points.len());
            prop_assert_eq!(series.cmd_lost().len(), len);
            prop_assert_eq!(series.sensor_lost().len(), len);
            prop_assert_eq!(series.cmd_ratio().len(), len);
            prop_assert_eq!(series.sensor_ratio().len(), len);
            for k in 0..len {
                prop_assert_eq!(
                    series.cmd_ratio()[k],
                    100.0 * series.cmd_lost()[k] as f64 / series.cmd_sent()[k] as f64
                );
                prop_assert_eq!(
                    series.sensor_ratio()[k],
                    100.0 * series.sensor_lost()[k] as f64 / series.sensor_sent()[k] as f64
                );
            }
        }
    }
}
