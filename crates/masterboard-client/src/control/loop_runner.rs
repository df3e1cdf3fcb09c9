//! Loop Runner - 统计会话循环
//!
//! 驱动一次完整的主控板会话并返回 [`RunRecord`]。
//!
//! # 流程
//!
//! 1. `init()`，配置每个受控驱动器及其两个电机
//! 2. **握手**: 每个周期 `send_init()`，直到收到 ack 或超时
//! 3. **控制循环**: 每个周期 `parse_sensor_data()` → 就绪闸门 →
//!    每 `report_every` 个 tick 输出诊断并采样 → `send_command()`
//! 4. 结束：除接口自行检测到超时外，`stop()` 恰好调用一次
//! 5. 读取两个方向的丢包直方图
//!
//! # 结束条件
//!
//! - 接口报告超时（握手期间为 `AckTimeout`，运行期间为 `BoardTimeout`）
//! - 自会话开始经过 `duration`（`Completed`）
//! - 中断标志被置位（`Interrupted`）
//!
//! # 使用场景
//!
//! ```
//! use masterboard_client::{FakeClock, LoopConfig, run_session};
//! use masterboard_driver::{SimConfig, SimMasterBoard};
//! use std::sync::atomic::AtomicBool;
//!
//! let mut board = SimMasterBoard::new("sim", SimConfig::default());
//! let config = LoopConfig {
//!     duration_ms: 500,
//!     ..LoopConfig::default()
//! };
//! let interrupt = AtomicBool::new(false);
//!
//! let record = run_session(
//!     &mut board,
//!     &FakeClock::new(),
//!     &config,
//!     &interrupt,
//!     &mut std::io::sink(),
//! )
//! .unwrap();
//! assert_eq!(record.ticks, 500);
//! assert_eq!(record.samples.len(), 5);
//! assert_eq!(board.stop_count(), 1);
//! ```

use super::gate::ReadinessGate;
use super::ticker::Ticker;
use crate::clock::Clock;
use crate::diagnostics::write_report;
use crate::error::ClientError;
use masterboard_driver::{DriverError, MasterBoard};
use masterboard_protocol::{MOTORS_PER_DRIVER, N_SLAVES};
use masterboard_tools::{LossSample, RunOutcome, RunRecord};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 会话循环配置（TOML 中的 `[session]` 表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    /// 控制周期（微秒）
    pub period_us: u64,

    /// 会话时长（毫秒，自会话开始计）
    pub duration_ms: u64,

    /// 每多少个 tick 输出一次诊断并采样
    pub report_every: u64,

    /// 受控驱动器数量（每个驱动器两个电机）
    pub controlled_drivers: usize,

    /// 写入驱动器的超时参数
    pub driver_timeout: u8,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            period_us: 1000,     // 1kHz
            duration_ms: 20_000, // 20s
            report_every: 100,
            controlled_drivers: 1,
            driver_timeout: 5,
        }
    }
}

impl LoopConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), ClientError> {
        // ✅ 输入验证
        if self.period_us == 0 {
            return Err(ClientError::ConfigError(format!(
                "Invalid period_us: {} (must be > 0)",
                self.period_us
            )));
        }
        if self.period_us < 100 {
            warn!(
                "Very short control period: {} us. This may cause performance issues.",
                self.period_us
            );
        }
        if self.duration_ms == 0 {
            return Err(ClientError::ConfigError(format!(
                "Invalid duration_ms: {} (must be > 0)",
                self.duration_ms
            )));
        }
        if self.report_every == 0 {
            return Err(ClientError::ConfigError(format!(
                "Invalid report_every: {} (must be > 0)",
                self.report_every
            )));
        }
        if self.controlled_drivers == 0 || self.controlled_drivers > N_SLAVES {
            return Err(ClientError::ConfigError(format!(
                "Invalid controlled_drivers: {} (must be in 1..={})",
                self.controlled_drivers, N_SLAVES
            )));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// 受控电机数量
    pub fn controlled_motors(&self) -> usize {
        self.controlled_drivers * MOTORS_PER_DRIVER
    }
}

/// 退出时关闭接口
///
/// 无论正常返回、`?` 提前返回还是 panic，都会在离开作用域时调用一次 `stop()`；
/// 接口已自行检测到超时时不调用。
struct StopGuard<'a, B: MasterBoard + ?Sized> {
    board: &'a mut B,
    released: bool,
}

impl<'a, B: MasterBoard + ?Sized> StopGuard<'a, B> {
    fn new(board: &'a mut B) -> Self {
        Self {
            board,
            released: false,
        }
    }

    /// 正常结束时显式关闭（返回 `stop()` 的错误）
    fn finish(mut self) -> Result<(), DriverError> {
        self.released = true;
        self.stop_unless_timed_out()
    }

    fn stop_unless_timed_out(&mut self) -> Result<(), DriverError> {
        if self.board.is_timeout() {
            debug!(
                "Interface '{}' timed out and already stopped itself",
                self.board.interface()
            );
            return Ok(());
        }
        self.board.stop()
    }
}

impl<B: MasterBoard + ?Sized> Deref for StopGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        &*self.board
    }
}

impl<B: MasterBoard + ?Sized> DerefMut for StopGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut *self.board
    }
}

impl<B: MasterBoard + ?Sized> Drop for StopGuard<'_, B> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // 尝试关闭（忽略错误，只记录）
        if let Err(e) = self.stop_unless_timed_out() {
            warn!("Failed to stop interface '{}': {}", self.board.interface(), e);
        }
    }
}

/// 配置受控驱动器：两个电机参考电流置零并使能，开启位置翻转检测，设置超时，使能驱动器
fn configure_drivers<B: MasterBoard + ?Sized>(
    board: &mut B,
    config: &LoopConfig,
) -> Result<(), DriverError> {
    for index in 0..config.controlled_drivers {
        let driver = board.driver_command(index)?;
        driver.motor1.set_current_reference(0.0);
        driver.motor2.set_current_reference(0.0);
        driver.motor1.enable();
        driver.motor2.enable();
        driver.enable_position_rollover_error();
        driver.set_timeout(config.driver_timeout);
        driver.enable();
    }
    debug!("Configured {} driver(s)", config.controlled_drivers);
    Ok(())
}

/// 运行一次统计会话
///
/// 这是一个阻塞函数，会持续运行直到接口超时、到达时长或 `interrupt` 被置位。
///
/// # 参数
///
/// - `board`: 主控板接口（会话结束后保持停止状态）
/// - `clock`: 时钟（测试中使用 [`FakeClock`](crate::FakeClock)）
/// - `config`: 循环配置
/// - `interrupt`: 中断标志（例如由 Ctrl-C 处理器置位）
/// - `report`: 周期诊断报告的输出
///
/// # 返回
///
/// - `Ok(RunRecord)`: 会话结束（结束原因见 `RunRecord::outcome`）
/// - `Err(ClientError)`: 配置无效、接口调用失败或报告输出失败
///   （接口调用失败时接口同样会被关闭）
pub fn run_session<B, C, W>(
    board: &mut B,
    clock: &C,
    config: &LoopConfig,
    interrupt: &AtomicBool,
    report: &mut W,
) -> Result<RunRecord, ClientError>
where
    B: MasterBoard + ?Sized,
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    config.validate()?;

    let start = clock.now();
    let deadline = start + config.duration();
    let mut ticker = Ticker::new(config.period(), start);
    let mut record = RunRecord::new(board.interface());

    info!(
        "Session on '{}' started: period {:?}, duration {:?}, {} driver(s)",
        record.interface,
        config.period(),
        config.duration(),
        config.controlled_drivers
    );

    let mut board = StopGuard::new(board);
    board.init()?;
    configure_drivers(&mut *board, config)?;

    // 握手
    let mut outcome = None;
    let mut inits = 0u64;
    while !board.is_timeout() && !board.is_ack_received() {
        if interrupt.load(Ordering::SeqCst) {
            outcome = Some(RunOutcome::Interrupted);
            break;
        }
        ticker.wait(clock);
        board.send_init()?;
        inits += 1;
    }
    if outcome.is_none() {
        if board.is_timeout() {
            warn!("Timeout while waiting for ack.");
            outcome = Some(RunOutcome::AckTimeout);
        } else {
            info!("Ack received after {} init retransmission(s)", inits);
        }
    }

    // 控制循环
    let mut gate = ReadinessGate::new(config.controlled_motors());
    let outcome = match outcome {
        Some(outcome) => outcome,
        None => loop {
            if board.is_timeout() {
                warn!(
                    "Masterboard timeout detected. Either the masterboard has been shut down \
                     or there has been a connection issue with the cable/wifi."
                );
                break RunOutcome::BoardTimeout;
            }
            if interrupt.load(Ordering::SeqCst) {
                info!("Session interrupted at tick {}", record.ticks);
                break RunOutcome::Interrupted;
            }
            if clock.now() >= deadline {
                break RunOutcome::Completed;
            }

            let now = ticker.wait(clock);
            record.ticks += 1;
            let tick = record.ticks;

            board.parse_sensor_data()?;
            gate.update(&*board, tick);

            if tick % config.report_every == 0 {
                write_report(&mut *report, &*board, config.controlled_drivers)?;
                let sample = LossSample::new(
                    now.saturating_sub(start).as_secs_f64(),
                    board.cmd_stats(),
                    board.sensor_stats(),
                );
                debug!(
                    "Sample {} at tick {}: cmd {} / sensor {}",
                    record.samples.len(),
                    tick,
                    sample.cmd,
                    sample.sensor
                );
                record.samples.push(sample);
            }

            board.send_command()?;
        },
    };

    record.outcome = outcome;
    record.ready_tick = gate.latched_at();
    record.overruns = ticker.overruns();
    record.histogram_sensor = *board.sensor_histogram().buckets();
    record.histogram_cmd = *board.cmd_histogram().buckets();

    board.finish()?;

    info!(
        "Session on '{}' finished ({}): {} ticks, {} samples, {} overrun(s)",
        record.interface,
        record.outcome,
        record.ticks,
        record.samples.len(),
        record.overruns
    );
    Ok(record)
}
